//! A shark that swims toward nearby players.

use silt_utils::random::Random;
use silt_utils::{BlockId, BlockPos, BlockState};

use crate::behavior::context::{BlockContext, TickContext};
use crate::behavior::{PhysicsBlock, ids};

/// Squared radius within which players are noticed.
const SIGHT_SQUARED: i64 = 6 * 6;

/// The shark.
pub struct SharkBlock;

/// Shark.
pub static SHARK_BLOCK: SharkBlock = SharkBlock;

impl SharkBlock {
    /// Returns the closest player within sight. Ties go to the first player
    /// in the world's list.
    fn nearest_player(ctx: &BlockContext<'_>, pos: BlockPos) -> Option<BlockPos> {
        let mut nearest: Option<(i64, BlockPos)> = None;
        for player in ctx.world.player_positions() {
            let distance = pos.distance_squared(&player);
            if distance > SIGHT_SQUARED {
                continue;
            }
            if nearest.is_none_or(|(best, _)| distance < best) {
                nearest = Some((distance, player));
            }
        }
        nearest.map(|(_, player)| player)
    }

    /// One step toward `target` along the axis with the largest gap.
    fn step_toward(pos: BlockPos, target: BlockPos) -> Option<BlockPos> {
        let dx = target.x() - pos.x();
        let dy = target.y() - pos.y();
        let dz = target.z() - pos.z();
        if dx == 0 && dy == 0 && dz == 0 {
            return None;
        }
        let step = if dx.abs() >= dy.abs() && dx.abs() >= dz.abs() {
            pos.offset(dx.signum(), 0, 0)
        } else if dy.abs() >= dz.abs() {
            pos.offset(0, dy.signum(), 0)
        } else {
            pos.offset(0, 0, dz.signum())
        };
        Some(step)
    }

    /// Swaps the shark at `pos` with the water at `to`.
    fn swim(&self, ctx: &BlockContext<'_>, pos: BlockPos, to: BlockPos) {
        let water = ctx.get_block(to);
        let shark = ctx.get_block(pos);
        ctx.set_block(to, shark);
        ctx.set_block(pos, water);
        ctx.queue_block_once(to, self.tick_rate());
    }
}

impl PhysicsBlock for SharkBlock {
    fn id(&self) -> BlockId {
        ids::SHARK
    }

    fn name(&self) -> &'static str {
        "shark"
    }

    fn vanilla_fallback(&self) -> BlockId {
        ids::GRAY_WOOL
    }

    fn tick_rate(&self) -> i32 {
        5
    }

    fn tick(&self, ctx: &mut TickContext<'_>, pos: BlockPos, _data: i32) {
        if ctx.get_id(pos) != ids::SHARK {
            return;
        }

        let above = pos.above();
        if ids::is_water(ctx.get_id(above)) {
            self.swim(ctx, pos, above);
            return;
        }
        let below = pos.below();
        if ctx.is_air(below) {
            ctx.move_block(pos, below);
            ctx.queue_block_once(below, self.tick_rate());
            return;
        }

        let target = match Self::nearest_player(ctx, pos) {
            Some(player) => Self::step_toward(pos, player),
            None => Some(pos.neighbours()[ctx.rng.next_i32_bounded(6) as usize]),
        };
        match target {
            Some(to) if ids::is_water(ctx.get_id(to)) => self.swim(ctx, pos, to),
            _ => {
                ctx.queue_block_once(pos, self.tick_rate());
            }
        }
    }

    fn on_modified(&self, ctx: &BlockContext<'_>, pos: BlockPos) {
        ctx.queue_block_once(pos, self.tick_rate());
    }
}
