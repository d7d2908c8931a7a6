//! Fireworks.
//!
//! Breaking a firework launches a rocket above it instead. The rocket climbs
//! one voxel per tick with a lava trail, then bursts into wool particles that
//! drift down for a few hops.

use silt_utils::random::Random;
use silt_utils::{BlockId, BlockPos, BlockState};

use crate::behavior::context::{BlockContext, TickContext};
use crate::behavior::{PhysicsBlock, ids};
use crate::physics::BlockTick;

const ROCKET_RATE: i32 = 1;
const MAX_ASCENT: i32 = 20;
const BURST_RADIUS: i32 = 5;
const PARTICLE_CHANCE: i32 = 40;
const PARTICLE_RATE: i32 = 2;
const PARTICLE_HOPS: i32 = 5;
const PARTICLE_FADE: i32 = 6;

/// The launcher block.
pub struct FireworkBlock;

/// Firework.
pub static FIREWORK_BLOCK: FireworkBlock = FireworkBlock;

impl PhysicsBlock for FireworkBlock {
    fn id(&self) -> BlockId {
        ids::FIREWORK
    }

    fn name(&self) -> &'static str {
        "firework"
    }

    fn vanilla_fallback(&self) -> BlockId {
        ids::IRON
    }

    fn breakable(&self) -> bool {
        false
    }

    fn on_break_attempt(&self, ctx: &BlockContext<'_>, pos: BlockPos) -> bool {
        let above = pos.above();
        if ctx.is_air(above) {
            ctx.set_block(above, BlockState::new(ids::ROCKET));
            ctx.queue_block_with(above, BlockTick::after(ROCKET_RATE).with_data(0));
        }
        false
    }
}

/// A rising rocket. The update's `data` counts the steps climbed.
pub struct RocketBlock;

/// Rocket.
pub static ROCKET_BLOCK: RocketBlock = RocketBlock;

impl RocketBlock {
    fn burst(ctx: &mut TickContext<'_>, pos: BlockPos) {
        let below = pos.below();
        if ctx.get_id(below) == ids::STILL_LAVA {
            ctx.set_block(below, BlockState::AIR);
        }
        ctx.set_block(pos, BlockState::AIR);

        let r = BURST_RADIUS;
        for dx in -r..=r {
            for dy in -r..=r {
                for dz in -r..=r {
                    if dx * dx + dy * dy + dz * dz > r * r {
                        continue;
                    }
                    let target = pos.offset(dx, dy, dz);
                    if !ctx.is_air(target) || !ctx.rng.one_in(PARTICLE_CHANCE) {
                        continue;
                    }
                    let colour = ids::WOOL_FIRST + ctx.rng.next_i32_bounded(16) as BlockId;
                    ctx.set_block(target, BlockState::new(colour));
                    ctx.queue_block_with(
                        target,
                        BlockTick::after(PARTICLE_RATE)
                            .with_data(0)
                            .with_callback(particle_tick),
                    );
                }
            }
        }
    }
}

impl PhysicsBlock for RocketBlock {
    fn id(&self) -> BlockId {
        ids::ROCKET
    }

    fn name(&self) -> &'static str {
        "rocket"
    }

    fn vanilla_fallback(&self) -> BlockId {
        ids::LAVA
    }

    fn tick_rate(&self) -> i32 {
        ROCKET_RATE
    }

    fn tick(&self, ctx: &mut TickContext<'_>, pos: BlockPos, data: i32) {
        if ctx.get_id(pos) != ids::ROCKET {
            return;
        }
        let above = pos.above();
        if data >= MAX_ASCENT || !ctx.is_air(above) {
            Self::burst(ctx, pos);
            return;
        }

        ctx.set_block(above, BlockState::new(ids::ROCKET));
        ctx.set_block(pos, BlockState::new(ids::STILL_LAVA));
        let below = pos.below();
        if ctx.get_id(below) == ids::STILL_LAVA {
            ctx.set_block(below, BlockState::AIR);
        }
        ctx.queue_block_with(above, BlockTick::after(ROCKET_RATE).with_data(data + 1));
    }
}

/// Update handler of a firework particle. `data` counts the hops so far.
pub fn particle_tick(ctx: &mut TickContext<'_>, pos: BlockPos, data: i32) {
    if !ids::is_wool(ctx.get_id(pos)) {
        return;
    }
    let below = pos.below();
    if data >= PARTICLE_HOPS || ctx.rng.one_in(PARTICLE_FADE) || !ctx.is_air(below) {
        ctx.set_block(pos, BlockState::AIR);
        return;
    }
    ctx.move_block(pos, below);
    ctx.queue_block_with(
        below,
        BlockTick::after(PARTICLE_RATE)
            .with_data(data + 1)
            .with_callback(particle_tick),
    );
}
