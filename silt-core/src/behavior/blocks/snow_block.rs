//! Falling snow.
//!
//! Drifts down through air and turns into a snow cover layer where it lands.
//! Snow landing on snow melts away.

use silt_utils::random::Random;
use silt_utils::{BlockId, BlockPos, BlockState};

use crate::behavior::context::{BlockContext, TickContext};
use crate::behavior::{PhysicsBlock, ids};

const DRIFTS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Behaviour of falling snow.
pub struct SnowBlock;

/// Falling snow.
pub static SNOW_BLOCK: SnowBlock = SnowBlock;

impl PhysicsBlock for SnowBlock {
    fn id(&self) -> BlockId {
        ids::SNOW
    }

    fn name(&self) -> &'static str {
        "snow"
    }

    fn vanilla_fallback(&self) -> BlockId {
        ids::WHITE_WOOL
    }

    fn tick_rate(&self) -> i32 {
        4
    }

    fn tick(&self, ctx: &mut TickContext<'_>, pos: BlockPos, _data: i32) {
        if ctx.get_id(pos) != ids::SNOW {
            return;
        }

        let below = pos.below();
        if !ctx.is_air(below) {
            let landed_on = ctx.get_id(below);
            if landed_on == ids::SNOW || landed_on == ids::SNOW_COVER {
                ctx.set_block(pos, BlockState::AIR);
            } else {
                ctx.set_block(pos, BlockState::new(ids::SNOW_COVER));
            }
            return;
        }

        let mut target = below;
        if ctx.rng.one_in(4) {
            let (dx, dz) = DRIFTS[ctx.rng.next_i32_bounded(4) as usize];
            let drifted = below.offset(dx, 0, dz);
            if ctx.is_air(drifted) {
                target = drifted;
            }
        }
        ctx.move_block(pos, target);
        ctx.queue_block_once(target, self.tick_rate());
    }

    fn on_modified(&self, ctx: &BlockContext<'_>, pos: BlockPos) {
        ctx.queue_block_once(pos, self.tick_rate());
    }
}
