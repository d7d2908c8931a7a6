//! A three dimensional life-like automaton over the 26 surrounding voxels.
//!
//! Live cells with two or three live neighbours survive and keep ticking,
//! cells with exactly five stay but go dormant, every other count kills the
//! cell. Empty voxels next to a ticking cell with exactly five live
//! neighbours come alive.

use silt_utils::{BlockId, BlockPos, BlockState};
use smallvec::SmallVec;

use crate::behavior::context::{BlockContext, TickContext};
use crate::behavior::{PhysicsBlock, ids};

const BIRTH: usize = 5;

fn surrounding(pos: BlockPos) -> impl Iterator<Item = BlockPos> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| {
            (-1..=1)
                .filter(move |&dz| dx != 0 || dy != 0 || dz != 0)
                .map(move |dz| pos.offset(dx, dy, dz))
        })
    })
}

fn live_neighbours(ctx: &BlockContext<'_>, pos: BlockPos) -> usize {
    surrounding(pos)
        .filter(|&p| ctx.get_id(p) == ids::C235)
        .count()
}

/// The automaton cell.
pub struct C235Block;

/// The c235 automaton.
pub static C235_BLOCK: C235Block = C235Block;

impl PhysicsBlock for C235Block {
    fn id(&self) -> BlockId {
        ids::C235
    }

    fn name(&self) -> &'static str {
        "c235"
    }

    fn vanilla_fallback(&self) -> BlockId {
        ids::GREEN_WOOL
    }

    fn affected_by_neighbours(&self) -> bool {
        true
    }

    fn tick(&self, ctx: &mut TickContext<'_>, pos: BlockPos, _data: i32) {
        if ctx.get_id(pos) != ids::C235 {
            return;
        }

        // Decided against the current generation before anything changes
        let cells = *ctx.block();
        let births: SmallVec<[BlockPos; 8]> = surrounding(pos)
            .filter(|&p| cells.is_air(p) && live_neighbours(&cells, p) == BIRTH)
            .collect();

        match live_neighbours(&cells, pos) {
            2 | 3 => {
                ctx.queue_block_once(pos, self.tick_rate());
            }
            BIRTH => {}
            _ => {
                ctx.set_block(pos, BlockState::AIR);
            }
        }

        for birth in births {
            ctx.set_block(birth, BlockState::new(ids::C235));
            ctx.queue_block_once(birth, self.tick_rate());
        }
    }

    fn on_neighbour_modified(&self, ctx: &BlockContext<'_>, pos: BlockPos, _neighbour: BlockPos) {
        ctx.queue_block_once(pos, self.tick_rate());
    }

    fn on_modified(&self, ctx: &BlockContext<'_>, pos: BlockPos) {
        ctx.queue_block_once(pos, self.tick_rate());
    }
}
