//! Sand and gravel.
//!
//! Falls straight down through air. When resting on something it slides off
//! diagonally if both the side cell and the cell below it are free.

use silt_utils::{BlockId, BlockPos};

use crate::behavior::context::{BlockContext, TickContext};
use crate::behavior::{PhysicsBlock, ids};

/// Diagonal slide directions, in the order they are tried.
const SLIDES: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A block that falls and slides like sand.
pub struct FallingBlock {
    id: BlockId,
    name: &'static str,
}

impl FallingBlock {
    /// Creates a falling block rule.
    #[must_use]
    pub const fn new(id: BlockId, name: &'static str) -> Self {
        Self { id, name }
    }

    fn target(ctx: &BlockContext<'_>, pos: BlockPos) -> Option<BlockPos> {
        let below = pos.below();
        if ctx.is_air(below) {
            return Some(below);
        }
        SLIDES
            .iter()
            .map(|&(dx, dz)| pos.offset(dx, -1, dz))
            .find(|diagonal| ctx.is_air(*diagonal) && ctx.is_air(diagonal.above()))
    }
}

/// Sand.
pub static SAND_BLOCK: FallingBlock = FallingBlock::new(ids::SAND, "sand");
/// Gravel.
pub static GRAVEL_BLOCK: FallingBlock = FallingBlock::new(ids::GRAVEL, "gravel");

impl PhysicsBlock for FallingBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn tick_rate(&self) -> i32 {
        2
    }

    fn affected_by_neighbours(&self) -> bool {
        true
    }

    fn tick(&self, ctx: &mut TickContext<'_>, pos: BlockPos, _data: i32) {
        if ctx.get_id(pos) != self.id {
            return;
        }
        if let Some(target) = Self::target(ctx, pos) {
            ctx.move_block(pos, target);
            ctx.queue_block_once(target, self.tick_rate());
        }
    }

    fn on_neighbour_modified(&self, ctx: &BlockContext<'_>, pos: BlockPos, _neighbour: BlockPos) {
        ctx.queue_block_once(pos, self.tick_rate());
    }

    fn on_modified(&self, ctx: &BlockContext<'_>, pos: BlockPos) {
        ctx.queue_block_once(pos, self.tick_rate());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use silt_utils::BlockState;

    use super::*;
    use crate::physics::Scheduler;
    use crate::test_util::settle;
    use crate::world::{MemoryWorld, World};

    fn setup() -> (Scheduler, Arc<MemoryWorld>) {
        let scheduler = Scheduler::new();
        let world = Arc::new(MemoryWorld::new(0));
        scheduler.register_world(world.clone());
        (scheduler, world)
    }

    #[test]
    fn test_sand_settles_at_the_bottom() {
        let (scheduler, world) = setup();
        let start = BlockPos::new(0, 10, 0);
        world.set_block(start, BlockState::new(ids::SAND));
        scheduler.queue_block(0, start, 0);

        settle(&scheduler);

        assert_eq!(world.get_id(BlockPos::new(0, 0, 0)), ids::SAND);
        assert_eq!(world.count_non_air(), 1);
        assert_eq!(scheduler.pending_count(), 0);
        for y in 0..=10 {
            assert_eq!(scheduler.membership_count(0, BlockPos::new(0, y, 0)), 0);
        }
    }

    #[test]
    fn test_sand_slides_off_a_pillar() {
        let (scheduler, world) = setup();
        world.set_block(BlockPos::new(0, 0, 0), BlockState::new(ids::STONE));
        world.set_block(BlockPos::new(0, 1, 0), BlockState::new(ids::GRAVEL));
        scheduler.queue_block(0, BlockPos::new(0, 1, 0), 0);

        settle(&scheduler);

        // -x is tried first
        assert_eq!(world.get_id(BlockPos::new(-1, 0, 0)), ids::GRAVEL);
        assert!(world.is_air(BlockPos::new(0, 1, 0)));
    }

    #[test]
    fn test_slide_needs_free_side_cell() {
        let (scheduler, world) = setup();
        world.set_block(BlockPos::new(0, 0, 0), BlockState::new(ids::STONE));
        world.set_block(BlockPos::new(-1, 1, 0), BlockState::new(ids::STONE));
        world.set_block(BlockPos::new(0, 1, 0), BlockState::new(ids::SAND));
        scheduler.queue_block(0, BlockPos::new(0, 1, 0), 0);

        settle(&scheduler);

        // -x is walled off at the side cell, so +x wins
        assert!(world.is_air(BlockPos::new(-1, 0, 0)));
        assert_eq!(world.get_id(BlockPos::new(1, 0, 0)), ids::SAND);
    }

    #[test]
    fn test_removing_support_starts_a_fall() {
        let (scheduler, world) = setup();
        world.fill(BlockPos::new(-1, 0, -1), BlockPos::new(1, 0, 1), BlockState::new(ids::STONE));
        world.set_block(BlockPos::new(0, 5, 0), BlockState::new(ids::STONE));
        world.set_block(BlockPos::new(0, 6, 0), BlockState::new(ids::SAND));

        let ctx = BlockContext::new(world.as_ref(), &scheduler);
        ctx.set_block(BlockPos::new(0, 5, 0), BlockState::AIR);
        assert_eq!(scheduler.membership_count(0, BlockPos::new(0, 6, 0)), 1);

        settle(&scheduler);
        assert_eq!(world.get_id(BlockPos::new(0, 1, 0)), ids::SAND);
        assert_eq!(scheduler.pending_count(), 0);
    }
}
