//! Water, active water and lava.
//!
//! The low three bits of the metadata hold the spread level, 0 being a
//! source. Bit 3 marks a falling column. A fluid falls into air below it,
//! keeping its level. Otherwise it spreads sideways with `level + 1` into
//! air or into the same fluid at a worse level, and stops at level 7.

use silt_utils::{BlockId, BlockPos, BlockState};

use crate::behavior::context::{BlockContext, TickContext};
use crate::behavior::{PhysicsBlock, ids};

const LEVEL_MASK: u8 = 0b0111;
const FALLING: u8 = 0b1000;
const MAX_LEVEL: u8 = 7;

const SIDES: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A spreading fluid.
pub struct FluidBlock {
    id: BlockId,
    name: &'static str,
    fallback: BlockId,
    tick_rate: i32,
    /// Start spreading as soon as the block is placed.
    flows_on_place: bool,
}

/// Water.
pub static WATER_BLOCK: FluidBlock = FluidBlock {
    id: ids::WATER,
    name: "water",
    fallback: ids::WATER,
    tick_rate: 5,
    flows_on_place: false,
};

/// Water that starts flowing when placed.
pub static ACTIVE_WATER_BLOCK: FluidBlock = FluidBlock {
    id: ids::ACTIVE_WATER,
    name: "active_water",
    fallback: ids::WATER,
    tick_rate: 5,
    flows_on_place: true,
};

/// Lava. Same rule as water, only slower.
pub static LAVA_BLOCK: FluidBlock = FluidBlock {
    id: ids::LAVA,
    name: "lava",
    fallback: ids::LAVA,
    tick_rate: 30,
    flows_on_place: false,
};

impl FluidBlock {
    /// Returns the spread level stored in `meta`.
    #[must_use]
    pub const fn level(meta: u8) -> u8 {
        meta & LEVEL_MASK
    }

    /// Returns true if `meta` marks a falling column.
    #[must_use]
    pub const fn is_falling(meta: u8) -> bool {
        meta & FALLING != 0
    }

    fn accepts(&self, ctx: &BlockContext<'_>, pos: BlockPos, level: u8) -> bool {
        let state = ctx.get_block(pos);
        if state.id == self.id {
            return Self::level(state.meta) > level;
        }
        ctx.is_air(pos)
    }
}

impl PhysicsBlock for FluidBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn vanilla_fallback(&self) -> BlockId {
        self.fallback
    }

    fn tick_rate(&self) -> i32 {
        self.tick_rate
    }

    fn affected_by_neighbours(&self) -> bool {
        true
    }

    fn tick(&self, ctx: &mut TickContext<'_>, pos: BlockPos, _data: i32) {
        let state = ctx.get_block(pos);
        if state.id != self.id {
            return;
        }
        let level = Self::level(state.meta);

        let below = pos.below();
        if ctx.is_air(below) {
            ctx.set_block(below, BlockState::with_meta(self.id, level | FALLING));
            ctx.queue_block_once(below, self.tick_rate);
            return;
        }
        // Part of a column, the bottom of the column does the spreading
        if ctx.get_id(below) == self.id {
            return;
        }

        if level >= MAX_LEVEL {
            return;
        }
        let next = level + 1;
        for (dx, dz) in SIDES {
            let side = pos.offset(dx, 0, dz);
            if self.accepts(ctx, side, next) {
                ctx.set_block(side, BlockState::with_meta(self.id, next));
                ctx.queue_block_once(side, self.tick_rate);
            }
        }
    }

    fn on_neighbour_modified(&self, ctx: &BlockContext<'_>, pos: BlockPos, _neighbour: BlockPos) {
        ctx.queue_block_once(pos, self.tick_rate);
    }

    fn on_modified(&self, ctx: &BlockContext<'_>, pos: BlockPos) {
        if self.flows_on_place {
            ctx.queue_block_once(pos, self.tick_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::physics::Scheduler;
    use crate::test_util::settle;
    use crate::world::{MemoryWorld, World};

    fn pool_floor() -> (Scheduler, Arc<MemoryWorld>) {
        let scheduler = Scheduler::new();
        let world = Arc::new(MemoryWorld::new(0));
        scheduler.register_world(world.clone());
        world.fill(BlockPos::new(-10, 0, -10), BlockPos::new(10, 0, 10), BlockState::new(ids::STONE));
        (scheduler, world)
    }

    #[test]
    fn test_level_bits() {
        assert_eq!(FluidBlock::level(0b1011), 3);
        assert!(FluidBlock::is_falling(0b1011));
        assert!(!FluidBlock::is_falling(7));
    }

    #[test]
    fn test_spread_is_bounded_by_level() {
        let (scheduler, world) = pool_floor();
        let source = BlockPos::new(0, 1, 0);
        world.set_block(source, BlockState::new(ids::WATER));
        scheduler.queue_block(0, source, 0);

        settle(&scheduler);

        // Level grows with Manhattan distance and stops at 7
        assert_eq!(world.get_block(BlockPos::new(3, 1, 4)), BlockState::with_meta(ids::WATER, 7));
        assert_eq!(world.get_block(BlockPos::new(-2, 1, 1)), BlockState::with_meta(ids::WATER, 3));
        assert!(world.is_air(BlockPos::new(4, 1, 4)));
        assert!(world.is_air(BlockPos::new(8, 1, 0)));
        // A diamond of radius 7: 1 + 2 * 7 * 8 cells
        assert_eq!(world.count_non_air(), 21 * 21 + 113);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_falls_as_a_column_then_spreads() {
        let (scheduler, world) = pool_floor();
        let top = BlockPos::new(0, 3, 0);
        world.set_block(top, BlockState::with_meta(ids::ACTIVE_WATER, 5));
        scheduler.queue_block_once(0, top, 0);

        settle(&scheduler);

        let falling = BlockState::with_meta(ids::ACTIVE_WATER, 5 | FALLING);
        assert_eq!(world.get_block(BlockPos::new(0, 2, 0)), falling);
        assert_eq!(world.get_block(BlockPos::new(0, 1, 0)), falling);
        // Spread happens from the bottom only
        assert_eq!(world.get_block(BlockPos::new(1, 1, 0)), BlockState::with_meta(ids::ACTIVE_WATER, 6));
        assert_eq!(world.get_block(BlockPos::new(1, 1, 1)), BlockState::with_meta(ids::ACTIVE_WATER, 7));
        assert!(world.is_air(BlockPos::new(1, 2, 0)));
        assert!(world.is_air(BlockPos::new(2, 1, 1)));
    }

    #[test]
    fn test_placed_active_water_flows_by_itself() {
        let (scheduler, world) = pool_floor();
        let ctx = BlockContext::new(world.as_ref(), &scheduler);
        ctx.set_block(BlockPos::new(0, 1, 0), BlockState::with_meta(ids::ACTIVE_WATER, 6));
        assert_eq!(scheduler.pending_count(), 1);

        settle(&scheduler);
        assert_eq!(world.get_block(BlockPos::new(0, 1, 1)), BlockState::with_meta(ids::ACTIVE_WATER, 7));
        assert_eq!(world.count_non_air(), 21 * 21 + 5);
    }

    #[test]
    fn test_better_level_overrides_worse() {
        let (scheduler, world) = pool_floor();
        world.set_block(BlockPos::new(1, 1, 0), BlockState::with_meta(ids::LAVA, 6));
        world.set_block(BlockPos::new(0, 1, 0), BlockState::with_meta(ids::LAVA, 2));
        world.set_block(BlockPos::new(-1, 1, 0), BlockState::with_meta(ids::WATER, 0));
        scheduler.queue_block(0, BlockPos::new(0, 1, 0), 0);

        settle(&scheduler);
        assert_eq!(world.get_block(BlockPos::new(1, 1, 0)), BlockState::with_meta(ids::LAVA, 3));
        // Lava never replaces water
        assert_eq!(world.get_block(BlockPos::new(-1, 1, 0)), BlockState::with_meta(ids::WATER, 0));
    }
}
