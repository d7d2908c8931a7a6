//! Sponge absorption.
//!
//! A placed sponge turns the water touching it into agents. Every agent tick
//! passes the agent on to the water around it and then clears itself, so the
//! absorption spreads as a wave through the update queue. The hop budget
//! travels in the update's `data`.

use silt_utils::{BlockId, BlockPos, BlockState};

use crate::behavior::context::{BlockContext, TickContext};
use crate::behavior::{PhysicsBlock, ids};
use crate::physics::BlockTick;

/// How many voxels away from the sponge water is still absorbed.
pub const SPONGE_REACH: i32 = 16;

const AGENT_RATE: i32 = 2;

/// Turns water neighbours of `pos` into agents carrying `hops_left`.
fn spawn_agents(ctx: &BlockContext<'_>, pos: BlockPos, hops_left: i32) {
    for neighbour in pos.neighbours() {
        if !ids::is_water(ctx.get_id(neighbour)) {
            continue;
        }
        ctx.set_block(neighbour, BlockState::new(ids::SPONGE_AGENT));
        ctx.queue_block_with(neighbour, BlockTick::after(AGENT_RATE).with_data(hops_left));
    }
}

/// The sponge itself.
pub struct SpongeBlock;

/// Sponge.
pub static SPONGE_BLOCK: SpongeBlock = SpongeBlock;

impl PhysicsBlock for SpongeBlock {
    fn id(&self) -> BlockId {
        ids::SPONGE
    }

    fn name(&self) -> &'static str {
        "sponge"
    }

    fn on_modified(&self, ctx: &BlockContext<'_>, pos: BlockPos) {
        spawn_agents(ctx, pos, SPONGE_REACH - 1);
    }
}

/// The transient marker carrying the absorption wave.
pub struct SpongeAgentBlock;

/// Sponge agent.
pub static SPONGE_AGENT_BLOCK: SpongeAgentBlock = SpongeAgentBlock;

impl PhysicsBlock for SpongeAgentBlock {
    fn id(&self) -> BlockId {
        ids::SPONGE_AGENT
    }

    fn name(&self) -> &'static str {
        "sponge_agent"
    }

    fn vanilla_fallback(&self) -> BlockId {
        ids::AIR
    }

    fn tick_rate(&self) -> i32 {
        AGENT_RATE
    }

    fn tick(&self, ctx: &mut TickContext<'_>, pos: BlockPos, data: i32) {
        if ctx.get_id(pos) != ids::SPONGE_AGENT {
            return;
        }
        if data > 0 {
            spawn_agents(ctx, pos, data - 1);
        }
        ctx.set_block(pos, BlockState::AIR);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::physics::Scheduler;
    use crate::test_util::settle;
    use crate::world::{MemoryWorld, World};

    #[test]
    fn test_sponge_clears_a_pool() {
        let scheduler = Scheduler::new();
        let world = Arc::new(MemoryWorld::new(0));
        scheduler.register_world(world.clone());
        world.fill(BlockPos::new(-2, 0, -2), BlockPos::new(2, 0, 2), BlockState::new(ids::STONE));
        world.fill(BlockPos::new(-1, 1, -1), BlockPos::new(1, 1, 1), BlockState::new(ids::WATER));

        let ctx = BlockContext::new(world.as_ref(), &scheduler);
        ctx.set_block(BlockPos::new(0, 1, 0), BlockState::new(ids::SPONGE));
        // The four face neighbours became agents right away
        assert_eq!(world.get_id(BlockPos::new(1, 1, 0)), ids::SPONGE_AGENT);
        assert_eq!(world.get_id(BlockPos::new(1, 1, 1)), ids::WATER);

        settle(&scheduler);

        assert_eq!(world.get_id(BlockPos::new(0, 1, 0)), ids::SPONGE);
        assert_eq!(world.count_non_air(), 25 + 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_absorption_stops_after_reach() {
        let scheduler = Scheduler::new();
        // A channel one voxel wide along x
        let world = Arc::new(MemoryWorld::with_size(0, 31, 1));
        scheduler.register_world(world.clone());
        world.fill(BlockPos::new(0, 0, 0), BlockPos::new(30, 0, 0), BlockState::new(ids::STONE));
        world.fill(BlockPos::new(1, 1, 0), BlockPos::new(30, 1, 0), BlockState::new(ids::STILL_WATER));

        let ctx = BlockContext::new(world.as_ref(), &scheduler);
        ctx.set_block(BlockPos::new(0, 1, 0), BlockState::new(ids::SPONGE));
        settle(&scheduler);

        for x in 1..=SPONGE_REACH {
            assert!(world.is_air(BlockPos::new(x, 1, 0)), "x = {x}");
        }
        for x in SPONGE_REACH + 1..=30 {
            assert_eq!(world.get_id(BlockPos::new(x, 1, 0)), ids::STILL_WATER, "x = {x}");
        }
    }
}
