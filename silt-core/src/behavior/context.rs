//! Handles passed to block rules.

use std::ops::Deref;

use silt_utils::random::Xoroshiro;
use silt_utils::{BlockId, BlockPos, BlockState};

use crate::physics::{BlockTick, Scheduler};
use crate::world::World;

/// The world a rule runs against plus the scheduler it queues into.
#[derive(Clone, Copy)]
pub struct BlockContext<'a> {
    /// Voxel storage.
    pub world: &'a dyn World,
    /// The scheduler that dispatched the rule.
    pub physics: &'a Scheduler,
}

impl<'a> BlockContext<'a> {
    /// Creates a context.
    #[must_use]
    pub const fn new(world: &'a dyn World, physics: &'a Scheduler) -> Self {
        Self { world, physics }
    }

    /// Returns the block at `pos`.
    #[must_use]
    pub fn get_block(&self, pos: BlockPos) -> BlockState {
        self.world.get_block(pos)
    }

    /// Returns the block id at `pos`.
    #[must_use]
    pub fn get_id(&self, pos: BlockPos) -> BlockId {
        self.world.get_id(pos)
    }

    /// Returns true if `pos` is in bounds and holds air.
    #[must_use]
    pub fn is_air(&self, pos: BlockPos) -> bool {
        self.world.is_air(pos)
    }

    /// Writes a block and lets the block and its neighbours react.
    ///
    /// Returns `false` if nothing changed.
    pub fn set_block(&self, pos: BlockPos, state: BlockState) -> bool {
        if !self.world.set_block(pos, state) {
            return false;
        }
        self.physics.notify_block_changed(self.world, pos);
        true
    }

    /// Moves the block at `from` to `to`, leaving air behind.
    pub fn move_block(&self, from: BlockPos, to: BlockPos) {
        let state = self.get_block(from);
        self.set_block(to, state);
        self.set_block(from, BlockState::AIR);
    }

    /// Queues an update for `pos` in this world.
    pub fn queue_block(&self, pos: BlockPos, tick_delay: i32) -> bool {
        self.physics.queue_block(self.world.id(), pos, tick_delay)
    }

    /// Queues an update for `pos` with the given options.
    pub fn queue_block_with(&self, pos: BlockPos, tick: BlockTick) -> bool {
        self.physics.queue_block_with(self.world.id(), pos, tick)
    }

    /// Queues an update for `pos` unless one is already pending.
    pub fn queue_block_once(&self, pos: BlockPos, tick_delay: i32) -> bool {
        self.physics.queue_block_once(self.world.id(), pos, tick_delay)
    }
}

/// Context of a rule's `tick`: a [`BlockContext`] plus the worker's random
/// number generator.
pub struct TickContext<'a> {
    block: BlockContext<'a>,
    /// The dispatching worker's generator.
    pub rng: &'a mut Xoroshiro,
}

impl<'a> TickContext<'a> {
    /// Creates a context.
    pub fn new(world: &'a dyn World, physics: &'a Scheduler, rng: &'a mut Xoroshiro) -> Self {
        Self {
            block: BlockContext::new(world, physics),
            rng,
        }
    }

    /// The context without the generator, for hooks that take one.
    #[must_use]
    pub const fn block(&self) -> &BlockContext<'a> {
        &self.block
    }
}

impl<'a> Deref for TickContext<'a> {
    type Target = BlockContext<'a>;

    fn deref(&self) -> &Self::Target {
        &self.block
    }
}
