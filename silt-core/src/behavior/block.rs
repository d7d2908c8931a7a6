//! The rule trait implemented by every physics block.

use silt_utils::{BlockId, BlockPos};

use super::context::{BlockContext, TickContext};
use crate::physics::DEFAULT_BLOCK_DELAY;

/// Behaviour of one block id.
///
/// Rules are stateless singletons. All per-voxel state lives in the world
/// (block id and metadata) or in the update's `data` value.
pub trait PhysicsBlock: Send + Sync {
    /// The block id this rule is registered for.
    fn id(&self) -> BlockId;

    /// Lookup name, matched case-insensitively.
    fn name(&self) -> &'static str;

    /// The classic block clients are shown instead of this one.
    fn vanilla_fallback(&self) -> BlockId {
        self.id()
    }

    /// Delay between the rule's own updates, in ticks.
    fn tick_rate(&self) -> i32 {
        DEFAULT_BLOCK_DELAY
    }

    /// Whether [`PhysicsBlock::on_neighbour_modified`] is called when a face
    /// neighbour changes.
    fn affected_by_neighbours(&self) -> bool {
        false
    }

    /// Whether players may break the block without asking the rule.
    fn breakable(&self) -> bool {
        true
    }

    /// Called when a queued update for a voxel holding this block comes due.
    fn tick(&self, _ctx: &mut TickContext<'_>, _pos: BlockPos, _data: i32) {}

    /// Called when a face neighbour of `pos` changed.
    fn on_neighbour_modified(&self, _ctx: &BlockContext<'_>, _pos: BlockPos, _neighbour: BlockPos) {
    }

    /// Called after the voxel at `pos` was set to this block.
    fn on_modified(&self, _ctx: &BlockContext<'_>, _pos: BlockPos) {}

    /// Called when a player tries to break an unbreakable block.
    ///
    /// Returns `true` to let the break go ahead.
    fn on_break_attempt(&self, _ctx: &BlockContext<'_>, _pos: BlockPos) -> bool {
        true
    }
}
