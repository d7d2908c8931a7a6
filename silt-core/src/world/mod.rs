//! The voxel storage seam.
//!
//! The physics engine never owns voxel storage. It reads and writes blocks
//! through the [`World`] trait, which the storage layer implements and must
//! make safe to call from any worker thread.
use std::sync::Arc;

use silt_utils::{BlockId, BlockPos, BlockState};

mod memory;

pub use memory::MemoryWorld;

/// Identifies a world. One scheduler serves many worlds.
pub type WorldId = u32;

/// Identifies an entity inside a world.
pub type EntityId = u32;

/// Thread safe access to a world's voxels, entities and players.
pub trait World: Send + Sync {
    /// The id this world is registered under.
    fn id(&self) -> WorldId;

    /// Returns the block at `pos`. Positions outside the world read as air.
    fn get_block(&self, pos: BlockPos) -> BlockState;

    /// Writes the block at `pos`.
    ///
    /// Returns `false` if the position is out of bounds or nothing changed.
    fn set_block(&self, pos: BlockPos, state: BlockState) -> bool;

    /// Returns true if `pos` can hold a block.
    fn in_bounds(&self, pos: BlockPos) -> bool;

    /// Looks up an entity by id.
    fn entity(&self, _id: EntityId) -> Option<Arc<dyn Entity>> {
        None
    }

    /// Block positions of the players currently in this world.
    fn player_positions(&self) -> Vec<BlockPos> {
        Vec::new()
    }

    /// Returns the block id at `pos`.
    fn get_id(&self, pos: BlockPos) -> BlockId {
        self.get_block(pos).id
    }

    /// Returns true if `pos` is in bounds and holds air.
    fn is_air(&self, pos: BlockPos) -> bool {
        self.in_bounds(pos) && self.get_block(pos).is_air()
    }
}

/// An entity that can be ticked by the physics workers.
pub trait Entity: Send + Sync {
    /// Advances the entity by one scheduled tick.
    ///
    /// Returns `true` when the entity is finished and should not be ticked
    /// again.
    fn tick(&self, world: &dyn World) -> bool;
}
