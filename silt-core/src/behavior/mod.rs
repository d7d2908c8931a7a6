//! Block rules.
//!
//! Every physics block is a stateless [`PhysicsBlock`] singleton registered
//! once in the global [`BlockRegistry`]. Workers look the rule up by the
//! voxel's current block id when an update comes due.

mod block;
pub mod blocks;
mod context;
pub mod ids;
mod registry;

pub use block::PhysicsBlock;
pub use context::{BlockContext, TickContext};
pub use registry::{BlockRegistry, blocks, init_blocks};
