//! # Silt utils
//!
//! Small shared types used by every Silt crate: voxel positions, block
//! states and the random number generator handed to rule handlers.

pub mod math;
pub mod random;
pub mod types;

pub use types::{BlockId, BlockPos, BlockState, ChunkPos};
