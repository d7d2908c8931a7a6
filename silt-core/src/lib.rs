//! # Silt core
//!
//! The block physics engine: a delay-ordered update scheduler drained by a
//! pool of worker threads, and the cellular-automaton rules those workers
//! run against voxel storage.

pub mod behavior;
pub mod config;
pub mod physics;
pub mod world;

#[cfg(test)]
mod test_util;
