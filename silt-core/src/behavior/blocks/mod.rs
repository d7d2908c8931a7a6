//! Block rules.
//!
//! Every rule is a stateless static registered in
//! [`BlockRegistry`](super::BlockRegistry) under its block id.

mod c235_block;
mod falling_block;
mod firework_block;
mod fluid_block;
mod shark_block;
mod snow_block;
mod sponge_block;

pub use c235_block::{C235_BLOCK, C235Block};
pub use falling_block::{FallingBlock, GRAVEL_BLOCK, SAND_BLOCK};
pub use firework_block::{FIREWORK_BLOCK, FireworkBlock, ROCKET_BLOCK, RocketBlock, particle_tick};
pub use fluid_block::{ACTIVE_WATER_BLOCK, FluidBlock, LAVA_BLOCK, WATER_BLOCK};
pub use shark_block::{SHARK_BLOCK, SharkBlock};
pub use snow_block::{SNOW_BLOCK, SnowBlock};
pub use sponge_block::{SPONGE_AGENT_BLOCK, SPONGE_BLOCK, SPONGE_REACH, SpongeAgentBlock, SpongeBlock};
