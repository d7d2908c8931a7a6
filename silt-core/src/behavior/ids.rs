//! Block ids known to the physics rules.
//!
//! Ids below 70 are blocks clients know. Higher ids are physics-only blocks
//! that clients see as their vanilla fallback.
#![allow(missing_docs)]

use silt_utils::BlockId;

pub const AIR: BlockId = 0;
pub const STONE: BlockId = 1;
pub const GRASS: BlockId = 2;
pub const DIRT: BlockId = 3;
pub const WATER: BlockId = 8;
pub const STILL_WATER: BlockId = 9;
pub const LAVA: BlockId = 10;
pub const STILL_LAVA: BlockId = 11;
pub const SAND: BlockId = 12;
pub const GRAVEL: BlockId = 13;
pub const SPONGE: BlockId = 19;
/// First of the 16 wool colours.
pub const WOOL_FIRST: BlockId = 21;
/// Last of the 16 wool colours.
pub const WOOL_LAST: BlockId = 36;
pub const GREEN_WOOL: BlockId = 25;
pub const GRAY_WOOL: BlockId = 35;
pub const WHITE_WOOL: BlockId = 36;
pub const IRON: BlockId = 42;
pub const SNOW_COVER: BlockId = 53;

pub const ACTIVE_WATER: BlockId = 70;
pub const SPONGE_AGENT: BlockId = 71;
pub const C235: BlockId = 72;
pub const FIREWORK: BlockId = 73;
pub const ROCKET: BlockId = 74;
pub const SHARK: BlockId = 75;
pub const SNOW: BlockId = 76;

/// Returns true for the ids a fluid rule treats as water.
#[must_use]
pub const fn is_water(id: BlockId) -> bool {
    matches!(id, WATER | STILL_WATER | ACTIVE_WATER)
}

/// Returns true for wool of any colour.
#[must_use]
pub const fn is_wool(id: BlockId) -> bool {
    id >= WOOL_FIRST && id <= WOOL_LAST
}
