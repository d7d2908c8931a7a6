// Wrapper types making it harder to accidentaly use the wrong underlying type.

use std::fmt::{self, Display};

use crate::math::{vector2::Vector2, vector3::Vector3};

/// A raw block type id. Ids above the vanilla range are physics-only blocks
/// that get sent to clients as their vanilla fallback.
pub type BlockId = u8;

/// The block stored in a single voxel: its type id plus 8 bits of metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockState {
    /// The block type id.
    pub id: BlockId,
    /// Block specific metadata (fluid level, wool colour, ...).
    pub meta: u8,
}

impl BlockState {
    /// The air block.
    pub const AIR: Self = Self { id: 0, meta: 0 };

    /// Creates a block state with zeroed metadata.
    #[must_use]
    pub const fn new(id: BlockId) -> Self {
        Self { id, meta: 0 }
    }

    /// Creates a block state with the given metadata.
    #[must_use]
    pub const fn with_meta(id: BlockId, meta: u8) -> Self {
        Self { id, meta }
    }

    /// Returns true if this is air.
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.id == 0
    }
}

// A chunk position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos(pub Vector2<i32>);

impl ChunkPos {
    /// Creates a chunk position from chunk coordinates.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self(Vector2::new(x, z))
    }

    /// The chunk x coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.0.x
    }

    /// The chunk z coordinate.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.0.y
    }
}

/// A block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos(pub Vector3<i32>);

impl BlockPos {
    /// The lowest valid y coordinate.
    pub const MIN_Y: i32 = 0;
    /// The highest valid y coordinate.
    pub const MAX_Y: i32 = 255;

    /// Creates a new block position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// The x coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.0.x
    }

    /// The y coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.0.y
    }

    /// The z coordinate.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.0.z
    }

    /// Returns this position moved by the given deltas.
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.0.x + dx, self.0.y + dy, self.0.z + dz)
    }

    /// The position directly below.
    #[must_use]
    pub const fn below(&self) -> Self {
        self.offset(0, -1, 0)
    }

    /// The position directly above.
    #[must_use]
    pub const fn above(&self) -> Self {
        self.offset(0, 1, 0)
    }

    /// Returns true if the y coordinate is inside the build height.
    #[must_use]
    pub const fn has_valid_y(&self) -> bool {
        self.0.y >= Self::MIN_Y && self.0.y <= Self::MAX_Y
    }

    /// The chunk column containing this position.
    #[must_use]
    pub const fn chunk(&self) -> ChunkPos {
        ChunkPos::new(self.0.x >> 4, self.0.z >> 4)
    }

    /// Index of this position inside its 16x16x16 section.
    #[must_use]
    pub const fn section_index(&self) -> usize {
        (((self.0.y & 15) << 8) | ((self.0.z & 15) << 4) | (self.0.x & 15)) as usize
    }

    /// The six face neighbours, in the order -x, +x, -y, +y, -z, +z.
    #[must_use]
    pub const fn neighbours(&self) -> [Self; 6] {
        [
            self.offset(-1, 0, 0),
            self.offset(1, 0, 0),
            self.offset(0, -1, 0),
            self.offset(0, 1, 0),
            self.offset(0, 0, -1),
            self.offset(0, 0, 1),
        ]
    }

    /// Squared distance to another position, saturating at `i64::MAX`.
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> i64 {
        let widen = |v: Vector3<i32>| Vector3::new(i64::from(v.x), i64::from(v.y), i64::from(v.z));
        let gap = widen(other.0) - widen(self.0);
        gap.x
            .saturating_mul(gap.x)
            .saturating_add(gap.y.saturating_mul(gap.y))
            .saturating_add(gap.z.saturating_mul(gap.z))
    }
}

impl Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_of_negative_positions() {
        assert_eq!(BlockPos::new(-1, 0, -16).chunk(), ChunkPos::new(-1, -1));
        assert_eq!(BlockPos::new(-17, 0, 15).chunk(), ChunkPos::new(-2, 0));
        assert_eq!(BlockPos::new(31, 0, 16).chunk(), ChunkPos::new(1, 1));
    }

    #[test]
    fn test_section_index_is_unique_within_section() {
        let mut seen = vec![false; 4096];
        for y in 16..32 {
            for z in -16..0 {
                for x in 0..16 {
                    let pos = BlockPos::new(x, y, z);
                    let index = pos.section_index();
                    assert!(!seen[index], "duplicate index for {pos}");
                    seen[index] = true;
                }
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_distance_squared_far_apart() {
        let origin = BlockPos::new(0, 4, 0);
        assert_eq!(origin.distance_squared(&BlockPos::new(3, 0, -1)), 26);
        assert_eq!(origin.distance_squared(&BlockPos::new(50_000, 4, 0)), 2_500_000_000);

        let low = BlockPos::new(i32::MIN, 0, i32::MIN);
        let high = BlockPos::new(i32::MAX, 0, i32::MAX);
        assert_eq!(low.distance_squared(&high), i64::MAX);
    }

    #[test]
    fn test_valid_y() {
        assert!(BlockPos::new(0, 0, 0).has_valid_y());
        assert!(BlockPos::new(0, 255, 0).has_valid_y());
        assert!(!BlockPos::new(0, -1, 0).has_valid_y());
        assert!(!BlockPos::new(0, 256, 0).has_valid_y());
    }
}
