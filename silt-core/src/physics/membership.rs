//! Per-voxel counts of queued block updates.
//!
//! The counts back the "queue once" path: a voxel with a non-zero count
//! already has an update on its way. They are advisory. The queue is the
//! source of truth for delivery, and the two are not updated atomically.

use parking_lot::{Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use silt_utils::{BlockPos, ChunkPos};

use crate::world::WorldId;

const SECTION_VOLUME: usize = 16 * 16 * 16;
const SECTIONS_PER_CHUNK: usize = 16;

/// Dense counters for one 16x16x16 section.
struct SectionCounters {
    counts: [u16; SECTION_VOLUME],
    /// Number of voxels with a non-zero count.
    occupied: u16,
}

impl SectionCounters {
    fn new() -> Box<Self> {
        Box::new(Self {
            counts: [0; SECTION_VOLUME],
            occupied: 0,
        })
    }
}

/// Lazily allocated sections of one chunk column.
#[derive(Default)]
struct ChunkCounters {
    sections: [Option<Box<SectionCounters>>; SECTIONS_PER_CHUNK],
}

impl ChunkCounters {
    fn is_empty(&self) -> bool {
        self.sections.iter().all(Option::is_none)
    }
}

/// Counter storage for every world. Access it through [`Membership::lock`].
#[derive(Default)]
pub struct MembershipTable {
    worlds: FxHashMap<WorldId, FxHashMap<ChunkPos, ChunkCounters>>,
}

impl MembershipTable {
    /// The number of queued block updates at `pos`.
    #[must_use]
    pub fn count(&self, world: WorldId, pos: BlockPos) -> u16 {
        if !pos.has_valid_y() {
            return 0;
        }
        self.worlds
            .get(&world)
            .and_then(|chunks| chunks.get(&pos.chunk()))
            .and_then(|chunk| chunk.sections[(pos.y() >> 4) as usize].as_ref())
            .map_or(0, |section| section.counts[pos.section_index()])
    }

    /// Counts one more queued update at `pos`. Saturates instead of
    /// overflowing.
    ///
    /// Returns `false` if `pos` is outside the build height.
    pub fn increment(&mut self, world: WorldId, pos: BlockPos) -> bool {
        if !pos.has_valid_y() {
            return false;
        }
        let chunk = self
            .worlds
            .entry(world)
            .or_default()
            .entry(pos.chunk())
            .or_default();
        let section = chunk.sections[(pos.y() >> 4) as usize].get_or_insert_with(SectionCounters::new);
        let count = &mut section.counts[pos.section_index()];
        if *count == 0 {
            section.occupied += 1;
        }
        *count = count.saturating_add(1);
        true
    }

    /// Counts one queued update at `pos` as gone. Never goes below zero.
    ///
    /// Sections and chunks are released once nothing in them is counted.
    pub fn decrement(&mut self, world: WorldId, pos: BlockPos) {
        if !pos.has_valid_y() {
            return;
        }
        let Some(chunks) = self.worlds.get_mut(&world) else {
            return;
        };
        let chunk_pos = pos.chunk();
        let Some(chunk) = chunks.get_mut(&chunk_pos) else {
            return;
        };
        let slot = &mut chunk.sections[(pos.y() >> 4) as usize];
        let Some(section) = slot.as_mut() else {
            return;
        };
        let count = &mut section.counts[pos.section_index()];
        if *count == 0 {
            return;
        }
        *count -= 1;
        if *count == 0 {
            section.occupied -= 1;
            if section.occupied == 0 {
                *slot = None;
                if chunk.is_empty() {
                    chunks.remove(&chunk_pos);
                }
            }
        }
    }

    /// Drops all counters of a chunk column.
    pub fn remove_chunk(&mut self, world: WorldId, chunk: ChunkPos) {
        if let Some(chunks) = self.worlds.get_mut(&world) {
            chunks.remove(&chunk);
        }
    }

    /// Drops all counters of a world.
    pub fn remove_world(&mut self, world: WorldId) {
        self.worlds.remove(&world);
    }

    /// Drops every counter.
    pub fn clear(&mut self) {
        self.worlds.clear();
    }

    /// Number of allocated sections, across all worlds.
    #[must_use]
    pub fn allocated_sections(&self) -> usize {
        self.worlds
            .values()
            .flat_map(FxHashMap::values)
            .map(|chunk| chunk.sections.iter().filter(|s| s.is_some()).count())
            .sum()
    }
}

/// The manager-wide membership table behind its mutex.
#[derive(Default)]
pub struct Membership {
    table: Mutex<MembershipTable>,
}

impl Membership {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the table. Every read, increment and decrement goes through
    /// this one lock.
    pub fn lock(&self) -> MutexGuard<'_, MembershipTable> {
        self.table.lock()
    }

    /// The number of queued block updates at `pos`.
    #[must_use]
    pub fn count(&self, world: WorldId, pos: BlockPos) -> u16 {
        self.lock().count(world, pos)
    }
}
