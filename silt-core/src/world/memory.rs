//! RAM-only world storage.
//!
//! Chunk columns are created on first write and never persisted. Useful for:
//! - Unit tests of rule handlers and the worker pool
//! - The demo world of the server shell
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use silt_utils::{BlockPos, BlockState, ChunkPos};

use super::{Entity, EntityId, World, WorldId};

const COLUMN_VOLUME: usize = 16 * 16 * 256;

type Column = Box<[BlockState]>;

/// In-memory world storage.
pub struct MemoryWorld {
    id: WorldId,
    /// Horizontal extent `(width, length)`. `None` means unbounded.
    size: Option<(i32, i32)>,
    columns: RwLock<FxHashMap<ChunkPos, Column>>,
    entities: scc::HashMap<EntityId, Arc<dyn Entity>>,
    players: Mutex<Vec<BlockPos>>,
}

impl MemoryWorld {
    /// Creates an empty world that is unbounded horizontally.
    #[must_use]
    pub fn new(id: WorldId) -> Self {
        Self {
            id,
            size: None,
            columns: RwLock::new(FxHashMap::default()),
            entities: scc::HashMap::new(),
            players: Mutex::new(Vec::new()),
        }
    }

    /// Creates an empty world spanning `0..width` by `0..length`.
    #[must_use]
    pub fn with_size(id: WorldId, width: i32, length: i32) -> Self {
        Self {
            size: Some((width, length)),
            ..Self::new(id)
        }
    }

    /// Adds an entity. Returns `false` if the id was taken.
    pub fn add_entity(&self, id: EntityId, entity: Arc<dyn Entity>) -> bool {
        self.entities.insert_sync(id, entity).is_ok()
    }

    /// Removes an entity.
    pub fn remove_entity(&self, id: EntityId) -> bool {
        self.entities.remove_sync(&id).is_some()
    }

    /// Replaces the tracked player positions.
    pub fn set_players(&self, players: Vec<BlockPos>) {
        *self.players.lock() = players;
    }

    /// Fills the axis aligned box between `from` and `to` (inclusive).
    pub fn fill(&self, from: BlockPos, to: BlockPos, state: BlockState) {
        for x in from.x().min(to.x())..=from.x().max(to.x()) {
            for y in from.y().min(to.y())..=from.y().max(to.y()) {
                for z in from.z().min(to.z())..=from.z().max(to.z()) {
                    self.set_block(BlockPos::new(x, y, z), state);
                }
            }
        }
    }

    /// Number of non-air blocks. Only meant for tests and diagnostics.
    #[must_use]
    pub fn count_non_air(&self) -> usize {
        self.columns
            .read()
            .values()
            .map(|column| column.iter().filter(|b| !b.is_air()).count())
            .sum()
    }

    fn column_index(pos: BlockPos) -> usize {
        ((pos.y() as usize) << 8) | (((pos.z() & 15) as usize) << 4) | ((pos.x() & 15) as usize)
    }
}

impl World for MemoryWorld {
    fn id(&self) -> WorldId {
        self.id
    }

    fn get_block(&self, pos: BlockPos) -> BlockState {
        if !self.in_bounds(pos) {
            return BlockState::AIR;
        }
        self.columns
            .read()
            .get(&pos.chunk())
            .map_or(BlockState::AIR, |column| column[Self::column_index(pos)])
    }

    fn set_block(&self, pos: BlockPos, state: BlockState) -> bool {
        if !self.in_bounds(pos) {
            return false;
        }
        let mut columns = self.columns.write();
        let chunk = pos.chunk();
        if state.is_air() && !columns.contains_key(&chunk) {
            return false;
        }
        let column = columns
            .entry(chunk)
            .or_insert_with(|| vec![BlockState::AIR; COLUMN_VOLUME].into_boxed_slice());
        let slot = &mut column[Self::column_index(pos)];
        if *slot == state {
            return false;
        }
        *slot = state;
        true
    }

    fn in_bounds(&self, pos: BlockPos) -> bool {
        if !pos.has_valid_y() {
            return false;
        }
        match self.size {
            Some((width, length)) => {
                (0..width).contains(&pos.x()) && (0..length).contains(&pos.z())
            }
            None => true,
        }
    }

    fn entity(&self, id: EntityId) -> Option<Arc<dyn Entity>> {
        self.entities.read_sync(&id, |_, entity| entity.clone())
    }

    fn player_positions(&self) -> Vec<BlockPos> {
        self.players.lock().clone()
    }
}
