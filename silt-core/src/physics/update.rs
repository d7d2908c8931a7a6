//! Pending update types.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use silt_utils::BlockPos;

use crate::behavior::TickContext;
use crate::world::{EntityId, WorldId};

use super::params::PhysicsParams;

/// Length of one scheduling tick.
pub const TICK: Duration = Duration::from_millis(50);

/// Default delay of a block update, in ticks.
pub const DEFAULT_BLOCK_DELAY: i32 = 20;

/// Default delay of an entity update, in ticks.
pub const DEFAULT_ENTITY_DELAY: i32 = 1;

/// A handler that replaces the rule registry lookup for one update.
///
/// Receives the update's position and its `data` value.
pub type BlockCallback = fn(&mut TickContext<'_>, BlockPos, i32);

/// Returns the instant `tick_delay` ticks after `now`. Negative delays count
/// as zero.
#[must_use]
pub fn due_after(now: Instant, tick_delay: i32) -> Instant {
    now + TICK * tick_delay.max(0) as u32
}

/// Options for scheduling a block update.
#[derive(Debug, Clone, Copy)]
pub struct BlockTick {
    /// Free-form value handed to the handler.
    pub data: i32,
    /// Delay in ticks. Negative delays cancel the update when it is dequeued.
    pub tick_delay: i32,
    /// Actions evaluated before the handler.
    pub params: PhysicsParams,
    /// Handler to call instead of the block's registered rule.
    pub callback: Option<BlockCallback>,
}

impl BlockTick {
    /// A plain update after `tick_delay` ticks.
    #[must_use]
    pub const fn after(tick_delay: i32) -> Self {
        Self {
            data: 0,
            tick_delay,
            params: PhysicsParams::EMPTY,
            callback: None,
        }
    }

    /// Sets the handler data.
    #[must_use]
    pub const fn with_data(mut self, data: i32) -> Self {
        self.data = data;
        self
    }

    /// Sets the action params.
    #[must_use]
    pub const fn with_params(mut self, params: PhysicsParams) -> Self {
        self.params = params;
        self
    }

    /// Sets a callback that replaces the rule lookup.
    #[must_use]
    pub const fn with_callback(mut self, callback: BlockCallback) -> Self {
        self.callback = Some(callback);
        self
    }
}

impl Default for BlockTick {
    fn default() -> Self {
        Self::after(DEFAULT_BLOCK_DELAY)
    }
}

/// What a pending update refers to.
#[derive(Debug, Clone, Copy)]
pub enum UpdateKind {
    /// A voxel update.
    Block {
        /// Current position. Drop and finite actions move it.
        pos: BlockPos,
        /// Position the update was counted at in the membership table.
        counted_at: BlockPos,
        /// Free-form handler value.
        data: i32,
        /// Delay between re-queues, in ticks.
        tick_delay: i32,
        /// Handler replacing the rule lookup.
        callback: Option<BlockCallback>,
    },
    /// An entity tick.
    Entity {
        /// The entity to tick.
        entity_id: EntityId,
        /// Keep ticking until the entity reports it is finished.
        persistent: bool,
        /// Delay between ticks.
        tick_delay: i32,
    },
}

/// A unit of scheduled work.
#[derive(Debug, Clone, Copy)]
pub struct PendingUpdate {
    /// The world the update belongs to.
    pub world: WorldId,
    /// Earliest instant the update may run.
    pub due_at: Instant,
    /// Number of times the action pipeline re-queued this update.
    pub elapsed: u32,
    /// Actions evaluated before the handler.
    pub params: PhysicsParams,
    /// Block or entity payload.
    pub kind: UpdateKind,
}

impl PendingUpdate {
    /// Creates a block update due `tick.tick_delay` ticks after `now`.
    #[must_use]
    pub fn block(world: WorldId, pos: BlockPos, tick: BlockTick, now: Instant) -> Self {
        Self {
            world,
            due_at: due_after(now, tick.tick_delay),
            elapsed: 0,
            params: tick.params,
            kind: UpdateKind::Block {
                pos,
                counted_at: pos,
                data: tick.data,
                tick_delay: tick.tick_delay,
                callback: tick.callback,
            },
        }
    }

    /// Creates an entity update due `tick_delay` ticks after `now`.
    #[must_use]
    pub fn entity(
        world: WorldId,
        entity_id: EntityId,
        persistent: bool,
        tick_delay: i32,
        params: PhysicsParams,
        now: Instant,
    ) -> Self {
        Self {
            world,
            due_at: due_after(now, tick_delay),
            elapsed: 0,
            params,
            kind: UpdateKind::Entity {
                entity_id,
                persistent,
                tick_delay,
            },
        }
    }

    /// The update's delay in ticks.
    #[must_use]
    pub const fn tick_delay(&self) -> i32 {
        match self.kind {
            UpdateKind::Block { tick_delay, .. } | UpdateKind::Entity { tick_delay, .. } => {
                tick_delay
            }
        }
    }

    /// Returns true if the update was cancelled with a negative delay.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.tick_delay() < 0
    }

    /// The current position of a block update.
    #[must_use]
    pub const fn block_pos(&self) -> Option<BlockPos> {
        match self.kind {
            UpdateKind::Block { pos, .. } => Some(pos),
            UpdateKind::Entity { .. } => None,
        }
    }

    /// Returns a copy for the next cycle: one more elapsed cycle, due one
    /// delay after `now`, counted at its current position.
    #[must_use]
    pub fn next_cycle(&self, now: Instant) -> Self {
        let mut next = *self;
        next.elapsed = self.elapsed.saturating_add(1);
        next.due_at = due_after(now, self.tick_delay());
        if let UpdateKind::Block {
            pos, counted_at, ..
        } = &mut next.kind
        {
            *counted_at = *pos;
        }
        next
    }
}

/// Queue entry ordering pending updates by due time.
pub(crate) struct QueuedUpdate {
    pub(crate) update: PendingUpdate,
    /// Insertion order, keeps entries with equal due times distinct.
    pub(crate) sequence: u64,
}

impl PartialEq for QueuedUpdate {
    fn eq(&self, other: &Self) -> bool {
        self.update.due_at == other.update.due_at && self.sequence == other.sequence
    }
}

impl Eq for QueuedUpdate {}

impl PartialOrd for QueuedUpdate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedUpdate {
    /// Ordering for the priority queue.
    ///
    /// Note: `BinaryHeap` is a max-heap, so we reverse the comparison
    /// to get the earliest due update first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .update
            .due_at
            .cmp(&self.update.due_at)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_after_clamps_negative_delay() {
        let now = Instant::now();
        assert_eq!(due_after(now, -5), now);
        assert_eq!(due_after(now, 0), now);
        assert_eq!(due_after(now, 3), now + Duration::from_millis(150));
    }

    #[test]
    fn test_queue_ordering() {
        let now = Instant::now();
        let pos = BlockPos::new(0, 0, 0);

        // Earlier due time should come first
        let early = QueuedUpdate {
            update: PendingUpdate::block(0, pos, BlockTick::after(1), now),
            sequence: 5,
        };
        let late = QueuedUpdate {
            update: PendingUpdate::block(0, pos, BlockTick::after(2), now),
            sequence: 0,
        };
        assert!(early > late); // In max-heap, "greater" means sooner

        // Same due time, lower sequence first
        let first = QueuedUpdate {
            update: PendingUpdate::block(0, pos, BlockTick::after(1), now),
            sequence: 1,
        };
        assert!(first > early);
    }

    #[test]
    fn test_next_cycle_tracks_moved_position() {
        let now = Instant::now();
        let mut update = PendingUpdate::block(0, BlockPos::new(1, 10, 1), BlockTick::after(2), now);
        if let UpdateKind::Block { pos, .. } = &mut update.kind {
            *pos = pos.below();
        }
        let next = update.next_cycle(now);
        assert_eq!(next.elapsed, 1);
        assert_eq!(next.due_at, now + TICK * 2);
        match next.kind {
            UpdateKind::Block {
                pos, counted_at, ..
            } => {
                assert_eq!(pos, BlockPos::new(1, 9, 1));
                assert_eq!(counted_at, pos);
            }
            UpdateKind::Entity { .. } => panic!("expected a block update"),
        }
    }

    #[test]
    fn test_cancelled() {
        let now = Instant::now();
        let update = PendingUpdate::entity(0, 1, true, -1, PhysicsParams::EMPTY, now);
        assert!(update.is_cancelled());
        assert_eq!(update.block_pos(), None);
    }
}
