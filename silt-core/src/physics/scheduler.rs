//! The state shared by every physics worker: the update queue, the
//! membership table and the registered worlds.

use std::any::Any;
use std::hint;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::MutexGuard;
use silt_utils::random::Xoroshiro;
use silt_utils::{BlockPos, ChunkPos};

use super::actions;
use super::membership::{Membership, MembershipTable};
use super::params::PhysicsParams;
use super::queue::{Pop, UpdateQueue};
use super::update::{BlockTick, PendingUpdate, UpdateKind};
use crate::behavior::{BlockContext, TickContext, blocks};
use crate::config::TickLimits;
use crate::world::{EntityId, World, WorldId};

/// How long a worker backs off after repeatedly losing the queue lock.
const RETRY_SLEEP: Duration = Duration::from_millis(1);

/// Queue, membership counts and world registry of one physics engine.
///
/// Producers on any thread queue updates here. Workers pop them with
/// [`Scheduler::run_due`].
pub struct Scheduler {
    queue: UpdateQueue,
    membership: Membership,
    worlds: scc::HashMap<WorldId, Arc<dyn World>>,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: UpdateQueue::new(),
            membership: Membership::new(),
            worlds: scc::HashMap::new(),
        }
    }

    /// Registers a world under its id. Returns `false` if the id is taken.
    pub fn register_world(&self, world: Arc<dyn World>) -> bool {
        let id = world.id();
        let inserted = self.worlds.insert_sync(id, world).is_ok();
        if inserted {
            log::debug!("Registered world {id} with physics");
        }
        inserted
    }

    /// Unregisters a world and drops its membership counts.
    ///
    /// Updates still queued for it are discarded as they come due.
    pub fn unregister_world(&self, id: WorldId) -> Option<Arc<dyn World>> {
        let removed = self.worlds.remove_sync(&id).map(|(_, world)| world);
        self.membership.lock().remove_world(id);
        removed
    }

    /// Looks up a registered world.
    #[must_use]
    pub fn world(&self, id: WorldId) -> Option<Arc<dyn World>> {
        self.worlds.read_sync(&id, |_, world| world.clone())
    }

    /// Drops the membership counts of an unloaded chunk column.
    pub fn unload_chunk(&self, world: WorldId, chunk: ChunkPos) {
        self.membership.lock().remove_chunk(world, chunk);
    }

    /// Locks the membership table for a batch of block enqueues.
    ///
    /// Holding the guard blocks every other producer and the workers'
    /// bookkeeping, so keep it short.
    pub fn lock_membership(&self) -> MembershipGuard<'_> {
        MembershipGuard {
            queue: &self.queue,
            table: self.membership.lock(),
        }
    }

    /// Queues an update for `pos` after `tick_delay` ticks.
    ///
    /// Returns `false` if `pos` is outside the build height.
    pub fn queue_block(&self, world: WorldId, pos: BlockPos, tick_delay: i32) -> bool {
        self.queue_block_with(world, pos, BlockTick::after(tick_delay))
    }

    /// Queues an update for `pos` with the given options.
    pub fn queue_block_with(&self, world: WorldId, pos: BlockPos, tick: BlockTick) -> bool {
        self.lock_membership().queue_block(world, pos, tick)
    }

    /// Queues an update for `pos` unless one is already pending there.
    pub fn queue_block_once(&self, world: WorldId, pos: BlockPos, tick_delay: i32) -> bool {
        self.queue_block_once_with(world, pos, BlockTick::after(tick_delay))
    }

    /// Queues an update for `pos` with the given options unless one is
    /// already pending there.
    pub fn queue_block_once_with(&self, world: WorldId, pos: BlockPos, tick: BlockTick) -> bool {
        self.lock_membership().queue_block_once(world, pos, tick)
    }

    /// Queues an entity tick. Entity updates are not deduplicated.
    ///
    /// A persistent update keeps re-queueing until the entity reports it is
    /// finished. `params` is stored with the update but its actions only run
    /// for block updates.
    pub fn queue_entity(
        &self,
        world: WorldId,
        entity_id: EntityId,
        persistent: bool,
        tick_delay: i32,
        params: PhysicsParams,
    ) {
        log::trace!("Queued entity {entity_id} in world {world} after {tick_delay} ticks");
        self.queue.push(PendingUpdate::entity(
            world,
            entity_id,
            persistent,
            tick_delay,
            params,
            Instant::now(),
        ));
    }

    /// Number of queued updates.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Number of queued block updates counted at `pos`.
    #[must_use]
    pub fn membership_count(&self, world: WorldId, pos: BlockPos) -> u16 {
        self.membership.count(world, pos)
    }

    /// Number of allocated membership sections, across all worlds.
    #[must_use]
    pub fn membership_sections(&self) -> usize {
        self.membership.lock().allocated_sections()
    }

    /// Drops every queued update and membership count. Returns the number of
    /// dropped updates.
    pub fn clear(&self) -> usize {
        let dropped = self.queue.drain().len();
        self.membership.lock().clear();
        dropped
    }

    /// Runs the hooks that react to the block at `pos` having changed: the
    /// block's own `on_modified` and `on_neighbour_modified` of the face
    /// neighbours that care.
    pub fn notify_block_changed(&self, world: &dyn World, pos: BlockPos) {
        let registry = blocks();
        let ctx = BlockContext::new(world, self);

        if let Some(rule) = registry.get(world.get_id(pos)) {
            rule.on_modified(&ctx, pos);
        }
        for neighbour in pos.neighbours() {
            if let Some(rule) = registry
                .get(world.get_id(neighbour))
                .filter(|rule| rule.affected_by_neighbours())
            {
                rule.on_neighbour_modified(&ctx, neighbour, pos);
            }
        }
    }

    /// Asks the block at `pos` whether a player may break it.
    #[must_use]
    pub fn try_break(&self, world: &dyn World, pos: BlockPos) -> bool {
        match blocks().get(world.get_id(pos)) {
            Some(rule) if !rule.breakable() => {
                rule.on_break_attempt(&BlockContext::new(world, self), pos)
            }
            _ => true,
        }
    }

    /// Processes updates due at `now` on the calling thread, within `limits`.
    ///
    /// Returns the number of updates taken off the queue.
    pub fn run_due(&self, now: Instant, limits: &TickLimits, rng: &mut Xoroshiro) -> usize {
        let mut processed = 0;
        let mut contended = 0;

        for _ in 0..limits.budget {
            match self.queue.try_pop_due(now) {
                Pop::Due(update) => {
                    contended = 0;
                    processed += 1;
                    self.run_update(update, rng);
                }
                Pop::NotDue | Pop::Empty => break,
                Pop::Contended => {
                    contended += 1;
                    if contended >= limits.abandon_after {
                        log::trace!("Queue stayed contended, skipping the rest of the tick");
                        break;
                    }
                    if contended >= limits.retry_sleep_after {
                        thread::sleep(RETRY_SLEEP);
                    } else {
                        hint::spin_loop();
                    }
                }
            }
        }

        processed
    }

    fn run_update(&self, update: PendingUpdate, rng: &mut Xoroshiro) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.process(update, rng)));
        if let Err(payload) = result {
            log::error!(
                "Physics update in world {} panicked: {}",
                update.world,
                panic_message(payload.as_ref())
            );
        }
    }

    fn process(&self, mut update: PendingUpdate, rng: &mut Xoroshiro) {
        if let UpdateKind::Block { counted_at, .. } = update.kind {
            self.membership.lock().decrement(update.world, counted_at);
        }

        let Some(world) = self.world(update.world) else {
            log::debug!("Dropped update for unknown world {}", update.world);
            return;
        };
        if update.is_cancelled() {
            log::trace!("Dropped cancelled update in world {}", update.world);
            return;
        }

        match update.kind {
            UpdateKind::Block { .. } => {
                let mut ctx = TickContext::new(world.as_ref(), self, rng);
                if !update.params.is_empty() && actions::run_actions(&mut ctx, &mut update) {
                    self.lock_membership()
                        .requeue(update.next_cycle(Instant::now()));
                }
                dispatch_block(&mut ctx, &update);
            }
            UpdateKind::Entity {
                entity_id,
                persistent,
                ..
            } => {
                let Some(entity) = world.entity(entity_id) else {
                    log::debug!(
                        "Dropped update for unknown entity {entity_id} in world {}",
                        update.world
                    );
                    return;
                };
                let finished = entity.tick(world.as_ref());
                if !finished && persistent {
                    self.queue.push(update.next_cycle(Instant::now()));
                }
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the callback of a block update, or the rule registered for the
/// block currently at its position.
fn dispatch_block(ctx: &mut TickContext<'_>, update: &PendingUpdate) {
    let UpdateKind::Block {
        pos,
        data,
        callback,
        ..
    } = update.kind
    else {
        return;
    };

    if let Some(callback) = callback {
        callback(ctx, pos, data);
    } else if let Some(rule) = blocks().get(ctx.get_id(pos)) {
        rule.tick(ctx, pos, data);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// Exclusive access to the membership table, for batching block enqueues
/// under one lock acquisition.
pub struct MembershipGuard<'a> {
    queue: &'a UpdateQueue,
    table: MutexGuard<'a, MembershipTable>,
}

impl MembershipGuard<'_> {
    /// Queues a block update and counts it.
    ///
    /// Returns `false` if `pos` is outside the build height.
    pub fn queue_block(&mut self, world: WorldId, pos: BlockPos, tick: BlockTick) -> bool {
        if !self.table.increment(world, pos) {
            log::debug!("Refused to queue update at invalid height {pos}");
            return false;
        }
        log::trace!(
            "Queued block update at {pos} in world {world} after {} ticks",
            tick.tick_delay
        );
        self.queue
            .push(PendingUpdate::block(world, pos, tick, Instant::now()));
        true
    }

    /// Queues a block update unless one is already counted at `pos`.
    pub fn queue_block_once(&mut self, world: WorldId, pos: BlockPos, tick: BlockTick) -> bool {
        if self.table.count(world, pos) > 0 {
            return false;
        }
        self.queue_block(world, pos, tick)
    }

    /// Number of queued block updates counted at `pos`.
    #[must_use]
    pub fn count(&self, world: WorldId, pos: BlockPos) -> u16 {
        self.table.count(world, pos)
    }

    /// Puts a block update from the action pipeline back, counted at its
    /// current position.
    fn requeue(&mut self, update: PendingUpdate) {
        if let UpdateKind::Block { counted_at, .. } = update.kind
            && !self.table.increment(update.world, counted_at)
        {
            log::debug!("Dropped re-queued update at invalid height {counted_at}");
            return;
        }
        self.queue.push(update);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use silt_utils::BlockState;

    use super::*;
    use crate::behavior::ids;
    use crate::test_util::{far_future, settle, test_rng};
    use crate::world::{Entity, MemoryWorld};

    fn scheduler_with_world() -> (Scheduler, Arc<MemoryWorld>) {
        let scheduler = Scheduler::new();
        let world = Arc::new(MemoryWorld::new(0));
        assert!(scheduler.register_world(world.clone()));
        (scheduler, world)
    }

    #[test]
    fn test_queue_block_rejects_invalid_height() {
        let (scheduler, _world) = scheduler_with_world();
        assert!(!scheduler.queue_block(0, BlockPos::new(0, 256, 0), 0));
        assert!(!scheduler.queue_block(0, BlockPos::new(0, -1, 0), 0));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_queue_block_once_deduplicates() {
        let (scheduler, _world) = scheduler_with_world();
        let pos = BlockPos::new(1, 1, 1);
        assert!(scheduler.queue_block_once(0, pos, 5));
        assert!(!scheduler.queue_block_once(0, pos, 5));
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.membership_count(0, pos), 1);

        // Plain queueing always enqueues
        assert!(scheduler.queue_block(0, pos, 5));
        assert_eq!(scheduler.membership_count(0, pos), 2);
    }

    #[test]
    fn test_batched_enqueue_under_one_lock() {
        let (scheduler, _world) = scheduler_with_world();
        {
            let mut guard = scheduler.lock_membership();
            for x in 0..4 {
                guard.queue_block_once(0, BlockPos::new(x, 0, 0), BlockTick::after(1));
                guard.queue_block_once(0, BlockPos::new(x, 0, 0), BlockTick::after(1));
            }
            assert_eq!(guard.count(0, BlockPos::new(2, 0, 0)), 1);
        }
        assert_eq!(scheduler.pending_count(), 4);
    }

    static DUE_HITS: AtomicU32 = AtomicU32::new(0);

    fn count_due(_ctx: &mut TickContext<'_>, _pos: BlockPos, _data: i32) {
        DUE_HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_run_due_never_runs_early() {
        let (scheduler, _world) = scheduler_with_world();
        let mut rng = test_rng();
        let tick = BlockTick::after(0).with_callback(count_due);
        scheduler.queue_block_with(0, BlockPos::new(0, 0, 0), tick);
        scheduler.queue_block_with(0, BlockPos::new(1, 0, 0), BlockTick { tick_delay: 100, ..tick });

        let processed = scheduler.run_due(Instant::now(), &TickLimits::default(), &mut rng);
        assert_eq!(processed, 1);
        assert_eq!(DUE_HITS.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.membership_count(0, BlockPos::new(0, 0, 0)), 0);
        assert_eq!(scheduler.membership_count(0, BlockPos::new(1, 0, 0)), 1);
    }

    static CANCELLED_HITS: AtomicU32 = AtomicU32::new(0);

    fn count_cancelled(_ctx: &mut TickContext<'_>, _pos: BlockPos, _data: i32) {
        CANCELLED_HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_negative_delay_cancels() {
        let (scheduler, _world) = scheduler_with_world();
        let pos = BlockPos::new(0, 0, 0);
        scheduler.queue_block_with(0, pos, BlockTick::after(-1).with_callback(count_cancelled));
        assert_eq!(settle(&scheduler), 1);
        assert_eq!(CANCELLED_HITS.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.membership_count(0, pos), 0);
    }

    #[test]
    fn test_unknown_world_is_dropped() {
        let (scheduler, _world) = scheduler_with_world();
        let pos = BlockPos::new(0, 0, 0);
        scheduler.queue_block(7, pos, 0);
        assert_eq!(settle(&scheduler), 1);
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.membership_count(7, pos), 0);
    }

    #[test]
    fn test_unregister_releases_membership() {
        let (scheduler, _world) = scheduler_with_world();
        scheduler.queue_block(0, BlockPos::new(0, 0, 0), 20);
        scheduler.queue_block(0, BlockPos::new(40, 100, 0), 20);
        assert_eq!(scheduler.membership_sections(), 2);

        scheduler.unload_chunk(0, ChunkPos::new(2, 0));
        assert_eq!(scheduler.membership_sections(), 1);

        assert!(scheduler.unregister_world(0).is_some());
        assert_eq!(scheduler.membership_sections(), 0);
        // The queued updates are discarded when they come due
        assert_eq!(scheduler.pending_count(), 2);
        assert_eq!(settle(&scheduler), 2);
    }

    static PANIC_HITS: AtomicU32 = AtomicU32::new(0);

    fn explode(_ctx: &mut TickContext<'_>, _pos: BlockPos, _data: i32) {
        panic!("handler failure");
    }

    fn count_after_panic(_ctx: &mut TickContext<'_>, _pos: BlockPos, _data: i32) {
        PANIC_HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_panicking_handler_is_contained() {
        let (scheduler, _world) = scheduler_with_world();
        let mut rng = test_rng();
        scheduler.queue_block_with(0, BlockPos::new(0, 0, 0), BlockTick::after(0).with_callback(explode));
        scheduler.queue_block_with(
            0,
            BlockPos::new(1, 0, 0),
            BlockTick::after(1).with_callback(count_after_panic),
        );

        let processed = scheduler.run_due(far_future(), &TickLimits::default(), &mut rng);
        assert_eq!(processed, 2);
        assert_eq!(PANIC_HITS.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.membership_count(0, BlockPos::new(0, 0, 0)), 0);
    }

    struct Countdown(AtomicU32);

    impl Entity for Countdown {
        fn tick(&self, _world: &dyn World) -> bool {
            self.0.fetch_sub(1, Ordering::SeqCst) == 1
        }
    }

    #[test]
    fn test_persistent_entity_ticks_until_finished() {
        let (scheduler, world) = scheduler_with_world();
        let entity = Arc::new(Countdown(AtomicU32::new(3)));
        world.add_entity(1, entity.clone());

        scheduler.queue_entity(0, 1, true, 1, PhysicsParams::EMPTY);
        assert_eq!(settle(&scheduler), 3);
        assert_eq!(entity.0.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_entity_params_are_not_applied() {
        let (scheduler, world) = scheduler_with_world();
        let entity = Arc::new(Countdown(AtomicU32::new(2)));
        world.add_entity(1, entity.clone());
        world.set_block(BlockPos::new(0, 10, 0), BlockState::new(ids::STONE));

        let params = PhysicsParams::build("drop 1 dissipate 100", -1).expect("valid params");
        scheduler.queue_entity(0, 1, true, 0, params);

        // The countdown alone decides how long the update lives
        assert_eq!(settle(&scheduler), 2);
        assert_eq!(entity.0.load(Ordering::SeqCst), 0);
        assert_eq!(world.get_id(BlockPos::new(0, 10, 0)), ids::STONE);
        assert_eq!(world.count_non_air(), 1);
    }

    #[test]
    fn test_one_shot_entity_and_missing_entity() {
        let (scheduler, world) = scheduler_with_world();
        let entity = Arc::new(Countdown(AtomicU32::new(3)));
        world.add_entity(1, entity.clone());

        scheduler.queue_entity(0, 1, false, 0, PhysicsParams::EMPTY);
        scheduler.queue_entity(0, 2, true, 0, PhysicsParams::EMPTY);
        assert_eq!(settle(&scheduler), 2);
        assert_eq!(entity.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_pipeline_requeue_is_counted_at_new_position() {
        let (scheduler, world) = scheduler_with_world();
        let mut rng = test_rng();
        let top = BlockPos::new(0, 3, 0);
        world.set_block(top, BlockState::new(ids::STONE));

        let params = PhysicsParams::build("drop 0", -1).expect("valid params");
        scheduler.queue_block_with(0, top, BlockTick::after(0).with_params(params));
        assert_eq!(scheduler.run_due(Instant::now(), &TickLimits::default(), &mut rng), 1);

        // Moved one down and queued again there
        assert_eq!(world.get_id(top.below()), ids::STONE);
        assert_eq!(scheduler.membership_count(0, top), 0);
        assert_eq!(scheduler.membership_count(0, top.below()), 1);

        settle(&scheduler);
        assert_eq!(world.get_id(BlockPos::new(0, 0, 0)), ids::STONE);
        assert_eq!(world.count_non_air(), 1);
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.membership_sections(), 0);
    }

    #[test]
    fn test_clear() {
        let (scheduler, _world) = scheduler_with_world();
        scheduler.queue_block(0, BlockPos::new(0, 0, 0), 20);
        scheduler.queue_entity(0, 1, true, 20, PhysicsParams::EMPTY);
        assert_eq!(scheduler.clear(), 2);
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.membership_sections(), 0);
    }
}
