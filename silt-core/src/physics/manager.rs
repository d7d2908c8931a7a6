//! The physics engine facade: a [`Scheduler`] plus the worker pool that
//! drains it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use silt_utils::BlockPos;

use super::params::{ParamsError, PhysicsParams};
use super::scheduler::Scheduler;
use super::update::BlockTick;
use super::worker::{PhysicsWorker, WorkerSettings, WorkerStats};
use crate::behavior::init_blocks;
use crate::config::{MAX_THREADS, PhysicsConfig};
use crate::world::{EntityId, World, WorldId};

/// Owns the worker threads of one physics engine.
///
/// Starts with no workers; call [`PhysicsManager::set_thread_count`].
/// Dropping the manager stops every worker.
pub struct PhysicsManager {
    scheduler: Arc<Scheduler>,
    workers: Mutex<Vec<PhysicsWorker>>,
    paused: Arc<AtomicBool>,
    settings: WorkerSettings,
    default_expire: i32,
}

impl PhysicsManager {
    /// Creates a manager with no running workers.
    #[must_use]
    pub fn new(config: &PhysicsConfig) -> Self {
        init_blocks();
        Self {
            scheduler: Arc::new(Scheduler::new()),
            workers: Mutex::new(Vec::new()),
            paused: Arc::new(AtomicBool::new(false)),
            settings: WorkerSettings {
                interval: config.tick_interval(),
                limits: config.tick_limits(),
            },
            default_expire: config.default_expire,
        }
    }

    /// The shared scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// Grows or shrinks the worker pool to `count` threads, clamped to
    /// `0..=20`. Queued updates are kept.
    ///
    /// Returns the resulting number of workers.
    pub fn set_thread_count(&self, count: usize) -> usize {
        let count = count.min(MAX_THREADS);
        let mut workers = self.workers.lock();
        let before = workers.len();

        if count > before {
            for index in before..count {
                match PhysicsWorker::spawn(
                    index,
                    self.scheduler.clone(),
                    self.settings,
                    self.paused.clone(),
                ) {
                    Ok(worker) => workers.push(worker),
                    Err(err) => {
                        log::error!("Failed to start physics worker {index}: {err}");
                        break;
                    }
                }
            }
        } else if count < before {
            let removed = workers.split_off(count);
            for worker in &removed {
                worker.signal_stop();
            }
            for worker in removed {
                worker.join();
            }
        }

        let after = workers.len();
        if after != before {
            log::info!("Physics threads: {before} -> {after}");
        }
        after
    }

    /// Number of running workers.
    #[must_use]
    pub fn get_thread_count(&self) -> usize {
        self.workers.lock().len()
    }

    /// Pauses or resumes every worker. Paused workers keep ticking but leave
    /// the queue alone.
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
        log::info!("Physics {}", if paused { "paused" } else { "resumed" });
    }

    /// Returns true while the workers are paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Counters of each running worker.
    #[must_use]
    pub fn stats(&self) -> Vec<WorkerStats> {
        self.workers.lock().iter().map(PhysicsWorker::stats).collect()
    }

    /// Stops every worker and drops all queued work. Safe to call repeatedly.
    pub fn stop(&self) {
        self.set_thread_count(0);
        let dropped = self.scheduler.clear();
        if dropped > 0 {
            log::debug!("Dropped {dropped} queued physics updates on stop");
        }
    }

    /// Parses action text using the configured default expiry.
    pub fn build_params(&self, text: &str) -> Result<PhysicsParams, ParamsError> {
        PhysicsParams::build(text, self.default_expire)
    }

    /// See [`Scheduler::register_world`].
    pub fn register_world(&self, world: Arc<dyn World>) -> bool {
        self.scheduler.register_world(world)
    }

    /// See [`Scheduler::unregister_world`].
    pub fn unregister_world(&self, id: WorldId) -> Option<Arc<dyn World>> {
        self.scheduler.unregister_world(id)
    }

    /// See [`Scheduler::queue_block`].
    pub fn queue_block(&self, world: WorldId, pos: BlockPos, tick_delay: i32) -> bool {
        self.scheduler.queue_block(world, pos, tick_delay)
    }

    /// See [`Scheduler::queue_block_with`].
    pub fn queue_block_with(&self, world: WorldId, pos: BlockPos, tick: BlockTick) -> bool {
        self.scheduler.queue_block_with(world, pos, tick)
    }

    /// See [`Scheduler::queue_block_once`].
    pub fn queue_block_once(&self, world: WorldId, pos: BlockPos, tick_delay: i32) -> bool {
        self.scheduler.queue_block_once(world, pos, tick_delay)
    }

    /// See [`Scheduler::queue_entity`]. Actions in `params` only apply to
    /// block updates.
    pub fn queue_entity(
        &self,
        world: WorldId,
        entity_id: EntityId,
        persistent: bool,
        tick_delay: i32,
        params: PhysicsParams,
    ) {
        self.scheduler
            .queue_entity(world, entity_id, persistent, tick_delay, params);
    }

    /// See [`Scheduler::pending_count`].
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.scheduler.pending_count()
    }
}

impl Drop for PhysicsManager {
    fn drop(&mut self) {
        self.stop();
    }
}
