//! The block update scheduler.
//!
//! Any thread queues block and entity updates on the [`Scheduler`]. A pool
//! of [`PhysicsManager`] workers wakes every tick, pops the updates that are
//! due, runs their action pipeline and then the block's rule.
//!
//! A per-voxel membership count tracks how many block updates are queued for
//! each voxel, which lets callers queue "once" without scanning the queue.

mod actions;
mod manager;
mod membership;
mod params;
mod queue;
mod scheduler;
mod update;
mod worker;

pub use manager::PhysicsManager;
pub use params::{ActionKind, MAX_ACTIONS, ParamsError, PhysicsAction, PhysicsParams};
pub use scheduler::{MembershipGuard, Scheduler};
pub use update::{
    BlockCallback, BlockTick, DEFAULT_BLOCK_DELAY, DEFAULT_ENTITY_DELAY, PendingUpdate, TICK,
    UpdateKind, due_after,
};
pub use worker::WorkerStats;
