//! Helpers shared by the unit tests.

use std::time::{Duration, Instant};

use silt_utils::random::Xoroshiro;

use crate::config::TickLimits;
use crate::physics::Scheduler;

/// An instant later than anything a test queues.
pub fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(3600)
}

/// A generator with a fixed seed.
pub fn test_rng() -> Xoroshiro {
    Xoroshiro::from_seed(0x5EED)
}

/// Runs queued updates on the calling thread, ignoring their delays, until
/// the queue is empty or 100 000 updates ran. Returns the number processed.
pub fn settle(scheduler: &Scheduler) -> usize {
    let limits = TickLimits {
        budget: 100_000,
        ..TickLimits::default()
    };
    scheduler.run_due(far_future(), &limits, &mut test_rng())
}
