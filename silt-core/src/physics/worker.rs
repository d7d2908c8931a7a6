//! Physics worker threads.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use silt_utils::random::Xoroshiro;

use super::scheduler::Scheduler;
use crate::config::TickLimits;

/// Counters of one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerStats {
    /// Number of wake-ups, including paused ones.
    pub ticks: u64,
    /// Number of updates taken off the queue.
    pub processed: u64,
}

#[derive(Default)]
struct Counters {
    ticks: AtomicU64,
    processed: AtomicU64,
}

/// How a worker paces itself.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerSettings {
    pub(crate) interval: Duration,
    pub(crate) limits: TickLimits,
}

/// A thread that wakes every tick and drains due updates.
pub(crate) struct PhysicsWorker {
    index: usize,
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl PhysicsWorker {
    /// Starts worker number `index`.
    pub(crate) fn spawn(
        index: usize,
        scheduler: Arc<Scheduler>,
        settings: WorkerSettings,
        paused: Arc<AtomicBool>,
    ) -> io::Result<Self> {
        let (stop, stop_rx) = channel::bounded::<()>(1);
        let counters = Arc::new(Counters::default());
        let thread_counters = counters.clone();

        let handle = thread::Builder::new()
            .name(format!("physics-worker-{index}"))
            .spawn(move || {
                let span = tracing::debug_span!("physics_worker", index);
                let _enter = span.enter();
                log::debug!("Physics worker {index} started");

                let mut rng = Xoroshiro::from_clock(index as u64);
                loop {
                    match stop_rx.recv_timeout(settings.interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    thread_counters.ticks.fetch_add(1, Ordering::Relaxed);
                    if paused.load(Ordering::Acquire) {
                        continue;
                    }

                    let processed = scheduler.run_due(Instant::now(), &settings.limits, &mut rng);
                    thread_counters
                        .processed
                        .fetch_add(processed as u64, Ordering::Relaxed);
                }

                log::debug!("Physics worker {index} stopped");
            })?;

        Ok(Self {
            index,
            stop,
            handle: Some(handle),
            counters,
        })
    }

    /// Asks the worker to stop after its current tick.
    pub(crate) fn signal_stop(&self) {
        // Full means a stop is already pending
        let _ = self.stop.try_send(());
    }

    /// Stops the worker and waits for its thread to exit.
    pub(crate) fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.signal_stop();
        if handle.join().is_err() {
            log::error!("Physics worker {} panicked", self.index);
        }
    }

    /// The worker's counters.
    pub(crate) fn stats(&self) -> WorkerStats {
        WorkerStats {
            ticks: self.counters.ticks.load(Ordering::Relaxed),
            processed: self.counters.processed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for PhysicsWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
