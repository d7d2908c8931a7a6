//! # Silt
//!
//! The server shell around the block physics engine: loads the config, sets
//! up logging, starts the worker pool and shuts it down again.

use std::sync::Arc;
use std::time::Duration;

use silt_core::behavior::ids;
use silt_core::config::ServerConfig;
use silt_core::physics::PhysicsManager;
use silt_core::world::MemoryWorld;
use silt_utils::{BlockPos, BlockState};
use tokio::{select, spawn, time};
use tokio_util::sync::CancellationToken;

/// Console logging.
pub mod logger;

/// Side length of the demo world.
const DEMO_SIZE: i32 = 64;

/// How often the status line is logged.
const STATUS_INTERVAL: Duration = Duration::from_secs(60);

/// The main server struct.
pub struct SiltServer {
    /// The cancellation token for graceful shutdown.
    pub cancel_token: CancellationToken,
    /// The block physics engine.
    pub physics: Arc<PhysicsManager>,
}

impl SiltServer {
    /// Creates the physics engine and starts its worker pool.
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        log::info!("Starting Silt");

        let physics = Arc::new(PhysicsManager::new(&config.physics));
        if config.demo_world {
            physics.register_world(Arc::new(demo_world()));
            log::info!("Registered the {DEMO_SIZE}x{DEMO_SIZE} demo world");
        }
        physics.set_thread_count(config.physics.threads);

        Self {
            cancel_token: CancellationToken::new(),
            physics,
        }
    }

    /// Starts logging a status line every minute until the server stops.
    pub fn start(&self) {
        let physics = self.physics.clone();
        let cancel_token = self.cancel_token.clone();

        spawn(async move {
            let mut interval = time::interval(STATUS_INTERVAL);
            interval.tick().await;
            loop {
                select! {
                    () = cancel_token.cancelled() => break,
                    _ = interval.tick() => {
                        let processed: u64 = physics.stats().iter().map(|s| s.processed).sum();
                        log::info!(
                            "{} physics workers, {} updates pending, {processed} processed",
                            physics.get_thread_count(),
                            physics.pending_count(),
                        );
                    }
                }
            }
        });
    }

    /// Stops the server and every physics worker.
    pub fn stop(&self) {
        self.cancel_token.cancel();
        self.physics.stop();
    }
}

/// A flat stone floor with id 0.
fn demo_world() -> MemoryWorld {
    let world = MemoryWorld::with_size(0, DEMO_SIZE, DEMO_SIZE);
    world.fill(
        BlockPos::new(0, 0, 0),
        BlockPos::new(DEMO_SIZE - 1, 0, DEMO_SIZE - 1),
        BlockState::new(ids::STONE),
    );
    world
}
