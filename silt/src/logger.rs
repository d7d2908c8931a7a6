use anyhow::Result;
use silt_core::config::LogConfig;
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// Verbosity comes from `RUST_LOG` and defaults to `info`. Records from the
/// `log` facade are forwarded to the subscriber.
pub fn init(config: &LogConfig) -> Result<()> {
    LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let timed = config
        .time
        .then(|| fmt::layer().with_target(config.module_path));
    let untimed = (!config.time).then(|| {
        fmt::layer()
            .without_time()
            .with_target(config.module_path)
    });

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(timed)
        .with(untimed);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
