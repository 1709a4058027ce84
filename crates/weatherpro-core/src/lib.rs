pub mod config;
pub mod error;
pub mod fetch_state;
pub mod storage;
pub mod view_state;

pub use config::{
    Config, LocationConfig, LocationSource, LoggingConfig, ProviderConfig, StorageConfig,
};
pub use error::{AppError, LocationError, StorageError, WeatherError};
pub use fetch_state::{FetchState, FetchTracker};
pub use storage::{DurableStorage, SessionStorage, Storage, StorageExt};
pub use view_state::{LoadState, Section, Tab, Theme};

use anyhow::Result;

/// Initialize logging.
///
/// `RUST_LOG` wins over `default_level`. Output goes to stderr so it does not
/// interleave with the rendered dashboard on stdout.
pub fn init(default_level: &str) -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    tracing::info!("WeatherPro core initialized");
    Ok(())
}
