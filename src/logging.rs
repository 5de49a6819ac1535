//! Logging subsystem.
//!
//! Structured logging via `tracing` with plaintext fmt output.
//!
//! # Environment Variables
//!
//! - `TERARELAY_LOG` - primary log level/filter (takes precedence)
//! - `RUST_LOG` - fallback log level/filter

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Error type for logging initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to parse log filter: {0}")]
    FilterParse(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to initialize subscriber: {0}")]
    TryInit(#[from] tracing_subscriber::util::TryInitError),
}

/// Build an `EnvFilter` from environment variables or the default level.
///
/// Checks `TERARELAY_LOG` first, then `RUST_LOG`, falling back to the default.
fn build_env_filter(default_level: Level) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = std::env::var("TERARELAY_LOG") {
        return Ok(EnvFilter::try_new(filter)?);
    }
    if let Ok(filter) = std::env::var("RUST_LOG") {
        return Ok(EnvFilter::try_new(filter)?);
    }
    Ok(EnvFilter::try_new(default_level.to_string().to_lowercase())?)
}

/// Initialize the global tracing subscriber at info level.
pub fn init() -> Result<(), LoggingError> {
    init_with_level(Level::INFO)
}

/// Initialize the global tracing subscriber with an explicit default level.
pub fn init_with_level(default_level: Level) -> Result<(), LoggingError> {
    let filter = build_env_filter(default_level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish()
        .try_init()?;
    Ok(())
}
