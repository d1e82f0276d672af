//! Logging Module
//!
//! Thin tracing-subscriber setup for embedding callers. Output goes to
//! stderr; the filter honors `RUST_LOG` and falls back to the configured
//! level for this crate.
//!
//! # Examples
//!
//! ```no_run
//! use compress_core::logging::{LogConfig, init_logging};
//! use tracing::info;
//!
//! init_logging(LogConfig::default()).expect("Failed to initialize logging");
//! info!("engine ready");
//! ```

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: Level,
    /// Include module targets in output
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            with_target: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }
}

/// Initialize the global subscriber. Call once, early; a second call fails.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("compress_core={}", config.level)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(config.with_target)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    tracing::debug!(level = ?config.level, "Logging initialized");

    Ok(())
}
