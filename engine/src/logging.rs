//! Structured logging initialisation.
//!
//! The subscriber is configured straight from [`DirectsendConfig`]: its
//! `log_format` field picks human-readable or JSON output, its `log_level`
//! seeds the filter. A `RUST_LOG` environment variable, when set, overrides
//! the configured level (e.g. `RUST_LOG=debug,directsend_engine=trace`).

use crate::config::DirectsendConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Selects the output format for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Pretty-printed, coloured output for local development.
    Human,
    /// Newline-delimited JSON for production and log aggregation pipelines.
    Json,
}

impl LogFormat {
    /// Parse from the config string; anything other than "json" is human.
    pub fn from_config(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Human
        }
    }
}

/// Initialise the global tracing subscriber from the engine config.
///
/// # Panics
///
/// Panics if a global subscriber has already been set (i.e. this function
/// was called twice in the same process).
pub fn init_logging(config: &DirectsendConfig) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::new(&config.log_level),
    };
    let registry = tracing_subscriber::registry().with(filter);

    match LogFormat::from_config(&config.log_format) {
        LogFormat::Human => registry.with(fmt::layer().with_target(true)).init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
    }
}
