//! Logging initialization for the `sublayer` binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is up to
//! the program. `RUST_LOG`, when set, overrides the configured level.

use serde::{Deserialize, Serialize};

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `sublayer=debug`.
    pub level: String,
    /// One JSON object per event instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// `debug` when verbose, `info` otherwise.
    pub fn for_verbosity(verbose: bool, json: bool) -> Self {
        Self {
            level: if verbose { "debug" } else { "info" }.to_string(),
            json,
        }
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Calling it again is a no-op.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(LoggingConfig::for_verbosity(false, false).level, "info");
        assert_eq!(LoggingConfig::for_verbosity(true, true).level, "debug");
        assert!(LoggingConfig::for_verbosity(true, true).json);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LoggingConfig = serde_json::from_str(r#"{"json": true}"#).unwrap();
        assert_eq!(
            config,
            LoggingConfig {
                level: "info".into(),
                json: true
            }
        );
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(&LoggingConfig::default());
        init_logging(&LoggingConfig::default());
    }
}
