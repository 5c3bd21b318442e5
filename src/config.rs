//! # Process configuration.
//!
//! Provides [`Config`], the centralized settings for the notifier runtime.
//!
//! Config is used in two ways:
//! 1. **Startup**: [`Config::from_env`] reads the process environment (and `.env`, if present)
//! 2. **Runtime creation**: `Notifier::builder(config)`
//!
//! ## Environment variables
//! - `BOT_TOKEN` (required) → [`Config::token`]
//! - `NOTIFY_WINDOW_SECS` → [`Config::notify_window`] (default 300)
//! - `CHANNELS_FILE` → [`Config::store_path`] (default `./channels.json`)
//!
//! ## Sentinel values
//! - `bus_capacity = 0` and `ingest_capacity = 0` are clamped to 1.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_WINDOW: Duration = Duration::from_secs(5 * 60);
const DEFAULT_STORE_PATH: &str = "./channels.json";

/// Global configuration for the notifier runtime.
///
/// ## Field semantics
/// - `token`: service credential, required; an empty token is rejected by [`Config::validate`]
/// - `notify_window`: aggregation window between two flush ticks
/// - `store_path`: JSON file holding the tenant→destination mapping
/// - `bus_capacity`: observability bus ring buffer size (min 1)
/// - `ingest_capacity`: hand-off channel capacity between producers and the worker (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Service credential used by the transports.
    pub token: String,

    /// Aggregation window: how long additions accumulate before one summary is sent.
    pub notify_window: Duration,

    /// Path of the durable tenant→destination mapping.
    pub store_path: PathBuf,

    /// Capacity of the observability bus.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,

    /// Capacity of the hand-off channel feeding the aggregation worker.
    ///
    /// When full, `EventIngestor::observe` waits and `try_observe` fails with `Full`.
    pub ingest_capacity: usize,
}

impl Config {
    /// Creates a configuration with defaults and the given token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    /// Reads configuration from the process environment.
    ///
    /// Loads `.env` first when present; a missing `.env` file is not an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "failed to load .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        cfg.token = lookup("BOT_TOKEN").unwrap_or_default();

        if let Some(raw) = lookup("NOTIFY_WINDOW_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidWindow { value: raw.clone() })?;
            cfg.notify_window = Duration::from_secs(secs);
        }

        if let Some(path) = lookup("CHANNELS_FILE").filter(|p| !p.trim().is_empty()) {
            cfg.store_path = PathBuf::from(path);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks invariants that cannot be expressed in the type.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.notify_window.is_zero() {
            return Err(ConfigError::InvalidWindow {
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a hand-off capacity clamped to a minimum of 1.
    #[inline]
    pub fn ingest_capacity_clamped(&self) -> usize {
        self.ingest_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `token = ""` (must be provided)
    /// - `notify_window = 5m`
    /// - `store_path = ./channels.json`
    /// - `bus_capacity = 1024`
    /// - `ingest_capacity = 256`
    fn default() -> Self {
        Self {
            token: String::new(),
            notify_window: DEFAULT_WINDOW,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            bus_capacity: 1024,
            ingest_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingToken);

        let err = Config::from_lookup(lookup(&[("BOT_TOKEN", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingToken);
    }

    #[test]
    fn test_defaults_applied() {
        let cfg = Config::from_lookup(lookup(&[("BOT_TOKEN", "secret")])).unwrap();
        assert_eq!(cfg.token, "secret");
        assert_eq!(cfg.notify_window, Duration::from_secs(300));
        assert_eq!(cfg.store_path, PathBuf::from("./channels.json"));
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("BOT_TOKEN", "secret"),
            ("NOTIFY_WINDOW_SECS", "30"),
            ("CHANNELS_FILE", "/var/lib/notifier/channels.json"),
        ]))
        .unwrap();
        assert_eq!(cfg.notify_window, Duration::from_secs(30));
        assert_eq!(
            cfg.store_path,
            PathBuf::from("/var/lib/notifier/channels.json")
        );
    }

    #[test]
    fn test_invalid_window() {
        for raw in ["0", "soon", "-5"] {
            let err = Config::from_lookup(lookup(&[
                ("BOT_TOKEN", "secret"),
                ("NOTIFY_WINDOW_SECS", raw),
            ]))
            .unwrap_err();
            assert_eq!(err.as_label(), "config_invalid_window", "raw={raw}");
        }
    }

    #[test]
    fn test_capacities_clamped() {
        let mut cfg = Config::with_token("t");
        cfg.bus_capacity = 0;
        cfg.ingest_capacity = 0;
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.ingest_capacity_clamped(), 1);
    }
}
