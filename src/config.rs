//! Runtime configuration from environment variables.

use crate::logic::{OptimizerSettings, StrategyKind};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Tournaments idle this long are dropped from memory.
    pub inactivity_timeout: Duration,
    pub cleanup_interval: Duration,
    pub optimizer: OptimizerSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            inactivity_timeout: Duration::from_secs(12 * 3600),
            cleanup_interval: Duration::from_secs(30 * 60),
            optimizer: OptimizerSettings::default(),
        }
    }
}

impl Config {
    /// Read `HOST`, `PORT`, `INACTIVITY_HOURS`, `CLEANUP_INTERVAL_MINUTES`,
    /// `SLOT_MINUTES`, `ASSIGNMENT_STRATEGY` and `EXACT_MAX_MATCHES`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let mut optimizer = defaults.optimizer;
        optimizer.slot_minutes = parse_or(&lookup, "SLOT_MINUTES", optimizer.slot_minutes).max(1);
        optimizer.strategy = parse_or::<StrategyKind>(&lookup, "ASSIGNMENT_STRATEGY", optimizer.strategy);
        optimizer.exact_max_matches = parse_or(&lookup, "EXACT_MAX_MATCHES", optimizer.exact_max_matches);

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            inactivity_timeout: Duration::from_secs(parse_or(&lookup, "INACTIVITY_HOURS", 12u64).saturating_mul(3600)),
            cleanup_interval: Duration::from_secs(parse_or(&lookup, "CLEANUP_INTERVAL_MINUTES", 30u64).max(1).saturating_mul(60)),
            optimizer,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}; using default", key, raw);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_variables() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn reads_and_falls_back() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "9000"),
            ("SLOT_MINUTES", "45"),
            ("ASSIGNMENT_STRATEGY", "greedy"),
            ("EXACT_MAX_MATCHES", "lots"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.port, 9000);
        assert_eq!(config.optimizer.slot_minutes, 45);
        assert_eq!(config.optimizer.strategy, StrategyKind::Greedy);
        assert_eq!(config.optimizer.exact_max_matches, 8);
    }

    #[test]
    fn huge_inactivity_saturates() {
        let config = Config::from_lookup(|k| (k == "INACTIVITY_HOURS").then(|| u64::MAX.to_string()));
        assert_eq!(config.inactivity_timeout, Duration::from_secs(u64::MAX));
    }
}
