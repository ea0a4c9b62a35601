//! Engine configuration, loadable from the environment.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::search::SearchLimits;

/// Tunable engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum search depth in plies.
    pub search_depth: u8,
    /// Optional wall-clock budget per move, in milliseconds.
    pub time_budget_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            search_depth: 3,
            time_budget_ms: None,
        }
    }
}

impl EngineConfig {
    /// Load settings from `TABULA_SEARCH_DEPTH` and
    /// `TABULA_TIME_BUDGET_MS`, falling back to defaults on missing or
    /// unparsable values.
    pub fn from_env() -> Self {
        let defaults = EngineConfig::default();
        EngineConfig {
            search_depth: parse_env("TABULA_SEARCH_DEPTH", defaults.search_depth),
            time_budget_ms: env::var("TABULA_TIME_BUDGET_MS")
                .ok()
                .and_then(|v| match v.parse() {
                    Ok(ms) => Some(ms),
                    Err(_) => {
                        warn!(value = %v, "ignoring unparsable TABULA_TIME_BUDGET_MS");
                        None
                    }
                }),
        }
    }

    /// Search limits derived from this configuration.
    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_depth: self.search_depth,
            time_budget: self.time_budget_ms.map(Duration::from_millis),
        }
    }
}

fn parse_env<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(%key, %value, "ignoring unparsable environment value");
                default
            }
        },
        Err(_) => default,
    }
}
