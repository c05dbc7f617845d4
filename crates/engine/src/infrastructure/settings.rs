//! Engine settings read from the environment
//!
//! Environment variables:
//! - `CRITERIA_DATA_PATH` - directory holding the static dataset (default: `data`)
//! - `CRITERIA_LOG` - tracing filter directive, overrides `RUST_LOG`

use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data";
pub const DEFAULT_LOG_FILTER: &str = "criteria_engine=debug,criteria_domain=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub data_path: PathBuf,
    pub log_filter: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            log_filter: None,
        }
    }
}

impl EngineSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup; missing or blank values
    /// fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let data_path = non_blank("CRITERIA_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let log_filter = non_blank("CRITERIA_LOG");

        Self {
            data_path,
            log_filter,
        }
    }
}
