//! Engine configuration, read from an optional `dynui.toml`.
//!
//! ```toml
//! max_age_ms = 3600000
//! sweep_interval_ms = 300000
//! default_limit = 3
//!
//! [types.productDetail]
//! limit = 2
//! display_name = "Product"
//! placements = ["sidebar"]
//!
//! [rules]
//! menuRecommendations = "latest"
//! ```

use crate::error::{EngineError, EngineResult};
use dynui_types::TypePolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_MAX_AGE_MS: u64 = 60 * 60 * 1000;
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Instances older than this are removed by eviction sweeps.
    #[serde(default = "default_max_age_ms")]
    pub max_age_ms: u64,
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
    /// Visible-instance limit for types without an explicit policy.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Policy overrides, applied after built-in registration.
    #[serde(default)]
    pub types: BTreeMap<String, TypePolicy>,
    /// Component type → strategy name.
    #[serde(default)]
    pub rules: BTreeMap<String, String>,
}

fn default_max_age_ms() -> u64 {
    DEFAULT_MAX_AGE_MS
}

fn default_sweep_interval_ms() -> u64 {
    DEFAULT_SWEEP_INTERVAL_MS
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_age_ms: DEFAULT_MAX_AGE_MS,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            default_limit: DEFAULT_LIMIT,
            types: BTreeMap::new(),
            rules: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document strictly.
    pub fn from_toml_str(contents: &str) -> EngineResult<Self> {
        let mut config: EngineConfig =
            toml::from_str(contents).map_err(|e| EngineError::Config(e.to_string()))?;
        if config.default_limit == 0 {
            warn!("default_limit = 0 is not meaningful, using 1");
            config.default_limit = 1;
        }
        Ok(config)
    }

    /// Loads configuration from `path`.
    ///
    /// A missing, unreadable or malformed file yields the defaults; the
    /// engine should still start with a broken config file.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No engine config found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        type_overrides = config.types.len(),
                        rules = config.rules.len(),
                        "Loaded engine config"
                    );
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse engine config {:?}: {}. Falling back to defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read engine config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }

    /// Eviction sweep period, never shorter than one second.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1_000))
    }
}
