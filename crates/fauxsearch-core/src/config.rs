//! Configuration types for the fauxsearch backend.
//!
//! [`BackendConfig::load`] layers, in increasing precedence: the embedded
//! defaults, an optional TOML file, and `FAUXSEARCH_*` environment variables
//! (`__` separates nested keys, e.g. `FAUXSEARCH_WATCH__MAX_EMISSIONS=5`).
//! [`BackendConfig::defaults`] returns the embedded defaults without touching
//! the filesystem or environment (useful in tests).

use crate::service::ServiceTimings;
use crate::types::BackendId;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
listen_addr = "0.0.0.0:36061"

[search]
max_delay_ms = 100

[watch]
max_delay_ms = 1000
"#;

const ENV_PREFIX: &str = "FAUXSEARCH";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Identity reported in results. Defaults to the host name.
    #[serde(default)]
    pub backend_id: Option<String>,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// `[search]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_max_delay_ms")]
    pub max_delay_ms: u64,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_watch_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Unset means sessions run until the caller cancels.
    #[serde(default)]
    pub max_emissions: Option<u64>,
}

fn default_listen_addr() -> String { "0.0.0.0:36061".to_string() }
fn default_search_max_delay_ms() -> u64 { 100 }
fn default_watch_max_delay_ms() -> u64 { 1000 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: default_search_max_delay_ms(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: default_watch_max_delay_ms(),
            max_emissions: None,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl BackendConfig {
    /// Load the layered configuration. A missing `path` is an error; pass
    /// `None` to use only defaults and environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// The configured identity, or the host name when none is set.
    pub fn backend_id(&self) -> BackendId {
        match &self.backend_id {
            Some(id) => BackendId::new(id),
            None => BackendId::from_hostname(),
        }
    }

    pub fn timings(&self) -> ServiceTimings {
        ServiceTimings {
            search_max_delay: Duration::from_millis(self.search.max_delay_ms),
            watch_max_delay: Duration::from_millis(self.watch.max_delay_ms),
            watch_max_emissions: self.watch.max_emissions,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
