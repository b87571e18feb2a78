//! Accessor configuration.
//!
//! [`QueryConfig`] holds the request ceiling, the default expiration, the
//! key prefixes and the default query arguments. It can be built in code
//! with the setter methods or loaded from TOML:
//!
//! ```toml
//! max_requests = 3
//! default_expiration_secs = 2592000
//! max_entries = 10000
//! cache_prefix = "wp-dev-wp-query-"
//! limit_prefix = "wp-dev-wp-query-limit-"
//!
//! [defaults]
//! post_type = "post"
//! fields = "ids"
//! no_found_rows = true
//! ```
//!
//! File resolution order for [`QueryConfig::load`]:
//! 1. Explicit path (must exist)
//! 2. `~/.transient-query/config.toml` (user)
//! 3. `/etc/transient-query/config.toml` (system)
//! 4. Built-in defaults

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{Result, TransientQueryError};

/// One month, in seconds (30 days).
pub const MONTH_IN_SECONDS: u64 = 30 * 24 * 3600;

/// Default number of counted requests allowed per throttle window.
pub const DEFAULT_MAX_REQUESTS: u64 = 3;

/// Default capacity of the in-memory transient store.
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Key prefix of cached result sets.
pub const DEFAULT_CACHE_PREFIX: &str = "wp-dev-wp-query-";

/// Key prefix of request counters.
pub const DEFAULT_LIMIT_PREFIX: &str = "wp-dev-wp-query-limit-";

/// Configuration for [`TransientQuery`](crate::TransientQuery).
///
/// ```rust
/// # use transient_query::QueryConfig;
/// # use std::time::Duration;
/// let config = QueryConfig::new()
///     .max_requests(5)
///     .default_expiration(Duration::from_secs(3600))
///     .default_option("post_type", "page");
/// assert_eq!(config.max_requests, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryConfig {
    /// Counted requests allowed per key and throttle window. Default: 3.
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,
    /// Expiration used when a call has no `expiration` option. Default: one month.
    #[serde(default = "default_expiration_secs")]
    pub default_expiration_secs: u64,
    /// Capacity of the in-memory store created by the builder. Default: 10,000.
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,
    #[serde(default = "default_limit_prefix")]
    pub limit_prefix: String,
    /// Query arguments merged under every call's options.
    #[serde(default = "default_query_args")]
    pub defaults: Map<String, Value>,
}

fn default_max_requests() -> u64 {
    DEFAULT_MAX_REQUESTS
}

fn default_expiration_secs() -> u64 {
    MONTH_IN_SECONDS
}

fn default_max_entries() -> u64 {
    DEFAULT_MAX_ENTRIES
}

fn default_cache_prefix() -> String {
    DEFAULT_CACHE_PREFIX.to_string()
}

fn default_limit_prefix() -> String {
    DEFAULT_LIMIT_PREFIX.to_string()
}

/// `post_type = "post"`, plus `fields = "ids"` and `no_found_rows = true`
/// to keep the underlying query cheap.
pub fn default_query_args() -> Map<String, Value> {
    let mut defaults = Map::new();
    defaults.insert("post_type".into(), Value::from("post"));
    defaults.insert("fields".into(), Value::from("ids"));
    defaults.insert("no_found_rows".into(), Value::Bool(true));
    defaults
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            default_expiration_secs: default_expiration_secs(),
            max_entries: default_max_entries(),
            cache_prefix: default_cache_prefix(),
            limit_prefix: default_limit_prefix(),
            defaults: default_query_args(),
        }
    }
}

impl QueryConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-window request ceiling.
    pub fn max_requests(mut self, n: u64) -> Self {
        self.max_requests = n;
        self
    }

    /// Set the expiration used when a call does not pass one.
    pub fn default_expiration(mut self, ttl: Duration) -> Self {
        self.default_expiration_secs = ttl.as_secs();
        self
    }

    /// Set the capacity of the builder-created in-memory store.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the prefix of cached result keys.
    pub fn cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    /// Set the prefix of request counter keys.
    pub fn limit_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.limit_prefix = prefix.into();
        self
    }

    /// Add (or overwrite) one default query argument.
    pub fn default_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// The default expiration as a [`Duration`].
    pub fn default_expiration_duration(&self) -> Duration {
        Duration::from_secs(self.default_expiration_secs)
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            TransientQueryError::Configuration(format!("Failed to parse config: {e}"))
        })
    }

    /// Load configuration from the standard locations.
    ///
    /// Falls back to [`QueryConfig::default`] when no explicit path is
    /// given and neither the user nor the system file exists.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit_path)? else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(&path).map_err(|e| {
            TransientQueryError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            TransientQueryError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(TransientQueryError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".transient-query").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/transient-query/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}
