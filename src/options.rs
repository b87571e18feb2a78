//! Query options, control options and cache key derivation.
//!
//! A call's [`QueryOptions`] are merged over the configured defaults, then
//! split into two parts:
//!
//! - [`ControlOptions`]: `force` and `expiration`, consumed by the accessor.
//! - [`QueryArgs`]: everything else. This is what the executor receives
//!   and what the digest covers.
//!
//! # Digest
//!
//! The digest is the lowercase hex SHA-256 of the canonical JSON encoding
//! of the query arguments. Object keys are sorted at every nesting level
//! before encoding, so insertion order never changes the key. Control
//! options are excluded: a forced refresh writes the same entry that
//! unforced calls read, and a different `expiration` does not fork the
//! cache.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::config::QueryConfig;
use crate::{Result, TransientQueryError};

/// Name of the option that bypasses the cache and the request counter.
pub const FORCE_OPTION: &str = "force";

/// Name of the option that overrides the expiration, in seconds.
pub const EXPIRATION_OPTION: &str = "expiration";

/// Caller-supplied query options.
///
/// ```rust
/// # use transient_query::QueryOptions;
/// # use std::time::Duration;
/// let options = QueryOptions::new()
///     .set("post_type", "page")
///     .set("posts_per_page", -1)
///     .expiration(Duration::from_secs(3600));
/// assert_eq!(options.get("post_type").and_then(|v| v.as_str()), Some("page"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryOptions(Map<String, Value>);

impl QueryOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(TransientQueryError::invalid_option(
                "options",
                format!("expected a JSON object, got {other}"),
            )),
        }
    }

    /// Set one option, replacing any previous value.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Set the `force` control option.
    pub fn force(self, force: bool) -> Self {
        self.set(FORCE_OPTION, force)
    }

    /// Set the `expiration` control option (whole seconds).
    pub fn expiration(self, ttl: Duration) -> Self {
        self.set(EXPIRATION_OPTION, ttl.as_secs())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Merge these options over `defaults`.
    ///
    /// Every explicit option survives unchanged; a default is only added
    /// when its key is absent. No other keys are introduced.
    pub fn merge_defaults(mut self, defaults: &Map<String, Value>) -> Self {
        for (name, value) in defaults {
            if !self.0.contains_key(name) {
                self.0.insert(name.clone(), value.clone());
            }
        }
        self
    }

    /// Split into control options and query arguments.
    ///
    /// An absent or `null` control option takes its default. `force` must
    /// be a boolean; `expiration` must be a whole number of seconds, given
    /// as a JSON integer or a string of ASCII digits.
    pub fn resolve(mut self, default_expiration: Duration) -> Result<ResolvedQuery> {
        let force = match self.0.remove(FORCE_OPTION) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(force)) => force,
            Some(other) => {
                return Err(TransientQueryError::invalid_option(
                    FORCE_OPTION,
                    format!("expected a boolean, got {other}"),
                ));
            }
        };

        let expiration = match self.0.remove(EXPIRATION_OPTION) {
            None | Some(Value::Null) => default_expiration,
            Some(value) => Duration::from_secs(parse_seconds(&value)?),
        };

        Ok(ResolvedQuery {
            args: QueryArgs(self.0),
            control: ControlOptions { force, expiration },
        })
    }
}

impl From<Map<String, Value>> for QueryOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for QueryOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn parse_seconds(value: &Value) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    };
    parsed.ok_or_else(|| {
        TransientQueryError::invalid_option(
            EXPIRATION_OPTION,
            format!("expected a non-negative number of seconds, got {value}"),
        )
    })
}

/// Options consumed by the accessor itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlOptions {
    /// Bypass the cache read and the request counter.
    pub force: bool,
    /// Lifetime of the cache and counter entries written by this call.
    pub expiration: Duration,
}

/// Merged query arguments, as handed to the executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryArgs(Map<String, Value>);

impl QueryArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex SHA-256 of the canonical (key-sorted) JSON encoding.
    pub fn digest(&self) -> Result<String> {
        let canonical = canonicalize(&Value::Object(self.0.clone()));
        let bytes = serde_json::to_vec(&canonical)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Rebuild `value` with object keys in sorted order at every level.
///
/// `serde_json::Map` is already sorted unless `preserve_order` is enabled
/// somewhere in the dependency graph; rebuilding keeps the digest stable
/// either way.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Options after the defaults merge and the control split.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub args: QueryArgs,
    pub control: ControlOptions,
}

/// Store keys derived from one digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientKeys {
    pub digest: String,
    /// Key of the cached result set.
    pub cache: String,
    /// Key of the request counter.
    pub limit: String,
}

impl TransientKeys {
    /// Derive both keys for `args` using the configured prefixes.
    pub fn derive(args: &QueryArgs, config: &QueryConfig) -> Result<Self> {
        let digest = args.digest()?;
        Ok(Self {
            cache: format!("{}{digest}", config.cache_prefix),
            limit: format!("{}{digest}", config.limit_prefix),
            digest,
        })
    }
}
