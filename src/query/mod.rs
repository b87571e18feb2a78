//! Cache-through query accessor.
//!
//! [`TransientQuery`] wraps a [`QueryExecutor`] with a transient cache and a
//! per-key request counter. For each call:
//!
//! - `force = true`: run the query, overwrite the cache entry, return `Live`.
//!   The counter is neither read nor written.
//! - otherwise, if the counter already reached the ceiling: return whatever
//!   the cache holds (possibly nothing) as `Throttled`, without running the
//!   query or touching the counter.
//! - otherwise bump the counter, then return the cache entry as `Cached` if
//!   there is one, or run the query, cache it and return `Live`.
//!
//! Both entries live for the call's effective expiration. When the counter
//! entry expires the window resets.
//!
//! The cache read and the executor call are not coordinated: concurrent
//! misses on one key can each run the query, bounded by the ceiling.

mod builder;
mod response;

pub use builder::TransientQueryBuilder;
pub use response::{QueryResponse, ResponseSource};

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::QueryConfig;
use crate::executor::QueryExecutor;
use crate::options::{QueryArgs, QueryOptions, ResolvedQuery, TransientKeys};
use crate::store::{CounterStep, TransientStore};
use crate::{Result, telemetry};

/// Transient-backed, throttled query accessor.
///
/// Construct once and share (it is `Send + Sync`; wrap in an `Arc` or
/// pass by reference).
///
/// ```rust
/// use std::sync::Arc;
/// use serde_json::json;
/// use transient_query::{PostCollection, QueryOptions, ResponseSource, TransientQuery};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> transient_query::Result<()> {
/// let posts = PostCollection::new(vec![json!({"ID": 1, "post_type": "post"})]);
/// let accessor = TransientQuery::builder()
///     .executor(Arc::new(posts))
///     .build()?;
///
/// let first = accessor.query(QueryOptions::new()).await?;
/// assert_eq!(first.source, ResponseSource::Live);
/// assert_eq!(first.data, Some(vec![json!(1)]));
///
/// let second = accessor.query(QueryOptions::new()).await?;
/// assert_eq!(second.source, ResponseSource::Cached);
/// # Ok(())
/// # }
/// ```
pub struct TransientQuery {
    store: Arc<dyn TransientStore>,
    executor: Arc<dyn QueryExecutor>,
    config: QueryConfig,
}

impl TransientQuery {
    /// Create a new builder.
    pub fn builder() -> TransientQueryBuilder {
        TransientQueryBuilder::new()
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// The store this accessor reads and writes.
    pub fn store(&self) -> &Arc<dyn TransientStore> {
        &self.store
    }

    /// Return the cached result for `options`, or run the query.
    #[instrument(skip(self, options), fields(digest = tracing::field::Empty))]
    pub async fn query(&self, options: QueryOptions) -> Result<QueryResponse> {
        let ResolvedQuery { args, control } = self.resolve(options)?;
        let keys = TransientKeys::derive(&args, &self.config)?;
        tracing::Span::current().record("digest", keys.digest.as_str());
        let expiration = control.expiration;

        if control.force {
            debug!("forced refresh");
        } else {
            let cached = self.store.get(&keys.cache).await?;
            let step = self
                .store
                .increment_below(&keys.limit, self.config.max_requests, expiration)
                .await?;

            match step {
                CounterStep::AtCeiling(count) => {
                    debug!(count, "request ceiling reached, serving transient");
                    metrics::counter!(telemetry::THROTTLED_TOTAL).increment(1);
                    let data = cached.and_then(|value| decode_cached(&keys.cache, value));
                    return Ok(self.respond(data, ResponseSource::Throttled, expiration));
                }
                CounterStep::Incremented(count) => {
                    if let Some(data) = cached.and_then(|value| decode_cached(&keys.cache, value)) {
                        debug!(count, "serving transient");
                        return Ok(self.respond(Some(data), ResponseSource::Cached, expiration));
                    }
                    debug!(count, "transient miss");
                }
            }
        }

        let data = self.execute(&args, control.force).await?;
        self.store
            .set(&keys.cache, Value::Array(data.clone()), expiration)
            .await?;
        Ok(self.respond(Some(data), ResponseSource::Live, expiration))
    }

    /// Delete the cache entry and the request counter for `options`.
    ///
    /// Returns whether either entry was live. Control options are ignored,
    /// exactly as in [`query`](Self::query).
    #[instrument(skip(self, options), fields(digest = tracing::field::Empty))]
    pub async fn forget(&self, options: QueryOptions) -> Result<bool> {
        let keys = self.keys_for(&options)?;
        tracing::Span::current().record("digest", keys.digest.as_str());
        let cache_removed = self.store.delete(&keys.cache).await?;
        let limit_removed = self.store.delete(&keys.limit).await?;
        debug!(cache_removed, limit_removed, "forgot transients");
        Ok(cache_removed || limit_removed)
    }

    /// The store keys [`query`](Self::query) would use for `options`.
    pub fn keys_for(&self, options: &QueryOptions) -> Result<TransientKeys> {
        let ResolvedQuery { args, .. } = self.resolve(options.clone())?;
        TransientKeys::derive(&args, &self.config)
    }

    fn resolve(&self, options: QueryOptions) -> Result<ResolvedQuery> {
        options
            .merge_defaults(&self.config.defaults)
            .resolve(self.config.default_expiration_duration())
    }

    async fn execute(&self, args: &QueryArgs, forced: bool) -> Result<Vec<Value>> {
        metrics::counter!(telemetry::EXECUTOR_CALLS_TOTAL,
            "forced" => if forced { "true" } else { "false" },
        )
        .increment(1);
        let data = self.executor.query(args).await?;
        debug!(
            executor = self.executor.name(),
            items = data.len(),
            "live query"
        );
        Ok(data)
    }

    fn respond(
        &self,
        data: Option<Vec<Value>>,
        source: ResponseSource,
        expiration: Duration,
    ) -> QueryResponse {
        metrics::counter!(telemetry::REQUESTS_TOTAL, "source" => source.as_str()).increment(1);
        QueryResponse::new(data, source, expiration)
    }
}

/// Cached result sets are JSON arrays; anything else is treated as a miss.
fn decode_cached(key: &str, value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        other => {
            warn!(key, kind = value_kind(&other), "ignoring malformed transient");
            None
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
