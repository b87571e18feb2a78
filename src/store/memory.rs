//! In-process transient store.
//!
//! Backed by moka's async cache. Unlike a cache-wide TTL, every entry
//! carries the lifetime it was written with; a moka [`Expiry`] policy
//! applies it on insert and on every overwrite. A zero TTL never expires.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use serde_json::Value;

use super::{CounterStep, TransientStore, counter_value};
use crate::Result;
use crate::config::DEFAULT_MAX_ENTRIES;

/// Stored value plus the TTL it was written with.
#[derive(Debug, Clone)]
struct Transient {
    value: Value,
    ttl: Duration,
}

impl Transient {
    fn lifetime(&self) -> Option<Duration> {
        (!self.ttl.is_zero()).then_some(self.ttl)
    }
}

/// Per-entry expiry: the TTL of the latest write.
struct TransientExpiry;

impl Expiry<String, Transient> for TransientExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Transient,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.lifetime()
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Transient,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.lifetime()
    }
}

/// Bounded in-memory [`TransientStore`].
///
/// Thread-safe (moka handles concurrent access internally). Counter
/// increments are atomic per key.
pub struct MemoryStore {
    entries: Cache<String, Transient>,
}

impl MemoryStore {
    /// Create a store with the default capacity (10,000 entries).
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Create a store with a custom capacity.
    pub fn with_max_entries(max: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max)
            .expire_after(TransientExpiry)
            .build();
        Self { entries }
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransientStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).await.map(|t| t.value))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        self.entries
            .insert(key.to_owned(), Transient { value, ttl })
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).await.is_some())
    }

    async fn increment_below(&self, key: &str, ceiling: u64, ttl: Duration) -> Result<CounterStep> {
        let outcome = self
            .entries
            .entry(key.to_owned())
            .and_compute_with(|existing| {
                let current = existing
                    .map(|entry| counter_value(&entry.value().value))
                    .unwrap_or(0);
                let op = if current >= ceiling {
                    Op::Nop
                } else {
                    Op::Put(Transient {
                        value: Value::from(current + 1),
                        ttl,
                    })
                };
                std::future::ready(op)
            })
            .await;

        let step = match outcome {
            CompResult::Inserted(entry) | CompResult::ReplacedWith(entry) => {
                CounterStep::Incremented(counter_value(&entry.value().value))
            }
            CompResult::Unchanged(entry) | CompResult::Removed(entry) => {
                CounterStep::AtCeiling(counter_value(&entry.value().value))
            }
            CompResult::StillNone(_) => CounterStep::AtCeiling(0),
        };
        Ok(step)
    }
}
