//! Expiring key/value stores.
//!
//! [`TransientStore`] is the seam between the accessor and whatever holds
//! transients: the in-process [`MemoryStore`], or a host-provided backend
//! (redis, a database table) injected through
//! [`TransientQueryBuilder::store()`](crate::TransientQueryBuilder::store).
//!
//! Expiration is best-effort: a backend may keep an entry briefly past its
//! TTL, but must never return it once evicted.

pub mod memory;

pub use memory::MemoryStore;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// Outcome of [`TransientStore::increment_below`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterStep {
    /// The counter was below the ceiling and now holds this value.
    Incremented(u64),
    /// The counter was already at (or above) the ceiling and was left untouched.
    AtCeiling(u64),
}

/// An expiring key/value store.
#[async_trait]
pub trait TransientStore: Send + Sync {
    /// Read a live entry. Absent and expired entries are both `None`.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write an entry with the given time-to-live, replacing any previous
    /// value and resetting its expiry. A zero `ttl` means no expiry.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()>;

    /// Remove an entry. Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Increment the counter at `key` unless it already reached `ceiling`.
    ///
    /// A missing or malformed counter reads as zero. The default is a plain
    /// read-modify-write over [`get`](Self::get) and [`set`](Self::set):
    /// concurrent callers can both observe the same value and overshoot the
    /// ceiling. Backends with an atomic primitive should override it.
    async fn increment_below(&self, key: &str, ceiling: u64, ttl: Duration) -> Result<CounterStep> {
        let current = self
            .get(key)
            .await?
            .as_ref()
            .map(counter_value)
            .unwrap_or(0);
        if current >= ceiling {
            return Ok(CounterStep::AtCeiling(current));
        }
        self.set(key, Value::from(current + 1), ttl).await?;
        Ok(CounterStep::Incremented(current + 1))
    }
}

/// Interpret a stored counter value.
///
/// Non-negative integers and digit strings are taken as-is; anything else
/// counts as zero.
pub fn counter_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counter_value_reads_integers_and_digit_strings() {
        assert_eq!(counter_value(&json!(2)), 2);
        assert_eq!(counter_value(&json!("3")), 3);
    }

    #[test]
    fn counter_value_defaults_to_zero() {
        assert_eq!(counter_value(&json!(-1)), 0);
        assert_eq!(counter_value(&json!("many")), 0);
        assert_eq!(counter_value(&json!([1, 2])), 0);
        assert_eq!(counter_value(&Value::Null), 0);
    }
}
