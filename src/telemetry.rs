//! Telemetry metric name constants.
//!
//! Centralised metric names for transient-query operations. Consumers
//! install their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `transient_query_`. Counters end in
//! `_total`.
//!
//! # Common labels
//!
//! - `source` — provenance of a response: "live", "cached" or "throttled"

/// Total responses returned by [`TransientQuery::query`](crate::TransientQuery::query).
///
/// Labels: `source` ("live" | "cached" | "throttled").
pub const REQUESTS_TOTAL: &str = "transient_query_requests_total";

/// Total invocations of the underlying query executor.
///
/// Labels: `forced` ("true" | "false").
pub const EXECUTOR_CALLS_TOTAL: &str = "transient_query_executor_calls_total";

/// Total calls refused a live query because the request ceiling was reached.
pub const THROTTLED_TOTAL: &str = "transient_query_throttled_total";
