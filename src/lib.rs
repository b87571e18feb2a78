//! transient-query - Throttled, transient-backed cache for post queries
//!
//! Wraps a post query executor with a time-expiring cache keyed by a digest
//! of the merged query arguments, and bounds how many cache-miss calls per
//! key may reach the executor within one expiration window.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use serde_json::json;
//! use transient_query::{PostCollection, QueryOptions, TransientQuery};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> transient_query::Result<()> {
//! let posts = PostCollection::new(vec![
//!     json!({"ID": 7, "post_type": "page", "post_title": "About"}),
//!     json!({"ID": 8, "post_type": "post", "post_title": "Hello"}),
//! ]);
//!
//! let accessor = TransientQuery::builder()
//!     .executor(Arc::new(posts))
//!     .build()?;
//!
//! let response = accessor
//!     .query(
//!         QueryOptions::new()
//!             .set("post_type", "page")
//!             .expiration(Duration::from_secs(3600)),
//!     )
//!     .await?;
//!
//! println!("{}: {:?}", response.message(), response.data);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod options;
pub mod query;
pub mod store;
pub mod telemetry;
mod version;

pub use config::QueryConfig;
pub use error::{Result, TransientQueryError};
pub use executor::{PostCollection, QueryExecutor};
pub use options::{ControlOptions, QueryArgs, QueryOptions, TransientKeys};
pub use query::{QueryResponse, ResponseSource, TransientQuery, TransientQueryBuilder};
pub use store::{CounterStep, MemoryStore, TransientStore};
pub use version::{PKG_VERSION, version_string};
