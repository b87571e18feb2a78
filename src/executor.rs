//! Query executors.
//!
//! [`QueryExecutor`] is the wrapped query call. The accessor never looks
//! inside the items it returns; it only caches them.
//!
//! [`PostCollection`] is an in-memory executor over JSON post records,
//! used by the `tq` tool and handy in tests. It understands a small subset
//! of post-query arguments:
//!
//! | Argument         | Meaning |
//! |------------------|---------|
//! | `post_type`      | string, array of strings, or `"any"` |
//! | `post_status`    | string, array of strings, or `"any"` (default `"publish"`) |
//! | `offset`         | number of matches to skip |
//! | `posts_per_page` | page size, `-1` for no limit (default 10) |
//! | `nopaging`       | `true` disables the page size |
//! | `fields`         | `"ids"` returns each post's `ID`; anything else the whole record |

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::options::QueryArgs;
use crate::{Result, TransientQueryError};

/// Page size when `posts_per_page` is not given.
pub const DEFAULT_POSTS_PER_PAGE: usize = 10;

/// Executes a post query.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &str;

    /// Run the query. No matches is an empty vec, not an error.
    async fn query(&self, args: &QueryArgs) -> Result<Vec<Value>>;
}

/// In-memory post source.
#[derive(Debug, Clone, Default)]
pub struct PostCollection {
    posts: Vec<Value>,
}

impl PostCollection {
    pub fn new(posts: Vec<Value>) -> Self {
        Self { posts }
    }

    /// Load posts from a JSON file holding an array of objects.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            TransientQueryError::Executor(format!("Failed to read posts file {path:?}: {e}"))
        })?;
        let posts: Vec<Value> = serde_json::from_str(&content)?;
        Ok(Self::new(posts))
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    fn select(&self, args: &QueryArgs) -> Vec<Value> {
        let post_type = args.get("post_type");
        let post_status = args.get("post_status");
        let offset = int_arg(args, "offset").filter(|n| *n > 0).unwrap_or(0) as usize;
        let limit = if args.get("nopaging") == Some(&Value::Bool(true)) {
            None
        } else {
            match int_arg(args, "posts_per_page") {
                Some(n) if n < 0 => None,
                Some(n) => Some(n as usize),
                None => Some(DEFAULT_POSTS_PER_PAGE),
            }
        };
        let ids_only = args.get("fields").and_then(Value::as_str) == Some("ids");

        self.posts
            .iter()
            .filter(|post| matches_field(post, "post_type", post_type, "post"))
            .filter(|post| matches_status(post, post_status))
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .map(|post| {
                if ids_only {
                    post.get("ID").cloned().unwrap_or(Value::Null)
                } else {
                    post.clone()
                }
            })
            .collect()
    }
}

#[async_trait]
impl QueryExecutor for PostCollection {
    fn name(&self) -> &str {
        "post_collection"
    }

    async fn query(&self, args: &QueryArgs) -> Result<Vec<Value>> {
        Ok(self.select(args))
    }
}

/// Read an integer argument given as a JSON number or a numeric string.
fn int_arg(args: &QueryArgs, name: &str) -> Option<i64> {
    match args.get(name)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whether `post[field]` is accepted by `wanted`.
///
/// Absent `wanted` or `"any"` accepts everything. A post without the
/// field is treated as having `fallback`.
fn matches_field(post: &Value, field: &str, wanted: Option<&Value>, fallback: &str) -> bool {
    let actual = post.get(field).and_then(Value::as_str).unwrap_or(fallback);
    match wanted {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s == "any" || s == actual,
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s == "any" || s == actual),
        Some(_) => false,
    }
}

fn matches_status(post: &Value, wanted: Option<&Value>) -> bool {
    let publish = Value::from("publish");
    matches_field(post, "post_status", Some(wanted.unwrap_or(&publish)), "publish")
}
