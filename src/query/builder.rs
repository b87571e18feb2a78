//! Builder for configuring accessor instances

use std::sync::Arc;

use super::TransientQuery;
use crate::config::QueryConfig;
use crate::executor::QueryExecutor;
use crate::store::{MemoryStore, TransientStore};
use crate::{Result, TransientQueryError};

/// Builder for [`TransientQuery`].
pub struct TransientQueryBuilder {
    store: Option<Arc<dyn TransientStore>>,
    executor: Option<Arc<dyn QueryExecutor>>,
    config: QueryConfig,
}

impl TransientQueryBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            executor: None,
            config: QueryConfig::default(),
        }
    }

    /// Use a custom transient store.
    ///
    /// Without one, `build()` creates a [`MemoryStore`] sized by
    /// [`QueryConfig::max_entries`].
    pub fn store(mut self, store: Arc<dyn TransientStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the wrapped query executor (required).
    pub fn executor(mut self, executor: Arc<dyn QueryExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the accessor.
    pub fn build(self) -> Result<TransientQuery> {
        let executor = self.executor.ok_or_else(|| {
            TransientQueryError::Configuration("no query executor configured".to_string())
        })?;
        let store = self.store.unwrap_or_else(|| {
            Arc::new(MemoryStore::with_max_entries(self.config.max_entries))
        });
        Ok(TransientQuery {
            store,
            executor,
            config: self.config,
        })
    }
}

impl Default for TransientQueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
