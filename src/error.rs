//! transient-query error types

/// transient-query error types
#[derive(Debug, thiserror::Error)]
pub enum TransientQueryError {
    // Collaborator errors
    /// The transient store backend failed. Propagated unchanged.
    #[error("transient store error: {0}")]
    Store(String),

    /// The query executor failed. Propagated unchanged.
    #[error("query executor error: {0}")]
    Executor(String),

    // Input errors
    #[error("invalid option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl TransientQueryError {
    /// Shorthand for [`TransientQueryError::InvalidOption`].
    pub fn invalid_option(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for transient-query operations
pub type Result<T> = std::result::Result<T, TransientQueryError>;
