//! Session error types.

use stitch_mutation::MutationError;
use stitch_query::QueryError;
use stitch_registry::RegistryError;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Unknown model or unresolved relation.
    #[error("configuration error: {0}")]
    Configuration(#[from] RegistryError),

    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("mutation error: {0}")]
    Mutation(#[from] MutationError),

    /// Settings that could not be loaded.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

impl SessionError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
