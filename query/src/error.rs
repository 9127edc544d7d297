//! Query error types.

use stitch_predicate::CompileError;
use stitch_registry::RegistryError;
use stitch_store::{SourceError, StoreError};
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur during query execution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Missing or unresolved model metadata.
    #[error("Configuration error: {0}")]
    Configuration(#[from] RegistryError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid pagination: {message}")]
    InvalidPagination { message: String },

    #[error("Invalid order: {message}")]
    InvalidOrder { message: String },
}

impl QueryError {
    pub fn invalid_pagination(message: impl Into<String>) -> Self {
        Self::InvalidPagination {
            message: message.into(),
        }
    }

    pub fn invalid_order(message: impl Into<String>) -> Self {
        Self::InvalidOrder {
            message: message.into(),
        }
    }
}
