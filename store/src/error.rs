//! Store error types.

use thiserror::Error;

/// Errors reported by a document store backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A unique index rejected the write.
    #[error("duplicate key error collection: {collection} index: {}", .fields.join(", "))]
    DuplicateKey {
        collection: String,
        fields: Vec<String>,
    },

    /// Collection schema validation rejected the write.
    #[error("Document failed validation in {collection}: {message}")]
    DocumentValidation { collection: String, message: String },

    /// The query could not be understood.
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// Any other backend failure.
    #[error("{message}")]
    Backend { message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Store errors as seen by callers of a model's data source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Unique constraint violation.
    #[error("Constraint unique value expected for \"{}\" duplicate on {model} model", .fields.join(", "))]
    Conflict { fields: Vec<String>, model: String },

    /// Store schema validation failure.
    #[error("Document failed validation on {model} model, review types or required values in data")]
    Validation { model: String },

    /// Anything else, with the store's message.
    #[error("{0}")]
    Store(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

impl SourceError {
    /// Map a store error raised while working on `model`.
    pub fn from_store(err: StoreError, model: &str) -> Self {
        match err {
            StoreError::DuplicateKey { fields, .. } => Self::Conflict {
                fields,
                model: model.to_string(),
            },
            StoreError::DocumentValidation { .. } => Self::Validation {
                model: model.to_string(),
            },
            other => Self::Store(other.to_string()),
        }
    }
}
