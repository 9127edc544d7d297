//! Mutation error types.

use stitch_predicate::CompileError;
use stitch_registry::RegistryError;
use stitch_store::{SourceError, StoreError};
use thiserror::Error;

/// Result type for mutation operations.
pub type MutationResult<T> = Result<T, MutationError>;

/// Errors that can occur during mutation execution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] RegistryError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No Node for the model {model} with unique field.")]
    NotFound { model: String },

    #[error("Invalid input for relation field {field}: {message}")]
    InvalidRelationInput { field: String, message: String },

    #[error("Only one of set, add or remove is allowed on {field}, got {}", .operators.join(", "))]
    ConflictingArrayOperations {
        field: String,
        operators: Vec<String>,
    },

    #[error("Invalid array operation on {field}: {message}")]
    InvalidArrayOperation { field: String, message: String },

    #[error("Cannot modify readonly field: {field} on model {model}")]
    ReadOnlyField { model: String, field: String },
}

impl MutationError {
    pub fn not_found(model: impl Into<String>) -> Self {
        Self::NotFound {
            model: model.into(),
        }
    }

    pub fn invalid_relation_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRelationInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_array_operation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArrayOperation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn read_only_field(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ReadOnlyField {
            model: model.into(),
            field: field.into(),
        }
    }
}
