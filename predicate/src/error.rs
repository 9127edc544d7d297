//! Predicate compilation error types.

use stitch_registry::RegistryError;
use thiserror::Error;

/// Errors raised while compiling a where clause.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Missing or unresolved relation metadata.
    #[error("Configuration error: {0}")]
    Configuration(#[from] RegistryError),

    #[error("Where clause for {model} must be an object, got {found}")]
    InvalidWhere { model: String, found: String },

    #[error("Unknown field '{field}' on model '{model}'")]
    UnknownField { model: String, field: String },

    #[error("Operator {operator} no support")]
    UnsupportedOperator { operator: String },

    #[error("There can be only one input field named {field}")]
    DuplicateField { field: String },

    #[error("Key '{key}' on model '{model}' matches both a field and a field with an operator")]
    AmbiguousKey { model: String, key: String },

    #[error("Relation filter '{field}' takes exactly one of some, none, every and nothing else")]
    AmbiguousQuantifier { field: String },

    #[error("Relation '{field}' is not a list and cannot be quantified")]
    QuantifierOnSingular { field: String },

    #[error("Operator {operator} on '{field}' expects {expected}")]
    InvalidOperand {
        field: String,
        operator: String,
        expected: String,
    },

    #[error("Relation filter '{field}' must be an object, got {found}")]
    InvalidRelationFilter { field: String, found: String },

    #[error("You provided an invalid argument for the where selector on {model}. Please provide exactly one unique field and value.")]
    InvalidUniqueWhere { model: String },
}

pub type CompileResult<T> = Result<T, CompileError>;

impl CompileError {
    pub fn unknown_field(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            model: model.into(),
            field: field.into(),
        }
    }

    pub fn unsupported_operator(operator: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
        }
    }

    pub fn duplicate_field(field: impl Into<String>) -> Self {
        Self::DuplicateField {
            field: field.into(),
        }
    }

    pub fn ambiguous_quantifier(field: impl Into<String>) -> Self {
        Self::AmbiguousQuantifier {
            field: field.into(),
        }
    }

    pub fn invalid_operand(
        field: impl Into<String>,
        operator: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidOperand {
            field: field.into(),
            operator: operator.to_string(),
            expected: expected.into(),
        }
    }

    pub fn invalid_unique_where(model: impl Into<String>) -> Self {
        Self::InvalidUniqueWhere {
            model: model.into(),
        }
    }
}
