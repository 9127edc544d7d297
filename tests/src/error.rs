//! Error types for the scenario framework.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scenario runs.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors that can occur when running scenarios.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Failed to read a fixture file.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A fixture file is not valid JSON of the expected shape.
    #[error("failed to parse '{path}': {message}")]
    FixtureParse { path: PathBuf, message: String },

    /// The schema fixture does not describe a valid registry.
    #[error("invalid schema '{path}': {message}")]
    Schema { path: PathBuf, message: String },

    /// Failed to seed the store.
    #[error("failed to seed collection '{collection}': {message}")]
    Seed { collection: String, message: String },

    /// Assertion failed.
    #[error("assertion failed for step '{step}': {message}")]
    AssertionFailed { step: String, message: String },

    /// Step not found in operations file.
    #[error("step '{step}' not found in operations file")]
    StepNotFound { step: String },

    /// Missing schema.
    #[error("schema not specified for scenario '{scenario}'")]
    MissingSchema { scenario: String },

    /// Missing operations file.
    #[error("operations not specified for scenario '{scenario}'")]
    MissingOperations { scenario: String },
}

impl ScenarioError {
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    pub fn fixture_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FixtureParse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn schema(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn seed(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Seed {
            collection: collection.into(),
            message: message.into(),
        }
    }

    pub fn assertion_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn step_not_found(step: impl Into<String>) -> Self {
        Self::StepNotFound { step: step.into() }
    }

    pub fn missing_schema(scenario: impl Into<String>) -> Self {
        Self::MissingSchema {
            scenario: scenario.into(),
        }
    }

    pub fn missing_operations(scenario: impl Into<String>) -> Self {
        Self::MissingOperations {
            scenario: scenario.into(),
        }
    }
}
