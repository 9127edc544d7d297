//! Identity types for Stitch records.
//!
//! Record identifiers are opaque strings that are:
//! - Unique within their collection
//! - Immutable once assigned
//! - Stored under the `id` field of every document

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Document, Value};

/// Name of the identity field on every stored document.
pub const ID_FIELD: &str = "id";

/// Unique identifier for a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a RecordId from a raw value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, time-ordered identifier.
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Get the raw value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        Value::String(id.0)
    }
}

impl From<&RecordId> for Value {
    fn from(id: &RecordId) -> Self {
        Value::String(id.0.clone())
    }
}

/// Field access helpers for stored documents.
pub trait DocumentExt {
    /// The record id, if the document carries a string `id`.
    fn record_id(&self) -> Option<RecordId>;

    /// The value of a field, Null when absent.
    fn field(&self, name: &str) -> &Value;
}

static NULL: Value = Value::Null;

impl DocumentExt for Document {
    fn record_id(&self) -> Option<RecordId> {
        self.get(ID_FIELD)
            .and_then(Value::as_str)
            .map(RecordId::new)
    }

    fn field(&self, name: &str) -> &Value {
        self.get(name).unwrap_or(&NULL)
    }
}
