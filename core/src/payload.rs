//! Mutation payloads.

use crate::{ArrayOperation, Document, Value};

/// A write payload: plain field assignments plus array-field operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mutation {
    /// Scalar assignments (`field = value`).
    pub data: Document,
    /// Declared array-field operations.
    pub array_operations: Vec<ArrayOperation>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mutation that only assigns fields.
    pub fn from_data(data: Document) -> Self {
        Self {
            data,
            array_operations: Vec::new(),
        }
    }

    /// Assign a field, replacing any earlier assignment.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(field.into(), value.into());
    }

    /// Builder form of [`Mutation::set`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn push_array_operation(&mut self, operation: ArrayOperation) {
        self.array_operations.push(operation);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.array_operations.is_empty()
    }
}
