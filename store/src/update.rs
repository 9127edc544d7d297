//! Native updates.

use stitch_core::{ArrayOperator, Document, Mutation, Value};

/// A single-document update: assignments, removals and list edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    /// `$set`: replace field values.
    pub set: Document,
    /// `$unset`: remove fields.
    pub unset: Vec<String>,
    /// `$addToSet` with `$each`: append values not already present.
    pub add_to_set: Vec<(String, Vec<Value>)>,
    /// `$pull` with `$in`: remove every matching value.
    pub pull: Vec<(String, Vec<Value>)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.unset.push(field.into());
        self
    }

    pub fn add_to_set(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.add_to_set.push((field.into(), values));
        self
    }

    pub fn pull(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.pull.push((field.into(), values));
        self
    }

    /// Native form of a mutation payload: assignments become `$set`,
    /// array operations become `$set`, `$addToSet` or `$pull`.
    pub fn from_mutation(mutation: &Mutation) -> Self {
        let mut update = Self {
            set: mutation.data.clone(),
            ..Self::default()
        };
        for op in &mutation.array_operations {
            update = match op.operator {
                ArrayOperator::Set => update.set(&op.field, Value::List(op.values())),
                ArrayOperator::Add => update.add_to_set(&op.field, op.values()),
                ArrayOperator::Remove => update.pull(&op.field, op.values()),
            };
        }
        update
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
            && self.unset.is_empty()
            && self.add_to_set.is_empty()
            && self.pull.is_empty()
    }

    /// Apply to a document in place.
    pub fn apply(&self, doc: &mut Document) {
        for (field, value) in &self.set {
            doc.insert(field.clone(), value.clone());
        }
        for field in &self.unset {
            doc.remove(field);
        }
        for (field, values) in &self.add_to_set {
            let slot = doc
                .entry(field.clone())
                .or_insert_with(|| Value::List(Vec::new()));
            if !slot.is_list() {
                *slot = Value::List(Vec::new());
            }
            if let Value::List(items) = slot {
                for value in values {
                    if !items.iter().any(|item| item.loose_eq(value)) {
                        items.push(value.clone());
                    }
                }
            }
        }
        for (field, values) in &self.pull {
            if let Some(Value::List(items)) = doc.get_mut(field) {
                items.retain(|item| !values.iter().any(|v| item.loose_eq(v)));
            }
        }
    }
}
