//! Unique selectors.
//!
//! `update` and `delete`, as well as relation `connect`, address exactly one
//! record through a single unique field: `{id: "..."}` or `{email: "..."}`.

use stitch_core::{FieldFilter, Value};
use stitch_registry::Registry;

use crate::error::{CompileError, CompileResult};

/// A compiled unique selector.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueWhere {
    pub field: String,
    pub value: Value,
}

impl UniqueWhere {
    pub fn to_filter(&self) -> FieldFilter {
        FieldFilter::eq(&self.field, self.value.clone())
    }
}

/// Compile a unique selector on `model`.
pub fn compile_unique_where(
    registry: &Registry,
    model: &str,
    raw: &Value,
) -> CompileResult<UniqueWhere> {
    let model_def = registry.model(model)?;
    let invalid = || CompileError::invalid_unique_where(model);

    let map = raw.as_object().ok_or_else(invalid)?;
    let mut entries = map.iter();
    let (Some((field, value)), None) = (entries.next(), entries.next()) else {
        return Err(invalid());
    };
    if !model_def.is_unique_field(field) || value.is_null() {
        return Err(invalid());
    }

    Ok(UniqueWhere {
        field: field.clone(),
        value: value.clone(),
    })
}
