//! Multi-key ordering of filtered records.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use stitch_core::{Document, DocumentExt, Value};

use crate::error::{QueryError, QueryResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Ordered sort keys; earlier keys take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderBy(Vec<(String, SortOrder)>);

impl OrderBy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.0.push((field.into(), SortOrder::Asc));
        self
    }

    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.0.push((field.into(), SortOrder::Desc));
        self
    }

    /// Parse `{"age": "DESC"}` or `[{"age": "DESC"}, {"name": "ASC"}]`.
    ///
    /// Objects are keyed maps without insertion order, so several keys must
    /// be given as a list of single-key objects; the list order is the
    /// precedence.
    pub fn from_value(value: &Value) -> QueryResult<Self> {
        let mut order = Self::new();
        match value {
            Value::Null => {}
            Value::Object(map) if map.len() > 1 => {
                return Err(QueryError::invalid_order(
                    "several sort keys must be given as a list of single-key objects",
                ))
            }
            Value::Object(map) => order.push_keys(map)?,
            Value::List(items) => {
                for item in items {
                    match item {
                        Value::Object(map) if map.len() == 1 => order.push_keys(map)?,
                        _ => {
                            return Err(QueryError::invalid_order(
                                "each list entry must be a single-key object",
                            ))
                        }
                    }
                }
            }
            other => {
                return Err(QueryError::invalid_order(format!(
                    "expected an object or a list, got {}",
                    other.type_name()
                )))
            }
        }
        Ok(order)
    }

    fn push_keys(&mut self, map: &Document) -> QueryResult<()> {
        for (field, direction) in map {
            let order = match direction.as_str().map(str::to_ascii_uppercase).as_deref() {
                Some("ASC") => SortOrder::Asc,
                Some("DESC") => SortOrder::Desc,
                _ => {
                    return Err(QueryError::invalid_order(format!(
                        "{} must be ASC or DESC",
                        field
                    )))
                }
            };
            self.0.push((field.clone(), order));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for (field, order) in &self.0 {
            let cmp = a.field(field).cmp_sortable(b.field(field));
            if cmp != Ordering::Equal {
                return match order {
                    SortOrder::Asc => cmp,
                    SortOrder::Desc => cmp.reverse(),
                };
            }
        }
        Ordering::Equal
    }
}

/// Stable sort; ties keep their filtered order.
pub fn sort(rows: &mut [Document], order: &OrderBy) {
    if !order.is_empty() {
        rows.sort_by(|a, b| order.compare(a, b));
    }
}
