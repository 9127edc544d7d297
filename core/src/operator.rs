//! Filter and array-update operators.
//!
//! Where-clause keys carry an optional operator suffix (`price_gt`,
//! `name_contains`); payload array fields carry one of `set`, `add`, `remove`.

use std::fmt;

use crate::Value;

/// A comparison operator applied to a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    /// Case-insensitive substring match.
    Contains,
    /// Case-insensitive substring exclusion.
    NotContains,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Field value is one of the listed values.
    In,
    /// Field value is none of the listed values.
    NotIn,
    /// Field (a list) contains all listed values.
    All,
    /// Inclusive range given as `{from, to}`.
    Between,
    /// Raw store-native condition object, passed through.
    Object,
}

impl Operator {
    /// Every operator, in suffix-lookup order.
    pub const ALL: [Operator; 13] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Contains,
        Operator::NotContains,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::NotIn,
        Operator::All,
        Operator::Between,
        Operator::Object,
    ];

    /// Parse a where-key suffix (the part after the last `_`).
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.suffix() == suffix)
    }

    /// The where-key suffix for this operator.
    pub fn suffix(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Contains => "contains",
            Operator::NotContains => "notcontains",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::All => "all",
            Operator::Between => "between",
            Operator::Object => "object",
        }
    }

    /// Whether the operand must be a list.
    pub fn takes_list(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn | Operator::All)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// One `field operator value` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Eq, value)
    }
}

/// An update applied to a list-valued field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayOperator {
    /// Replace the whole list.
    Set,
    /// Append values not already present.
    Add,
    /// Remove every matching value.
    Remove,
}

impl ArrayOperator {
    /// Precedence order used when a payload names more than one operator.
    pub const PRECEDENCE: [ArrayOperator; 3] =
        [ArrayOperator::Set, ArrayOperator::Add, ArrayOperator::Remove];

    pub fn from_key(key: &str) -> Option<Self> {
        Self::PRECEDENCE.into_iter().find(|op| op.key() == key)
    }

    pub fn key(&self) -> &'static str {
        match self {
            ArrayOperator::Set => "set",
            ArrayOperator::Add => "add",
            ArrayOperator::Remove => "remove",
        }
    }
}

impl fmt::Display for ArrayOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A declared array-field operation from a mutation payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayOperation {
    pub field: String,
    pub operator: ArrayOperator,
    pub value: Value,
}

impl ArrayOperation {
    pub fn new(field: impl Into<String>, operator: ArrayOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// The operand as a list; a scalar operand is treated as a one-element list.
    pub fn values(&self) -> Vec<Value> {
        match &self.value {
            Value::List(items) => items.clone(),
            Value::Null => Vec::new(),
            other => vec![other.clone()],
        }
    }
}
