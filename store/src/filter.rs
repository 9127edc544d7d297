//! Native filters.
//!
//! The filter language follows document-store semantics:
//! - a condition on a list field holds if it holds for any element
//! - equality with null also matches a missing field
//! - comparisons between values of different types never hold

use std::cmp::Ordering;

use stitch_core::{Document, FieldFilter, Operator, RecordId, Value, ID_FIELD};

use crate::error::{StoreError, StoreResult};

/// A condition on one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    /// The list field contains every value.
    All(Vec<Value>),
    Regex { pattern: Pattern, negate: bool },
    Exists(bool),
}

/// A regular expression compiled once when the filter is built.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: regex_lite::Regex,
    case_insensitive: bool,
}

impl Pattern {
    pub fn new(source: &str, case_insensitive: bool) -> StoreResult<Self> {
        let regex = regex_lite::RegexBuilder::new(source)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| StoreError::invalid_query(e.to_string()))?;
        Ok(Self {
            regex,
            case_insensitive,
        })
    }

    /// Case-insensitive match of `text` as a literal.
    pub fn literal(text: &str) -> StoreResult<Self> {
        Self::new(&regex_lite::escape(text), true)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str() && self.case_insensitive == other.case_insensitive
    }
}

/// A native query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    Field { field: String, cond: Cond },
    /// Every child holds; empty matches all.
    And(Vec<Filter>),
    /// Some child holds; empty matches nothing.
    Or(Vec<Filter>),
}

impl Filter {
    pub fn field(field: impl Into<String>, cond: Cond) -> Self {
        Filter::Field {
            field: field.into(),
            cond,
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Cond::Eq(value.into()))
    }

    /// Match one record by id.
    pub fn by_id(id: &RecordId) -> Self {
        Self::eq(ID_FIELD, id)
    }

    /// Match records whose id is listed.
    pub fn id_in<'a>(ids: impl IntoIterator<Item = &'a RecordId>) -> Self {
        Self::field(ID_FIELD, Cond::In(ids.into_iter().map(Value::from).collect()))
    }

    /// Conjunction, flattening trivial cases.
    pub fn and(mut filters: Vec<Filter>) -> Self {
        filters.retain(|f| *f != Filter::All);
        match filters.len() {
            0 => Filter::All,
            1 => filters.remove(0),
            _ => Filter::And(filters),
        }
    }

    /// Translate one where comparison.
    pub fn from_field_filter(filter: &FieldFilter) -> StoreResult<Self> {
        let field = filter.field.as_str();
        let value = &filter.value;
        let list = || {
            value
                .as_list()
                .map(<[Value]>::to_vec)
                .ok_or_else(|| StoreError::invalid_query(format!("{} expects a list", filter.operator)))
        };

        Ok(match filter.operator {
            Operator::Eq => Self::field(field, Cond::Eq(value.clone())),
            Operator::Neq => Self::field(field, Cond::Ne(value.clone())),
            Operator::Contains | Operator::NotContains => {
                let text = value
                    .as_str()
                    .ok_or_else(|| StoreError::invalid_query("contains expects a string"))?;
                Self::field(
                    field,
                    Cond::Regex {
                        pattern: Pattern::literal(text)?,
                        negate: filter.operator == Operator::NotContains,
                    },
                )
            }
            Operator::Gt => Self::field(field, Cond::Gt(value.clone())),
            Operator::Gte => Self::field(field, Cond::Gte(value.clone())),
            Operator::Lt => Self::field(field, Cond::Lt(value.clone())),
            Operator::Lte => Self::field(field, Cond::Lte(value.clone())),
            Operator::In => Self::field(field, Cond::In(list()?)),
            Operator::NotIn => Self::field(field, Cond::Nin(list()?)),
            Operator::All => Self::field(field, Cond::All(list()?)),
            Operator::Between => {
                let range = value
                    .as_object()
                    .ok_or_else(|| StoreError::invalid_query("between expects {from, to}"))?;
                let bound = |key: &str| range.get(key).cloned().unwrap_or_default();
                Filter::And(vec![
                    Self::field(field, Cond::Gte(bound("from"))),
                    Self::field(field, Cond::Lte(bound("to"))),
                ])
            }
            Operator::Object => {
                let raw = value
                    .as_object()
                    .ok_or_else(|| StoreError::invalid_query("object expects a condition map"))?;
                Self::from_raw(field, raw)?
            }
        })
    }

    /// Translate a list of where comparisons, all of which must hold.
    pub fn from_field_filters(filters: &[FieldFilter]) -> StoreResult<Self> {
        filters
            .iter()
            .map(Self::from_field_filter)
            .collect::<StoreResult<Vec<_>>>()
            .map(Self::and)
    }

    /// Parse a raw condition map such as `{"$gt": 1, "$lt": 5}`.
    pub fn from_raw(field: &str, raw: &Document) -> StoreResult<Self> {
        let case_insensitive = raw
            .get("$options")
            .and_then(Value::as_str)
            .is_some_and(|o| o.contains('i'));
        let list = |op: &str, v: &Value| {
            v.as_list()
                .map(<[Value]>::to_vec)
                .ok_or_else(|| StoreError::invalid_query(format!("{} expects a list", op)))
        };

        let mut conds = Vec::with_capacity(raw.len());
        for (op, v) in raw {
            let cond = match op.as_str() {
                "$eq" => Cond::Eq(v.clone()),
                "$ne" => Cond::Ne(v.clone()),
                "$gt" => Cond::Gt(v.clone()),
                "$gte" => Cond::Gte(v.clone()),
                "$lt" => Cond::Lt(v.clone()),
                "$lte" => Cond::Lte(v.clone()),
                "$in" => Cond::In(list(op, v)?),
                "$nin" => Cond::Nin(list(op, v)?),
                "$all" => Cond::All(list(op, v)?),
                "$exists" => Cond::Exists(v.as_bool().unwrap_or(true)),
                "$regex" => {
                    let pattern = v
                        .as_str()
                        .ok_or_else(|| StoreError::invalid_query("$regex expects a string"))?;
                    Cond::Regex {
                        pattern: Pattern::new(pattern, case_insensitive)?,
                        negate: false,
                    }
                }
                "$options" => continue,
                other => {
                    return Err(StoreError::invalid_query(format!(
                        "unknown operator {}",
                        other
                    )))
                }
            };
            conds.push(Self::field(field, cond));
        }
        Ok(Self::and(conds))
    }

    /// Whether `doc` satisfies this filter.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Field { field, cond } => cond.matches(lookup(doc, field)),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }

    /// Equality fields a matching document must carry, used to seed upserts.
    pub fn equalities(&self) -> Vec<(&str, &Value)> {
        match self {
            Filter::Field {
                field,
                cond: Cond::Eq(value),
            } => vec![(field.as_str(), value)],
            Filter::And(filters) => filters.iter().flat_map(Filter::equalities).collect(),
            _ => Vec::new(),
        }
    }
}

/// Resolve a possibly dotted path.
fn lookup<'d>(doc: &'d Document, path: &str) -> Option<&'d Value> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

impl Cond {
    fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Cond::Eq(expected) => eq_matches(value, expected),
            Cond::Ne(expected) => !eq_matches(value, expected),
            Cond::Gt(bound) => any_compares(value, bound, |o| o == Ordering::Greater),
            Cond::Gte(bound) => any_compares(value, bound, |o| o != Ordering::Less),
            Cond::Lt(bound) => any_compares(value, bound, |o| o == Ordering::Less),
            Cond::Lte(bound) => any_compares(value, bound, |o| o != Ordering::Greater),
            Cond::In(options) => options.iter().any(|o| eq_matches(value, o)),
            Cond::Nin(options) => !options.iter().any(|o| eq_matches(value, o)),
            Cond::All(required) => match value {
                Some(Value::List(items)) if !required.is_empty() => required
                    .iter()
                    .all(|r| items.iter().any(|item| item.loose_eq(r))),
                _ => false,
            },
            Cond::Regex { pattern, negate } => {
                let found = candidates(value).any(|v| v.as_str().is_some_and(|s| pattern.is_match(s)));
                found != *negate
            }
            Cond::Exists(expected) => value.is_some() == *expected,
        }
    }
}

/// The value itself plus, for lists, each element.
fn candidates(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    let elements = match value {
        Some(Value::List(items)) => items.as_slice(),
        _ => &[],
    };
    value.into_iter().chain(elements)
}

fn eq_matches(value: Option<&Value>, expected: &Value) -> bool {
    match value {
        None | Some(Value::Null) if expected.is_null() => true,
        _ => candidates(value).any(|v| v.loose_eq(expected)),
    }
}

fn any_compares(value: Option<&Value>, bound: &Value, pred: impl Fn(Ordering) -> bool) -> bool {
    if bound.is_null() {
        return false;
    }
    candidates(value).any(|v| v.compare(bound).is_some_and(&pred))
}
