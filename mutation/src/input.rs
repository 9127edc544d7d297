//! Nested relation inputs.
//!
//! A relation field in a write payload carries verbs instead of a value:
//!
//! ```text
//! { team: { connect: { id: "t1" } } }
//! { skills: { connect: [{ code: "S00" }], create: [{ code: "S01" }] } }
//! ```
//!
//! Singular relations take exactly one verb. `disconnect` and `delete`
//! take `true` and only make sense on update.

use std::collections::BTreeMap;

use stitch_core::{Document, Value};
use stitch_registry::ModelDef;

use crate::error::{MutationError, MutationResult};
use crate::interceptor::Operation;

const VERBS: [&str; 4] = ["connect", "create", "disconnect", "delete"];

/// Verb applied to a singular relation.
#[derive(Debug, Clone, PartialEq)]
pub enum SingularInput {
    /// Link the record selected by a unique where.
    Connect(Value),
    /// Create a record and link it.
    Create(Document),
    Disconnect,
    /// Delete the linked record.
    Delete,
}

/// Verbs applied to a list relation. Each list holds unique wheres, except
/// `create` which holds payloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListInput {
    pub connect: Vec<Value>,
    pub create: Vec<Document>,
    pub disconnect: Vec<Value>,
    pub delete: Vec<Value>,
}

impl ListInput {
    pub fn is_empty(&self) -> bool {
        self.connect.is_empty()
            && self.create.is_empty()
            && self.disconnect.is_empty()
            && self.delete.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelationInput {
    One(SingularInput),
    Many(ListInput),
}

/// Parse the relation inputs in `data`, keyed by relation field.
pub fn parse_relation_inputs(
    model: &ModelDef,
    data: &Document,
    operation: Operation,
) -> MutationResult<BTreeMap<String, RelationInput>> {
    let mut inputs = BTreeMap::new();
    for field in model.relation_fields() {
        let Some(raw) = data.get(&field.name).filter(|v| !v.is_null()) else {
            continue;
        };
        let is_list = field
            .relation_def()
            .and_then(|r| r.link())
            .map_or(field.list, |link| link.is_list());

        let input = if is_list {
            RelationInput::Many(parse_list(&field.name, raw, operation)?)
        } else {
            RelationInput::One(parse_singular(&field.name, raw, operation)?)
        };
        inputs.insert(field.name.clone(), input);
    }
    Ok(inputs)
}

fn verbs<'v>(field: &str, raw: &'v Value) -> MutationResult<&'v Document> {
    let map = raw
        .as_object()
        .ok_or_else(|| MutationError::invalid_relation_input(field, "expected an object of verbs"))?;
    if let Some(unknown) = map.keys().find(|k| !VERBS.contains(&k.as_str())) {
        return Err(MutationError::invalid_relation_input(
            field,
            format!("unknown verb {}", unknown),
        ));
    }
    Ok(map)
}

fn parse_singular(field: &str, raw: &Value, operation: Operation) -> MutationResult<SingularInput> {
    let map = verbs(field, raw)?;
    let mut entries = map.iter();
    let (Some((verb, value)), None) = (entries.next(), entries.next()) else {
        return Err(MutationError::invalid_relation_input(
            field,
            "expected exactly one of connect, create, disconnect or delete",
        ));
    };

    let object = |value: &Value| {
        value
            .as_object()
            .cloned()
            .ok_or_else(|| MutationError::invalid_relation_input(field, format!("{} expects an object", verb)))
    };
    let flag = |value: &Value| {
        if operation == Operation::Create {
            return Err(MutationError::invalid_relation_input(
                field,
                format!("{} is only allowed on update", verb),
            ));
        }
        match value.as_bool() {
            Some(true) => Ok(()),
            _ => Err(MutationError::invalid_relation_input(
                field,
                format!("{} expects true", verb),
            )),
        }
    };

    match verb.as_str() {
        "connect" => Ok(SingularInput::Connect(Value::Object(object(value)?))),
        "create" => Ok(SingularInput::Create(object(value)?)),
        "disconnect" => flag(value).map(|_| SingularInput::Disconnect),
        _ => flag(value).map(|_| SingularInput::Delete),
    }
}

fn parse_list(field: &str, raw: &Value, operation: Operation) -> MutationResult<ListInput> {
    let map = verbs(field, raw)?;
    let items = |verb: &str| -> MutationResult<Vec<Document>> {
        let items = match map.get(verb) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::List(items)) => items.as_slice(),
            Some(single) => std::slice::from_ref(single),
        };
        items
            .iter()
            .map(|item| {
                item.as_object().cloned().ok_or_else(|| {
                    MutationError::invalid_relation_input(field, format!("{} expects objects", verb))
                })
            })
            .collect()
    };

    let input = ListInput {
        connect: items("connect")?.into_iter().map(Value::Object).collect(),
        create: items("create")?,
        disconnect: items("disconnect")?.into_iter().map(Value::Object).collect(),
        delete: items("delete")?.into_iter().map(Value::Object).collect(),
    };
    if operation == Operation::Create && !(input.disconnect.is_empty() && input.delete.is_empty()) {
        return Err(MutationError::invalid_relation_input(
            field,
            "disconnect and delete are only allowed on update",
        ));
    }
    Ok(input)
}
