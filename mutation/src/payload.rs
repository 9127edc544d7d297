//! Mutation payload building.
//!
//! Splits a write payload into plain assignments and array-field
//! operations. Relation fields are left to [`crate::input`].

use stitch_core::{ArrayOperation, ArrayOperator, Document, Mutation, Value, ID_FIELD};
use stitch_registry::ModelDef;

use crate::config::ArrayConflictPolicy;
use crate::error::{MutationError, MutationResult};
use crate::interceptor::Operation;

/// Build the base mutation for `data` on `model`.
///
/// Keys that name no model field pass through unchanged; foreign key
/// columns are written this way.
pub fn build_mutation(
    model: &ModelDef,
    data: &Document,
    operation: Operation,
    policy: ArrayConflictPolicy,
) -> MutationResult<Mutation> {
    let mut mutation = Mutation::new();

    for (key, value) in data {
        let Some(field) = model.get_field(key) else {
            mutation.set(key, value.clone());
            continue;
        };
        if field.is_relation() {
            continue;
        }
        if field.read_only || (key == ID_FIELD && operation == Operation::Update) {
            return Err(MutationError::read_only_field(&model.name, key));
        }

        if model.is_array_operation_field(key) {
            mutation.push_array_operation(array_operation(key, value, policy)?);
        } else {
            mutation.set(key, value.clone());
        }
    }

    Ok(mutation)
}

fn array_operation(
    field: &str,
    value: &Value,
    policy: ArrayConflictPolicy,
) -> MutationResult<ArrayOperation> {
    let map = value.as_object().ok_or_else(|| {
        MutationError::invalid_array_operation(field, "expected one of set, add or remove")
    })?;
    if let Some(unknown) = map.keys().find(|k| ArrayOperator::from_key(k).is_none()) {
        return Err(MutationError::invalid_array_operation(
            field,
            format!("unknown operator {}", unknown),
        ));
    }

    let given: Vec<ArrayOperator> = ArrayOperator::PRECEDENCE
        .into_iter()
        .filter(|op| map.contains_key(op.key()))
        .collect();
    let Some(&operator) = given.first() else {
        return Err(MutationError::invalid_array_operation(
            field,
            "expected one of set, add or remove",
        ));
    };
    if given.len() > 1 && policy == ArrayConflictPolicy::Reject {
        return Err(MutationError::ConflictingArrayOperations {
            field: field.to_string(),
            operators: given.iter().map(|op| op.key().to_string()).collect(),
        });
    }

    let operand = map.get(operator.key()).cloned().unwrap_or_default();
    Ok(ArrayOperation::new(field, operator, operand))
}
