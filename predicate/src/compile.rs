//! Where-clause compiler.
//!
//! Turns a raw where map into a [`PredicateNode`]. Keys are classified
//! deterministically:
//! - `AND` / `OR` group child clauses
//! - the exact name of a relation field starts a relation filter
//! - the exact name of any other field is an equality filter
//! - `field_operator` applies a suffix operator to `field`
//!
//! Anything else, or any key that could be read two ways, is an error.

use std::collections::HashSet;

use stitch_core::{Document, FieldFilter, Operator, Value};
use stitch_registry::{FieldDef, ModelDef, Registry};

use crate::error::{CompileError, CompileResult};
use crate::node::{BoolOp, PredicateNode, Quantifier, RelationWhere};

/// How a single where key is read.
enum KeyKind<'m> {
    Relation(&'m FieldDef),
    Field(&'m FieldDef, Operator),
}

/// Compiles where clauses against a registry.
#[derive(Debug, Clone, Copy)]
pub struct WhereCompiler<'r> {
    registry: &'r Registry,
}

impl<'r> WhereCompiler<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Compile `raw` as a where clause on `model`. Null and `{}` match all.
    pub fn compile(&self, model: &str, raw: &Value) -> CompileResult<PredicateNode> {
        let model_def = self.registry.model(model)?;
        let node = match raw {
            Value::Null => PredicateNode::Empty,
            Value::Object(map) => self.compile_map(model_def, map)?,
            other => {
                return Err(CompileError::InvalidWhere {
                    model: model.to_string(),
                    found: other.type_name().to_string(),
                })
            }
        };
        tracing::trace!(model, ?node, "compiled where clause");
        Ok(node)
    }

    fn compile_map(&self, model: &ModelDef, map: &Document) -> CompileResult<PredicateNode> {
        let mut seen = HashSet::new();
        let mut base = Vec::new();
        let mut relations = Vec::new();
        let mut groups = Vec::new();

        for (key, value) in map {
            if let Some(op) = BoolOp::from_key(key) {
                if let Some(group) = self.compile_group(model, op, value)? {
                    groups.push(group);
                }
                continue;
            }

            match self.classify(model, key)? {
                KeyKind::Relation(field) => {
                    if !seen.insert(field.name.as_str()) {
                        return Err(CompileError::duplicate_field(&field.name));
                    }
                    relations.push(self.compile_relation(model, field, value)?);
                }
                KeyKind::Field(field, operator) => {
                    if !seen.insert(field.name.as_str()) {
                        return Err(CompileError::duplicate_field(&field.name));
                    }
                    check_operand(&field.name, operator, value)?;
                    base.push(FieldFilter::new(&field.name, operator, value.clone()));
                }
            }
        }

        let mut parts = Vec::with_capacity(2 + groups.len());
        if !base.is_empty() {
            parts.push(PredicateNode::Base(base));
        }
        if !relations.is_empty() {
            parts.push(PredicateNode::RelationGroup(relations));
        }
        parts.extend(groups);
        Ok(PredicateNode::all_of(parts))
    }

    /// Compile an `AND` / `OR` value. `AND` of nothing contributes nothing.
    fn compile_group(
        &self,
        model: &ModelDef,
        op: BoolOp,
        value: &Value,
    ) -> CompileResult<Option<PredicateNode>> {
        let items: Vec<&Value> = match value {
            Value::List(items) => items.iter().collect(),
            Value::Object(_) => vec![value],
            other => {
                return Err(CompileError::invalid_operand(
                    op.to_string(),
                    op,
                    format!("a list of where clauses, got {}", other.type_name()),
                ))
            }
        };

        let mut children = Vec::with_capacity(items.len());
        for item in items {
            let Value::Object(map) = item else {
                return Err(CompileError::invalid_operand(
                    op.to_string(),
                    op,
                    "a list of where clauses",
                ));
            };
            children.push(self.compile_map(model, map)?);
        }

        if op == BoolOp::And {
            children.retain(|c| !c.is_empty());
            if children.is_empty() {
                return Ok(None);
            }
        }
        Ok(Some(PredicateNode::AndOr { op, children }))
    }

    fn classify<'m>(&self, model: &'m ModelDef, key: &str) -> CompileResult<KeyKind<'m>> {
        let split = key.rsplit_once('_');
        let exact = model.get_field(key);

        if let (Some(_), Some((name, suffix))) = (exact, split) {
            if model.has_field(name) && Operator::from_suffix(suffix).is_some() {
                return Err(CompileError::AmbiguousKey {
                    model: model.name.clone(),
                    key: key.to_string(),
                });
            }
        }

        if let Some(field) = exact {
            return Ok(if field.is_relation() {
                KeyKind::Relation(field)
            } else {
                KeyKind::Field(field, Operator::Eq)
            });
        }

        let Some((name, suffix)) = split else {
            return Err(CompileError::unknown_field(&model.name, key));
        };
        let operator =
            Operator::from_suffix(suffix).ok_or_else(|| CompileError::unsupported_operator(suffix))?;
        let field = model
            .get_field(name)
            .ok_or_else(|| CompileError::unknown_field(&model.name, name))?;
        if field.is_relation() {
            return Err(CompileError::unsupported_operator(suffix));
        }
        Ok(KeyKind::Field(field, operator))
    }

    fn compile_relation(
        &self,
        model: &ModelDef,
        field: &FieldDef,
        value: &Value,
    ) -> CompileResult<RelationWhere> {
        let relation = self.registry.resolve_relation(&model.name, &field.name)?;
        let target = relation.target;
        let link = relation.resolved.link.clone();

        let Value::Object(map) = value else {
            return Err(CompileError::InvalidRelationFilter {
                field: field.name.clone(),
                found: value.type_name().to_string(),
            });
        };

        let quantified: Vec<(Quantifier, &Value)> = map
            .iter()
            .filter_map(|(k, v)| Quantifier::from_key(k).map(|q| (q, v)))
            .collect();

        if !link.is_list() {
            if quantified.iter().any(|(q, _)| !target.has_field(quantifier_key(*q))) {
                return Err(CompileError::QuantifierOnSingular {
                    field: field.name.clone(),
                });
            }
            return Ok(RelationWhere {
                field: field.name.clone(),
                target: target.name.clone(),
                link,
                quantifier: None,
                filters: Box::new(self.compile_map(target, map)?),
            });
        }

        let (quantifier, filters) = match quantified.as_slice() {
            [] => (Quantifier::Some, self.compile_map(target, map)?),
            [(q, nested)] => {
                if map.len() > 1 || target.has_field(quantifier_key(*q)) {
                    return Err(CompileError::ambiguous_quantifier(&field.name));
                }
                let nested = match nested {
                    Value::Null => PredicateNode::Empty,
                    Value::Object(inner) => self.compile_map(target, inner)?,
                    other => {
                        return Err(CompileError::InvalidRelationFilter {
                            field: field.name.clone(),
                            found: other.type_name().to_string(),
                        })
                    }
                };
                (*q, nested)
            }
            _ => return Err(CompileError::ambiguous_quantifier(&field.name)),
        };

        Ok(RelationWhere {
            field: field.name.clone(),
            target: target.name.clone(),
            link,
            quantifier: Some(quantifier),
            filters: Box::new(filters),
        })
    }
}

fn quantifier_key(q: Quantifier) -> &'static str {
    match q {
        Quantifier::Some => "some",
        Quantifier::None => "none",
        Quantifier::Every => "every",
    }
}

fn check_operand(field: &str, operator: Operator, value: &Value) -> CompileResult<()> {
    let ok = match operator {
        Operator::In | Operator::NotIn | Operator::All => value.is_list(),
        Operator::Between => value
            .as_object()
            .is_some_and(|range| range.contains_key("from") && range.contains_key("to")),
        Operator::Object => value.is_object(),
        Operator::Contains | Operator::NotContains => value.is_string(),
        _ => true,
    };
    if ok {
        return Ok(());
    }

    let expected = match operator {
        Operator::In | Operator::NotIn | Operator::All => "a list",
        Operator::Between => "an object with from and to",
        Operator::Object => "an object",
        _ => "a string",
    };
    Err(CompileError::invalid_operand(field, operator, expected))
}

/// Compile `raw` as a where clause on `model`.
pub fn compile_where(registry: &Registry, model: &str, raw: &Value) -> CompileResult<PredicateNode> {
    WhereCompiler::new(registry).compile(model, raw)
}
