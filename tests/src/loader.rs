//! Loaders for fixture files.
//!
//! A fixture directory holds three kinds of JSON files:
//!
//! - `schema.json` - models and their fields, built into a [`Registry`]
//! - `seeds/*.json` - documents per collection, inserted as-is
//! - `operations/*.json` - named steps run against a session

use std::fs;
use std::path::Path;

use serde::Deserialize;
use stitch_core::{Document, Value};
use stitch_query::Pagination;
use stitch_registry::{FieldDef, Registry, RegistryBuilder, ScalarType};
use stitch_store::MemoryStore;

use crate::error::{ScenarioError, ScenarioResult};

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> ScenarioResult<T> {
    let source = fs::read_to_string(path).map_err(|e| ScenarioError::file_read(path, e))?;
    serde_json::from_str(&source).map_err(|e| ScenarioError::fixture_parse(path, e.to_string()))
}

// ==================== Schema ====================

#[derive(Debug, Deserialize)]
struct SchemaFile {
    models: Vec<ModelSpec>,
}

#[derive(Debug, Deserialize)]
struct ModelSpec {
    name: String,
    #[serde(default)]
    fields: Vec<FieldSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldSpec {
    name: String,
    #[serde(rename = "type")]
    scalar: Option<String>,
    #[serde(rename = "enum")]
    enumeration: Option<String>,
    relation: Option<String>,
    #[serde(default)]
    list: bool,
    #[serde(default)]
    unique: bool,
    #[serde(default)]
    non_null: bool,
    #[serde(default)]
    read_only: bool,
    #[serde(default)]
    array_operations: bool,
    relation_name: Option<String>,
    foreign_key: Option<ForeignKeySpec>,
}

#[derive(Debug, Deserialize)]
struct ForeignKeySpec {
    key: String,
    side: Option<String>,
}

fn scalar_type(name: &str) -> Option<ScalarType> {
    Some(match name {
        "ID" => ScalarType::Id,
        "String" => ScalarType::String,
        "Int" => ScalarType::Int,
        "Float" => ScalarType::Float,
        "Boolean" => ScalarType::Boolean,
        "DateTime" => ScalarType::DateTime,
        "Json" => ScalarType::Json,
        _ => return None,
    })
}

impl FieldSpec {
    fn into_field(self, path: &Path, model: &str) -> ScenarioResult<FieldDef> {
        let mut field = match (self.scalar, self.enumeration, self.relation) {
            (Some(scalar), None, None) => {
                let scalar = scalar_type(&scalar).ok_or_else(|| {
                    ScenarioError::schema(path, format!("{}.{}: unknown type {}", model, self.name, scalar))
                })?;
                FieldDef::scalar(&self.name, scalar)
            }
            (None, Some(enumeration), None) => FieldDef::enumeration(&self.name, enumeration),
            (None, None, Some(target)) => {
                let mut field = FieldDef::relation(&self.name, target);
                if let Some(name) = self.relation_name {
                    field = field.relation_name(name);
                }
                match self.foreign_key {
                    Some(ForeignKeySpec { key, side: Some(side) }) => field.foreign_key_on(key, side),
                    Some(ForeignKeySpec { key, side: None }) => field.foreign_key(key),
                    None => field,
                }
            }
            _ => {
                return Err(ScenarioError::schema(
                    path,
                    format!("{}.{}: expected exactly one of type, enum or relation", model, self.name),
                ))
            }
        };

        if self.list {
            field = field.list();
        }
        if self.unique {
            field = field.unique();
        }
        if self.non_null {
            field = field.non_null();
        }
        if self.read_only {
            field = field.read_only();
        }
        if self.array_operations {
            field = field.array_operations();
        }
        Ok(field)
    }
}

/// Build a registry from a schema file.
pub fn load_registry(path: &Path) -> ScenarioResult<Registry> {
    let schema: SchemaFile = read_json(path)?;

    let mut builder = RegistryBuilder::new();
    for model in schema.models {
        let mut model_builder = builder.add_model(&model.name);
        for field in model.fields {
            model_builder = model_builder.field(field.into_field(path, &model.name)?);
        }
        model_builder
            .done()
            .map_err(|e| ScenarioError::schema(path, e.to_string()))?;
    }
    builder.build().map_err(|e| ScenarioError::schema(path, e.to_string()))
}

// ==================== Seeds ====================

/// Insert the documents of a seed file, keyed by collection.
pub fn load_seed(path: &Path, store: &MemoryStore) -> ScenarioResult<usize> {
    let seed: serde_json::Map<String, serde_json::Value> = read_json(path)?;

    let mut inserted = 0;
    for (collection, documents) in seed {
        let serde_json::Value::Array(documents) = documents else {
            return Err(ScenarioError::fixture_parse(
                path,
                format!("collection {} must hold an array of documents", collection),
            ));
        };
        let documents = documents
            .into_iter()
            .map(|raw| {
                Value::from(raw).into_object().ok_or_else(|| {
                    ScenarioError::fixture_parse(path, format!("{} holds a non-object document", collection))
                })
            })
            .collect::<ScenarioResult<Vec<Document>>>()?;

        inserted += documents.len();
        store
            .seed(&collection, documents)
            .map_err(|e| ScenarioError::seed(&collection, e.to_string()))?;
    }
    Ok(inserted)
}

// ==================== Operations ====================

/// One session call.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Find {
        model: String,
        #[serde(rename = "where", default)]
        filter: serde_json::Value,
        #[serde(rename = "orderBy", default)]
        order_by: serde_json::Value,
        #[serde(default)]
        pagination: Pagination,
    },
    FindOne {
        model: String,
        #[serde(rename = "where", default)]
        filter: serde_json::Value,
    },
    FindById {
        model: String,
        id: String,
    },
    Create {
        model: String,
        data: serde_json::Value,
    },
    Update {
        model: String,
        #[serde(rename = "where")]
        selector: serde_json::Value,
        data: serde_json::Value,
    },
    Delete {
        model: String,
        #[serde(rename = "where")]
        selector: serde_json::Value,
    },
    /// Raw contents of a store collection, join collections included.
    Collection { name: String },
}

#[derive(Debug, Clone, Deserialize)]
struct StepSpec {
    step: String,
    #[serde(flatten)]
    operation: Operation,
}

/// A parsed operations file.
#[derive(Debug, Clone)]
pub struct Operations {
    steps: Vec<(String, Operation)>,
}

impl Operations {
    /// Parse an operations file from a string.
    pub fn parse(source: &str) -> Result<Self, String> {
        let specs: Vec<StepSpec> = serde_json::from_str(source).map_err(|e| e.to_string())?;
        Ok(Self {
            steps: specs.into_iter().map(|s| (s.step, s.operation)).collect(),
        })
    }

    /// Load and parse an operations file.
    pub fn load(path: &Path) -> ScenarioResult<Self> {
        let source = fs::read_to_string(path).map_err(|e| ScenarioError::file_read(path, e))?;
        Self::parse(&source).map_err(|message| ScenarioError::fixture_parse(path, message))
    }

    /// Get the operation for a step.
    pub fn get(&self, step: &str) -> Option<&Operation> {
        self.steps.iter().find(|(name, _)| name == step).map(|(_, op)| op)
    }

    /// Step names in order of appearance.
    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operations() {
        let source = r#"[
            {"step": "list", "op": "find", "model": "User", "where": {"age_gt": 20}, "pagination": {"first": 2}},
            {"step": "drop", "op": "delete", "model": "User", "where": {"id": "u1"}},
            {"step": "raw", "op": "collection", "name": "_user_skill"}
        ]"#;

        let ops = Operations::parse(source).unwrap();

        assert_eq!(ops.step_names().collect::<Vec<_>>(), vec!["list", "drop", "raw"]);
        match ops.get("list") {
            Some(Operation::Find { model, pagination, order_by, .. }) => {
                assert_eq!(model, "User");
                assert_eq!(pagination.first, Some(2));
                assert!(order_by.is_null());
            }
            other => panic!("unexpected operation {:?}", other),
        }
        assert!(ops.get("missing").is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_op() {
        let source = r#"[{"step": "x", "op": "upsert", "model": "User"}]"#;

        assert!(Operations::parse(source).is_err());
    }
}
