//! The Registry - immutable schema lookup.

use std::collections::HashMap;

use crate::{FieldDef, ModelDef, ModelRelation, RegistryError, RegistryResult, ResolvedRelation};

/// The Registry provides runtime lookup of model definitions.
/// It is immutable after construction.
#[derive(Debug)]
pub struct Registry {
    /// Model definitions in declaration order.
    models: Vec<ModelDef>,
    /// Model position lookup by name.
    model_names: HashMap<String, usize>,
    /// Resolved relations.
    relations: Vec<ModelRelation>,
}

/// A relation field together with its target model and resolution.
#[derive(Debug, Clone, Copy)]
pub struct RelationTarget<'r> {
    pub field: &'r FieldDef,
    pub target: &'r ModelDef,
    pub resolved: &'r ResolvedRelation,
}

impl Registry {
    pub(crate) fn new(
        models: Vec<ModelDef>,
        model_names: HashMap<String, usize>,
        relations: Vec<ModelRelation>,
    ) -> Self {
        Self {
            models,
            model_names,
            relations,
        }
    }

    // ==================== Model Lookups ====================

    /// Get a model definition by name.
    pub fn get_model(&self, name: &str) -> Option<&ModelDef> {
        self.model_names.get(name).map(|&i| &self.models[i])
    }

    /// Get a model definition by name, failing for unknown names.
    pub fn model(&self, name: &str) -> RegistryResult<&ModelDef> {
        self.get_model(name)
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))
    }

    /// Check if a model exists.
    pub fn has_model(&self, name: &str) -> bool {
        self.model_names.contains_key(name)
    }

    /// All models in declaration order.
    pub fn models(&self) -> impl Iterator<Item = &ModelDef> {
        self.models.iter()
    }

    // ==================== Relation Lookups ====================

    /// All resolved relations.
    pub fn relations(&self) -> &[ModelRelation] {
        &self.relations
    }

    /// Get the ModelRelation a resolved field belongs to.
    pub fn get_relation(&self, resolved: &ResolvedRelation) -> Option<&ModelRelation> {
        self.relations.get(resolved.relation)
    }

    /// Resolve `model.field` to its relation target.
    pub fn resolve_relation(&self, model: &str, field: &str) -> RegistryResult<RelationTarget<'_>> {
        let unresolved = || RegistryError::UnresolvedRelation {
            model: model.to_string(),
            field: field.to_string(),
        };

        let field_def = self.model(model)?.get_field(field).ok_or_else(unresolved)?;
        let relation = field_def.relation_def().ok_or_else(unresolved)?;
        let resolved = relation.resolved.as_ref().ok_or_else(unresolved)?;
        let target = self.model(&relation.target)?;

        Ok(RelationTarget {
            field: field_def,
            target,
            resolved,
        })
    }
}
