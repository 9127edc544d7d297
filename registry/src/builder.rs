//! RegistryBuilder for constructing an immutable Registry.
//!
//! `build` runs the relation inference pass: every relation field is paired
//! with at most one field on the target model and resolved to a
//! [`RelationType`] and a [`RelationLink`].

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::naming::Namings;
use crate::relation::{ModelRelation, RelationLink, RelationType, ResolvedRelation};
use crate::{FieldDef, ModelDef, Registry};

/// Errors that can occur during registry construction or lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Duplicate model name: {0}")]
    DuplicateModel(String),

    #[error("Duplicate field {field} on model {model}")]
    DuplicateField { model: String, field: String },

    #[error("Relation field {model}.{field} targets unknown model {target}")]
    UnknownModel {
        model: String,
        field: String,
        target: String,
    },

    #[error("Ambiguous relation {name}: {reason}")]
    AmbiguousRelation { name: String, reason: String },

    #[error("One-to-one relation {0} needs a foreign key with an owning side")]
    MissingOwningSide(String),

    #[error("Owning side {side} of relation {relation} is not one of its models")]
    InvalidOwningSide { relation: String, side: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Relation field {model}.{field} is not resolved")]
    UnresolvedRelation { model: String, field: String },
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Builder for constructing an immutable Registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    /// Models being built, in declaration order.
    models: Vec<ModelDef>,
    /// Model name to position mapping.
    model_names: HashMap<String, usize>,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model definition. The model starts with an `id` field.
    pub fn add_model(&mut self, name: impl Into<String>) -> ModelBuilder<'_> {
        let name = name.into();
        ModelBuilder {
            builder: self,
            namings: Namings::for_model(&name),
            name,
            fields: vec![FieldDef::id()],
            duplicate: None,
        }
    }

    /// Build the immutable Registry.
    pub fn build(mut self) -> RegistryResult<Registry> {
        let pairings = pair_relation_fields(&self.models, &self.model_names)?;

        let mut relations = Vec::with_capacity(pairings.len());
        for pairing in pairings {
            let (relation, sides) = resolve_pairing(&self.models, &self.model_names, pairing)?;
            let index = relations.len();
            for (at, mut resolved) in sides {
                resolved.relation = index;
                if let Some(rel) = self.models[at.model].fields_mut()[at.field].relation_def_mut() {
                    rel.resolved = Some(resolved);
                }
            }
            tracing::debug!(
                relation = %relation.name,
                relation_type = %relation.relation_type,
                "resolved relation"
            );
            relations.push(relation);
        }

        Ok(Registry::new(self.models, self.model_names, relations))
    }
}

/// Builder for a model definition.
pub struct ModelBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    name: String,
    namings: Namings,
    fields: Vec<FieldDef>,
    duplicate: Option<String>,
}

impl<'a> ModelBuilder<'a> {
    /// Add a field. A field named `id` replaces the default id field.
    pub fn field(mut self, field: FieldDef) -> Self {
        if let Some(existing) = self.fields.iter_mut().find(|f| f.name == field.name) {
            if field.name == stitch_core::ID_FIELD {
                *existing = field;
            } else {
                self.duplicate.get_or_insert(field.name);
            }
            return self;
        }
        self.fields.push(field);
        self
    }

    /// Override the derived naming forms.
    pub fn namings(mut self, namings: Namings) -> Self {
        self.namings = namings;
        self
    }

    /// Finish building this model.
    pub fn done(self) -> RegistryResult<()> {
        if self.builder.model_names.contains_key(&self.name) {
            return Err(RegistryError::DuplicateModel(self.name));
        }
        if let Some(field) = self.duplicate {
            return Err(RegistryError::DuplicateField {
                model: self.name,
                field,
            });
        }

        let index = self.builder.models.len();
        self.builder.model_names.insert(self.name.clone(), index);
        self.builder
            .models
            .push(ModelDef::new(self.name, self.namings, self.fields));
        Ok(())
    }
}

// ==================== Relation Inference ====================

/// Position of a relation field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FieldRef {
    model: usize,
    field: usize,
}

#[derive(Debug)]
enum Pairing {
    Uni(FieldRef),
    Bi(FieldRef, FieldRef),
}

/// One side of a relation during inference.
struct Side<'m> {
    at: FieldRef,
    model: &'m ModelDef,
    field: &'m FieldDef,
    target: usize,
}

impl<'m> Side<'m> {
    fn of(models: &'m [ModelDef], names: &HashMap<String, usize>, at: FieldRef) -> Option<Self> {
        let model = &models[at.model];
        let field = &model.fields()[at.field];
        let target = *names.get(&field.relation_def()?.target)?;
        Some(Self {
            at,
            model,
            field,
            target,
        })
    }

    fn explicit_name(&self) -> Option<&str> {
        self.field.relation_def().and_then(|r| r.name.as_deref())
    }

    fn foreign_key(&self) -> Option<&crate::ForeignKey> {
        self.field
            .relation_def()
            .and_then(|r| r.config.foreign_key.as_ref())
    }

    fn relation_name(&self, models: &[ModelDef]) -> String {
        match self.explicit_name() {
            Some(name) => name.to_string(),
            None => ModelRelation::default_name(
                &self.model.namings.capital_singular,
                &models[self.target].namings.capital_singular,
                &self.field.name,
            ),
        }
    }
}

/// Pair relation fields. Named fields pair by name; unnamed fields pair only
/// when each side has exactly one unnamed candidate, otherwise they stay
/// uni-directional.
fn pair_relation_fields(
    models: &[ModelDef],
    names: &HashMap<String, usize>,
) -> RegistryResult<Vec<Pairing>> {
    let mut named: Vec<(String, Vec<FieldRef>)> = Vec::new();
    let mut unnamed = Vec::new();
    let mut buckets: HashMap<(usize, usize), Vec<FieldRef>> = HashMap::new();

    for (mi, model) in models.iter().enumerate() {
        for (fi, field) in model.fields().iter().enumerate() {
            let Some(rel) = field.relation_def() else {
                continue;
            };
            let Some(&target) = names.get(&rel.target) else {
                return Err(RegistryError::UnknownModel {
                    model: model.name.clone(),
                    field: field.name.clone(),
                    target: rel.target.clone(),
                });
            };

            let at = FieldRef {
                model: mi,
                field: fi,
            };
            match &rel.name {
                Some(name) => match named.iter_mut().find(|(n, _)| n == name) {
                    Some((_, group)) => group.push(at),
                    None => named.push((name.clone(), vec![at])),
                },
                None => {
                    unnamed.push(at);
                    buckets.entry((mi, target)).or_default().push(at);
                }
            }
        }
    }

    let mut pairings = Vec::new();

    for (name, group) in named {
        match group.as_slice() {
            [one] => pairings.push(Pairing::Uni(*one)),
            [a, b] => {
                let reciprocal = Side::of(models, names, *a).is_some_and(|s| s.target == b.model)
                    && Side::of(models, names, *b).is_some_and(|s| s.target == a.model);
                if !reciprocal {
                    return Err(RegistryError::AmbiguousRelation {
                        name,
                        reason: "the two fields do not target each other".into(),
                    });
                }
                pairings.push(Pairing::Bi(*a, *b));
            }
            more => {
                return Err(RegistryError::AmbiguousRelation {
                    name,
                    reason: format!("declared by {} fields", more.len()),
                })
            }
        }
    }

    let mut built = HashSet::new();
    for at in unnamed {
        if built.contains(&at) {
            continue;
        }
        let Some(side) = Side::of(models, names, at) else {
            continue;
        };
        let forward = buckets
            .get(&(at.model, side.target))
            .map(Vec::as_slice)
            .unwrap_or_default();

        let partner = if side.target == at.model {
            // Self relation: exactly two unnamed fields pair with each other.
            match forward {
                [a, b] => Some(if *a == at { *b } else { *a }),
                _ => None,
            }
        } else {
            match (forward, buckets.get(&(side.target, at.model))) {
                ([_], Some(reverse)) if reverse.len() == 1 => Some(reverse[0]),
                _ => None,
            }
        };

        built.insert(at);
        match partner {
            Some(other) if !built.contains(&other) => {
                built.insert(other);
                pairings.push(Pairing::Bi(at, other));
            }
            _ => pairings.push(Pairing::Uni(at)),
        }
    }

    Ok(pairings)
}

fn resolved(name: &str, relation_type: RelationType, link: RelationLink) -> ResolvedRelation {
    ResolvedRelation {
        relation: 0,
        name: name.to_string(),
        relation_type,
        ship: relation_type.ship(),
        link,
    }
}

/// Resolve a pairing into its ModelRelation plus one resolution per field.
fn resolve_pairing(
    models: &[ModelDef],
    names: &HashMap<String, usize>,
    pairing: Pairing,
) -> RegistryResult<(ModelRelation, Vec<(FieldRef, ResolvedRelation)>)> {
    let side = |at: FieldRef| {
        Side::of(models, names, at).ok_or_else(|| RegistryError::UnresolvedRelation {
            model: models[at.model].name.clone(),
            field: models[at.model].fields()[at.field].name.clone(),
        })
    };

    match pairing {
        Pairing::Uni(at) => {
            let src = side(at)?;
            let name = src.relation_name(models);
            let configured = src.foreign_key().map(|fk| fk.key.clone());
            let (relation_type, link) = if src.field.list {
                let key = configured.unwrap_or_else(|| format!("{}Id", src.model.namings.singular));
                (
                    RelationType::UniOneToMany,
                    RelationLink::ForeignList { foreign_key: key },
                )
            } else {
                let key = configured.unwrap_or_else(|| format!("{}Id", src.field.name.to_lowercase()));
                (
                    RelationType::UniOneToOne,
                    RelationLink::OwnedKey { foreign_key: key },
                )
            };

            let relation = ModelRelation {
                name: name.clone(),
                relation_type,
                source: src.model.name.clone(),
                source_field: src.field.name.clone(),
                target: models[src.target].name.clone(),
                target_field: None,
                foreign_key: link.foreign_key().map(str::to_string),
            };
            Ok((relation, vec![(at, resolved(&name, relation_type, link))]))
        }

        Pairing::Bi(a, b) => {
            let (a, b) = (side(a)?, side(b)?);
            let name = a.relation_name(models);
            let config = a.foreign_key().or_else(|| b.foreign_key()).cloned();

            let relation_type;
            let (source, target, source_link, target_link);
            match (a.field.list, b.field.list) {
                (false, false) => {
                    relation_type = RelationType::BiOneToOne;
                    let Some(fk) = config.filter(|fk| fk.side.is_some()) else {
                        return Err(RegistryError::MissingOwningSide(name));
                    };
                    let owner_side = fk.side.clone().unwrap_or_default();
                    (source, target) = if owner_side == a.model.name {
                        (a, b)
                    } else if owner_side == b.model.name {
                        (b, a)
                    } else {
                        return Err(RegistryError::InvalidOwningSide {
                            relation: name,
                            side: owner_side,
                        });
                    };
                    source_link = RelationLink::OwnedKey {
                        foreign_key: fk.key.clone(),
                    };
                    target_link = RelationLink::ReferencedKey {
                        foreign_key: fk.key,
                    };
                }
                (true, true) => {
                    relation_type = RelationType::BiManyToMany;
                    source_link = RelationLink::JoinTable {
                        source_side: a.model.namings.singular.clone(),
                        target_side: b.model.namings.singular.clone(),
                    };
                    target_link = RelationLink::JoinTable {
                        source_side: b.model.namings.singular.clone(),
                        target_side: a.model.namings.singular.clone(),
                    };
                    (source, target) = (a, b);
                }
                (a_list, _) => {
                    relation_type = RelationType::BiOneToMany;
                    (source, target) = if a_list { (a, b) } else { (b, a) };
                    let key = config
                        .map(|fk| fk.key)
                        .unwrap_or_else(|| format!("{}Id", source.model.namings.singular));
                    source_link = RelationLink::ForeignList {
                        foreign_key: key.clone(),
                    };
                    target_link = RelationLink::OwnedKey { foreign_key: key };
                }
            }

            let relation = ModelRelation {
                name: name.clone(),
                relation_type,
                source: source.model.name.clone(),
                source_field: source.field.name.clone(),
                target: target.model.name.clone(),
                target_field: Some(target.field.name.clone()),
                foreign_key: source_link.foreign_key().map(str::to_string),
            };
            Ok((
                relation,
                vec![
                    (source.at, resolved(&name, relation_type, source_link)),
                    (target.at, resolved(&name, relation_type, target_link)),
                ],
            ))
        }
    }
}
