//! Relation descriptors.
//!
//! A relation field names its target model; the builder resolves every
//! relation field into a [`ResolvedRelation`] during `build`, pairing both
//! sides where it can and fixing where the foreign key lives.

use std::fmt;

/// The resolved shape of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationType {
    UniOneToOne,
    UniOneToMany,
    BiOneToOne,
    BiOneToMany,
    BiManyToMany,
}

impl RelationType {
    pub fn ship(&self) -> RelationShip {
        match self {
            RelationType::UniOneToOne | RelationType::BiOneToOne => RelationShip::OneToOne,
            RelationType::UniOneToMany | RelationType::BiOneToMany => RelationShip::OneToMany,
            RelationType::BiManyToMany => RelationShip::ManyToMany,
        }
    }

    pub fn is_bidirectional(&self) -> bool {
        !matches!(self, RelationType::UniOneToOne | RelationType::UniOneToMany)
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationType::UniOneToOne => "uniOneToOne",
            RelationType::UniOneToMany => "uniOneToMany",
            RelationType::BiOneToOne => "biOneToOne",
            RelationType::BiOneToMany => "biOneToMany",
            RelationType::BiManyToMany => "biManyToMany",
        };
        f.write_str(name)
    }
}

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationShip {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// How one side of a relation reaches the other side's records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationLink {
    /// This record stores the target's id under `foreign_key`.
    OwnedKey { foreign_key: String },
    /// At most one target record stores this record's id under `foreign_key`.
    ReferencedKey { foreign_key: String },
    /// Any number of target records store this record's id under `foreign_key`.
    ForeignList { foreign_key: String },
    /// Join records `_{source_side}_{target_side}` list the target ids.
    JoinTable {
        source_side: String,
        target_side: String,
    },
}

impl RelationLink {
    /// Whether the field resolves to a list of records.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            RelationLink::ForeignList { .. } | RelationLink::JoinTable { .. }
        )
    }

    pub fn foreign_key(&self) -> Option<&str> {
        match self {
            RelationLink::OwnedKey { foreign_key }
            | RelationLink::ReferencedKey { foreign_key }
            | RelationLink::ForeignList { foreign_key } => Some(foreign_key),
            RelationLink::JoinTable { .. } => None,
        }
    }
}

/// Configured foreign key of a relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Column holding the referenced id.
    pub key: String,
    /// Model whose records store the key (required for one-to-one).
    pub side: Option<String>,
}

impl ForeignKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            side: None,
        }
    }

    pub fn on_side(mut self, side: impl Into<String>) -> Self {
        self.side = Some(side.into());
        self
    }
}

/// User-supplied relation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationConfig {
    pub foreign_key: Option<ForeignKey>,
}

/// The relation part of a relation field.
#[derive(Debug, Clone)]
pub struct RelationFieldDef {
    /// Target model name, resolved by name so models may reference each other.
    pub target: String,
    /// Explicit relation name.
    pub name: Option<String>,
    pub config: RelationConfig,
    /// Filled in by the builder.
    pub resolved: Option<ResolvedRelation>,
}

impl RelationFieldDef {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            name: None,
            config: RelationConfig::default(),
            resolved: None,
        }
    }

    pub fn link(&self) -> Option<&RelationLink> {
        self.resolved.as_ref().map(|r| &r.link)
    }
}

/// Resolution of one relation field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelation {
    /// Index into the registry's relation list.
    pub relation: usize,
    pub name: String,
    pub relation_type: RelationType,
    pub ship: RelationShip,
    pub link: RelationLink,
}

/// A fully resolved pairing of two models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRelation {
    pub name: String,
    pub relation_type: RelationType,
    /// Source model (the one side of a one-to-many, the owner of a one-to-one).
    pub source: String,
    pub source_field: String,
    pub target: String,
    /// Target field, absent for uni-directional relations.
    pub target_field: Option<String>,
    /// Foreign key column, absent for many-to-many.
    pub foreign_key: Option<String>,
}

impl ModelRelation {
    /// Default relation name, e.g. `UserAndTeamOnteam`.
    pub fn default_name(source_cap: &str, target_cap: &str, source_field: &str) -> String {
        format!("{}And{}On{}", source_cap, target_cap, source_field)
    }
}

/// Name of the join collection listing `target` ids per `source` record.
pub fn join_collection(source_side: &str, target_side: &str) -> String {
    format!("_{}_{}", source_side, target_side)
}
