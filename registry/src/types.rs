//! Schema definition types.

use std::collections::{HashMap, HashSet};

use crate::naming::Namings;
use crate::relation::{ForeignKey, RelationConfig, RelationFieldDef};

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Id,
    String,
    Int,
    Float,
    Boolean,
    DateTime,
    Json,
}

/// What a field holds.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Scalar(ScalarType),
    /// A named enum; values are stored as strings.
    Enum(String),
    /// An embedded object type stored inline.
    Object(String),
    /// A user-defined scalar, stored as given.
    CustomScalar(String),
    /// A link to another model.
    Relation(RelationFieldDef),
}

/// Field definition within a model.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field kind.
    pub kind: FieldKind,
    /// Whether this field can be null.
    pub nullable: bool,
    /// Whether this field holds a list.
    pub list: bool,
    /// Whether this field must be unique across records.
    pub unique: bool,
    /// Whether clients may not write this field.
    pub read_only: bool,
    /// Whether the store assigns this field.
    pub auto_generated: bool,
    /// Whether writes use set/add/remove operations instead of assignment.
    pub array_operations: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: true,
            list: false,
            unique: false,
            read_only: false,
            auto_generated: false,
            array_operations: false,
        }
    }

    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldKind::Scalar(scalar))
    }

    /// The `id` field every model carries.
    pub fn id() -> Self {
        Self::scalar(stitch_core::ID_FIELD, ScalarType::Id)
            .non_null()
            .unique()
            .auto_generated()
    }

    pub fn enumeration(name: impl Into<String>, enum_name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Enum(enum_name.into()))
    }

    pub fn object(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Object(type_name.into()))
    }

    pub fn custom_scalar(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::CustomScalar(type_name.into()))
    }

    /// A relation field pointing at `target`.
    pub fn relation(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Relation(RelationFieldDef::new(target)))
    }

    pub fn non_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn auto_generated(mut self) -> Self {
        self.auto_generated = true;
        self
    }

    /// Declare a list field written through set/add/remove.
    pub fn array_operations(mut self) -> Self {
        self.list = true;
        self.array_operations = true;
        self
    }

    /// Name the relation so both sides pair explicitly.
    pub fn relation_name(mut self, name: impl Into<String>) -> Self {
        if let FieldKind::Relation(rel) = &mut self.kind {
            rel.name = Some(name.into());
        }
        self
    }

    /// Override the foreign key column.
    pub fn foreign_key(self, key: impl Into<String>) -> Self {
        self.with_relation_config(ForeignKey::new(key))
    }

    /// Set the foreign key column and the model whose records store it.
    pub fn foreign_key_on(self, key: impl Into<String>, side: impl Into<String>) -> Self {
        self.with_relation_config(ForeignKey::new(key).on_side(side))
    }

    fn with_relation_config(mut self, foreign_key: ForeignKey) -> Self {
        if let FieldKind::Relation(rel) = &mut self.kind {
            rel.config = RelationConfig {
                foreign_key: Some(foreign_key),
            };
        }
        self
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::Relation(_))
    }

    /// Get the relation definition if this is a relation field.
    pub fn relation_def(&self) -> Option<&RelationFieldDef> {
        match &self.kind {
            FieldKind::Relation(rel) => Some(rel),
            _ => None,
        }
    }

    pub(crate) fn relation_def_mut(&mut self) -> Option<&mut RelationFieldDef> {
        match &mut self.kind {
            FieldKind::Relation(rel) => Some(rel),
            _ => None,
        }
    }

    /// Whether the store must reject a record missing this field.
    pub fn is_required(&self) -> bool {
        !self.nullable && !self.auto_generated && !self.is_relation()
    }
}

/// Model definition.
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// Model name.
    pub name: String,
    /// Naming forms.
    pub namings: Namings,
    /// Field definitions in declaration order.
    fields: Vec<FieldDef>,
    /// Field position by name.
    field_index: HashMap<String, usize>,
    /// Fields written through array operations.
    array_fields: HashSet<String>,
}

impl ModelDef {
    pub(crate) fn new(name: String, namings: Namings, fields: Vec<FieldDef>) -> Self {
        let field_index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        let array_fields = fields
            .iter()
            .filter(|f| f.array_operations)
            .map(|f| f.name.clone())
            .collect();

        Self {
            name,
            namings,
            fields,
            field_index,
            array_fields,
        }
    }

    /// Get a field definition by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.field_index.get(name).map(|&i| &self.fields[i])
    }

    /// Check if this model has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.field_index.contains_key(name)
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [FieldDef] {
        &mut self.fields
    }

    /// Relation fields in declaration order.
    pub fn relation_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_relation())
    }

    /// Names of unique fields, `id` included.
    pub fn unique_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.unique)
            .map(|f| f.name.as_str())
    }

    pub fn is_unique_field(&self, name: &str) -> bool {
        self.get_field(name).is_some_and(|f| f.unique)
    }

    /// Names of fields the store must see on every record.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.name.as_str())
    }

    /// Whether writes to this field go through set/add/remove.
    pub fn is_array_operation_field(&self, name: &str) -> bool {
        self.array_fields.contains(name)
    }

    /// Backing collection name.
    pub fn collection(&self) -> &str {
        &self.namings.plural
    }
}
