//! In-memory document store.
//!
//! Collections are vectors of documents kept in insertion order. Writes
//! check the collection schema, if any, before they are applied: unique
//! fields reject duplicates and required fields reject missing values.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use stitch_core::{Document, Value};
use stitch_registry::Registry;

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::store::{DocumentStore, FindOptions, UpdateOutcome};
use crate::update::Update;

/// Constraints enforced on one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSchema {
    pub unique: Vec<String>,
    pub required: Vec<String>,
}

impl CollectionSchema {
    fn validate(&self, collection: &str, doc: &Document, others: &[&Document]) -> StoreResult<()> {
        for field in &self.required {
            if doc.get(field).map_or(true, Value::is_null) {
                return Err(StoreError::DocumentValidation {
                    collection: collection.to_string(),
                    message: format!("missing required field {}", field),
                });
            }
        }

        let duplicated: Vec<String> = self
            .unique
            .iter()
            .filter(|field| match doc.get(field.as_str()) {
                None | Some(Value::Null) => false,
                Some(value) => others
                    .iter()
                    .any(|other| other.get(field.as_str()).is_some_and(|v| v.loose_eq(value))),
            })
            .cloned()
            .collect();
        if !duplicated.is_empty() {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                fields: duplicated,
            });
        }
        Ok(())
    }
}

/// A document store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    schemas: HashMap<String, CollectionSchema>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store enforcing every model's unique and required fields.
    pub fn for_registry(registry: &Registry) -> Self {
        let schemas = registry
            .models()
            .map(|model| {
                let schema = CollectionSchema {
                    unique: model.unique_fields().map(str::to_string).collect(),
                    required: model.required_fields().map(str::to_string).collect(),
                };
                (model.collection().to_string(), schema)
            })
            .collect();
        Self {
            collections: RwLock::default(),
            schemas,
        }
    }

    pub fn with_schema(mut self, collection: impl Into<String>, schema: CollectionSchema) -> Self {
        self.schemas.insert(collection.into(), schema);
        self
    }

    /// Insert documents directly, bypassing schema checks.
    pub fn seed(&self, collection: &str, documents: impl IntoIterator<Item = Document>) -> StoreResult<()> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        Ok(())
    }

    /// Snapshot of a collection.
    pub fn documents(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    fn check(&self, collection: &str, docs: &[Document], index: Option<usize>, doc: &Document) -> StoreResult<()> {
        let Some(schema) = self.schemas.get(collection) else {
            return Ok(());
        };
        let others: Vec<&Document> = docs
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != index)
            .map(|(_, d)| d)
            .collect();
        schema.validate(collection, doc, &others)
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::backend("memory store lock poisoned")
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>> {
        tracing::trace!(collection, ?filter, "find");
        let collections = self.collections.read().map_err(poisoned)?;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|d| filter.matches(d))
            .skip(options.skip.unwrap_or(0))
            .take(options.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<()> {
        tracing::trace!(collection, "insert_one");
        let mut collections = self.collections.write().map_err(poisoned)?;
        let docs = collections.entry(collection.to_string()).or_default();
        self.check(collection, docs, None, &document)?;
        docs.push(document);
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        upsert: bool,
    ) -> StoreResult<UpdateOutcome> {
        tracing::trace!(collection, ?filter, upsert, "update_one");
        let mut collections = self.collections.write().map_err(poisoned)?;
        let docs = collections.entry(collection.to_string()).or_default();

        if let Some(index) = docs.iter().position(|d| filter.matches(d)) {
            let mut updated = docs[index].clone();
            update.apply(&mut updated);
            self.check(collection, docs, Some(index), &updated)?;
            docs[index] = updated;
            return Ok(UpdateOutcome {
                matched: 1,
                upserted: false,
            });
        }
        if !upsert {
            return Ok(UpdateOutcome::default());
        }

        let mut created: Document = filter
            .equalities()
            .into_iter()
            .map(|(field, value)| (field.to_string(), value.clone()))
            .collect();
        update.apply(&mut created);
        self.check(collection, docs, None, &created)?;
        docs.push(created);
        Ok(UpdateOutcome {
            matched: 0,
            upserted: true,
        })
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> StoreResult<usize> {
        tracing::trace!(collection, ?filter, "update_many");
        let mut collections = self.collections.write().map_err(poisoned)?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let matching: Vec<usize> = docs
            .iter()
            .enumerate()
            .filter(|(_, d)| filter.matches(d))
            .map(|(i, _)| i)
            .collect();
        for &index in &matching {
            let mut updated = docs[index].clone();
            update.apply(&mut updated);
            self.check(collection, docs, Some(index), &updated)?;
            docs[index] = updated;
        }
        Ok(matching.len())
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<usize> {
        tracing::trace!(collection, ?filter, "delete_one");
        let mut collections = self.collections.write().map_err(poisoned)?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
