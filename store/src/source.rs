//! Per-model data source.
//!
//! Wraps a [`DocumentStore`] with one model's collection and display name,
//! maps store failures to [`SourceError`], and provides the relation
//! primitives the query and mutation engines are built on.
//!
//! Many-to-many links are stored as two join records, one per direction:
//! `_{source}_{target}: {sourceSideId, targetSideIds: [..]}`. Every write
//! touches both directions.

use std::sync::Arc;

use futures_util::future::{try_join, try_join_all};
use stitch_core::{Document, DocumentExt, Mutation, RecordId, Value, ID_FIELD};
use stitch_registry::{join_collection, ModelDef};

use crate::error::{SourceError, SourceResult, StoreError};
use crate::filter::Filter;
use crate::store::{DocumentStore, FindOptions};
use crate::update::Update;

/// Join record field holding the owning record's id.
pub const SOURCE_SIDE_ID: &str = "sourceSideId";
/// Join record field listing the linked record ids.
pub const TARGET_SIDE_IDS: &str = "targetSideIds";

/// Data access for one model.
#[derive(Clone)]
pub struct DataSource {
    store: Arc<dyn DocumentStore>,
    collection: String,
    model: String,
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("collection", &self.collection)
            .field("model", &self.model)
            .finish()
    }
}

impl DataSource {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            model: model.into(),
        }
    }

    /// Data source for a registry model: plural collection, capitalized display name.
    pub fn for_model(store: Arc<dyn DocumentStore>, model: &ModelDef) -> Self {
        Self::new(store, model.collection(), model.namings.capital_singular.clone())
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Display name used in error messages.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn map_err(&self, err: StoreError) -> SourceError {
        SourceError::from_store(err, &self.model)
    }

    // ==================== Reads ====================

    pub async fn find_in_collection(&self, filter: &Filter) -> SourceResult<Vec<Document>> {
        self.store
            .find(&self.collection, filter, FindOptions::default())
            .await
            .map_err(|e| self.map_err(e))
    }

    pub async fn find_one_in_collection(&self, filter: &Filter) -> SourceResult<Option<Document>> {
        self.store
            .find_one(&self.collection, filter)
            .await
            .map_err(|e| self.map_err(e))
    }

    pub async fn find_one_by_id(&self, id: &RecordId) -> SourceResult<Option<Document>> {
        self.find_one_in_collection(&Filter::by_id(id)).await
    }

    // ==================== Writes ====================

    /// Insert a record built from `mutation`, assigning an id unless one is given.
    pub async fn create(&self, mutation: &Mutation) -> SourceResult<Document> {
        let mut record = Document::new();
        Update::from_mutation(mutation).apply(&mut record);
        if record.get(ID_FIELD).map_or(true, Value::is_null) {
            record.insert(ID_FIELD.to_string(), RecordId::generate().into());
        }

        self.store
            .insert_one(&self.collection, record.clone())
            .await
            .map_err(|e| self.map_err(e))?;
        Ok(record)
    }

    /// Update the first record matching `filter`; returns it as stored afterwards.
    pub async fn update(
        &self,
        filter: &Filter,
        mutation: &Mutation,
    ) -> SourceResult<Option<Document>> {
        let Some(id) = self
            .find_one_in_collection(filter)
            .await?
            .and_then(|record| record.record_id())
        else {
            return Ok(None);
        };

        let update = Update::from_mutation(mutation);
        if !update.is_empty() {
            self.store
                .update_one(&self.collection, &Filter::by_id(&id), &update, false)
                .await
                .map_err(|e| self.map_err(e))?;
        }
        self.find_one_by_id(&id).await
    }

    /// Apply a raw update to one record by id.
    pub async fn update_by_id(&self, id: &RecordId, update: &Update) -> SourceResult<()> {
        self.store
            .update_one(&self.collection, &Filter::by_id(id), update, false)
            .await
            .map(|_| ())
            .map_err(|e| self.map_err(e))
    }

    pub async fn delete(&self, filter: &Filter) -> SourceResult<()> {
        self.store
            .delete_one(&self.collection, filter)
            .await
            .map(|_| ())
            .map_err(|e| self.map_err(e))
    }

    // ==================== Relation Primitives ====================

    /// The record whose `foreign_key` holds `id`.
    pub async fn find_one_by_relation(
        &self,
        foreign_key: &str,
        id: &RecordId,
    ) -> SourceResult<Option<Document>> {
        self.find_one_in_collection(&Filter::eq(foreign_key, id))
            .await
    }

    /// Unset `foreign_key` on every record that holds `foreign_id`.
    pub async fn clear_one_relation(&self, foreign_key: &str, foreign_id: &RecordId) -> SourceResult<()> {
        self.store
            .update_many(
                &self.collection,
                &Filter::eq(foreign_key, foreign_id),
                &Update::new().unset(foreign_key),
            )
            .await
            .map(|_| ())
            .map_err(|e| self.map_err(e))
    }

    /// Point record `id` at `foreign_id`, first clearing the key on any
    /// record that pointed there before.
    pub async fn update_one_relation(
        &self,
        id: &RecordId,
        foreign_key: &str,
        foreign_id: &RecordId,
    ) -> SourceResult<()> {
        self.clear_one_relation(foreign_key, foreign_id).await?;
        self.update_by_id(id, &Update::new().set(foreign_key, foreign_id))
            .await
    }

    /// Records whose `foreign_key` holds `id`.
    pub async fn find_many_from_one_relation(
        &self,
        foreign_key: &str,
        id: &RecordId,
    ) -> SourceResult<Vec<Document>> {
        self.find_in_collection(&Filter::eq(foreign_key, id)).await
    }

    /// Ids listed in the `_{source_side}_{target_side}` join record of `id`.
    pub async fn join_ids(
        &self,
        source_side: &str,
        target_side: &str,
        id: &RecordId,
    ) -> SourceResult<Vec<RecordId>> {
        let record = self
            .store
            .find_one(
                &join_collection(source_side, target_side),
                &Filter::eq(SOURCE_SIDE_ID, id),
            )
            .await
            .map_err(|e| self.map_err(e))?;

        Ok(record
            .as_ref()
            .and_then(|r| r.field(TARGET_SIDE_IDS).as_list())
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_str)
            .map(RecordId::new)
            .collect())
    }

    /// Records of this model linked to `id` through the join records.
    /// Listed ids whose record no longer exists are dropped.
    pub async fn find_many_from_many_relation(
        &self,
        source_side: &str,
        target_side: &str,
        id: &RecordId,
    ) -> SourceResult<Vec<Document>> {
        let ids = self.join_ids(source_side, target_side, id).await?;
        let records = try_join_all(ids.iter().map(|id| self.find_one_by_id(id))).await?;
        Ok(records.into_iter().flatten().collect())
    }

    /// Link `source_id` and `target_id` in both join records.
    pub async fn add_id_to_many_relation(
        &self,
        source_side: &str,
        target_side: &str,
        source_id: &RecordId,
        target_id: &RecordId,
    ) -> SourceResult<()> {
        try_join(
            self.edit_join(source_side, target_side, source_id, target_id, true),
            self.edit_join(target_side, source_side, target_id, source_id, true),
        )
        .await?;
        Ok(())
    }

    /// Unlink `source_id` and `target_id` in both join records.
    pub async fn remove_id_from_many_relation(
        &self,
        source_side: &str,
        target_side: &str,
        source_id: &RecordId,
        target_id: &RecordId,
    ) -> SourceResult<()> {
        try_join(
            self.edit_join(source_side, target_side, source_id, target_id, false),
            self.edit_join(target_side, source_side, target_id, source_id, false),
        )
        .await?;
        Ok(())
    }

    /// Drop every join entry naming `id` after its record was deleted:
    /// its own join record and its id in the opposite direction.
    pub async fn prune_many_relation(
        &self,
        source_side: &str,
        target_side: &str,
        id: &RecordId,
    ) -> SourceResult<()> {
        let own = join_collection(source_side, target_side);
        let opposite = join_collection(target_side, source_side);
        try_join(
            async {
                self.store
                    .delete_one(&own, &Filter::eq(SOURCE_SIDE_ID, id))
                    .await
                    .map_err(|e| self.map_err(e))
            },
            async {
                self.store
                    .update_many(
                        &opposite,
                        &Filter::eq(TARGET_SIDE_IDS, id),
                        &Update::new().pull(TARGET_SIDE_IDS, vec![id.into()]),
                    )
                    .await
                    .map_err(|e| self.map_err(e))
            },
        )
        .await?;
        Ok(())
    }

    async fn edit_join(
        &self,
        source_side: &str,
        target_side: &str,
        source_id: &RecordId,
        target_id: &RecordId,
        add: bool,
    ) -> SourceResult<()> {
        let collection = join_collection(source_side, target_side);
        let filter = Filter::eq(SOURCE_SIDE_ID, source_id);
        let update = if add {
            Update::new().add_to_set(TARGET_SIDE_IDS, vec![target_id.into()])
        } else {
            Update::new().pull(TARGET_SIDE_IDS, vec![target_id.into()])
        };

        tracing::trace!(%collection, %source_id, %target_id, add, "edit join record");
        self.store
            .update_one(&collection, &filter, &update, add)
            .await
            .map(|_| ())
            .map_err(|e| self.map_err(e))
    }
}
