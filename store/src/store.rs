//! The document store interface.
//!
//! The engines are store-agnostic; concrete implementations can wrap a
//! remote document database or, as [`crate::MemoryStore`] does, keep
//! collections in memory for tests and embedding.

use async_trait::async_trait;
use stitch_core::Document;

use crate::error::StoreResult;
use crate::filter::Filter;
use crate::update::Update;

/// Windowing applied by the store, in natural collection order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn limit(limit: usize) -> Self {
        Self {
            skip: None,
            limit: Some(limit),
        }
    }
}

/// Result of an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: usize,
    pub upserted: bool,
}

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        let mut found = self.find(collection, filter, FindOptions::limit(1)).await?;
        Ok(found.pop())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<()>;

    /// Update the first matching document. With `upsert`, insert one built
    /// from the filter's equalities when nothing matches.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        upsert: bool,
    ) -> StoreResult<UpdateOutcome>;

    /// Update every matching document, returning how many matched.
    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> StoreResult<usize>;

    /// Delete the first matching document, returning how many were deleted.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<usize>;
}
