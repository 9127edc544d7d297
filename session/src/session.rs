//! Session manager.

use std::sync::Arc;

use stitch_core::{Document, RecordId, Value};
use stitch_mutation::{Interceptor, MutationEngine};
use stitch_query::{OrderBy, PaginatedResult, Pagination, QueryEngine};
use stitch_registry::{ModelDef, Registry};
use stitch_store::DocumentStore;
use tracing::{debug_span, Instrument, Span};

use crate::config::SessionConfig;
use crate::error::SessionResult;

/// Session ID, recorded on the span of every model operation.
pub type SessionId = u64;

/// A session over one registry and one document store.
pub struct Session<'r> {
    /// Unique session ID.
    id: SessionId,
    /// The registry (shared).
    registry: &'r Registry,
    config: SessionConfig,
    queries: QueryEngine<'r>,
    mutations: MutationEngine<'r>,
}

impl<'r> Session<'r> {
    /// Create a new session with default settings.
    pub fn new(id: SessionId, registry: &'r Registry, store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(id, registry, store, SessionConfig::default())
    }

    pub fn with_config(
        id: SessionId,
        registry: &'r Registry,
        store: Arc<dyn DocumentStore>,
        config: SessionConfig,
    ) -> Self {
        tracing::debug!(id, ?config, "session opened");
        Self {
            id,
            registry,
            config,
            queries: QueryEngine::new(registry, store.clone()),
            mutations: MutationEngine::new(registry, store, config.mutation_config()),
        }
    }

    /// Add an interceptor to `model`'s write chain.
    pub fn with_interceptor(mut self, model: &str, interceptor: Arc<dyn Interceptor>) -> Self {
        self.mutations = self.mutations.with_interceptor(model, interceptor);
        self
    }

    /// Get the session ID.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Get the registry.
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn queries(&self) -> &QueryEngine<'r> {
        &self.queries
    }

    pub fn mutations(&self) -> &MutationEngine<'r> {
        &self.mutations
    }

    /// Handle for reading and writing one model.
    pub fn model(&self, name: &str) -> SessionResult<ModelHandle<'_, 'r>> {
        let model = self.registry.model(name)?;
        Ok(ModelHandle {
            session: self,
            model,
        })
    }
}

/// Per-model operations.
pub struct ModelHandle<'s, 'r> {
    session: &'s Session<'r>,
    model: &'r ModelDef,
}

impl<'s, 'r> ModelHandle<'s, 'r> {
    pub fn name(&self) -> &str {
        &self.model.name
    }

    pub fn definition(&self) -> &'r ModelDef {
        self.model
    }

    /// Span tying an operation to this session and model.
    fn span(&self, op: &'static str) -> Span {
        debug_span!("stitch.model", session = self.session.id, model = %self.model.name, op)
    }

    /// Filter, order and paginate.
    pub async fn find(
        &self,
        raw_where: &Value,
        order: &OrderBy,
        pagination: &Pagination,
    ) -> SessionResult<PaginatedResult> {
        Ok(self
            .session
            .queries
            .find(&self.model.name, raw_where, order, pagination)
            .instrument(self.span("find"))
            .await?)
    }

    pub async fn find_one(&self, raw_where: &Value) -> SessionResult<Option<Document>> {
        Ok(self
            .session
            .queries
            .find_one(&self.model.name, raw_where)
            .instrument(self.span("find_one"))
            .await?)
    }

    pub async fn find_one_by_id(&self, id: &RecordId) -> SessionResult<Option<Document>> {
        Ok(self
            .session
            .queries
            .find_one_by_id(&self.model.name, id)
            .instrument(self.span("find_one_by_id"))
            .await?)
    }

    pub async fn create(&self, data: Document) -> SessionResult<Document> {
        Ok(self
            .session
            .mutations
            .create(&self.model.name, data)
            .instrument(self.span("create"))
            .await?)
    }

    /// Update the record selected by a unique where.
    pub async fn update(&self, unique_where: &Value, data: Document) -> SessionResult<Document> {
        Ok(self
            .session
            .mutations
            .update(&self.model.name, unique_where, data)
            .instrument(self.span("update"))
            .await?)
    }

    /// Delete the record selected by a unique where.
    pub async fn delete(&self, unique_where: &Value) -> SessionResult<()> {
        Ok(self
            .session
            .mutations
            .delete(&self.model.name, unique_where)
            .instrument(self.span("delete"))
            .await?)
    }
}
