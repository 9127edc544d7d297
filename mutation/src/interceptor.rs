//! Write interceptors.
//!
//! Every model has an ordered chain of interceptors bound when the engine
//! is built. A write runs the chain outermost first; each interceptor may
//! adjust the context, call [`Next::run`] to continue, and act on the
//! stored record afterwards. The end of the chain is the base write.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use stitch_core::{Document, DocumentExt, Mutation, RecordId};

use crate::error::MutationResult;
use crate::executor::MutationEngine;
use crate::input::RelationInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
}

/// State of one write as it passes through the chain.
#[derive(Debug, Clone)]
pub struct MutationContext {
    pub model: String,
    pub operation: Operation,
    /// The record as stored before an update.
    pub current: Option<Document>,
    /// Base write payload. Interceptors may add foreign keys here.
    pub mutation: Mutation,
    relations: BTreeMap<String, RelationInput>,
}

impl MutationContext {
    pub fn new(
        model: impl Into<String>,
        operation: Operation,
        mutation: Mutation,
        relations: BTreeMap<String, RelationInput>,
    ) -> Self {
        Self {
            model: model.into(),
            operation,
            current: None,
            mutation,
            relations,
        }
    }

    pub fn with_current(mut self, current: Document) -> Self {
        self.current = Some(current);
        self
    }

    /// Remove and return the relation input for `field`.
    pub fn take_relation(&mut self, field: &str) -> Option<RelationInput> {
        self.relations.remove(field)
    }

    pub fn current_id(&self) -> Option<RecordId> {
        self.current.as_ref().and_then(|c| c.record_id())
    }
}

#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    /// Wrap the rest of the chain.
    async fn around(&self, ctx: &mut MutationContext, next: Next<'_, '_>) -> MutationResult<Document>;
}

/// The remainder of an interceptor chain.
pub struct Next<'a, 'r> {
    engine: &'a MutationEngine<'r>,
    chain: &'a [Arc<dyn Interceptor>],
}

impl<'a, 'r> Next<'a, 'r> {
    pub(crate) fn new(engine: &'a MutationEngine<'r>, chain: &'a [Arc<dyn Interceptor>]) -> Self {
        Self { engine, chain }
    }

    pub fn engine(&self) -> &'a MutationEngine<'r> {
        self.engine
    }

    pub async fn run(self, ctx: &mut MutationContext) -> MutationResult<Document> {
        match self.chain.split_first() {
            Some((head, rest)) => head.around(ctx, Next::new(self.engine, rest)).await,
            None => self.engine.base_write(ctx).await,
        }
    }
}
