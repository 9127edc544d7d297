//! Mutation engine - runs writes through each model's interceptor chain.
//!
//! Chains are bound once in [`MutationEngine::new`]: one relation strategy
//! per resolved relation field, in field order, followed by any custom
//! interceptors added with [`MutationEngine::with_interceptor`].

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::try_join_all;
use stitch_core::{Document, DocumentExt, RecordId, Value};
use stitch_predicate::compile_unique_where;
use stitch_registry::{Registry, RelationLink};
use stitch_store::{DataSource, DocumentStore, Filter};

use crate::config::{JoinPruning, MutationConfig};
use crate::error::{MutationError, MutationResult};
use crate::input::parse_relation_inputs;
use crate::interceptor::{Interceptor, MutationContext, Next, Operation};
use crate::payload::build_mutation;
use crate::strategy;

/// Executes create, update and delete with relation side effects.
pub struct MutationEngine<'r> {
    registry: &'r Registry,
    store: Arc<dyn DocumentStore>,
    config: MutationConfig,
    chains: HashMap<String, Vec<Arc<dyn Interceptor>>>,
}

impl<'r> MutationEngine<'r> {
    pub fn new(registry: &'r Registry, store: Arc<dyn DocumentStore>, config: MutationConfig) -> Self {
        let chains = registry
            .models()
            .map(|model| {
                let chain: Vec<_> = model.relation_fields().filter_map(strategy::bind).collect();
                (model.name.clone(), chain)
            })
            .collect();

        Self {
            registry,
            store,
            config,
            chains,
        }
    }

    /// Append a custom interceptor to `model`'s chain. It runs inside the
    /// relation strategies, closest to the base write.
    pub fn with_interceptor(mut self, model: &str, interceptor: Arc<dyn Interceptor>) -> Self {
        self.chains.entry(model.to_string()).or_default().push(interceptor);
        self
    }

    pub fn config(&self) -> &MutationConfig {
        &self.config
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Data source for `model`.
    pub fn source(&self, model: &str) -> MutationResult<DataSource> {
        let model = self.registry.model(model)?;
        Ok(DataSource::for_model(self.store.clone(), model))
    }

    /// Resolve a unique selector to the id of an existing record.
    pub async fn resolve_unique(&self, model: &str, selector: &Value) -> MutationResult<RecordId> {
        self.find_unique(model, selector)
            .await?
            .record_id()
            .ok_or_else(|| self.not_found(model))
    }

    async fn find_unique(&self, model: &str, selector: &Value) -> MutationResult<Document> {
        let unique = compile_unique_where(self.registry, model, selector)?;
        let filter = Filter::from_field_filter(&unique.to_filter())?;
        self.source(model)?
            .find_one_in_collection(&filter)
            .await?
            .ok_or_else(|| self.not_found(model))
    }

    fn not_found(&self, model: &str) -> MutationError {
        let name = self
            .registry
            .get_model(model)
            .map_or(model, |m| m.namings.capital_singular.as_str());
        MutationError::not_found(name)
    }

    /// Create a record of `model`, running its relation inputs.
    pub async fn create(&self, model: &str, data: Document) -> MutationResult<Document> {
        let model_def = self.registry.model(model)?;
        let mutation = build_mutation(model_def, &data, Operation::Create, self.config.array_conflicts)?;
        let relations = parse_relation_inputs(model_def, &data, Operation::Create)?;
        tracing::debug!(model, relations = relations.len(), "create");

        let mut ctx = MutationContext::new(model, Operation::Create, mutation, relations);
        self.run(&mut ctx).await
    }

    /// Update the record selected by the unique `selector`.
    pub async fn update(&self, model: &str, selector: &Value, data: Document) -> MutationResult<Document> {
        let model_def = self.registry.model(model)?;
        let current = self.find_unique(model, selector).await?;
        let mutation = build_mutation(model_def, &data, Operation::Update, self.config.array_conflicts)?;
        let relations = parse_relation_inputs(model_def, &data, Operation::Update)?;
        tracing::debug!(model, id = ?current.record_id(), relations = relations.len(), "update");

        let mut ctx =
            MutationContext::new(model, Operation::Update, mutation, relations).with_current(current);
        self.run(&mut ctx).await
    }

    /// Delete the record selected by the unique `selector`.
    ///
    /// Records that referenced it keep their keys. With eager join pruning
    /// its many-to-many join entries are removed as well.
    pub async fn delete(&self, model: &str, selector: &Value) -> MutationResult<()> {
        let model_def = self.registry.model(model)?;
        let id = self.resolve_unique(model, selector).await?;
        let source = self.source(model)?;
        source.delete(&Filter::by_id(&id)).await?;
        tracing::debug!(model, %id, "delete");

        if self.config.join_pruning == JoinPruning::Eager {
            let joins = model_def.relation_fields().filter_map(|field| {
                match field.relation_def()?.link()? {
                    RelationLink::JoinTable {
                        source_side,
                        target_side,
                    } => Some((source_side.as_str(), target_side.as_str())),
                    _ => None,
                }
            });
            try_join_all(joins.map(|(source_side, target_side)| {
                source.prune_many_relation(source_side, target_side, &id)
            }))
            .await?;
        }
        Ok(())
    }

    async fn run(&self, ctx: &mut MutationContext) -> MutationResult<Document> {
        let chain = self.chains.get(&ctx.model).map(Vec::as_slice).unwrap_or_default();
        Next::new(self, chain).run(ctx).await
    }

    /// The write at the end of every chain.
    pub(crate) async fn base_write(&self, ctx: &mut MutationContext) -> MutationResult<Document> {
        let source = self.source(&ctx.model)?;
        match ctx.operation {
            Operation::Create => Ok(source.create(&ctx.mutation).await?),
            Operation::Update => {
                let id = ctx.current_id().ok_or_else(|| self.not_found(&ctx.model))?;
                source
                    .update(&Filter::by_id(&id), &ctx.mutation)
                    .await?
                    .ok_or_else(|| self.not_found(&ctx.model))
            }
        }
    }
}
