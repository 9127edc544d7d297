//! Relation write strategies.
//!
//! One interceptor per relation field, chosen from the field's resolved
//! [`RelationLink`] when the engine is built:
//!
//! | Link            | Runs          | Writes                                  |
//! |-----------------|---------------|-----------------------------------------|
//! | `OwnedKey`      | before write  | the key on the record being written     |
//! | `ReferencedKey` | after write   | the key on the single target record     |
//! | `ForeignList`   | after write   | the key on each target record           |
//! | `JoinTable`     | after write   | both join records                       |
//!
//! Side effects are not rolled back when a later step fails.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use stitch_core::{Document, DocumentExt, RecordId, Value};
use stitch_registry::{FieldDef, RelationLink, RelationType};
use stitch_store::{Filter, StoreError, Update};

use crate::config::JoinPruning;
use crate::error::{MutationError, MutationResult};
use crate::input::{ListInput, RelationInput, SingularInput};
use crate::interceptor::{Interceptor, MutationContext, Next};

/// Bind the strategy for a resolved relation field.
pub(crate) fn bind(field: &FieldDef) -> Option<Arc<dyn Interceptor>> {
    let relation = field.relation_def()?;
    let name = field.name.clone();
    let target = relation.target.clone();

    let strategy: Arc<dyn Interceptor> = match relation.link()? {
        RelationLink::OwnedKey { foreign_key } => Arc::new(OwnedKeyStrategy {
            field: name,
            target,
            foreign_key: foreign_key.clone(),
            exclusive: relation
                .resolved
                .as_ref()
                .is_some_and(|r| r.relation_type == RelationType::BiOneToOne),
        }),
        RelationLink::ReferencedKey { foreign_key } => Arc::new(ReferencedKeyStrategy {
            field: name,
            target,
            foreign_key: foreign_key.clone(),
        }),
        RelationLink::ForeignList { foreign_key } => Arc::new(ForeignListStrategy {
            field: name,
            target,
            foreign_key: foreign_key.clone(),
        }),
        RelationLink::JoinTable {
            source_side,
            target_side,
        } => Arc::new(JoinTableStrategy {
            field: name,
            target,
            source_side: source_side.clone(),
            target_side: target_side.clone(),
        }),
    };
    Some(strategy)
}

fn written_id(record: &Document) -> MutationResult<RecordId> {
    record
        .record_id()
        .ok_or_else(|| StoreError::backend("written record has no id").into())
}

/// Run one verb's items concurrently.
async fn fan_out<F>(field: &str, verb: &str, tasks: impl IntoIterator<Item = F>) -> MutationResult<()>
where
    F: Future<Output = MutationResult<()>>,
{
    try_join_all(tasks)
        .await
        .map(|_| ())
        .inspect_err(|err| tracing::warn!(error = ?err, field, verb, "relation write failed"))
}

// ==================== One-to-one, key on this side ====================

/// This record stores the target's id. Resolved before the base write so
/// the key is written with it.
#[derive(Debug)]
struct OwnedKeyStrategy {
    field: String,
    target: String,
    foreign_key: String,
    /// At most one record of this model may hold a given target id.
    exclusive: bool,
}

#[async_trait]
impl Interceptor for OwnedKeyStrategy {
    async fn around(&self, ctx: &mut MutationContext, next: Next<'_, '_>) -> MutationResult<Document> {
        let Some(RelationInput::One(input)) = ctx.take_relation(&self.field) else {
            return next.run(ctx).await;
        };
        let engine = next.engine();

        let key = match input {
            SingularInput::Connect(selector) => {
                Value::from(engine.resolve_unique(&self.target, &selector).await?)
            }
            SingularInput::Create(data) => {
                let created = engine.create(&self.target, data).await?;
                Value::from(written_id(&created)?)
            }
            SingularInput::Disconnect => Value::Null,
            SingularInput::Delete => {
                let linked = ctx
                    .current
                    .as_ref()
                    .and_then(|current| current.field(&self.foreign_key).as_str())
                    .map(RecordId::from);
                if let Some(linked) = linked {
                    engine
                        .source(&self.target)?
                        .delete(&Filter::by_id(&linked))
                        .await?;
                }
                Value::Null
            }
        };

        if self.exclusive {
            if let Some(target_id) = key.as_str().map(RecordId::from) {
                engine
                    .source(&ctx.model)?
                    .clear_one_relation(&self.foreign_key, &target_id)
                    .await?;
            }
        }

        tracing::debug!(field = %self.field, key = %self.foreign_key, value = %key, "owned key");
        ctx.mutation.set(&self.foreign_key, key);
        next.run(ctx).await
    }
}

// ==================== One-to-one, key on the other side ====================

/// The target record points back at this one. The base record must exist
/// first.
#[derive(Debug)]
struct ReferencedKeyStrategy {
    field: String,
    target: String,
    foreign_key: String,
}

#[async_trait]
impl Interceptor for ReferencedKeyStrategy {
    async fn around(&self, ctx: &mut MutationContext, next: Next<'_, '_>) -> MutationResult<Document> {
        let Some(RelationInput::One(input)) = ctx.take_relation(&self.field) else {
            return next.run(ctx).await;
        };
        let engine = next.engine();
        let record = next.run(ctx).await?;
        let id = written_id(&record)?;
        let target = engine.source(&self.target)?;

        match input {
            SingularInput::Connect(selector) => {
                let linked = engine.resolve_unique(&self.target, &selector).await?;
                target.update_one_relation(&linked, &self.foreign_key, &id).await?;
            }
            SingularInput::Create(data) => {
                let created = engine.create(&self.target, data).await?;
                target
                    .update_one_relation(&written_id(&created)?, &self.foreign_key, &id)
                    .await?;
            }
            SingularInput::Disconnect => {
                if let Some(linked) = target.find_one_by_relation(&self.foreign_key, &id).await? {
                    target
                        .update_by_id(&written_id(&linked)?, &Update::new().unset(&self.foreign_key))
                        .await?;
                }
            }
            SingularInput::Delete => {
                if let Some(linked) = target.find_one_by_relation(&self.foreign_key, &id).await? {
                    target.delete(&Filter::by_id(&written_id(&linked)?)).await?;
                }
            }
        }

        tracing::debug!(field = %self.field, %id, "referenced key");
        Ok(record)
    }
}

// ==================== One-to-many ====================

/// Target records store this record's id.
#[derive(Debug)]
struct ForeignListStrategy {
    field: String,
    target: String,
    foreign_key: String,
}

#[async_trait]
impl Interceptor for ForeignListStrategy {
    async fn around(&self, ctx: &mut MutationContext, next: Next<'_, '_>) -> MutationResult<Document> {
        let Some(RelationInput::Many(input)) = ctx.take_relation(&self.field) else {
            return next.run(ctx).await;
        };
        let engine = next.engine();
        let record = next.run(ctx).await?;
        let id = written_id(&record)?;
        let target = engine.source(&self.target)?;
        let ListInput {
            connect,
            create,
            disconnect,
            delete,
        } = input;

        let (id, target, key) = (&id, &target, self.foreign_key.as_str());
        fan_out(
            &self.field,
            "connect",
            connect.iter().map(|selector| async move {
                let child = engine.resolve_unique(&self.target, selector).await?;
                target.update_by_id(&child, &Update::new().set(key, id)).await?;
                Ok::<_, MutationError>(())
            }),
        )
        .await?;
        fan_out(
            &self.field,
            "create",
            create.into_iter().map(|mut data| async move {
                data.insert(key.to_string(), id.into());
                engine.create(&self.target, data).await.map(|_| ())
            }),
        )
        .await?;
        fan_out(
            &self.field,
            "disconnect",
            disconnect.iter().map(|selector| async move {
                let child = engine.resolve_unique(&self.target, selector).await?;
                target.update_by_id(&child, &Update::new().unset(key)).await?;
                Ok::<_, MutationError>(())
            }),
        )
        .await?;
        fan_out(
            &self.field,
            "delete",
            delete.iter().map(|selector| async move {
                let child = engine.resolve_unique(&self.target, selector).await?;
                target.delete(&Filter::by_id(&child)).await?;
                Ok::<_, MutationError>(())
            }),
        )
        .await?;

        tracing::debug!(field = %self.field, %id, "foreign list");
        Ok(record)
    }
}

// ==================== Many-to-many ====================

/// Both sides list each other in join records.
#[derive(Debug)]
struct JoinTableStrategy {
    field: String,
    target: String,
    source_side: String,
    target_side: String,
}

#[async_trait]
impl Interceptor for JoinTableStrategy {
    async fn around(&self, ctx: &mut MutationContext, next: Next<'_, '_>) -> MutationResult<Document> {
        let Some(RelationInput::Many(input)) = ctx.take_relation(&self.field) else {
            return next.run(ctx).await;
        };
        let engine = next.engine();
        let model = ctx.model.clone();
        let record = next.run(ctx).await?;
        let id = written_id(&record)?;
        let source = engine.source(&model)?;
        let target = engine.source(&self.target)?;
        let eager = engine.config().join_pruning == JoinPruning::Eager;

        let (id, source, target) = (&id, &source, &target);
        let (source_side, target_side) = (self.source_side.as_str(), self.target_side.as_str());
        fan_out(
            &self.field,
            "connect",
            input.connect.iter().map(|selector| async move {
                let linked = engine.resolve_unique(&self.target, selector).await?;
                source
                    .add_id_to_many_relation(source_side, target_side, id, &linked)
                    .await?;
                Ok::<_, MutationError>(())
            }),
        )
        .await?;
        fan_out(
            &self.field,
            "create",
            input.create.into_iter().map(|data| async move {
                let created = engine.create(&self.target, data).await?;
                source
                    .add_id_to_many_relation(source_side, target_side, id, &written_id(&created)?)
                    .await?;
                Ok::<_, MutationError>(())
            }),
        )
        .await?;
        fan_out(
            &self.field,
            "disconnect",
            input.disconnect.iter().map(|selector| async move {
                let linked = engine.resolve_unique(&self.target, selector).await?;
                source
                    .remove_id_from_many_relation(source_side, target_side, id, &linked)
                    .await?;
                Ok::<_, MutationError>(())
            }),
        )
        .await?;
        fan_out(
            &self.field,
            "delete",
            input.delete.iter().map(|selector| async move {
                let linked = engine.resolve_unique(&self.target, selector).await?;
                target.delete(&Filter::by_id(&linked)).await?;
                source
                    .remove_id_from_many_relation(source_side, target_side, id, &linked)
                    .await?;
                if eager {
                    target.prune_many_relation(target_side, source_side, &linked).await?;
                }
                Ok::<_, MutationError>(())
            }),
        )
        .await?;

        tracing::debug!(field = %self.field, %id, "join table");
        Ok(record)
    }
}
