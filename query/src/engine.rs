//! Predicate tree evaluation.
//!
//! Native subtrees (field comparisons and AND/OR groups of them) become one
//! store query. Everything else is evaluated here:
//! - `OR` evaluates its children concurrently and unions them by id
//! - `AND` narrows the candidate set child by child, native children first
//! - relation groups check every candidate concurrently; the relation
//!   filters of one candidate run in order and stop at the first miss

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::{try_join_all, BoxFuture};
use futures_util::FutureExt;
use stitch_core::{Document, DocumentExt, RecordId, Value};
use stitch_predicate::{compile_where, BoolOp, PredicateNode, Quantifier, RelationWhere};
use stitch_registry::Registry;
use stitch_store::{DataSource, DocumentStore, Filter, StoreError};

use crate::error::QueryResult;
use crate::join::{fetch_related, Related};
use crate::paginate::{paginate, PaginatedResult, Pagination};
use crate::sort::{sort, OrderBy};

/// Records a predicate is evaluated against.
#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    /// The whole collection.
    Collection,
    /// Only these records.
    Within(Vec<Document>),
}

/// Executes where clauses against a document store.
#[derive(Clone)]
pub struct QueryEngine<'r> {
    registry: &'r Registry,
    store: Arc<dyn DocumentStore>,
}

impl<'r> QueryEngine<'r> {
    pub fn new(registry: &'r Registry, store: Arc<dyn DocumentStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Data source for `model`.
    pub fn source(&self, model: &str) -> QueryResult<DataSource> {
        let model = self.registry.model(model)?;
        Ok(DataSource::for_model(self.store.clone(), model))
    }

    /// Filter, order and paginate records of `model`.
    pub async fn find(
        &self,
        model: &str,
        raw_where: &Value,
        order: &OrderBy,
        pagination: &Pagination,
    ) -> QueryResult<PaginatedResult> {
        let node = compile_where(self.registry, model, raw_where)?;
        tracing::debug!(model, ?node, "find");

        let mut rows = self.evaluate(model, &node, Scope::Collection).await?;
        sort(&mut rows, order);
        paginate(rows, pagination)
    }

    /// First record of `model` matching `raw_where`, in collection order.
    pub async fn find_one(&self, model: &str, raw_where: &Value) -> QueryResult<Option<Document>> {
        let node = compile_where(self.registry, model, raw_where)?;
        let rows = self.evaluate(model, &node, Scope::Collection).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn find_one_by_id(&self, model: &str, id: &RecordId) -> QueryResult<Option<Document>> {
        Ok(self.source(model)?.find_one_by_id(id).await?)
    }

    /// Records of `model` within `scope` that satisfy `node`.
    pub fn evaluate<'a>(
        &'a self,
        model: &'a str,
        node: &'a PredicateNode,
        scope: Scope,
    ) -> BoxFuture<'a, QueryResult<Vec<Document>>> {
        async move {
            if matches!(&scope, Scope::Within(records) if records.is_empty()) {
                return Ok(Vec::new());
            }

            match node {
                PredicateNode::AndOr {
                    op: BoolOp::Or,
                    children,
                } if !node.is_native() => {
                    let results = try_join_all(
                        children
                            .iter()
                            .map(|child| self.evaluate(model, child, scope.clone())),
                    )
                    .await?;
                    Ok(union(results))
                }
                PredicateNode::AndOr {
                    op: BoolOp::And,
                    children,
                } if !node.is_native() => {
                    let (native, rest): (Vec<&PredicateNode>, Vec<&PredicateNode>) =
                        children.iter().partition(|child| child.is_native());

                    let mut current = scope;
                    if !native.is_empty() {
                        let filters = native
                            .into_iter()
                            .map(native_filter)
                            .collect::<QueryResult<Vec<_>>>()?;
                        current = Scope::Within(self.fetch(model, &Filter::and(filters), current).await?);
                    }
                    for child in rest {
                        current = Scope::Within(self.evaluate(model, child, current).await?);
                    }
                    self.materialize(model, current).await
                }
                PredicateNode::RelationGroup(relations) => {
                    let candidates = self.materialize(model, scope).await?;
                    let keep = try_join_all(
                        candidates
                            .iter()
                            .map(|record| self.relations_hold(relations, record)),
                    )
                    .await?;
                    Ok(candidates
                        .into_iter()
                        .zip(keep)
                        .filter_map(|(record, keep)| keep.then_some(record))
                        .collect())
                }
                native => {
                    let filter = native_filter(native)?;
                    self.fetch(model, &filter, scope).await
                }
            }
        }
        .boxed()
    }

    async fn relations_hold(&self, relations: &[RelationWhere], record: &Document) -> QueryResult<bool> {
        for relation in relations {
            if !self.relation_holds(relation, record).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn relation_holds(&self, relation: &RelationWhere, record: &Document) -> QueryResult<bool> {
        let target = self.source(&relation.target)?;
        let related = fetch_related(&target, &relation.link, record).await?;
        tracing::trace!(field = %relation.field, ?related, "relation lookup");

        match related {
            Related::Many(records) => {
                let total = records.len();
                let quantifier = relation.quantifier.unwrap_or(Quantifier::Some);
                let matched = if relation.filters.is_empty() {
                    total
                } else {
                    self.evaluate(&relation.target, &relation.filters, Scope::Within(records))
                        .await?
                        .len()
                };
                Ok(quantifier.holds(matched, total))
            }
            Related::One(None) => Ok(relation.filters.is_empty()),
            Related::One(Some(_)) if relation.filters.is_empty() => Ok(true),
            Related::One(Some(target_record)) => {
                let matched = self
                    .evaluate(
                        &relation.target,
                        &relation.filters,
                        Scope::Within(vec![target_record]),
                    )
                    .await?;
                Ok(!matched.is_empty())
            }
        }
    }

    /// One store query, restricted to the scope's ids.
    async fn fetch(&self, model: &str, filter: &Filter, scope: Scope) -> QueryResult<Vec<Document>> {
        let source = self.source(model)?;
        let records = match scope {
            Scope::Collection => source.find_in_collection(filter).await?,
            Scope::Within(records) => {
                if records.is_empty() {
                    return Ok(records);
                }
                let ids: Vec<RecordId> = records.iter().filter_map(|r| r.record_id()).collect();
                let restricted = Filter::and(vec![Filter::id_in(&ids), filter.clone()]);
                source.find_in_collection(&restricted).await?
            }
        };
        Ok(records)
    }

    async fn materialize(&self, model: &str, scope: Scope) -> QueryResult<Vec<Document>> {
        match scope {
            Scope::Collection => Ok(self.source(model)?.find_in_collection(&Filter::All).await?),
            Scope::Within(records) => Ok(records),
        }
    }
}

/// Translate a relation-free subtree into one store filter.
fn native_filter(node: &PredicateNode) -> QueryResult<Filter> {
    let filter = match node {
        PredicateNode::Empty => Filter::All,
        PredicateNode::Base(filters) => Filter::from_field_filters(filters)?,
        PredicateNode::AndOr { op, children } => {
            let parts = children
                .iter()
                .map(native_filter)
                .collect::<QueryResult<Vec<_>>>()?;
            match op {
                BoolOp::And => Filter::and(parts),
                BoolOp::Or => Filter::Or(parts),
            }
        }
        PredicateNode::RelationGroup(_) => {
            return Err(StoreError::invalid_query("relation filters have no native form").into())
        }
    };
    Ok(filter)
}

/// Concatenate result sets, keeping the first occurrence of each id.
fn union(results: Vec<Vec<Document>>) -> Vec<Document> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .flatten()
        .filter(|record| match record.record_id() {
            Some(id) => seen.insert(id),
            None => true,
        })
        .collect()
}
