//! Scenario runner.

use std::sync::Arc;

use stitch_core::{Document, RecordId, Value};
use stitch_query::OrderBy;
use stitch_session::{Session, SessionError};
use stitch_store::MemoryStore;

use crate::assertion::Outcome;
use crate::error::{ScenarioError, ScenarioResult};
use crate::loader::{load_registry, load_seed, Operation, Operations};
use crate::scenario::Scenario;

/// Runs a scenario against a fresh in-memory store.
pub struct Runner<'s> {
    scenario: &'s Scenario,
    operations: Operations,
}

impl<'s> Runner<'s> {
    /// Create a new runner for a scenario.
    pub fn new(scenario: &'s Scenario) -> ScenarioResult<Self> {
        let operations = scenario.load_operations()?;
        Ok(Self {
            scenario,
            operations,
        })
    }

    /// Run the scenario.
    pub async fn run(&self) -> ScenarioResult<()> {
        // 1. Build the registry
        let registry = load_registry(&self.scenario.schema_path()?)?;

        // 2. Seed a store that enforces the schema's unique and required fields
        let store = Arc::new(MemoryStore::for_registry(&registry));
        for seed in self.scenario.seed_paths() {
            load_seed(&seed, &store)?;
        }

        // 3. Open a session
        let session = Session::with_config(1, &registry, store.clone(), self.scenario.session_config());

        // 4. Execute each step and verify its assertion
        for step in self.scenario.steps() {
            let operation = self
                .operations
                .get(&step.name)
                .ok_or_else(|| ScenarioError::step_not_found(&step.name))?;
            let result = execute(&session, &store, operation)
                .await
                .map_err(|e| e.to_string());
            step.assertion.verify(&step.name, &result)?;
        }

        Ok(())
    }
}

fn object(raw: &serde_json::Value) -> Result<Document, String> {
    Value::from(raw.clone())
        .into_object()
        .ok_or_else(|| format!("expected an object, got {}", raw))
}

/// Run one operation against the session.
async fn execute(
    session: &Session<'_>,
    store: &MemoryStore,
    operation: &Operation,
) -> Result<Outcome, StepFailure> {
    let outcome = match operation {
        Operation::Find {
            model,
            filter,
            order_by,
            pagination,
        } => {
            let order = OrderBy::from_value(&Value::from(order_by.clone())).map_err(SessionError::from)?;
            let page = session
                .model(model)?
                .find(&Value::from(filter.clone()), &order, pagination)
                .await?;
            Outcome::Page(page)
        }
        Operation::FindOne { model, filter } => {
            Outcome::Record(session.model(model)?.find_one(&Value::from(filter.clone())).await?)
        }
        Operation::FindById { model, id } => {
            Outcome::Record(session.model(model)?.find_one_by_id(&RecordId::from(id.as_str())).await?)
        }
        Operation::Create { model, data } => {
            let data = object(data).map_err(StepFailure::Input)?;
            Outcome::Record(Some(session.model(model)?.create(data).await?))
        }
        Operation::Update {
            model,
            selector,
            data,
        } => {
            let data = object(data).map_err(StepFailure::Input)?;
            let record = session
                .model(model)?
                .update(&Value::from(selector.clone()), data)
                .await?;
            Outcome::Record(Some(record))
        }
        Operation::Delete { model, selector } => {
            session.model(model)?.delete(&Value::from(selector.clone())).await?;
            Outcome::Deleted
        }
        Operation::Collection { name } => Outcome::Documents(
            store
                .documents(name)
                .map_err(|e| StepFailure::Input(e.to_string()))?,
        ),
    };
    Ok(outcome)
}

#[derive(Debug, thiserror::Error)]
enum StepFailure {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{0}")]
    Input(String),
}
