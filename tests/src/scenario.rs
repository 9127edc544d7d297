//! Scenario definition and builder.

use std::path::{Path, PathBuf};

use stitch_session::SessionConfig;

use crate::assertion::{Assertion, AssertionBuilder};
use crate::error::{ScenarioError, ScenarioResult};
use crate::loader::Operations;
use crate::runner::Runner;

/// A step in a scenario with its assertion.
#[derive(Debug)]
pub struct Step {
    /// Step name (matches `"step"` in the operations file).
    pub name: String,
    /// Assertion to verify the result.
    pub assertion: Assertion,
}

/// A complete test scenario.
#[derive(Debug)]
pub struct Scenario {
    /// Scenario name (for reporting).
    name: String,
    schema_path: Option<PathBuf>,
    seed_paths: Vec<PathBuf>,
    operations_path: Option<PathBuf>,
    /// Parsed operations (if loaded inline).
    operations: Option<Operations>,
    config: SessionConfig,
    steps: Vec<Step>,
    /// Base path for resolving relative paths.
    base_path: PathBuf,
}

impl Scenario {
    /// Create a new scenario with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_path: None,
            seed_paths: Vec::new(),
            operations_path: None,
            operations: None,
            config: SessionConfig::default(),
            steps: Vec::new(),
            base_path: fixtures_root(),
        }
    }

    /// Set the base path for resolving relative paths.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = path.into();
        self
    }

    /// Set the schema file path (relative to fixtures/).
    pub fn schema(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// Add a seed file (relative to fixtures/). Seeds load in order.
    pub fn seed(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_paths.push(path.into());
        self
    }

    /// Set the operations file path (relative to fixtures/).
    pub fn operations(mut self, path: impl Into<PathBuf>) -> Self {
        self.operations_path = Some(path.into());
        self
    }

    /// Load operations from a string.
    pub fn operations_source(mut self, source: &str) -> ScenarioResult<Self> {
        let operations = Operations::parse(source)
            .map_err(|message| ScenarioError::fixture_parse("<inline>", message))?;
        self.operations = Some(operations);
        Ok(self)
    }

    /// Session settings for the run.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a step with an assertion.
    ///
    /// The step name must match a step in the operations file.
    pub fn step<F>(mut self, name: impl Into<String>, assertion_fn: F) -> Self
    where
        F: FnOnce(AssertionBuilder) -> AssertionBuilder,
    {
        let name = name.into();
        let assertion = assertion_fn(AssertionBuilder::new()).build();
        self.steps.push(Step { name, assertion });
        self
    }

    /// Run the scenario.
    pub async fn run(&self) -> ScenarioResult<()> {
        Runner::new(self)?.run().await
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session_config(&self) -> SessionConfig {
        self.config
    }

    /// Get the schema path (resolved).
    pub fn schema_path(&self) -> ScenarioResult<PathBuf> {
        match &self.schema_path {
            Some(p) => Ok(self.resolve_path(p)),
            None => Err(ScenarioError::missing_schema(&self.name)),
        }
    }

    /// Get the seed paths (resolved).
    pub fn seed_paths(&self) -> Vec<PathBuf> {
        self.seed_paths.iter().map(|p| self.resolve_path(p)).collect()
    }

    /// Get the operations, loading from file if needed.
    pub fn load_operations(&self) -> ScenarioResult<Operations> {
        if let Some(ref ops) = self.operations {
            return Ok(ops.clone());
        }
        match &self.operations_path {
            Some(p) => Operations::load(&self.resolve_path(p)),
            None => Err(ScenarioError::missing_operations(&self.name)),
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

/// The `fixtures/` directory of this crate.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_builder() {
        let scenario = Scenario::new("test")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .step("spawn", |a| a.rows(1))
            .step("query", |a| a.empty());

        assert_eq!(scenario.name(), "test");
        assert_eq!(scenario.steps().len(), 2);
        assert!(scenario.schema_path().unwrap().ends_with("fixtures/people/schema.json"));
        assert_eq!(scenario.seed_paths().len(), 1);
    }

    #[test]
    fn test_missing_operations() {
        let scenario = Scenario::new("nothing").schema("people/schema.json");

        assert!(matches!(
            scenario.load_operations(),
            Err(ScenarioError::MissingOperations { .. })
        ));
    }
}
