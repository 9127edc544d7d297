//! Stitch Integration Test Framework
//!
//! Provides a fluent API for writing integration tests against a Stitch
//! session backed by the in-memory store.
//!
//! # Structure
//!
//! Fixtures live under `fixtures/<domain>/`:
//!
//! - **schema.json** - models, fields and relations
//! - **seeds/** - starting documents per collection, join collections included
//! - **operations/** - named session calls (find, create, update, delete, ...)
//!
//! Scenarios (Rust) pick a schema, seeds and an operations file, and attach
//! an assertion to each step they run.
//!
//! # Example
//!
//! ```ignore
//! use stitch_tests::prelude::*;
//!
//! pub fn scenario() -> Scenario {
//!     Scenario::new("team_filter")
//!         .schema("people/schema.json")
//!         .seed("people/seeds/base.json")
//!         .operations("people/operations/filters.json")
//!         .step("users_in_team_one", |a| a.ids(["u1", "u2"]))
//! }
//!
//! #[tokio::test]
//! async fn test() {
//!     scenario().run().await.unwrap();
//! }
//! ```

mod error;
mod loader;
mod runner;
mod scenario;

pub use assertion::{Assertion, AssertionBuilder, Outcome};
pub use error::{ScenarioError, ScenarioResult};
pub use loader::{load_registry, load_seed, Operation, Operations};
pub use scenario::{Scenario, Step};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::assertion::{Assertion, AssertionBuilder, Outcome};
    pub use crate::error::{ScenarioError, ScenarioResult};
    pub use crate::scenario::Scenario;
    pub use serde_json::json;
    pub use stitch_session::{ArrayConflictPolicy, JoinPruning, SessionConfig};
}
