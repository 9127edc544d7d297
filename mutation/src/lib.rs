//! Stitch Mutation
//!
//! Execute write operations with nested relation side effects.
//!
//! Responsibilities:
//! - Split payloads into assignments, array-field operations and relation inputs
//! - Run each model's interceptor chain around the base write
//! - Apply connect/create/disconnect/delete through one strategy per relation shape
//! - Keep both directions of many-to-many join records in step
//!
//! # Module Structure
//!
//! - `executor` - `MutationEngine`, chain binding and the base write
//! - `interceptor` - the `around(ctx, next)` interceptor contract
//! - `strategy` - relation strategies, one per `RelationLink`
//! - `payload` - scalar and array-operation payload building
//! - `input` - nested relation verb parsing
//! - `config` - join pruning and array conflict settings

mod config;
mod error;
mod executor;
mod input;
mod interceptor;
mod payload;
mod strategy;

pub use config::{ArrayConflictPolicy, JoinPruning, MutationConfig};
pub use error::{MutationError, MutationResult};
pub use executor::MutationEngine;
pub use input::{parse_relation_inputs, ListInput, RelationInput, SingularInput};
pub use interceptor::{Interceptor, MutationContext, Next, Operation};
pub use payload::build_mutation;
