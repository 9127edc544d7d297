//! Stitch Store
//!
//! Backing store adapter for a document store without joins or foreign keys.
//!
//! Responsibilities:
//! - A native filter and update language with document-store semantics
//! - Translate where operators into native filters
//! - The async DocumentStore interface and an in-memory implementation
//! - Per-model DataSource: CRUD, relation primitives, join records
//! - Map store failures to conflict, validation and store errors

mod error;
mod filter;
mod memory;
mod source;
mod store;
mod update;

pub use error::{SourceError, SourceResult, StoreError, StoreResult};
pub use filter::{Cond, Filter, Pattern};
pub use memory::{CollectionSchema, MemoryStore};
pub use source::{DataSource, SOURCE_SIDE_ID, TARGET_SIDE_IDS};
pub use store::{DocumentStore, FindOptions, UpdateOutcome};
pub use update::Update;
