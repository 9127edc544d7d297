//! Stitch Registry
//!
//! Runtime schema lookup. Single source of truth for models, fields and
//! resolved relations. The registry is immutable after construction via
//! RegistryBuilder.

mod builder;
mod naming;
mod registry;
mod relation;
mod types;

pub use builder::{ModelBuilder, RegistryBuilder, RegistryError, RegistryResult};
pub use naming::Namings;
pub use registry::{Registry, RelationTarget};
pub use relation::*;
pub use types::*;
