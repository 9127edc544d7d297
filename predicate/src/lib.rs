//! Stitch Predicate
//!
//! Compile raw where-clause maps into typed predicate trees.
//!
//! Responsibilities:
//! - Classify every key as a boolean group, a relation filter or a field filter
//! - Split operator suffixes (`price_gt`, `name_contains`) and validate operands
//! - Resolve relation filters against the registry, with SOME/NONE/EVERY quantifiers
//! - Compile unique selectors (`{id: ...}` or `{email: ...}`)

mod compile;
mod error;
mod node;
mod unique;

pub use compile::{compile_where, WhereCompiler};
pub use error::{CompileError, CompileResult};
pub use node::{BoolOp, PredicateNode, Quantifier, RelationWhere};
pub use unique::{compile_unique_where, UniqueWhere};
