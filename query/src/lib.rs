//! Stitch Query
//!
//! Execute read operations over relation-aware where clauses.
//!
//! Responsibilities:
//! - Evaluate compiled predicate trees, pushing native subtrees to the store
//! - Follow relations through foreign keys, foreign lists and join records
//! - Apply SOME/NONE/EVERY quantifiers to list relations
//! - Order and paginate results

mod engine;
mod error;
mod join;
mod paginate;
mod sort;

pub use engine::{QueryEngine, Scope};
pub use error::{QueryError, QueryResult};
pub use join::{fetch_related, Related};
pub use paginate::{paginate, PaginatedResult, Pagination};
pub use sort::{sort, OrderBy, SortOrder};
