//! Stitch Session
//!
//! Per-model entry points over a registry and a document store.
//!
//! Responsibilities:
//! - Hold the query and mutation engines for one store
//! - Expose find/find_one/find_one_by_id/create/update/delete per model
//! - Load settings (join pruning, array conflict policy)

mod config;
mod error;
mod session;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use session::{ModelHandle, Session, SessionId};
pub use stitch_mutation::{ArrayConflictPolicy, JoinPruning};
