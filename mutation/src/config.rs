//! Mutation engine settings.

use serde::{Deserialize, Serialize};

/// What happens to join records when a many-to-many member is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPruning {
    /// Leave dangling ids; reads skip them.
    #[default]
    Lazy,
    /// Remove the deleted record's join entries on delete.
    Eager,
}

/// How a payload naming several of set/add/remove for one field is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayConflictPolicy {
    /// Fail with `ConflictingArrayOperations`.
    #[default]
    Reject,
    /// Keep the first in set, add, remove order.
    FirstWins,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    pub join_pruning: JoinPruning,
    pub array_conflicts: ArrayConflictPolicy,
}
