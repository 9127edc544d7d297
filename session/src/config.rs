//! Session settings.

use serde::{Deserialize, Serialize};
use stitch_mutation::{ArrayConflictPolicy, JoinPruning, MutationConfig};

use crate::error::{SessionError, SessionResult};

/// Settings shared by every model handle of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub join_pruning: JoinPruning,
    pub array_conflicts: ArrayConflictPolicy,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_join_pruning(mut self, join_pruning: JoinPruning) -> Self {
        self.join_pruning = join_pruning;
        self
    }

    pub fn with_array_conflicts(mut self, policy: ArrayConflictPolicy) -> Self {
        self.array_conflicts = policy;
        self
    }

    /// Load from JSON, e.g. `{"join_pruning": "eager"}`. Missing keys keep
    /// their defaults.
    pub fn from_json(raw: &str) -> SessionResult<Self> {
        serde_json::from_str(raw).map_err(|e| SessionError::invalid_config(e.to_string()))
    }

    pub fn mutation_config(&self) -> MutationConfig {
        MutationConfig {
            join_pruning: self.join_pruning,
            array_conflicts: self.array_conflicts,
        }
    }
}
