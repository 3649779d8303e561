//! Workflow runtime types: instances and their execution history

use crate::storage::Identified;
use crate::workflow::{ActionId, DefinitionId, StateId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Globally unique identifier for workflow instances
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(String);

impl InstanceId {
    /// Create an instance ID from an existing value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, globally unique ID
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One fired action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// The action that fired
    pub action_id: ActionId,
    /// When it fired
    pub timestamp: DateTime<Utc>,
}

/// A running execution of a workflow definition
///
/// The instance refers to its definition by id only. Definition changes made
/// after the instance started are visible to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInstance {
    /// Unique identifier for this instance
    pub id: InstanceId,
    /// The definition this instance executes
    pub definition_id: DefinitionId,
    /// Current state ID
    pub current_state: StateId,
    /// Fired actions, oldest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl WorkflowInstance {
    /// Create an instance with a fresh id sitting in `initial_state`
    pub fn new(definition_id: DefinitionId, initial_state: StateId) -> Self {
        Self {
            id: InstanceId::generate(),
            definition_id,
            current_state: initial_state,
            history: Vec::new(),
        }
    }

    /// Record a fired action and move to its target state
    pub(crate) fn record_transition(&mut self, action_id: ActionId, to_state: StateId) {
        self.history.push(HistoryEntry {
            action_id,
            timestamp: Utc::now(),
        });
        self.current_state = to_state;
    }
}

impl Identified for WorkflowInstance {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}
