//! Workflow definition: the reusable schema of states and actions

use crate::storage::Identified;
use crate::workflow::{Action, ActionId, State, StateId};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Globally unique identifier for workflow definitions
///
/// An empty id is allowed on input and means "assign one on creation".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefinitionId(String);

impl DefinitionId {
    /// Create a definition ID from an existing value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, globally unique ID
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Whether the ID is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DefinitionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DefinitionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A workflow definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// Definition id; blank until assigned
    #[serde(default)]
    pub id: DefinitionId,
    /// States in declaration order
    #[serde(default)]
    pub states: Vec<State>,
    /// Actions in declaration order
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl WorkflowDefinition {
    /// Create an empty definition
    pub fn new(id: impl Into<DefinitionId>) -> Self {
        Self {
            id: id.into(),
            states: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Append a state, builder style
    pub fn with_state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    /// Append an action, builder style
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Find a state by id
    pub fn state(&self, id: &StateId) -> Option<&State> {
        self.states.iter().find(|s| &s.id == id)
    }

    /// Find the first action with this id
    pub fn action(&self, id: &ActionId) -> Option<&Action> {
        self.actions.iter().find(|a| &a.id == id)
    }

    /// Whether a state with this id is declared
    pub fn has_state(&self, id: &StateId) -> bool {
        self.state(id).is_some()
    }

    /// Whether an action with this id is declared
    pub fn has_action(&self, id: &ActionId) -> bool {
        self.action(id).is_some()
    }

    /// The first state marked initial
    pub fn initial_state(&self) -> Option<&State> {
        self.states.iter().find(|s| s.is_initial)
    }

    /// Number of states marked initial
    pub fn initial_state_count(&self) -> usize {
        self.states.iter().filter(|s| s.is_initial).count()
    }
}

impl Identified for WorkflowDefinition {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::test_helpers::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let id1 = DefinitionId::generate();
        let id2 = DefinitionId::generate();

        assert_ne!(id1, id2);
        assert!(!id1.is_blank());
    }

    #[test]
    fn test_blank_ids() {
        assert!(DefinitionId::default().is_blank());
        assert!(DefinitionId::new("  ").is_blank());
        assert!(!DefinitionId::new("orders").is_blank());
    }

    #[test]
    fn test_lookups() {
        let definition = create_two_state_definition("orders");

        assert_eq!(definition.initial_state().unwrap().id.as_str(), "S1");
        assert_eq!(definition.initial_state_count(), 1);
        assert!(definition.has_state(&StateId::new("S2")));
        assert!(!definition.has_state(&StateId::new("ghost")));
        assert!(definition.has_action(&ActionId::new("A1")));
        assert!(definition.action(&ActionId::new("A9")).is_none());
    }

    #[test]
    fn test_definition_without_id_deserializes_blank() {
        let json = r#"{
            "states": [{"id": "S1", "name": "Start", "isInitial": true}],
            "actions": []
        }"#;
        let definition: WorkflowDefinition = serde_json::from_str(json).unwrap();

        assert!(definition.id.is_blank());
        assert_eq!(definition.states.len(), 1);
    }

    #[test]
    fn test_identified_uses_definition_id() {
        let definition = create_two_state_definition("orders");
        assert_eq!(Identified::id(&definition), "orders");
    }
}
