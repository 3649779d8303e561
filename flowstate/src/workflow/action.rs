//! Action types: the named, directed transitions of a workflow

use crate::workflow::state::default_enabled;
use crate::workflow::StateId;
use serde::{Deserialize, Serialize};

/// Unique identifier for an action within a definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(String);

impl ActionId {
    /// Create a new action ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transition rule: fires from any of `from_states` and lands on `to_state`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Identifier, unique within the definition
    pub id: ActionId,
    /// Human readable name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// A disabled action never fires
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// States this action may fire from
    #[serde(default)]
    pub from_states: Vec<StateId>,
    /// Destination state
    pub to_state: StateId,
}

impl Action {
    /// Create an enabled action
    pub fn new<I, S>(
        id: impl Into<ActionId>,
        name: impl Into<String>,
        from_states: I,
        to_state: impl Into<StateId>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StateId>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            enabled: true,
            from_states: from_states.into_iter().map(Into::into).collect(),
            to_state: to_state.into(),
        }
    }

    /// Mark the action as disabled
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether the action lists `state` among its source states
    pub fn fires_from(&self, state: &StateId) -> bool {
        self.from_states.contains(state)
    }

    /// Every state id this action refers to, sources first
    pub fn referenced_states(&self) -> impl Iterator<Item = &StateId> {
        self.from_states
            .iter()
            .chain(std::iter::once(&self.to_state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_creation() {
        let action = Action::new("approve", "Approve", ["draft", "review"], "done");

        assert_eq!(action.id.as_str(), "approve");
        assert!(action.enabled);
        assert!(action.fires_from(&StateId::new("review")));
        assert!(!action.fires_from(&StateId::new("done")));
        assert_eq!(action.to_state.as_str(), "done");
    }

    #[test]
    fn test_referenced_states_include_target() {
        let action = Action::new("a", "A", ["s1"], "s2");
        let referenced: Vec<&str> = action.referenced_states().map(|s| s.as_str()).collect();

        assert_eq!(referenced, vec!["s1", "s2"]);
    }

    #[test]
    fn test_action_deserialization() {
        let json = r#"{"id":"A1","name":"Go","fromStates":["S1"],"toState":"S2","enabled":false}"#;
        let action: Action = serde_json::from_str(json).unwrap();

        assert!(!action.enabled);
        assert_eq!(action.from_states, vec![StateId::new("S1")]);
        assert_eq!(action.to_state, StateId::new("S2"));
    }
}
