//! State-related types for workflows

use serde::{Deserialize, Serialize};

/// Unique identifier for a state within a definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(String);

impl StateId {
    /// Create a new state ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for StateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) fn default_enabled() -> bool {
    true
}

/// Represents a state in a workflow definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// Identifier, unique within the definition
    pub id: StateId,
    /// Human readable name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Whether instances start in this state
    #[serde(default)]
    pub is_initial: bool,
    /// Whether this is a terminal state; no action may fire from it
    #[serde(default)]
    pub is_final: bool,
    /// Carried for clients; transitions do not consult it
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl State {
    /// Create an enabled, non-initial, non-final state
    pub fn new(id: impl Into<StateId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            is_initial: false,
            is_final: false,
            enabled: true,
        }
    }

    /// Mark the state as the initial state
    pub fn initial(mut self) -> Self {
        self.is_initial = true;
        self
    }

    /// Mark the state as final
    pub fn terminal(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_id_creation() {
        let id1 = StateId::new("start");
        let id2 = StateId::from("start");
        let id3: StateId = "start".into();

        assert_eq!(id1, id2);
        assert_eq!(id2, id3);
        assert_eq!(id1.as_str(), "start");
    }

    #[test]
    fn test_state_builder() {
        let state = State::new("review", "Review").initial().terminal();

        assert_eq!(state.id.as_str(), "review");
        assert!(state.is_initial);
        assert!(state.is_final);
        assert!(state.enabled);
    }

    #[test]
    fn test_state_deserialization_defaults() {
        let state: State = serde_json::from_str(r#"{"id":"S1","name":"Draft"}"#).unwrap();

        assert_eq!(state.id.as_str(), "S1");
        assert!(!state.is_initial);
        assert!(!state.is_final);
        assert!(state.enabled);
        assert!(state.description.is_empty());
    }

    #[test]
    fn test_state_uses_camel_case_fields() {
        let state = State::new("S1", "Draft").initial();
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["isInitial"], serde_json::Value::Bool(true));
        assert_eq!(json["isFinal"], serde_json::Value::Bool(false));
        assert_eq!(json["id"], serde_json::Value::String("S1".into()));
    }
}
