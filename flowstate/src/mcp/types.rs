//! Request types for the MCP tools
//!
//! Field names are snake_case on the wire; camelCase aliases are accepted so
//! that clients can reuse the entity field names.

use crate::workflow::{Action, State, WorkflowDefinition};
use serde::Deserialize;

/// `definition_create`
#[derive(Debug, Deserialize)]
pub struct CreateDefinitionRequest {
    /// The definition; a missing id is assigned by the engine
    pub definition: WorkflowDefinition,
}

/// Any tool addressing one definition: `definition_get`, `definition_states`,
/// `definition_actions`
#[derive(Debug, Deserialize)]
pub struct DefinitionIdRequest {
    /// Definition id
    pub id: String,
}

/// `definition_list`
#[derive(Debug, Default, Deserialize)]
pub struct ListDefinitionsRequest {}

/// `definition_add_state`
#[derive(Debug, Deserialize)]
pub struct AddStateRequest {
    /// Definition id
    pub id: String,
    /// The new state
    pub state: State,
}

/// `definition_add_action`
#[derive(Debug, Deserialize)]
pub struct AddActionRequest {
    /// Definition id
    pub id: String,
    /// The new action
    pub action: Action,
}

/// `instance_start`
#[derive(Debug, Deserialize)]
pub struct StartInstanceRequest {
    /// Definition to instantiate
    #[serde(alias = "definitionId")]
    pub definition_id: String,
}

/// `instance_get`
#[derive(Debug, Deserialize)]
pub struct InstanceIdRequest {
    /// Instance id
    pub id: String,
}

/// `instance_list`
#[derive(Debug, Default, Deserialize)]
pub struct ListInstancesRequest {
    /// Only instances of this definition
    #[serde(default, alias = "definitionId")]
    pub definition_id: Option<String>,
}

/// `instance_execute`
#[derive(Debug, Deserialize)]
pub struct ExecuteActionRequest {
    /// Instance id
    pub id: String,
    /// Action to fire
    #[serde(alias = "actionId")]
    pub action_id: String,
}
