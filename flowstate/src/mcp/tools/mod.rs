//! MCP tools, one per engine operation
//!
//! - `definition_*`: create, inspect and extend workflow definitions
//! - `instance_*`: start instances, fire actions and inspect progress

pub mod definitions;
pub mod instances;

use crate::mcp::tool_registry::ToolRegistry;

/// Register every workflow tool with the registry
pub fn register_workflow_tools(registry: &mut ToolRegistry) {
    definitions::register_definition_tools(registry);
    instances::register_instance_tools(registry);
}

/// JSON schema of a state object
pub(crate) fn state_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "description": "State id, unique within the definition"},
            "name": {"type": "string"},
            "description": {"type": "string"},
            "isInitial": {"type": "boolean", "default": false},
            "isFinal": {"type": "boolean", "default": false},
            "enabled": {"type": "boolean", "default": true}
        },
        "required": ["id", "name"]
    })
}

/// JSON schema of an action object
pub(crate) fn action_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "description": "Action id, unique within the definition"},
            "name": {"type": "string"},
            "description": {"type": "string"},
            "enabled": {"type": "boolean", "default": true},
            "fromStates": {
                "type": "array",
                "items": {"type": "string"},
                "description": "States the action may fire from"
            },
            "toState": {"type": "string", "description": "Destination state"}
        },
        "required": ["id", "name", "fromStates", "toState"]
    })
}

/// Schema for tools taking a single `id` argument
pub(crate) fn id_schema(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "description": description}
        },
        "required": ["id"]
    })
}
