//! Definition tools

use super::{action_schema, id_schema, state_schema};
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext, ToolRegistry};
use crate::mcp::types::{
    AddActionRequest, AddStateRequest, CreateDefinitionRequest, DefinitionIdRequest,
    ListDefinitionsRequest,
};
use crate::workflow::DefinitionId;
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;

/// Register all definition tools with the registry
pub fn register_definition_tools(registry: &mut ToolRegistry) {
    registry.register(CreateDefinitionTool);
    registry.register(GetDefinitionTool);
    registry.register(ListDefinitionsTool);
    registry.register(ListStatesTool);
    registry.register(ListActionsTool);
    registry.register(AddStateTool);
    registry.register(AddActionTool);
}

/// Validate and store a new definition
#[derive(Default)]
pub struct CreateDefinitionTool;

#[async_trait]
impl McpTool for CreateDefinitionTool {
    fn name(&self) -> &'static str {
        "definition_create"
    }

    fn description(&self) -> &'static str {
        "Create a workflow definition. The definition must have exactly one initial \
         state, unique state ids and actions that only reference declared states. \
         Omit the id to have one generated. Returns the stored definition."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "definition": {
                    "type": "object",
                    "properties": {
                        "id": {"type": "string"},
                        "states": {"type": "array", "items": state_schema()},
                        "actions": {"type": "array", "items": action_schema()}
                    },
                    "required": ["states", "actions"]
                }
            },
            "required": ["definition"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: CreateDefinitionRequest = BaseToolImpl::parse_arguments(arguments)?;
        context
            .run(move |engine| engine.create_definition(request.definition))
            .await
    }
}

/// Fetch one definition
#[derive(Default)]
pub struct GetDefinitionTool;

#[async_trait]
impl McpTool for GetDefinitionTool {
    fn name(&self) -> &'static str {
        "definition_get"
    }

    fn description(&self) -> &'static str {
        "Get a workflow definition with all of its states and actions"
    }

    fn schema(&self) -> serde_json::Value {
        id_schema("Definition id")
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: DefinitionIdRequest = BaseToolImpl::parse_arguments(arguments)?;
        let id = DefinitionId::from(request.id);
        context.run(move |engine| engine.get_definition(&id)).await
    }
}

/// List every definition
#[derive(Default)]
pub struct ListDefinitionsTool;

#[async_trait]
impl McpTool for ListDefinitionsTool {
    fn name(&self) -> &'static str {
        "definition_list"
    }

    fn description(&self) -> &'static str {
        "List all workflow definitions in creation order"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let _request: ListDefinitionsRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.run(|engine| engine.list_definitions()).await
    }
}

/// States of a definition
#[derive(Default)]
pub struct ListStatesTool;

#[async_trait]
impl McpTool for ListStatesTool {
    fn name(&self) -> &'static str {
        "definition_states"
    }

    fn description(&self) -> &'static str {
        "List the states of a workflow definition in declaration order"
    }

    fn schema(&self) -> serde_json::Value {
        id_schema("Definition id")
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: DefinitionIdRequest = BaseToolImpl::parse_arguments(arguments)?;
        let id = DefinitionId::from(request.id);
        context.run(move |engine| engine.list_states(&id)).await
    }
}

/// Actions of a definition
#[derive(Default)]
pub struct ListActionsTool;

#[async_trait]
impl McpTool for ListActionsTool {
    fn name(&self) -> &'static str {
        "definition_actions"
    }

    fn description(&self) -> &'static str {
        "List the actions of a workflow definition in declaration order"
    }

    fn schema(&self) -> serde_json::Value {
        id_schema("Definition id")
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: DefinitionIdRequest = BaseToolImpl::parse_arguments(arguments)?;
        let id = DefinitionId::from(request.id);
        context.run(move |engine| engine.list_actions(&id)).await
    }
}

/// Append a state to an existing definition
#[derive(Default)]
pub struct AddStateTool;

#[async_trait]
impl McpTool for AddStateTool {
    fn name(&self) -> &'static str {
        "definition_add_state"
    }

    fn description(&self) -> &'static str {
        "Add a state to an existing workflow definition. The whole definition is \
         re-validated; on failure it is left unchanged. Returns the added state."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "description": "Definition id"},
                "state": state_schema()
            },
            "required": ["id", "state"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: AddStateRequest = BaseToolImpl::parse_arguments(arguments)?;
        let id = DefinitionId::from(request.id);
        context
            .run(move |engine| engine.add_state(&id, request.state))
            .await
    }
}

/// Append an action to an existing definition
#[derive(Default)]
pub struct AddActionTool;

#[async_trait]
impl McpTool for AddActionTool {
    fn name(&self) -> &'static str {
        "definition_add_action"
    }

    fn description(&self) -> &'static str {
        "Add an action to an existing workflow definition. The action may only \
         reference declared states; on failure the definition is left unchanged. \
         Returns the added action."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "description": "Definition id"},
                "action": action_schema()
            },
            "required": ["id", "action"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: AddActionRequest = BaseToolImpl::parse_arguments(arguments)?;
        let id = DefinitionId::from(request.id);
        context
            .run(move |engine| engine.add_action(&id, request.action))
            .await
    }
}
