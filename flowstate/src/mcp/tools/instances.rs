//! Instance tools

use super::id_schema;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext, ToolRegistry};
use crate::mcp::types::{
    ExecuteActionRequest, InstanceIdRequest, ListInstancesRequest, StartInstanceRequest,
};
use crate::workflow::{ActionId, DefinitionId, InstanceId};
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;

/// Register all instance tools with the registry
pub fn register_instance_tools(registry: &mut ToolRegistry) {
    registry.register(StartInstanceTool);
    registry.register(GetInstanceTool);
    registry.register(ListInstancesTool);
    registry.register(ExecuteActionTool);
    registry.register(AvailableActionsTool);
}

/// Start an instance of a definition
#[derive(Default)]
pub struct StartInstanceTool;

#[async_trait]
impl McpTool for StartInstanceTool {
    fn name(&self) -> &'static str {
        "instance_start"
    }

    fn description(&self) -> &'static str {
        "Start a new instance of a workflow definition. The instance begins in the \
         definition's initial state with an empty history."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "definition_id": {"type": "string", "description": "Definition to instantiate"}
            },
            "required": ["definition_id"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: StartInstanceRequest = BaseToolImpl::parse_arguments(arguments)?;
        let definition_id = DefinitionId::from(request.definition_id);
        context
            .run(move |engine| engine.start_instance(&definition_id))
            .await
    }
}

/// Fetch one instance
#[derive(Default)]
pub struct GetInstanceTool;

#[async_trait]
impl McpTool for GetInstanceTool {
    fn name(&self) -> &'static str {
        "instance_get"
    }

    fn description(&self) -> &'static str {
        "Get a workflow instance with its current state and history"
    }

    fn schema(&self) -> serde_json::Value {
        id_schema("Instance id")
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: InstanceIdRequest = BaseToolImpl::parse_arguments(arguments)?;
        let id = InstanceId::from(request.id);
        context.run(move |engine| engine.get_instance(&id)).await
    }
}

/// List instances, optionally of one definition
#[derive(Default)]
pub struct ListInstancesTool;

#[async_trait]
impl McpTool for ListInstancesTool {
    fn name(&self) -> &'static str {
        "instance_list"
    }

    fn description(&self) -> &'static str {
        "List workflow instances in creation order, optionally only those of one definition"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "definition_id": {"type": "string", "description": "Only instances of this definition"}
            },
            "required": []
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: ListInstancesRequest = BaseToolImpl::parse_arguments(arguments)?;
        match request.definition_id.map(DefinitionId::from) {
            Some(definition_id) => {
                context
                    .run(move |engine| engine.list_instances_for(&definition_id))
                    .await
            }
            None => context.run(|engine| engine.list_instances()).await,
        }
    }
}

/// Fire an action on an instance
#[derive(Default)]
pub struct ExecuteActionTool;

#[async_trait]
impl McpTool for ExecuteActionTool {
    fn name(&self) -> &'static str {
        "instance_execute"
    }

    fn description(&self) -> &'static str {
        "Execute an action on a workflow instance. The action must be enabled, list \
         the instance's current state among its sources, and the current state must \
         not be final. Returns the updated instance."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "description": "Instance id"},
                "action_id": {"type": "string", "description": "Action to fire"}
            },
            "required": ["id", "action_id"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: ExecuteActionRequest = BaseToolImpl::parse_arguments(arguments)?;
        let id = InstanceId::from(request.id);
        let action_id = ActionId::from(request.action_id);
        context
            .run(move |engine| engine.execute_action(&id, &action_id))
            .await
    }
}

/// Actions that would currently fire
#[derive(Default)]
pub struct AvailableActionsTool;

#[async_trait]
impl McpTool for AvailableActionsTool {
    fn name(&self) -> &'static str {
        "instance_actions"
    }

    fn description(&self) -> &'static str {
        "List the actions that can currently be executed on a workflow instance"
    }

    fn schema(&self) -> serde_json::Value {
        id_schema("Instance id")
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: InstanceIdRequest = BaseToolImpl::parse_arguments(arguments)?;
        let id = InstanceId::from(request.id);
        context.run(move |engine| engine.available_actions(&id)).await
    }
}
