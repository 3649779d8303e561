//! Tool registry for MCP operations
//!
//! Each engine operation is a [`McpTool`]; the server looks tools up by name
//! and hands them a shared [`ToolContext`].

use crate::error::{WorkflowError, WorkflowResult};
use crate::workflow::WorkflowEngine;
use rmcp::model::{Annotated, CallToolResult, RawContent, RawTextContent, Tool};
use rmcp::Error as McpError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Context shared by all tools during execution
#[derive(Clone)]
pub struct ToolContext {
    /// The engine every tool operates on
    pub engine: Arc<WorkflowEngine>,
}

impl ToolContext {
    /// Create a new tool context
    pub fn new(engine: Arc<WorkflowEngine>) -> Self {
        Self { engine }
    }

    /// Run an engine operation off the async runtime and turn its outcome
    /// into a tool result
    ///
    /// Engine failures become error results carrying the reason code. Only a
    /// crashed worker or an unserializable value is a protocol error.
    pub async fn run<T, F>(&self, operation: F) -> std::result::Result<CallToolResult, McpError>
    where
        T: Serialize + Send + 'static,
        F: FnOnce(&WorkflowEngine) -> WorkflowResult<T> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let outcome = tokio::task::spawn_blocking(move || operation(&engine))
            .await
            .map_err(|e| McpError::internal_error(format!("Engine task failed: {e}"), None))?;

        match outcome {
            Ok(value) => BaseToolImpl::create_json_response(&value),
            Err(e) => Ok(BaseToolImpl::create_workflow_error_response(&e)),
        }
    }
}

/// Trait defining the interface for all MCP tools
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Get the tool's name
    fn name(&self) -> &'static str;

    /// Get the tool's description
    fn description(&self) -> &'static str;

    /// Get the tool's JSON schema for arguments
    fn schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments and context
    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError>;
}

/// Registry for managing MCP tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn McpTool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool in the registry
    pub fn register<T: McpTool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Box::new(tool));
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<&dyn McpTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    /// All registered tool names, sorted
    pub fn list_tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Get all registered tools as Tool objects for MCP list_tools response
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools
            .values()
            .map(|tool| {
                let schema_map = match tool.schema() {
                    serde_json::Value::Object(map) => map,
                    _ => serde_json::Map::new(),
                };

                Tool {
                    name: tool.name().into(),
                    description: Some(tool.description().into()),
                    input_schema: Arc::new(schema_map),
                    annotations: None,
                }
            })
            .collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Common helpers for tool implementations
pub struct BaseToolImpl;

impl BaseToolImpl {
    /// Parse tool arguments from a JSON map into a typed struct
    pub fn parse_arguments<T: serde::de::DeserializeOwned>(
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<T, McpError> {
        serde_json::from_value(serde_json::Value::Object(arguments))
            .map_err(|e| McpError::invalid_request(format!("Invalid arguments: {e}"), None))
    }

    /// Create a success response with the given text
    pub fn create_success_response<T: Into<String>>(content: T) -> CallToolResult {
        CallToolResult {
            content: vec![Annotated::new(
                RawContent::Text(RawTextContent {
                    text: content.into(),
                }),
                None,
            )],
            is_error: Some(false),
        }
    }

    /// Create a success response holding `value` as pretty JSON
    pub fn create_json_response<T: Serialize>(
        value: &T,
    ) -> std::result::Result<CallToolResult, McpError> {
        serde_json::to_string_pretty(value)
            .map(Self::create_success_response)
            .map_err(|e| McpError::internal_error(format!("Failed to serialize result: {e}"), None))
    }

    /// Create an error response with the given error message
    pub fn create_error_response<T: Into<String>>(
        error: T,
        details: Option<String>,
    ) -> CallToolResult {
        let error_text = match details {
            Some(details) => format!("{}: {}", error.into(), details),
            None => error.into(),
        };

        CallToolResult {
            content: vec![Annotated::new(
                RawContent::Text(RawTextContent { text: error_text }),
                None,
            )],
            is_error: Some(true),
        }
    }

    /// `<Code>: <message>` error response for an engine failure
    pub fn create_workflow_error_response(error: &WorkflowError) -> CallToolResult {
        tracing::debug!("Tool call failed with {}: {}", error.code(), error);
        Self::create_error_response(error.code(), Some(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait::async_trait]
    impl McpTool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echo the arguments back"
        }

        fn schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn execute(
            &self,
            arguments: serde_json::Map<String, serde_json::Value>,
            _context: &ToolContext,
        ) -> std::result::Result<CallToolResult, McpError> {
            BaseToolImpl::create_json_response(&arguments)
        }
    }

    fn text_of(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            RawContent::Text(text) => &text.text,
            _ => panic!("expected text content"),
        }
    }

    #[test]
    fn test_registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(EchoTool);

        assert_eq!(registry.len(), 1);
        assert!(registry.get_tool("echo").is_some());
        assert!(registry.get_tool("missing").is_none());
        assert_eq!(registry.list_tool_names(), vec!["echo"]);

        let tools = registry.list_tools();
        assert_eq!(tools[0].name, "echo");
        assert_eq!(tools[0].input_schema["type"], "object");
    }

    #[test]
    fn test_workflow_error_response_shape() {
        let result = BaseToolImpl::create_workflow_error_response(&WorkflowError::TerminalState {
            state: "done".to_string(),
        });

        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).starts_with("TerminalState: "));
        assert!(text_of(&result).contains("done"));
    }

    #[test]
    fn test_parse_arguments_rejects_wrong_shape() {
        #[derive(Debug, serde::Deserialize)]
        struct Needs {
            #[allow(dead_code)]
            id: String,
        }

        let result: std::result::Result<Needs, McpError> =
            BaseToolImpl::parse_arguments(serde_json::Map::new());
        assert!(result.is_err());
    }
}
