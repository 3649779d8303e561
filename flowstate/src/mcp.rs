//! Model Context Protocol (MCP) server support

use crate::config::Config;
use crate::workflow::WorkflowEngine;
use crate::Result;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{Error as McpError, RoleServer, ServerHandler};
use std::sync::Arc;

pub mod tool_registry;
pub mod tools;
pub mod types;

use tool_registry::{ToolContext, ToolRegistry};

const SERVER_NAME: &str = "Flowstate";

const INSTRUCTIONS: &str = "A workflow state-machine server. Use definition_* tools to \
create workflow definitions (states plus the actions that move between them) and to \
extend them. Use instance_start to run a definition, instance_execute to fire actions \
and instance_actions to see which actions are currently possible. Failed calls return \
an error result whose text starts with a reason code such as IllegalTransition.";

/// MCP server exposing the workflow engine as tools
#[derive(Clone)]
pub struct McpServer {
    tool_registry: Arc<ToolRegistry>,
    tool_context: Arc<ToolContext>,
}

impl McpServer {
    /// Create a server over an engine
    pub fn new(engine: WorkflowEngine) -> Self {
        Self::with_engine(Arc::new(engine))
    }

    /// Create a server sharing an existing engine
    pub fn with_engine(engine: Arc<WorkflowEngine>) -> Self {
        let mut tool_registry = ToolRegistry::new();
        tools::register_workflow_tools(&mut tool_registry);
        tracing::debug!("Registered {} MCP tools", tool_registry.len());

        Self {
            tool_registry: Arc::new(tool_registry),
            tool_context: Arc::new(ToolContext::new(engine)),
        }
    }

    /// Create a server over the stores and policy named by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.build_engine()?))
    }

    /// The engine behind the tools
    pub fn engine(&self) -> &Arc<WorkflowEngine> {
        &self.tool_context.engine
    }

    /// Names of all registered tools, sorted
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_registry.list_tool_names()
    }

    /// Dispatch a tool call by name
    pub async fn call(
        &self,
        name: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<CallToolResult, McpError> {
        match self.tool_registry.get_tool(name) {
            Some(tool) => {
                tracing::debug!("Calling tool {}", name);
                tool.execute(arguments, &self.tool_context).await
            }
            None => Err(McpError::invalid_request(
                format!("Unknown tool: {name}"),
                None,
            )),
        }
    }
}

impl ServerHandler for McpServer {
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_registry.list_tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        self.call(&request.name, request.arguments.unwrap_or_default())
            .await
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities {
                prompts: None,
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                resources: None,
                logging: None,
                completions: None,
                experimental: None,
            },
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: crate::VERSION.into(),
            },
            instructions: Some(INSTRUCTIONS.into()),
        }
    }
}
