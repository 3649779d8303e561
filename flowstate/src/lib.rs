//! # Flowstate
//!
//! A workflow state-machine engine.
//!
//! ## Features
//!
//! - **Definitions**: states and the actions that move between them, checked
//!   by a structural validator before they are accepted
//! - **Instances**: executions of a definition that advance one action at a
//!   time and keep a timestamped history
//! - **Incremental edits**: states and actions can be added to a live
//!   definition, with rollback when the result would be invalid
//! - **Storage**: in-memory or JSON-file backends behind one `Store` trait
//! - **MCP Support**: every engine operation exposed as a Model Context
//!   Protocol tool
//!
//! ## Quick Start
//!
//! ```rust
//! use flowstate::prelude::*;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let engine = WorkflowEngine::new(WorkflowStores::memory(), ValidationPolicy::default());
//!
//! let definition = engine.create_definition(
//!     WorkflowDefinition::new("ticket")
//!         .with_state(State::new("open", "Open").initial())
//!         .with_state(State::new("closed", "Closed").terminal())
//!         .with_action(Action::new("close", "Close", ["open"], "closed")),
//! )?;
//!
//! let instance = engine.start_instance(&definition.id)?;
//! let instance = engine.execute_action(&instance.id, &ActionId::new("close"))?;
//! assert_eq!(instance.current_state.as_str(), "closed");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Shared utilities
pub mod common;

/// Layered configuration
pub mod config;

/// Error types used throughout the library
pub mod error;

/// Model Context Protocol (MCP) server support
pub mod mcp;

/// Storage abstractions and implementations
pub mod storage;

/// Workflow definitions, instances and the engine
pub mod workflow;

pub use config::{Config, StorageKind};
pub use error::{
    ConfigError, ErrorKind, FlowstateError, Result, StorageError, ValidationError, WorkflowError,
    WorkflowResult,
};
pub use storage::{FileSystemStore, Identified, MemoryStore, Store, WorkflowStores};
pub use workflow::{
    Action, ActionId, DefinitionId, HistoryEntry, InstanceId, State, StateId, ValidationPolicy,
    Validator, WorkflowDefinition, WorkflowEngine, WorkflowInstance,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, ActionId, Config, DefinitionId, ErrorKind, FlowstateError, InstanceId, Result,
        State, StateId, ValidationPolicy, Validator, WorkflowDefinition, WorkflowEngine,
        WorkflowError, WorkflowInstance, WorkflowStores,
    };

    pub use crate::mcp::McpServer;
}
