//! Workflow system data structures and the state-machine engine
//!
//! A [`WorkflowDefinition`] declares states and the actions that move between
//! them. The [`WorkflowEngine`] accepts definitions that pass the
//! [`Validator`], starts [`WorkflowInstance`]s from them and fires actions.

mod action;
mod definition;
mod engine;
mod instance;
mod state;
#[cfg(test)]
pub(crate) mod test_helpers;
mod validator;

pub use action::{Action, ActionId};
pub use definition::{DefinitionId, WorkflowDefinition};
pub use engine::WorkflowEngine;
pub use instance::{HistoryEntry, InstanceId, WorkflowInstance};
pub use state::{State, StateId};
pub use validator::{
    validate_definition, ValidationPolicy, Validator, DEFAULT_MIN_ACTIONS, DEFAULT_MIN_STATES,
};
