//! Test helper functions for workflow module
//!
//! Shared fixtures so that tests across the workflow module build definitions
//! the same way.

#![cfg(test)]

use crate::storage::WorkflowStores;
use crate::workflow::{Action, State, ValidationPolicy, WorkflowDefinition, WorkflowEngine};

/// `S1` (initial) and `S2` (final) joined by `A1: S1 -> S2`
pub fn create_two_state_definition(id: &str) -> WorkflowDefinition {
    WorkflowDefinition::new(id)
        .with_state(State::new("S1", "Start").initial())
        .with_state(State::new("S2", "End").terminal())
        .with_action(Action::new("A1", "Finish", ["S1"], "S2"))
}

/// A review cycle: draft -> review -> (draft | approved), with a disabled
/// `archive` action and an `approve` action that also lists the final state
/// among its sources
pub fn create_review_definition(id: &str) -> WorkflowDefinition {
    WorkflowDefinition::new(id)
        .with_state(State::new("draft", "Draft").initial())
        .with_state(State::new("review", "In review"))
        .with_state(State::new("approved", "Approved").terminal())
        .with_action(Action::new("submit", "Submit", ["draft"], "review"))
        .with_action(Action::new("reject", "Reject", ["review"], "draft"))
        .with_action(Action::new(
            "approve",
            "Approve",
            ["review", "approved"],
            "approved",
        ))
        .with_action(Action::new("archive", "Archive", ["draft", "review"], "approved").disabled())
}

/// An engine over fresh in-memory stores with the default policy
pub fn create_memory_engine() -> WorkflowEngine {
    WorkflowEngine::new(WorkflowStores::memory(), ValidationPolicy::default())
}
