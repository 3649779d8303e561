//! Structural validation of workflow definitions

use crate::error::ValidationError;
use crate::workflow::WorkflowDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default minimum number of states a definition must declare
pub const DEFAULT_MIN_STATES: usize = 2;

/// Default minimum number of actions a definition must declare
pub const DEFAULT_MIN_ACTIONS: usize = 1;

/// Size requirements applied before the structural checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Minimum number of states (0 disables the check)
    #[serde(default = "default_min_states", alias = "minStates")]
    pub min_states: usize,
    /// Minimum number of actions (0 disables the check)
    #[serde(default = "default_min_actions", alias = "minActions")]
    pub min_actions: usize,
}

fn default_min_states() -> usize {
    DEFAULT_MIN_STATES
}

fn default_min_actions() -> usize {
    DEFAULT_MIN_ACTIONS
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_states: DEFAULT_MIN_STATES,
            min_actions: DEFAULT_MIN_ACTIONS,
        }
    }
}

impl ValidationPolicy {
    /// A policy with no size requirements
    pub fn permissive() -> Self {
        Self {
            min_states: 0,
            min_actions: 0,
        }
    }
}

/// Accepts or rejects workflow definitions
///
/// Checks run in a fixed order and the first failure is reported:
///
/// 1. state count against the policy
/// 2. action count against the policy
/// 3. exactly one initial state
/// 4. unique state ids
/// 5. every action target and source is a declared state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    policy: ValidationPolicy,
}

impl Validator {
    /// Create a validator with the given policy
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    /// The policy in effect
    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Validate a definition
    pub fn validate(&self, definition: &WorkflowDefinition) -> Result<(), ValidationError> {
        if definition.states.len() < self.policy.min_states {
            return Err(ValidationError::TooFewStates {
                required: self.policy.min_states,
                found: definition.states.len(),
            });
        }

        if definition.actions.len() < self.policy.min_actions {
            return Err(ValidationError::TooFewActions {
                required: self.policy.min_actions,
                found: definition.actions.len(),
            });
        }

        let initial_count = definition.initial_state_count();
        if initial_count != 1 {
            return Err(ValidationError::InitialStateCount {
                found: initial_count,
            });
        }

        let mut state_ids = HashSet::with_capacity(definition.states.len());
        for state in &definition.states {
            if !state_ids.insert(&state.id) {
                return Err(ValidationError::DuplicateStateId {
                    state: state.id.to_string(),
                });
            }
        }

        for action in &definition.actions {
            let unknown = std::iter::once(&action.to_state)
                .chain(action.from_states.iter())
                .find(|state| !state_ids.contains(state));

            if let Some(state) = unknown {
                return Err(ValidationError::UnknownStateReference {
                    action: action.id.to_string(),
                    state: state.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Validate a definition with the default policy
pub fn validate_definition(definition: &WorkflowDefinition) -> Result<(), ValidationError> {
    Validator::default().validate(definition)
}
