//! Unified error handling for the Flowstate library
//!
//! Every failure path returns a typed error with a stable reason code so that
//! callers (the CLI, the MCP tools and tests) can discriminate on cause rather
//! than on success/failure alone.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a workflow definition is rejected by the validator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The definition declares fewer states than the policy requires
    #[error("Workflow must have at least {required} states, found {found}")]
    TooFewStates {
        /// Minimum number of states the policy demands
        required: usize,
        /// Number of states the definition declares
        found: usize,
    },

    /// The definition declares fewer actions than the policy requires
    #[error("Workflow must have at least {required} actions, found {found}")]
    TooFewActions {
        /// Minimum number of actions the policy demands
        required: usize,
        /// Number of actions the definition declares
        found: usize,
    },

    /// Zero or several states are marked initial
    #[error("Workflow must have exactly one initial state, found {found}")]
    InitialStateCount {
        /// Number of states marked initial
        found: usize,
    },

    /// Two states share an id
    #[error("Duplicate state id '{state}'")]
    DuplicateStateId {
        /// The repeated state id
        state: String,
    },

    /// An action refers to a state that is not declared
    #[error("Action '{action}' refers to unknown state '{state}'")]
    UnknownStateReference {
        /// Action holding the dangling reference
        action: String,
        /// The undeclared state id
        state: String,
    },
}

impl ValidationError {
    /// Stable reason code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::TooFewStates { .. } => "TooFewStates",
            ValidationError::TooFewActions { .. } => "TooFewActions",
            ValidationError::InitialStateCount { .. } => "InitialStateCount",
            ValidationError::DuplicateStateId { .. } => "DuplicateStateId",
            ValidationError::UnknownStateReference { .. } => "UnknownStateReference",
        }
    }
}

/// Storage backend errors
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// Reading or writing a stored entity failed
    #[error("IO error on {path}: {source}")]
    Io {
        /// File the operation touched
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A stored entity could not be encoded or decoded
    #[error("Serialization error on {path}: {source}")]
    Serialization {
        /// File holding the entity
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The id cannot be used as a storage key
    #[error("Invalid storage key '{key}': {reason}")]
    InvalidKey {
        /// The rejected key
        key: String,
        /// What makes the key unusable
        reason: String,
    },
}

/// Broad classification of workflow errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A definition or instance does not exist
    NotFound,
    /// The submitted definition, state or action is not acceptable
    ValidationFailed,
    /// The state machine refused to fire an action
    TransitionRejected,
    /// An id collides with an existing one
    DuplicateId,
    /// The storage backend failed
    Storage,
}

/// Errors returned by the workflow engine
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkflowError {
    /// No definition with this id exists
    #[error("Definition '{id}' not found")]
    DefinitionNotFound {
        /// The requested definition id
        id: String,
    },

    /// No instance with this id exists
    #[error("Instance '{id}' not found")]
    InstanceNotFound {
        /// The requested instance id
        id: String,
    },

    /// The definition targeted by a mutation does not exist
    #[error("Workflow '{id}' not found")]
    WorkflowNotFound {
        /// The definition id the mutation targeted
        id: String,
    },

    /// The action is not declared by the instance's definition
    #[error("Action '{action}' not found in workflow definition '{definition}'")]
    ActionNotFound {
        /// The requested action id
        action: String,
        /// Definition the instance was started from
        definition: String,
    },

    /// The action exists but is disabled
    #[error("Action '{action}' is disabled")]
    ActionDisabled {
        /// The disabled action id
        action: String,
    },

    /// The instance's current state is not a source state of the action
    #[error("Invalid transition: current state '{state}' is not a source state of action '{action}'")]
    IllegalTransition {
        /// The requested action id
        action: String,
        /// The instance's current state
        state: String,
    },

    /// The instance sits in a final state
    #[error("No actions allowed from final state '{state}'")]
    TerminalState {
        /// The final state the instance is in
        state: String,
    },

    /// A definition with this id is already stored
    #[error("Workflow with id '{id}' already exists")]
    DuplicateDefinitionId {
        /// The colliding definition id
        id: String,
    },

    /// The definition already has a state with this id
    #[error("State with id '{state}' already exists in workflow '{workflow}'")]
    DuplicateStateId {
        /// Definition being extended
        workflow: String,
        /// The colliding state id
        state: String,
    },

    /// The definition already has an action with this id
    #[error("Action with id '{action}' already exists in workflow '{workflow}'")]
    DuplicateActionId {
        /// Definition being extended
        workflow: String,
        /// The colliding action id
        action: String,
    },

    /// A second initial state was submitted
    #[error("Workflow '{workflow}' already has initial state '{existing}'")]
    MultipleInitialStates {
        /// Definition being extended
        workflow: String,
        /// The state already marked initial
        existing: String,
    },

    /// The definition failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The storage backend failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl WorkflowError {
    /// Stable reason code for this error
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::DefinitionNotFound { .. } => "DefinitionNotFound",
            WorkflowError::InstanceNotFound { .. } => "InstanceNotFound",
            WorkflowError::WorkflowNotFound { .. } => "WorkflowNotFound",
            WorkflowError::ActionNotFound { .. } => "ActionNotFound",
            WorkflowError::ActionDisabled { .. } => "ActionDisabled",
            WorkflowError::IllegalTransition { .. } => "IllegalTransition",
            WorkflowError::TerminalState { .. } => "TerminalState",
            WorkflowError::DuplicateDefinitionId { .. } => "DuplicateDefinitionId",
            WorkflowError::DuplicateStateId { .. } => "DuplicateStateId",
            WorkflowError::DuplicateActionId { .. } => "DuplicateActionId",
            WorkflowError::MultipleInitialStates { .. } => "MultipleInitialStates",
            WorkflowError::Validation(e) => e.code(),
            WorkflowError::Storage(_) => "Storage",
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::DefinitionNotFound { .. }
            | WorkflowError::InstanceNotFound { .. }
            | WorkflowError::WorkflowNotFound { .. } => ErrorKind::NotFound,
            WorkflowError::ActionNotFound { .. }
            | WorkflowError::ActionDisabled { .. }
            | WorkflowError::IllegalTransition { .. }
            | WorkflowError::TerminalState { .. } => ErrorKind::TransitionRejected,
            WorkflowError::DuplicateDefinitionId { .. }
            | WorkflowError::DuplicateStateId { .. }
            | WorkflowError::DuplicateActionId { .. } => ErrorKind::DuplicateId,
            WorkflowError::MultipleInitialStates { .. } | WorkflowError::Validation(_) => {
                ErrorKind::ValidationFailed
            }
            WorkflowError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for engine operations
pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        /// Path to the configuration file that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Failed to parse YAML content from a configuration file
    #[error("Invalid YAML syntax in {path}:\n{source}\n\nHint: Check for proper indentation and YAML formatting")]
    YamlParse {
        /// Path to the configuration file with invalid YAML content
        path: PathBuf,
        /// Underlying YAML parsing error
        #[source]
        source: serde_yaml::Error,
    },

    /// Invalid configuration value for a specific field
    #[error("Invalid configuration value for '{field}': {value}\n{hint}")]
    InvalidValue {
        /// Name of the offending field
        field: String,
        /// The value that was provided
        value: String,
        /// How to fix it
        hint: String,
    },
}

/// The main error type for the Flowstate library
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowstateError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Workflow rule violation or lookup failure
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl From<ValidationError> for FlowstateError {
    fn from(error: ValidationError) -> Self {
        FlowstateError::Workflow(WorkflowError::Validation(error))
    }
}

impl From<StorageError> for FlowstateError {
    fn from(error: StorageError) -> Self {
        FlowstateError::Workflow(WorkflowError::Storage(error))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FlowstateError>;
