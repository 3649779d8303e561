//! Error handling for the Flowstate CLI
//!
//! Errors keep their source chain and carry the exit code the process should
//! end with.

use crate::exit_codes::{exit_code_for, EXIT_ERROR, EXIT_SUCCESS};
use flowstate::{ConfigError, FlowstateError, StorageError, WorkflowError};
use std::error::Error;
use std::fmt;

/// CLI-specific result type that preserves error information
pub type CliResult<T> = Result<T, CliError>;

/// CLI error type that includes both error information and suggested exit code
#[derive(Debug)]
pub struct CliError {
    /// Message shown to the user
    pub message: String,
    /// Process exit code
    pub exit_code: i32,
    /// Underlying error, if any
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

impl CliError {
    /// Create a new CLI error with a message and exit code
    pub fn new(message: impl Into<String>, exit_code: i32) -> Self {
        Self {
            message: message.into(),
            exit_code,
            source: None,
        }
    }

    /// Create a CLI error from another error with a specific exit code
    pub fn from_error<E: Error + Send + Sync + 'static>(error: E, exit_code: i32) -> Self {
        Self {
            message: error.to_string(),
            exit_code,
            source: Some(Box::new(error)),
        }
    }

    /// Create a CLI error with exit code 1 (general error)
    pub fn general<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Self::from_error(error, EXIT_ERROR)
    }

    /// The message followed by every underlying cause
    pub fn full_chain(&self) -> String {
        let mut result = self.message.clone();

        // The wrapped error's own text is already the message
        let mut current = self.source.as_deref().and_then(|e| e.source());
        while let Some(err) = current {
            result.push_str(&format!("\n  Caused by: {err}"));
            current = err.source();
        }

        result
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

impl From<WorkflowError> for CliError {
    fn from(error: WorkflowError) -> Self {
        let exit_code = exit_code_for(error.kind());
        let message = format!("{}: {}", error.code(), error);
        Self {
            message,
            exit_code,
            source: Some(Box::new(error)),
        }
    }
}

impl From<StorageError> for CliError {
    fn from(error: StorageError) -> Self {
        Self::general(error)
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        Self::general(error)
    }
}

impl From<FlowstateError> for CliError {
    fn from(error: FlowstateError) -> Self {
        match error {
            FlowstateError::Workflow(error) => error.into(),
            other => Self::general(other),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(error: anyhow::Error) -> Self {
        Self {
            message: error.to_string(),
            exit_code: EXIT_ERROR,
            source: Some(error.into()),
        }
    }
}

/// Extension trait for converting results to CLI results
pub trait IntoCliResult<T> {
    /// Map the error with exit code 1
    fn cli_general_error(self) -> CliResult<T>;
}

impl<T, E: Error + Send + Sync + 'static> IntoCliResult<T> for Result<T, E> {
    fn cli_general_error(self) -> CliResult<T> {
        self.map_err(CliError::general)
    }
}

/// Convert a CliResult to an exit code, printing the full error chain if needed
pub fn handle_cli_result<T>(result: CliResult<T>) -> i32 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.full_chain());
            e.exit_code
        }
    }
}
