//! Exit code constants for CLI commands
//!
//! - 0: Success
//! - 1: General, storage or configuration error
//! - 2: Validation error or rejected workflow operation
//! - 3: Definition or instance not found

use flowstate::ErrorKind;

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// General, storage or configuration error
pub const EXIT_ERROR: i32 = 1;

/// The request broke a workflow rule
pub const EXIT_VALIDATION: i32 = 2;

/// The addressed entity does not exist
pub const EXIT_NOT_FOUND: i32 = 3;

/// Exit code for an engine failure category
pub fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::NotFound => EXIT_NOT_FOUND,
        ErrorKind::ValidationFailed | ErrorKind::TransitionRejected | ErrorKind::DuplicateId => {
            EXIT_VALIDATION
        }
        ErrorKind::Storage => EXIT_ERROR,
    }
}
