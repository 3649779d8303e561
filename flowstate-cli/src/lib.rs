//! Flowstate CLI Library
//!
//! Command-line definitions, command handlers and output rendering for the
//! `flowstate` binary.

/// Command-line interface definitions and argument parsing
pub mod cli;
/// Shell completion generation
pub mod completions;
/// `flowstate definition` handlers
pub mod definition;
/// CLI error type and exit code mapping
pub mod error;
/// Exit codes used by the CLI application
pub mod exit_codes;
/// `flowstate instance` handlers
pub mod instance;
/// Tracing subscriber setup
pub mod logging;
/// Table, JSON and YAML rendering
pub mod output;
/// `flowstate validate` handler
pub mod validate;
