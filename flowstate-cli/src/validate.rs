use crate::cli::ValidateFormat;
use crate::definition::read_definition_file;
use crate::error::{CliResult, IntoCliResult};
use crate::exit_codes::{EXIT_SUCCESS, EXIT_VALIDATION};
use colored::*;
use flowstate::{Config, StateId, Validator, WorkflowDefinition};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// Outcome of checking one definition file
#[derive(Debug, Clone, Serialize)]
pub struct DefinitionReport {
    pub file: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub warnings: Vec<String>,
}

impl DefinitionReport {
    fn exit_code(&self) -> i32 {
        if self.valid {
            EXIT_SUCCESS
        } else {
            EXIT_VALIDATION
        }
    }
}

/// Run the validator and the structural lints over a parsed definition
pub fn check_definition(
    file: &str,
    definition: &WorkflowDefinition,
    validator: &Validator,
) -> DefinitionReport {
    match validator.validate(definition) {
        Ok(()) => DefinitionReport {
            file: file.to_string(),
            valid: true,
            code: None,
            message: None,
            warnings: structural_warnings(definition),
        },
        Err(e) => DefinitionReport {
            file: file.to_string(),
            valid: false,
            code: Some(e.code()),
            message: Some(e.to_string()),
            warnings: Vec::new(),
        },
    }
}

/// Problems that do not make a definition invalid but usually indicate a mistake
///
/// Only meaningful for definitions the validator accepted.
pub fn structural_warnings(definition: &WorkflowDefinition) -> Vec<String> {
    let mut warnings = Vec::new();
    let enabled: Vec<_> = definition.actions.iter().filter(|a| a.enabled).collect();

    let mut reachable: HashSet<&StateId> = HashSet::new();
    let mut queue: VecDeque<&StateId> = VecDeque::new();
    if let Some(initial) = definition.initial_state() {
        reachable.insert(&initial.id);
        queue.push_back(&initial.id);
    }
    while let Some(current) = queue.pop_front() {
        let is_final = definition.state(current).is_some_and(|s| s.is_final);
        if is_final {
            continue;
        }
        for action in enabled.iter().filter(|a| a.fires_from(current)) {
            if reachable.insert(&action.to_state) {
                queue.push_back(&action.to_state);
            }
        }
    }

    for state in &definition.states {
        if !reachable.contains(&state.id) {
            warnings.push(format!(
                "State '{}' is unreachable from the initial state",
                state.id
            ));
        }
    }

    for state in definition.states.iter().filter(|s| !s.is_final) {
        if !enabled.iter().any(|a| a.fires_from(&state.id)) {
            warnings.push(format!(
                "State '{}' is not final but no enabled action leaves it",
                state.id
            ));
        }
    }

    warnings
}

fn print_text_report(report: &DefinitionReport, quiet: bool) {
    if let (Some(code), Some(message)) = (report.code, &report.message) {
        println!("{} [{}] {}", "ERROR".red(), code, message);
        if !quiet {
            println!("\n{} {} is invalid.", "✗".red(), report.file);
        }
        return;
    }

    if quiet {
        return;
    }

    for warning in &report.warnings {
        println!("{} {}", "WARN".yellow(), warning);
    }

    if report.warnings.is_empty() {
        println!("{} {} is valid.", "✓".green(), report.file);
    } else {
        println!(
            "\n{} {} is valid with {} warning(s).",
            "⚠".yellow(),
            report.file,
            report.warnings.len()
        );
    }
}

/// Handle `flowstate validate`, returning the exit code
pub fn run_validate_command(
    file: &str,
    quiet: bool,
    config: &Config,
    format: ValidateFormat,
) -> CliResult<i32> {
    let definition = read_definition_file(file)?;
    let validator = Validator::new(config.validation);
    let report = check_definition(file, &definition, &validator);

    match format {
        ValidateFormat::Text => print_text_report(&report, quiet),
        ValidateFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).cli_general_error()?)
        }
    }

    Ok(report.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowstate::{Action, State, ValidationPolicy};

    fn linear() -> WorkflowDefinition {
        WorkflowDefinition::new("linear")
            .with_state(State::new("S1", "Start").initial())
            .with_state(State::new("S2", "Middle"))
            .with_state(State::new("S3", "Done").terminal())
            .with_action(Action::new("A1", "Go", ["S1"], "S2"))
            .with_action(Action::new("A2", "Finish", ["S2"], "S3"))
    }

    #[test]
    fn test_clean_definition_has_no_warnings() {
        let report = check_definition("linear.yaml", &linear(), &Validator::default());

        assert!(report.valid);
        assert!(report.warnings.is_empty());
        assert_eq!(report.exit_code(), EXIT_SUCCESS);
    }

    #[test]
    fn test_unreachable_state_warns() {
        let definition = linear().with_state(State::new("S4", "Orphan").terminal());
        let warnings = structural_warnings(&definition);

        assert_eq!(
            warnings,
            vec!["State 'S4' is unreachable from the initial state"]
        );
    }

    #[test]
    fn test_disabled_action_leaves_dead_end() {
        let mut definition = linear();
        definition.actions[1] = Action::new("A2", "Finish", ["S2"], "S3").disabled();
        let warnings = structural_warnings(&definition);

        assert!(warnings.contains(&"State 'S3' is unreachable from the initial state".to_string()));
        assert!(warnings
            .contains(&"State 'S2' is not final but no enabled action leaves it".to_string()));
    }

    #[test]
    fn test_no_path_through_final_states() {
        let definition = WorkflowDefinition::new("through-final")
            .with_state(State::new("S1", "Start").initial().terminal())
            .with_state(State::new("S2", "Beyond").terminal())
            .with_action(Action::new("A1", "Go", ["S1"], "S2"));

        assert_eq!(
            structural_warnings(&definition),
            vec!["State 'S2' is unreachable from the initial state"]
        );
    }

    #[test]
    fn test_invalid_definition_reports_code() {
        let definition = WorkflowDefinition::new("bad")
            .with_state(State::new("S1", "Start").initial())
            .with_state(State::new("S2", "Done").terminal())
            .with_action(Action::new("A1", "Go", ["S1"], "S9"));
        let report = check_definition("bad.yaml", &definition, &Validator::default());

        assert!(!report.valid);
        assert_eq!(report.code, Some("UnknownStateReference"));
        assert_eq!(report.exit_code(), EXIT_VALIDATION);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["code"], "UnknownStateReference");
    }

    #[test]
    fn test_policy_comes_from_config() {
        let definition = WorkflowDefinition::new("tiny")
            .with_state(State::new("S1", "Only").initial().terminal());

        let strict = check_definition("tiny.yaml", &definition, &Validator::default());
        assert_eq!(strict.code, Some("TooFewStates"));

        let permissive = check_definition(
            "tiny.yaml",
            &definition,
            &Validator::new(ValidationPolicy::permissive()),
        );
        assert!(permissive.valid);
    }
}
