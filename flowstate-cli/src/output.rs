//! Rendering of definitions, instances and their parts
//!
//! JSON and YAML output is the entity's wire form. Table output is for people
//! and is colored when `color` is set.

use crate::cli::OutputFormat;
use crate::error::{CliResult, IntoCliResult};
use colored::*;
use flowstate::{Action, State, WorkflowDefinition, WorkflowInstance};
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Style},
    Table, Tabled,
};

#[derive(Tabled)]
struct DefinitionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Initial")]
    initial: String,
    #[tabled(rename = "States")]
    states: usize,
    #[tabled(rename = "Actions")]
    actions: usize,
}

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
}

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Definition")]
    definition: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Steps")]
    steps: usize,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "#")]
    step: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "At")]
    at: String,
}

/// Serialize `value` for the machine formats, or build the table
pub fn render<T, F>(value: &T, format: OutputFormat, table: F) -> CliResult<String>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).cli_general_error(),
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map(|yaml| yaml.trim_end().to_string())
            .cli_general_error(),
        OutputFormat::Table => Ok(table()),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn state_kind(state: &State) -> &'static str {
    match (state.is_initial, state.is_final) {
        (true, true) => "initial, final",
        (true, false) => "initial",
        (false, true) => "final",
        (false, false) => "",
    }
}

fn finish(mut table: Table, color: bool) -> String {
    table.with(Style::modern());
    if color {
        table.with(Modify::new(Rows::one(0)).with(Color::FG_BRIGHT_CYAN));
    }
    table.with(Modify::new(Rows::new(1..)).with(Alignment::left()));
    table.to_string()
}

fn heading(label: &str, value: &str, color: bool) -> String {
    if color {
        format!("{} {}", label.bright_white().bold(), value.cyan())
    } else {
        format!("{label} {value}")
    }
}

/// All definitions, one row each
pub fn definitions_table(definitions: &[WorkflowDefinition], color: bool) -> String {
    if definitions.is_empty() {
        return "No definitions found.".to_string();
    }

    let rows = definitions.iter().map(|definition| DefinitionRow {
        id: definition.id.to_string(),
        initial: definition
            .initial_state()
            .map(|state| state.id.to_string())
            .unwrap_or_default(),
        states: definition.states.len(),
        actions: definition.actions.len(),
    });

    finish(Table::new(rows), color)
}

/// States with initial rows green and final rows yellow
pub fn states_table(states: &[State], color: bool) -> String {
    if states.is_empty() {
        return "No states.".to_string();
    }

    let rows = states.iter().map(|state| StateRow {
        id: state.id.to_string(),
        name: state.name.clone(),
        kind: state_kind(state),
        enabled: yes_no(state.enabled),
        description: state.description.clone(),
    });
    let mut table = Table::new(rows);

    if color {
        for (i, state) in states.iter().enumerate() {
            let row = Rows::one(i + 1);
            if state.is_initial {
                table.with(Modify::new(row).with(Color::FG_GREEN));
            } else if state.is_final {
                table.with(Modify::new(row).with(Color::FG_YELLOW));
            }
        }
    }

    finish(table, color)
}

/// Actions with disabled rows red
pub fn actions_table(actions: &[Action], color: bool) -> String {
    if actions.is_empty() {
        return "No actions.".to_string();
    }

    let rows = actions.iter().map(|action| ActionRow {
        id: action.id.to_string(),
        name: action.name.clone(),
        from: action
            .from_states
            .iter()
            .map(|state| state.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        to: action.to_state.to_string(),
        enabled: yes_no(action.enabled),
    });
    let mut table = Table::new(rows);

    if color {
        for (i, action) in actions.iter().enumerate() {
            if !action.enabled {
                table.with(Modify::new(Rows::one(i + 1)).with(Color::FG_RED));
            }
        }
    }

    finish(table, color)
}

/// A definition with its states and actions
pub fn definition_detail(definition: &WorkflowDefinition, color: bool) -> String {
    format!(
        "{}\n\n{}\n{}\n\n{}\n{}",
        heading("Definition", definition.id.as_str(), color),
        "States:",
        states_table(&definition.states, color),
        "Actions:",
        actions_table(&definition.actions, color),
    )
}

/// All instances, one row each
pub fn instances_table(instances: &[WorkflowInstance], color: bool) -> String {
    if instances.is_empty() {
        return "No instances found.".to_string();
    }

    let rows = instances.iter().map(|instance| InstanceRow {
        id: instance.id.to_string(),
        definition: instance.definition_id.to_string(),
        state: instance.current_state.to_string(),
        steps: instance.history.len(),
    });

    finish(Table::new(rows), color)
}

/// An instance with its history
pub fn instance_detail(instance: &WorkflowInstance, color: bool) -> String {
    let mut out = format!(
        "{}\n  definition: {}\n  state:      {}\n",
        heading("Instance", instance.id.as_str(), color),
        instance.definition_id,
        instance.current_state,
    );

    if instance.history.is_empty() {
        out.push_str("\nNo actions executed yet.");
    } else {
        let rows = instance
            .history
            .iter()
            .enumerate()
            .map(|(i, entry)| HistoryRow {
                step: i + 1,
                action: entry.action_id.to_string(),
                at: entry.timestamp.to_rfc3339(),
            });
        out.push_str("\nHistory:\n");
        out.push_str(&finish(Table::new(rows), color));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> WorkflowDefinition {
        WorkflowDefinition::new("orders")
            .with_state(State::new("placed", "Placed").initial())
            .with_state(State::new("shipped", "Shipped").terminal())
            .with_action(Action::new("ship", "Ship", ["placed"], "shipped"))
            .with_action(Action::new("skip", "Skip", ["placed"], "shipped").disabled())
    }

    #[test]
    fn test_render_json_is_wire_format() {
        let json = render(&definition(), OutputFormat::Json, || unreachable!()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["id"], "orders");
        assert_eq!(value["states"][0]["isInitial"], true);
        assert_eq!(value["actions"][0]["fromStates"][0], "placed");
    }

    #[test]
    fn test_render_yaml_round_trips() {
        let yaml = render(&definition(), OutputFormat::Yaml, || unreachable!()).unwrap();
        let parsed: WorkflowDefinition = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, definition());
    }

    #[test]
    fn test_render_table_uses_builder() {
        let out = render(&definition(), OutputFormat::Table, || "table".to_string()).unwrap();
        assert_eq!(out, "table");
    }

    #[test]
    fn test_definition_detail_lists_parts() {
        let out = definition_detail(&definition(), false);

        assert!(out.starts_with("Definition orders"));
        assert!(out.contains("placed"));
        assert!(out.contains("initial"));
        assert!(out.contains("Skip"));
        assert!(!out.contains('\u{1b}'), "no escape codes without color");
    }

    #[test]
    fn test_definitions_table() {
        let out = definitions_table(&[definition()], false);
        assert!(out.contains("orders"));
        assert!(out.contains("placed"));

        assert_eq!(definitions_table(&[], false), "No definitions found.");
    }

    #[test]
    fn test_instance_detail_shows_history() {
        let mut instance = WorkflowInstance::new("orders".into(), "placed".into());
        assert!(instance_detail(&instance, false).contains("No actions executed yet."));

        let entry: flowstate::HistoryEntry = serde_json::from_value(serde_json::json!({
            "actionId": "ship",
            "timestamp": "2026-01-02T03:04:05Z"
        }))
        .unwrap();
        instance.history.push(entry);
        instance.current_state = "shipped".into();

        let out = instance_detail(&instance, false);
        assert!(out.contains("state:      shipped"));
        assert!(out.contains("2026-01-02T03:04:05+00:00"));
    }
}
