use crate::cli::{Cli, DefinitionSubcommand};
use crate::error::CliResult;
use crate::output;
use anyhow::Context;
use flowstate::{Action, Config, DefinitionId, State, WorkflowDefinition};
use std::io::{self, Read};
use std::path::Path;

/// Handle `flowstate definition ...`
pub fn run_definition_command(subcommand: DefinitionSubcommand, config: &Config) -> CliResult<()> {
    let engine = config.build_engine()?;
    let color = Cli::should_use_color();

    let rendered = match subcommand {
        DefinitionSubcommand::Create { file, output } => {
            let definition = read_definition_file(&file)?;
            let created = engine.create_definition(definition)?;
            output::render(&created, output.format, || {
                output::definition_detail(&created, color)
            })?
        }
        DefinitionSubcommand::Get { id, output } => {
            let definition = engine.get_definition(&DefinitionId::new(id))?;
            output::render(&definition, output.format, || {
                output::definition_detail(&definition, color)
            })?
        }
        DefinitionSubcommand::List { output } => {
            let definitions = engine.list_definitions()?;
            output::render(&definitions, output.format, || {
                output::definitions_table(&definitions, color)
            })?
        }
        DefinitionSubcommand::States { id, output } => {
            let states = engine.list_states(&DefinitionId::new(id))?;
            output::render(&states, output.format, || {
                output::states_table(&states, color)
            })?
        }
        DefinitionSubcommand::Actions { id, output } => {
            let actions = engine.list_actions(&DefinitionId::new(id))?;
            output::render(&actions, output.format, || {
                output::actions_table(&actions, color)
            })?
        }
        DefinitionSubcommand::AddState {
            id,
            state_id,
            name,
            initial,
            is_final,
            disabled,
            description,
            output,
        } => {
            let mut state = State::new(state_id, name)
                .with_description(description)
                .with_enabled(!disabled);
            if initial {
                state = state.initial();
            }
            if is_final {
                state = state.terminal();
            }

            let added = engine.add_state(&DefinitionId::new(id), state)?;
            output::render(&added, output.format, || {
                output::states_table(std::slice::from_ref(&added), color)
            })?
        }
        DefinitionSubcommand::AddAction {
            id,
            action_id,
            name,
            from_states,
            to_state,
            disabled,
            description,
            output,
        } => {
            let mut action =
                Action::new(action_id, name, from_states, to_state).with_description(description);
            if disabled {
                action = action.disabled();
            }

            let added = engine.add_action(&DefinitionId::new(id), action)?;
            output::render(&added, output.format, || {
                output::actions_table(std::slice::from_ref(&added), color)
            })?
        }
    };

    println!("{rendered}");
    Ok(())
}

/// Parse a definition from a JSON or YAML file, or from stdin when `file` is `-`
///
/// Files ending in `.json` are read as JSON; everything else goes through the
/// YAML parser, which also accepts JSON.
pub fn read_definition_file(file: &str) -> anyhow::Result<WorkflowDefinition> {
    let (source, content) = if file == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read definition from stdin")?;
        ("stdin".to_string(), content)
    } else {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read definition file '{file}'"))?;
        (file.to_string(), content)
    };

    let is_json = Path::new(file)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let definition = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON definition from {source}"))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML definition from {source}"))?
    };

    Ok(definition)
}
