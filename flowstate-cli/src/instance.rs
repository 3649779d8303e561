use crate::cli::{Cli, InstanceSubcommand};
use crate::error::CliResult;
use crate::output;
use flowstate::{ActionId, Config, DefinitionId, InstanceId};

/// Handle `flowstate instance ...`
pub fn run_instance_command(subcommand: InstanceSubcommand, config: &Config) -> CliResult<()> {
    let engine = config.build_engine()?;
    let color = Cli::should_use_color();

    let rendered = match subcommand {
        InstanceSubcommand::Start {
            definition_id,
            output,
        } => {
            let instance = engine.start_instance(&DefinitionId::new(definition_id))?;
            output::render(&instance, output.format, || {
                output::instance_detail(&instance, color)
            })?
        }
        InstanceSubcommand::Get { id, output } => {
            let instance = engine.get_instance(&InstanceId::new(id))?;
            output::render(&instance, output.format, || {
                output::instance_detail(&instance, color)
            })?
        }
        InstanceSubcommand::List { definition, output } => {
            let instances = match definition {
                Some(definition_id) => {
                    engine.list_instances_for(&DefinitionId::new(definition_id))?
                }
                None => engine.list_instances()?,
            };
            output::render(&instances, output.format, || {
                output::instances_table(&instances, color)
            })?
        }
        InstanceSubcommand::Execute {
            id,
            action_id,
            output,
        } => {
            let instance =
                engine.execute_action(&InstanceId::new(id), &ActionId::new(action_id))?;
            output::render(&instance, output.format, || {
                output::instance_detail(&instance, color)
            })?
        }
        InstanceSubcommand::Actions { id, output } => {
            let actions = engine.available_actions(&InstanceId::new(id))?;
            output::render(&actions, output.format, || {
                output::actions_table(&actions, color)
            })?
        }
    };

    println!("{rendered}");
    Ok(())
}
