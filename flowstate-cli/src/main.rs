use std::process;

use clap::CommandFactory;
use flowstate::{Config, StorageKind};
use flowstate_cli::cli::{Cli, Commands};
use flowstate_cli::error::{handle_cli_result, CliError};
use flowstate_cli::exit_codes::{EXIT_ERROR, EXIT_SUCCESS};
use flowstate_cli::{completions, definition, instance, logging, validate};

#[tokio::main]
async fn main() {
    let mut cli = Cli::parse_args();

    // Fast path for help - avoid expensive initialization
    let Some(command) = cli.command.take() else {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("Error: {e}");
            process::exit(EXIT_ERROR);
        }
        process::exit(EXIT_SUCCESS);
    };

    let level = logging::level_for(cli.quiet, cli.debug, cli.verbose);

    // Configuration loads before the global subscriber exists
    let config = match logging::with_stderr(level, || load_config(&cli)) {
        Ok(config) => config,
        Err(e) => {
            let code = handle_cli_result::<()>(Err(e));
            eprintln!("\nExample configuration:\n{}", Config::example_yaml_config());
            process::exit(code);
        }
    };

    if matches!(command, Commands::Serve) {
        logging::init_server(level, &logging::server_log_path(&config.data_dir));
    } else {
        logging::init_stderr(level);
    }

    tracing::debug!(
        "Using {} storage at {}",
        config.storage,
        config.data_dir.display()
    );

    let exit_code = match command {
        Commands::Serve => {
            tracing::info!("Starting MCP server");
            run_server(config).await
        }
        Commands::Definition { subcommand } => {
            handle_cli_result(definition::run_definition_command(subcommand, &config))
        }
        Commands::Instance { subcommand } => {
            handle_cli_result(instance::run_instance_command(subcommand, &config))
        }
        Commands::Validate { file, format } => {
            match validate::run_validate_command(&file, cli.quiet, &config, format) {
                Ok(code) => code,
                Err(e) => handle_cli_result::<()>(Err(e)),
            }
        }
        Commands::Completion { shell } => {
            handle_cli_result(completions::print_completion(shell).map_err(CliError::from))
        }
    };

    process::exit(exit_code);
}

/// Layer the command-line overrides on top of env vars and the YAML file
fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = match &cli.config {
        Some(path) => Config::with_yaml_file(path)?,
        None => Config::new(),
    };

    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if cli.memory {
        config.storage = StorageKind::Memory;
    }

    Ok(config)
}

async fn run_server(config: Config) -> i32 {
    use flowstate::mcp::McpServer;
    use rmcp::serve_server;
    use rmcp::transport::io::stdio;
    use tokio_util::sync::CancellationToken;

    let server = match McpServer::from_config(&config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to create MCP server: {}", e);
            eprintln!("Error: {e}");
            return EXIT_ERROR;
        }
    };

    let ct = CancellationToken::new();
    let ct_clone = ct.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            ct_clone.cancel();
        }
    });

    match serve_server(server, stdio()).await {
        Ok(running) => {
            tracing::info!("MCP server started successfully");

            tokio::select! {
                _ = ct.cancelled() => {
                    tracing::info!("MCP server cancelled");
                }
                result = running.waiting() => {
                    if let Err(e) = result {
                        tracing::error!("MCP server task failed: {}", e);
                        return EXIT_ERROR;
                    }
                }
            }

            tracing::info!("MCP server exited successfully");
            EXIT_SUCCESS
        }
        Err(e) => {
            tracing::error!("MCP server error: {}", e);
            EXIT_ERROR
        }
    }
}
