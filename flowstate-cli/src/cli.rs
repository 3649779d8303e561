use clap::{Args, Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::io;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidateFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "flowstate")]
#[command(version)]
#[command(about = "Define, validate and run finite-state workflows")]
#[command(long_about = "
flowstate manages workflow definitions (states plus the actions that move
between them) and runs instances of them. Everything is stored under the
data directory, so successive commands see each other's changes.

Example usage:
  flowstate definition create order.yaml     # Validate and store a definition
  flowstate instance start order             # Start an instance
  flowstate instance execute <id> ship       # Fire an action
  flowstate serve                            # Run as MCP server
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Data directory (overrides FLOWSTATE_DATA_DIR and flowstate.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Keep everything in memory; only useful with `serve`
    #[arg(long, global = true)]
    pub memory: bool,

    /// Read configuration from this YAML file instead of searching for one
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run as MCP server on stdio
    #[command(long_about = "
Runs flowstate as an MCP server over stdio. Every engine operation is
exposed as a tool (definition_create, instance_execute, ...). Logs are
written to <data-dir>/mcp.log, or to FLOWSTATE_LOG_FILE when set.

Example:
  flowstate serve
  flowstate --memory serve    # Nothing is persisted
")]
    Serve,
    /// Create and inspect workflow definitions
    Definition {
        #[command(subcommand)]
        subcommand: DefinitionSubcommand,
    },
    /// Start and advance workflow instances
    Instance {
        #[command(subcommand)]
        subcommand: InstanceSubcommand,
    },
    /// Check a definition file without storing it
    #[command(long_about = "
Runs the definition validator on a JSON or YAML file using the configured
minimum state and action counts. Also warns about states that cannot be
reached from the initial state and non-final states no action leaves.

Exit codes:
  0 - Definition is valid (warnings may have been printed)
  1 - File could not be read or parsed
  2 - Definition is invalid
")]
    Validate {
        /// Definition file, or - for stdin
        file: String,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: ValidateFormat,
    },
    /// Generate shell completion scripts
    #[command(long_about = "
Generates shell completion scripts for bash, zsh, fish and powershell.

Examples:
  flowstate completion bash > ~/.local/share/bash-completion/completions/flowstate
  flowstate completion zsh > ~/.zfunc/_flowstate
")]
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Output selection shared by every command that prints entities
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct FormatArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum DefinitionSubcommand {
    /// Validate and store a definition from a JSON or YAML file
    Create {
        /// Definition file, or - for stdin
        file: String,
        #[command(flatten)]
        output: FormatArgs,
    },
    /// Show one definition
    Get {
        id: String,
        #[command(flatten)]
        output: FormatArgs,
    },
    /// List all definitions
    List {
        #[command(flatten)]
        output: FormatArgs,
    },
    /// List the states of a definition
    States {
        id: String,
        #[command(flatten)]
        output: FormatArgs,
    },
    /// List the actions of a definition
    Actions {
        id: String,
        #[command(flatten)]
        output: FormatArgs,
    },
    /// Add a state to a definition
    AddState {
        /// Definition id
        id: String,
        /// Id of the new state
        #[arg(long)]
        state_id: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Make this the initial state
        #[arg(long)]
        initial: bool,
        /// Make this a final state
        #[arg(long = "final")]
        is_final: bool,
        /// Mark the state disabled
        #[arg(long)]
        disabled: bool,
        #[arg(long, default_value = "")]
        description: String,
        #[command(flatten)]
        output: FormatArgs,
    },
    /// Add an action to a definition
    AddAction {
        /// Definition id
        id: String,
        /// Id of the new action
        #[arg(long)]
        action_id: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Source states
        #[arg(long = "from", required = true, num_args = 1..)]
        from_states: Vec<String>,
        /// Destination state
        #[arg(long = "to")]
        to_state: String,
        /// Create the action disabled
        #[arg(long)]
        disabled: bool,
        #[arg(long, default_value = "")]
        description: String,
        #[command(flatten)]
        output: FormatArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum InstanceSubcommand {
    /// Start an instance of a definition
    Start {
        definition_id: String,
        #[command(flatten)]
        output: FormatArgs,
    },
    /// Show an instance and its history
    Get {
        id: String,
        #[command(flatten)]
        output: FormatArgs,
    },
    /// List instances
    List {
        /// Only instances of this definition
        #[arg(long)]
        definition: Option<String>,
        #[command(flatten)]
        output: FormatArgs,
    },
    /// Fire an action on an instance
    Execute {
        id: String,
        action_id: String,
        #[command(flatten)]
        output: FormatArgs,
    },
    /// List the actions that can fire right now
    Actions {
        id: String,
        #[command(flatten)]
        output: FormatArgs,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    #[allow(dead_code)]
    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(args)
    }

    pub fn is_tty() -> bool {
        io::stdout().is_terminal()
    }

    pub fn should_use_color() -> bool {
        Self::is_tty() && std::env::var("NO_COLOR").is_err()
    }
}
