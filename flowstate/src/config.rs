//! Configuration management for Flowstate
//!
//! Values are layered, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `FLOWSTATE_*` environment variables
//! 3. a `flowstate.yaml` file
//!
//! Callers (the CLI) may override the result further with explicit flags.

use crate::common::env_loader::EnvLoader;
use crate::error::{ConfigError, StorageError};
use crate::storage::WorkflowStores;
use crate::workflow::{ValidationPolicy, WorkflowEngine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILE_NAME: &str = "flowstate.yaml";
const DATA_DIR_NAME: &str = ".flowstate";

/// Where definitions and instances are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Process-local, lost on exit
    Memory,
    /// JSON files under the data directory
    #[default]
    #[serde(alias = "file_system", alias = "fs")]
    Filesystem,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "filesystem" | "file_system" | "fs" => Ok(Self::Filesystem),
            other => Err(format!("unknown storage kind '{other}'")),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Filesystem => write!(f, "filesystem"),
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Size rules applied by the validator
    pub validation: ValidationPolicy,
    /// Storage backend
    pub storage: StorageKind,
    /// Root directory for the filesystem backend and the server log
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validation: ValidationPolicy::default(),
            storage: StorageKind::default(),
            data_dir: Self::default_data_dir(),
        }
    }
}

impl Config {
    /// Load defaults, then environment variables, then the first YAML file found
    ///
    /// A YAML file that cannot be read or fails validation is skipped with a
    /// warning.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env_vars();

        match YamlConfig::load_or_default() {
            Ok(yaml_config) => yaml_config.apply_to_config(&mut config),
            Err(e) => {
                tracing::warn!(
                    "Failed to load YAML configuration, falling back to env vars and defaults: {}",
                    e
                );
            }
        }

        config
    }

    /// Load defaults, then environment variables, then the given YAML file
    ///
    /// Unlike [`Config::new`], a bad file is an error.
    pub fn with_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_vars();
        YamlConfig::load_from_file(path)?.apply_to_config(&mut config);
        Ok(config)
    }

    /// `~/.flowstate`, or `.flowstate` when there is no home directory
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(DATA_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME))
    }

    fn apply_env_vars(&mut self) {
        let loader = EnvLoader::new("FLOWSTATE");

        match loader.load_checked("MIN_STATES", "expected a non-negative integer") {
            Ok(Some(value)) => self.validation.min_states = value,
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring environment override: {}", e),
        }

        match loader.load_checked("MIN_ACTIONS", "expected a non-negative integer") {
            Ok(Some(value)) => self.validation.min_actions = value,
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring environment override: {}", e),
        }

        match loader.load_checked("STORAGE", "expected 'memory' or 'filesystem'") {
            Ok(Some(value)) => self.storage = value,
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring environment override: {}", e),
        }

        if let Ok(Some(dir)) = loader.load_checked::<PathBuf>("DATA_DIR", "expected a path") {
            self.data_dir = dir;
        }
    }

    /// Find the flowstate.yaml configuration file
    ///
    /// The search order is:
    /// 1. Current working directory: `flowstate.yaml`
    /// 2. `~/.config/flowstate/flowstate.yaml`
    /// 3. `~/flowstate.yaml`
    pub fn find_yaml_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(CONFIG_FILE_NAME)];

        if let Some(home_dir) = dirs::home_dir() {
            search_paths.push(
                home_dir
                    .join(".config")
                    .join("flowstate")
                    .join(CONFIG_FILE_NAME),
            );
            search_paths.push(home_dir.join(CONFIG_FILE_NAME));
        }

        let found = search_paths
            .iter()
            .find_map(|path| Self::check_config_file(path));

        match &found {
            Some(path) => tracing::debug!("Found configuration file: {:?}", path),
            None => tracing::debug!("No {} found in any search location", CONFIG_FILE_NAME),
        }
        found
    }

    /// The path, if it names a readable regular file
    pub fn check_config_file(config_path: &Path) -> Option<PathBuf> {
        match config_path.try_exists() {
            Ok(true) if config_path.is_file() => match std::fs::File::open(config_path) {
                Ok(_) => Some(config_path.to_path_buf()),
                Err(e) => {
                    tracing::warn!(
                        "Configuration file {:?} exists but cannot be read: {}",
                        config_path,
                        e
                    );
                    None
                }
            },
            Ok(true) => {
                tracing::debug!("{:?} is not a file", config_path);
                None
            }
            Ok(false) => None,
            Err(e) => {
                tracing::warn!(
                    "Error checking for configuration file {:?}: {}",
                    config_path,
                    e
                );
                None
            }
        }
    }

    /// Open the configured stores
    pub fn open_stores(&self) -> Result<WorkflowStores, StorageError> {
        match self.storage {
            StorageKind::Memory => Ok(WorkflowStores::memory()),
            StorageKind::Filesystem => WorkflowStores::file_system(&self.data_dir),
        }
    }

    /// An engine over the configured stores and policy
    pub fn build_engine(&self) -> Result<WorkflowEngine, StorageError> {
        tracing::debug!(
            "Opening {} storage at {:?} (min_states={}, min_actions={})",
            self.storage,
            self.data_dir,
            self.validation.min_states,
            self.validation.min_actions
        );
        Ok(WorkflowEngine::new(self.open_stores()?, self.validation))
    }

    /// Example file content, shown by the CLI on configuration errors
    pub fn example_yaml_config() -> &'static str {
        "# flowstate.yaml\n\
         min_states: 2\n\
         min_actions: 1\n\
         storage: filesystem\n\
         data_dir: /var/lib/flowstate\n"
    }
}

/// Configuration loaded from a flowstate.yaml file
///
/// Every field is optional; absent fields leave the lower layers in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct YamlConfig {
    /// Minimum number of states
    #[serde(default, alias = "minStates")]
    pub min_states: Option<usize>,
    /// Minimum number of actions
    #[serde(default, alias = "minActions")]
    pub min_actions: Option<usize>,
    /// Storage backend
    #[serde(default)]
    pub storage: Option<StorageKind>,
    /// Data directory
    #[serde(default, alias = "dataDir")]
    pub data_dir: Option<PathBuf>,
}

impl YamlConfig {
    /// Overwrite `config` with every value present here
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(min_states) = self.min_states {
            config.validation.min_states = min_states;
        }
        if let Some(min_actions) = self.min_actions {
            config.validation.min_actions = min_actions;
        }
        if let Some(storage) = self.storage {
            config.storage = storage;
        }
        if let Some(ref data_dir) = self.data_dir {
            config.data_dir = data_dir.clone();
        }
    }

    /// Read, parse and validate a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::info!("Loading YAML configuration from: {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        // An empty file is a valid, empty configuration
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: YamlConfig =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load the first file found by [`Config::find_yaml_config_file`], or defaults
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Config::find_yaml_config_file() {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject values that parse but make no sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref data_dir) = self.data_dir {
            if data_dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "data_dir".to_string(),
                    value: String::new(),
                    hint: "data_dir cannot be empty; omit it to use the default".to_string(),
                });
            }
        }
        Ok(())
    }
}
