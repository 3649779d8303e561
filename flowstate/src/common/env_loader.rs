//! Environment variable loading utilities
//!
//! A prefixed loader that reports unparsable values instead of silently
//! ignoring them.

use crate::error::ConfigError;
use std::env;
use std::str::FromStr;

/// Loads variables sharing a prefix, e.g. `FLOWSTATE_MIN_STATES`
#[derive(Debug)]
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    /// Create a new environment loader with the given prefix
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    /// Full variable name for a suffix
    pub fn key(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    /// Load a value, distinguishing "unset" from "set but invalid"
    ///
    /// Empty values count as unset.
    pub fn load_checked<T>(&self, suffix: &str, hint: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
    {
        let key = self.key(suffix);
        match env::var(&key) {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    field: key,
                    value: raw,
                    hint: hint.to_string(),
                }),
            Err(_) => Ok(None),
        }
    }
}
