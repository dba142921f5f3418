//! Runtime configuration
//!
//! `TreeConfig` is the single source of truth for what the running server
//! uses. It is read from the environment once at startup and validated before
//! any service is built.
//!
//! # Environment Variables
//!
//! - `TREE_DB_PATH`: Database file (default: `./data/deftree.db`)
//! - `TREE_SERVER_PORT`: HTTP port (default: 3001)
//! - `TREE_PAGE_SIZE`: Rows per rendered page (default: 50)
//! - `TREE_LABEL_MAX_CHARS`: Label bound in code points (default: 191)
//! - `TREE_ALLOWED_ROLES`: Comma-separated roles allowed to mutate (default: `admin,editor`)

use crate::models::DEFAULT_LABEL_MAX_CHARS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "TREE_DB_PATH";
pub const ENV_SERVER_PORT: &str = "TREE_SERVER_PORT";
pub const ENV_PAGE_SIZE: &str = "TREE_PAGE_SIZE";
pub const ENV_LABEL_MAX_CHARS: &str = "TREE_LABEL_MAX_CHARS";
pub const ENV_ALLOWED_ROLES: &str = "TREE_ALLOWED_ROLES";

pub const DEFAULT_SERVER_PORT: u16 = 3001;
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Largest page the server will render
pub const MAX_PAGE_SIZE: usize = 1000;

/// Invalid configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Server and repository settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConfig {
    pub db_path: PathBuf,
    pub server_port: u16,
    pub page_size: usize,
    pub label_max_chars: usize,
    /// Roles allowed to call mutating routes
    pub allowed_roles: Vec<String>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/deftree.db"),
            server_port: DEFAULT_SERVER_PORT,
            page_size: DEFAULT_PAGE_SIZE,
            label_max_chars: DEFAULT_LABEL_MAX_CHARS,
            allowed_roles: vec!["admin".to_string(), "editor".to_string()],
        }
    }
}

impl TreeConfig {
    /// Read from the process environment, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary variable lookup
    ///
    /// Unset and empty variables both fall back to the default. Set but
    /// unparsable variables are errors, not silently ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            db_path: get(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            server_port: parse_or(get(ENV_SERVER_PORT), ENV_SERVER_PORT, defaults.server_port)?,
            page_size: parse_or(get(ENV_PAGE_SIZE), ENV_PAGE_SIZE, defaults.page_size)?,
            label_max_chars: parse_or(
                get(ENV_LABEL_MAX_CHARS),
                ENV_LABEL_MAX_CHARS,
                defaults.label_max_chars,
            )?,
            allowed_roles: get(ENV_ALLOWED_ROLES)
                .map(|roles| {
                    roles
                        .split(',')
                        .map(|role| role.trim().to_ascii_lowercase())
                        .filter(|role| !role.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.allowed_roles),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::invalid(
                ENV_PAGE_SIZE,
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }
        if self.label_max_chars == 0 {
            return Err(ConfigError::invalid(ENV_LABEL_MAX_CHARS, "must be positive"));
        }
        if self.allowed_roles.is_empty() {
            return Err(ConfigError::invalid(
                ENV_ALLOWED_ROLES,
                "at least one role is required",
            ));
        }
        Ok(())
    }

    /// Whether `role` may call mutating routes (case-insensitive)
    pub fn allows_role(&self, role: &str) -> bool {
        let role = role.trim();
        self.allowed_roles
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(role))
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(key, format!("{:?} is not a valid number", raw))),
        None => Ok(default),
    }
}
