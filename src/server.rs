//! Server configuration (external collaborator)
//!
//! Read once per build. Unlike the override layer there is no fallback: the
//! proxy target cannot be computed without it.

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::{kind_of, read_document, DocumentError};

/// Default server config location, relative to the user project root
pub const SERVER_CONFIG_PATH: &str = "src/Server/Config/server.json";

/// Errors obtaining the server configuration
#[derive(Debug, thiserror::Error)]
pub enum ServerConfigError {
    #[error("server configuration unavailable: {0}")]
    Document(#[from] DocumentError),

    #[error("server configuration {path} must be a mapping, got {found}")]
    NotAMapping { path: PathBuf, found: &'static str },

    #[error("server configuration is missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("server configuration field '{field}' must be {expected}, got {found}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
        found: String,
    },
}

/// Protocol flag and port of the application server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    pub https: bool,
    pub port: u16,
}

impl ServerConfig {
    pub fn new(https: bool, port: u16) -> Self {
        Self { https, port }
    }

    /// Extract the record from a parsed document.
    ///
    /// `https` is optional and treated as `false` when absent; `port` is required.
    pub fn from_value(value: &Value) -> Result<Self, ServerConfigError> {
        let map = value.as_object().ok_or_else(|| ServerConfigError::NotAMapping {
            path: PathBuf::new(),
            found: kind_of(value),
        })?;

        let https = match map.get("https") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(ServerConfigError::InvalidField {
                    field: "https",
                    expected: "a boolean",
                    found: other.to_string(),
                })
            }
        };

        let port = match map.get("port") {
            None | Some(Value::Null) => {
                return Err(ServerConfigError::MissingField { field: "port" })
            }
            Some(raw) => raw
                .as_u64()
                .and_then(|p| u16::try_from(p).ok())
                .filter(|p| *p != 0)
                .ok_or_else(|| ServerConfigError::InvalidField {
                    field: "port",
                    expected: "an integer in 1..=65535",
                    found: raw.to_string(),
                })?,
        };

        Ok(Self { https, port })
    }

    /// Load the record from a JSON or TOML file, returning it with the file digest
    pub fn load(path: &Path) -> Result<(Self, String), ServerConfigError> {
        let raw = read_document(path)?;
        let config = Self::from_value(&raw.value).map_err(|e| match e {
            ServerConfigError::NotAMapping { found, .. } => ServerConfigError::NotAMapping {
                path: path.to_path_buf(),
                found,
            },
            other => other,
        })?;
        Ok((config, raw.digest))
    }

    pub fn protocol(&self) -> &'static str {
        if self.https {
            "https"
        } else {
            "http"
        }
    }
}
