//! Best-effort loading of the user override document (layer 2)
//!
//! A missing or malformed override never fails the build: the caller maps
//! any `LoadError` to "use the base configuration" via [`apply_override`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::defaults::BaseConfig;
use super::document::{kind_of, read_document, DocumentError};
use super::merged::MergedConfig;

/// Default override file name, relative to the user project root
pub const OVERRIDE_FILE_NAME: &str = "webpack.config.json";

/// Errors loading an override document
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("override {path} must be a mapping at the top level, got {found}")]
    NotAMapping { path: PathBuf, found: &'static str },
}

impl LoadError {
    /// Whether the document simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::Document(DocumentError::NotFound(_)))
    }
}

/// A successfully read, partially specified configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideDocument {
    fields: Map<String, Value>,
    path: Option<PathBuf>,
    digest: Option<String>,
}

impl OverrideDocument {
    /// Build from an in-memory value (must be a mapping)
    pub fn from_value(value: Value) -> Result<Self, LoadError> {
        Self::from_parts(value, None, None)
    }

    fn from_parts(
        value: Value,
        path: Option<PathBuf>,
        digest: Option<String>,
    ) -> Result<Self, LoadError> {
        match value {
            Value::Object(fields) => Ok(Self {
                fields,
                path,
                digest,
            }),
            other => Err(LoadError::NotAMapping {
                path: path.unwrap_or_default(),
                found: kind_of(&other),
            }),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

/// Read and parse the override document at `path`
pub fn load_override(path: &Path) -> Result<OverrideDocument, LoadError> {
    let raw = read_document(path)?;
    OverrideDocument::from_parts(raw.value, Some(raw.path), Some(raw.digest))
}

/// What happened to the override layer during a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OverrideOutcome {
    Loaded { path: PathBuf, digest: String },
    Absent { path: PathBuf },
    Rejected { path: PathBuf, reason: String },
}

impl OverrideOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, OverrideOutcome::Loaded { .. })
    }
}

/// Merge a load result into the base, falling back to the base on any error
pub fn apply_override(
    base: &BaseConfig,
    path: &Path,
    loaded: Result<OverrideDocument, LoadError>,
) -> (MergedConfig, OverrideOutcome) {
    match loaded {
        Ok(doc) => {
            info!(
                path = %path.display(),
                fields = doc.fields().len(),
                "applying configuration override"
            );
            let outcome = OverrideOutcome::Loaded {
                path: path.to_path_buf(),
                digest: doc.digest().unwrap_or_default().to_string(),
            };
            (MergedConfig::merge(base, &doc), outcome)
        }
        Err(e) if e.is_not_found() => {
            debug!(path = %path.display(), "no configuration override, using defaults");
            (
                MergedConfig::from_base(base),
                OverrideOutcome::Absent {
                    path: path.to_path_buf(),
                },
            )
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "ignoring configuration override, using defaults"
            );
            (
                MergedConfig::from_base(base),
                OverrideOutcome::Rejected {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                },
            )
        }
    }
}
