//! Configuration build pipeline
//!
//! One sequential pass:
//! - Baseline
//! - Override (best effort, or strict)
//! - Server record and derived proxy table
//! - Assembly
//!
//! Failures carry the stage that produced them; nothing partial is returned.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::assemble::{assemble, AssembleError, FinalConfig, WorkerPool};
use crate::config::{
    apply_override, load_override, BaseConfig, LoadError, MergedConfig, OverrideOutcome,
};
use crate::layout::ProjectLayout;
use crate::proxy::{resolve_proxy, ProxyError};
use crate::server::{ServerConfig, ServerConfigError};

/// Pipeline stages that can fail a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStage {
    OverrideLoad,
    DerivedValues,
    Assembly,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStage::OverrideLoad => write!(f, "override-load"),
            BuildStage::DerivedValues => write!(f, "derived-values"),
            BuildStage::Assembly => write!(f, "assembly"),
        }
    }
}

/// Build errors
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("override-load stage failed: {0}")]
    OverrideLoad(#[source] LoadError),

    #[error("derived-values stage failed: {0}")]
    ServerConfig(#[from] ServerConfigError),

    #[error("derived-values stage failed: {0}")]
    Proxy(#[from] ProxyError),

    #[error("assembly stage failed: {0}")]
    Assembly(#[from] AssembleError),
}

impl BuildError {
    pub fn stage(&self) -> BuildStage {
        match self {
            BuildError::OverrideLoad(_) => BuildStage::OverrideLoad,
            BuildError::ServerConfig(_) | BuildError::Proxy(_) => BuildStage::DerivedValues,
            BuildError::Assembly(_) => BuildStage::Assembly,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.stage() {
            BuildStage::OverrideLoad => 2,
            BuildStage::DerivedValues => 3,
            BuildStage::Assembly => 4,
        }
    }
}

/// Result type for build operations
pub type BuildResult<T> = Result<T, BuildError>;

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Override,
    Server,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// SHA-256 digest of raw file bytes (None for builtin)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Build options
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub layout: ProjectLayout,

    /// Fail instead of falling back when the override exists but cannot be used
    pub strict_override: bool,

    /// Worker pool size; sized to the host when None
    pub pool_size: Option<usize>,
}

impl BuildOptions {
    pub fn new(layout: ProjectLayout) -> Self {
        Self {
            layout,
            strict_override: false,
            pool_size: None,
        }
    }
}

/// Everything a build produced
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub created_at: DateTime<Utc>,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,

    #[serde(rename = "override")]
    pub override_outcome: OverrideOutcome,

    pub server: ServerConfig,

    pub merged: MergedConfig,

    #[serde(rename = "final")]
    pub final_config: FinalConfig,
}

impl BuildReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Run the whole build
pub fn build(options: &BuildOptions) -> BuildResult<BuildReport> {
    let layout = &options.layout;
    let mut sources = vec![ConfigSource {
        origin: ConfigOrigin::Builtin,
        path: None,
        digest: None,
    }];

    let base = BaseConfig::default();

    let loaded = match load_override(&layout.override_path) {
        Err(e) if options.strict_override && !e.is_not_found() => {
            return Err(BuildError::OverrideLoad(e))
        }
        other => other,
    };
    let (merged, override_outcome) = apply_override(&base, &layout.override_path, loaded);
    if let OverrideOutcome::Loaded { path, digest } = &override_outcome {
        sources.push(ConfigSource {
            origin: ConfigOrigin::Override,
            path: Some(path.clone()),
            digest: Some(digest.clone()),
        });
    }

    let (server, server_digest) = ServerConfig::load(&layout.server_config_path)?;
    sources.push(ConfigSource {
        origin: ConfigOrigin::Server,
        path: Some(layout.server_config_path.clone()),
        digest: Some(server_digest),
    });
    let proxy = resolve_proxy(&server, &merged)?;

    let pool = Arc::new(match options.pool_size {
        Some(size) => WorkerPool::with_size(size),
        None => WorkerPool::sized_to_host(),
    });
    let final_config = assemble(&merged, proxy, layout, pool)?;

    info!(
        override_loaded = override_outcome.is_loaded(),
        sources = sources.len(),
        "configuration build complete"
    );

    Ok(BuildReport {
        created_at: Utc::now(),
        sources,
        override_outcome,
        server,
        merged,
        final_config,
    })
}
