//! packcfg - layered bundler configuration
//!
//! Builds the final bundler configuration from a fixed baseline, an optional
//! user override document, proxy targets derived from the server
//! configuration, and the assembler-owned structural sections.

pub mod assemble;
pub mod config;
pub mod layout;
pub mod pipeline;
pub mod proxy;
pub mod server;
pub mod session;

pub use assemble::{assemble, FinalConfig, PluginDescriptor, WorkerPool};
pub use config::{BaseConfig, LoadError, MergedConfig, OverrideDocument, OverrideOutcome};
pub use layout::ProjectLayout;
pub use pipeline::{build, BuildError, BuildOptions, BuildReport, BuildStage};
pub use server::{ServerConfig, ServerConfigError};

pub use packcfg_chunks as chunks;
