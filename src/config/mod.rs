//! Configuration layering
//!
//! 1. Built-in baseline (every extension point present, neutral)
//! 2. User override document (best effort, deep-merged)
//!
//! Derived network values and the assembler-owned sections are added later
//! by [`crate::proxy`] and [`crate::assemble`].

mod defaults;
mod document;
mod merge;
mod merged;
mod overrides;

pub use defaults::{
    BaseConfig, ModuleSection, ResolveSection, DEFAULT_API_HOST, DEFAULT_DEVTOOL,
    DEFAULT_HTML_TEMPLATE, KNOWN_DEVTOOLS,
};
pub use document::{kind_of, parse_str, read_document, DocumentError, DocumentFormat, RawDocument};
pub use merge::{deep_merge, merge_layers, merge_maps};
pub use merged::MergedConfig;
pub use overrides::{
    apply_override, load_override, LoadError, OverrideDocument, OverrideOutcome, OVERRIDE_FILE_NAME,
};
