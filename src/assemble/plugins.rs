//! Plugin descriptors and the shared transform worker pool

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::config::deep_merge;

/// Extra workers on top of the available processing units
pub const POOL_MARGIN: usize = 2;

/// Identifier the coordinators use to reference the pool
pub const POOL_ID: &str = "shared";

/// Coordinator ids referenced by the fixed transform rules
pub const SCRIPT_COORDINATOR: &str = "babel";
pub const FILE_COORDINATOR: &str = "files";
pub const STYLE_COORDINATOR: &str = "styles";

/// Declared worker pool for the bundler's transform stage. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerPool {
    pub id: String,
    pub size: usize,
}

impl WorkerPool {
    pub fn with_size(size: usize) -> Self {
        Self {
            id: POOL_ID.to_string(),
            size,
        }
    }

    /// Available processing units plus [`POOL_MARGIN`]
    pub fn sized_to_host() -> Self {
        let units = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::with_size(units + POOL_MARGIN)
    }
}

/// Options of a parallel transform coordinator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelOptions {
    pub id: String,
    pub loaders: Vec<Value>,
    pub thread_pool: Arc<WorkerPool>,
}

/// One entry of the final plugin list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PluginDescriptor {
    /// Passed through from the override untouched
    Custom(Value),

    /// Assembler-injected plugin with an options bag
    Builtin {
        plugin: &'static str,
        options: Value,
    },

    /// Assembler-injected transform coordinator bound to the shared pool
    Parallel {
        plugin: &'static str,
        options: ParallelOptions,
    },
}

impl PluginDescriptor {
    /// Coordinator id for parallel transforms
    pub fn coordinator_id(&self) -> Option<&str> {
        match self {
            PluginDescriptor::Parallel { options, .. } => Some(&options.id),
            _ => None,
        }
    }

    pub fn pool(&self) -> Option<&Arc<WorkerPool>> {
        match self {
            PluginDescriptor::Parallel { options, .. } => Some(&options.thread_pool),
            _ => None,
        }
    }
}

/// Option bags the injected plugins read from the merged configuration
pub struct PluginInputs<'a> {
    pub html_config: Option<&'a Value>,
    pub css_options: Option<&'a Value>,
    pub less_options: Option<&'a Value>,
    pub file_options: Option<&'a Value>,
    pub styles_dir: String,
}

/// Defaults layered under a user option bag
fn layered(defaults: Value, user: Option<&Value>) -> Value {
    match user {
        None | Some(Value::Null) => defaults,
        Some(user) => deep_merge(defaults, user.clone()),
    }
}

/// Document template injector plus the three transform coordinators
pub fn injected_plugins(
    inputs: &PluginInputs<'_>,
    pool: &Arc<WorkerPool>,
) -> Vec<PluginDescriptor> {
    let parallel = |id: &str, loaders: Vec<Value>| PluginDescriptor::Parallel {
        plugin: "HappyPack",
        options: ParallelOptions {
            id: id.to_string(),
            loaders,
            thread_pool: Arc::clone(pool),
        },
    };

    let file_loader = match inputs.file_options {
        Some(Value::Object(opts)) if !opts.is_empty() => json!({
            "loader": "file-loader",
            "options": opts
        }),
        _ => json!("file-loader"),
    };

    vec![
        PluginDescriptor::Builtin {
            plugin: "HtmlWebpackPlugin",
            options: layered(Value::Object(Map::new()), inputs.html_config),
        },
        parallel(SCRIPT_COORDINATOR, vec![json!("babel-loader?cacheDirectory")]),
        parallel(FILE_COORDINATOR, vec![file_loader]),
        parallel(
            STYLE_COORDINATOR,
            vec![
                json!("style-loader"),
                json!({
                    "loader": "css-loader",
                    "options": layered(json!({"modules": true, "minimize": true}), inputs.css_options)
                }),
                json!("postcss-loader"),
                json!({
                    "loader": "less-loader",
                    "options": layered(json!({"paths": [inputs.styles_dir]}), inputs.less_options)
                }),
            ],
        ),
    ]
}
