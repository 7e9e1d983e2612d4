//! Final configuration assembly
//!
//! Combines the merged configuration with the assembler-owned sections:
//! entry, output naming, fixed resolution entries, transform bindings,
//! injected plugins and the split policy. All-or-nothing per build.

mod plugins;
mod rules;
mod split;

pub use plugins::{
    injected_plugins, ParallelOptions, PluginDescriptor, PluginInputs, WorkerPool,
    FILE_COORDINATOR, POOL_ID, POOL_MARGIN, SCRIPT_COORDINATOR, STYLE_COORDINATOR,
};
pub use rules::{fixed_rules, FIXED_EXTENSIONS};
pub use split::{builtin_cache_groups, SplitChunks, COMMONS_MIN_CHUNKS, COMMONS_MIN_SIZE};

use packcfg_chunks::{RuleError, RuleSet};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{MergedConfig, DEFAULT_DEVTOOL, KNOWN_DEVTOOLS};
use crate::layout::{display, ProjectLayout};

/// Errors assembling the final configuration
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("invalid chunk split policy: {0}")]
    SplitPolicy(#[from] RuleError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSection {
    pub path: String,
    pub filename: String,
    pub chunk_filename: String,
    pub public_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchOptions {
    pub ignored: String,
    pub aggregate_timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolveOutput {
    pub alias: Value,
    pub modules: Value,
    pub extensions: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleOutput {
    pub rules: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServer {
    pub content_base: String,
    pub proxy: Map<String, Value>,
    pub history_api_fallback: Value,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimization {
    pub split_chunks: SplitChunks,
}

/// The object handed to the bundler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalConfig {
    pub entry: BTreeMap<String, String>,
    pub output: OutputSection,
    pub watch: bool,
    pub watch_options: WatchOptions,
    pub resolve: ResolveOutput,
    pub devtool: Value,
    pub dev_server: DevServer,
    pub module: ModuleOutput,
    pub plugins: Vec<PluginDescriptor>,
    pub optimization: Optimization,
    pub performance: Value,
    pub mode: &'static str,
}

impl FinalConfig {
    /// Rule table behind `optimization.splitChunks.cacheGroups`
    pub fn split_rules(&self) -> &RuleSet {
        &self.optimization.split_chunks.rules
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Assemble the final configuration
pub fn assemble(
    merged: &MergedConfig,
    proxy: Map<String, Value>,
    layout: &ProjectLayout,
    pool: Arc<WorkerPool>,
) -> Result<FinalConfig, AssembleError> {
    let optimization = Optimization {
        split_chunks: SplitChunks::new(merged.get("cacheGroups"))?,
    };

    let mut fixed_alias = Map::new();
    fixed_alias.insert(
        "lib".to_string(),
        Value::String(display(&layout.framework_dir.join("HOC"))),
    );
    let fixed_modules = vec![
        json!("./node_modules"),
        json!(layout.user_path("src/Frontend")),
        json!(layout.user_path("src")),
    ];
    let fixed_extensions: Vec<Value> = FIXED_EXTENSIONS.iter().map(|e| json!(e)).collect();

    let resolve = ResolveOutput {
        alias: union_mapping("resolve.alias", merged.get("resolve.alias"), fixed_alias),
        modules: append_sequence("resolve.modules", merged.get("resolve.modules"), fixed_modules),
        extensions: dedup_strings(append_sequence(
            "resolve.extensions",
            merged.get("resolve.extensions"),
            fixed_extensions,
        )),
    };

    let module = ModuleOutput {
        rules: append_sequence("module.rules", merged.get("module.rules"), fixed_rules()),
    };

    let mut plugin_list: Vec<PluginDescriptor> = match merged.get("plugins") {
        Some(Value::Array(items)) => items.iter().cloned().map(PluginDescriptor::Custom).collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            warn!(found = %other, "'plugins' is not a sequence, passing it through");
            vec![PluginDescriptor::Custom(other.clone())]
        }
    };
    let inputs = PluginInputs {
        html_config: merged.get("HtmlWebpackPluginConfig"),
        css_options: merged.get("cssLoaderOptions"),
        less_options: merged.get("lessLoaderOptions"),
        file_options: merged.get("fileLoaderOptions"),
        styles_dir: layout.user_path("src/Frontend/Styles"),
    };
    plugin_list.extend(injected_plugins(&inputs, &pool));

    let devtool = merged
        .get("devtool")
        .cloned()
        .unwrap_or_else(|| json!(DEFAULT_DEVTOOL));
    if let Some(mode) = devtool.as_str() {
        if !KNOWN_DEVTOOLS.contains(&mode) {
            warn!(devtool = mode, "unrecognized devtool, passing it through");
        }
    }

    let mut entry = BTreeMap::new();
    entry.insert("index".to_string(), display(&layout.app_entry));

    debug!(
        plugins = plugin_list.len(),
        pool_size = pool.size,
        cache_groups = optimization.split_chunks.rules.rules().len(),
        "assembled final configuration"
    );

    Ok(FinalConfig {
        entry,
        output: OutputSection {
            path: layout.user_path("public"),
            filename: "[name]-[hash].js".to_string(),
            chunk_filename: "./static/js/[name].chunk-[chunkhash].js".to_string(),
            public_path: "/".to_string(),
        },
        watch: true,
        watch_options: WatchOptions {
            ignored: layout.user_path("node_modules"),
            aggregate_timeout: 1200,
        },
        resolve,
        devtool,
        dev_server: DevServer {
            content_base: layout.user_path("public"),
            proxy,
            history_api_fallback: json!({"index": "/index.html"}),
            inline: true,
        },
        module,
        plugins: plugin_list,
        optimization,
        performance: json!({"hints": false}),
        mode: "development",
    })
}

/// Fixed entries first and always present; user keys follow
fn union_mapping(field: &str, user: Option<&Value>, fixed: Map<String, Value>) -> Value {
    match user {
        None | Some(Value::Null) => Value::Object(fixed),
        Some(Value::Object(user)) => {
            let mut out = fixed;
            for (key, value) in user {
                if out.contains_key(key) {
                    debug!(field, key = key.as_str(), "assembler-owned key kept");
                    continue;
                }
                out.insert(key.clone(), value.clone());
            }
            Value::Object(out)
        }
        Some(other) => {
            warn!(field, found = %other, "expected a mapping, passing it through");
            other.clone()
        }
    }
}

/// User entries first, then the fixed ones
fn append_sequence(field: &str, user: Option<&Value>, fixed: Vec<Value>) -> Value {
    match user {
        None | Some(Value::Null) => Value::Array(fixed),
        Some(Value::Array(items)) => {
            let mut out = items.clone();
            out.extend(fixed);
            Value::Array(out)
        }
        Some(other) => {
            warn!(field, found = %other, "expected a sequence, passing it through");
            other.clone()
        }
    }
}

/// Drop repeated strings, keeping the first occurrence
fn dedup_strings(value: Value) -> Value {
    match value {
        Value::Array(items) => {
            let mut out: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                if item.is_string() && out.contains(&item) {
                    continue;
                }
                out.push(item);
            }
            Value::Array(out)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BaseConfig, OverrideDocument};

    fn layout() -> ProjectLayout {
        ProjectLayout::new("/app", "/app/node_modules/simple-direct")
            .with_app_entry("/app/node_modules/simple-direct/App")
    }

    fn assemble_with(overlay: Option<Value>) -> FinalConfig {
        let base = BaseConfig::default();
        let merged = match overlay {
            Some(v) => MergedConfig::merge(&base, &OverrideDocument::from_value(v).unwrap()),
            None => MergedConfig::from_base(&base),
        };
        assemble(&merged, Map::new(), &layout(), Arc::new(WorkerPool::with_size(4))).unwrap()
    }

    #[test]
    fn test_structural_sections() {
        let config = assemble_with(None);

        assert_eq!(config.entry["index"], "/app/node_modules/simple-direct/App");
        assert_eq!(config.output.path, "/app/public");
        assert_eq!(config.output.filename, "[name]-[hash].js");
        assert_eq!(config.watch_options.ignored, "/app/node_modules");
        assert_eq!(config.dev_server.content_base, "/app/public");
        assert_eq!(config.devtool, json!("source-map"));
        assert_eq!(config.mode, "development");
    }

    #[test]
    fn test_fixed_resolution_present_without_override() {
        let config = assemble_with(None);

        assert_eq!(
            config.resolve.alias,
            json!({"lib": "/app/node_modules/simple-direct/HOC"})
        );
        assert_eq!(
            config.resolve.modules,
            json!(["./node_modules", "/app/src/Frontend", "/app/src"])
        );
        assert_eq!(config.resolve.extensions.as_array().unwrap().len(), FIXED_EXTENSIONS.len());
    }

    #[test]
    fn test_fixed_alias_not_overridable() {
        let config = assemble_with(Some(json!({
            "resolve": {"alias": {"lib": "/elsewhere", "@ui": "/app/src/ui"}}
        })));

        assert_eq!(config.resolve.alias["lib"], "/app/node_modules/simple-direct/HOC");
        assert_eq!(config.resolve.alias["@ui"], "/app/src/ui");
    }

    #[test]
    fn test_user_sequences_come_first() {
        let config = assemble_with(Some(json!({
            "resolve": {"modules": ["/shared"], "extensions": [".ts", ".js"]},
            "module": {"rules": [{"test": "\\.md$", "use": "raw-loader"}]}
        })));

        assert_eq!(config.resolve.modules[0], "/shared");
        let extensions = config.resolve.extensions.as_array().unwrap();
        assert_eq!(extensions[0], ".ts");
        assert_eq!(extensions[1], ".js");
        assert_eq!(extensions.iter().filter(|e| *e == ".js").count(), 1);

        let rules = config.module.rules.as_array().unwrap();
        assert_eq!(rules.len(), 1 + fixed_rules().len());
        assert_eq!(rules[0]["use"], "raw-loader");
    }

    #[test]
    fn test_plugins_user_then_injected() {
        let config = assemble_with(Some(json!({
            "plugins": [{"plugin": "DefinePlugin", "options": {"DEBUG": true}}]
        })));

        assert_eq!(config.plugins.len(), 5);
        assert!(matches!(config.plugins[0], PluginDescriptor::Custom(_)));
        let value = config.to_value().unwrap();
        assert_eq!(value["plugins"][0]["plugin"], "DefinePlugin");
        assert_eq!(value["plugins"][1]["plugin"], "HtmlWebpackPlugin");
        assert_eq!(value["plugins"][1]["options"]["template"], "./template.html");
    }

    #[test]
    fn test_wrong_kind_propagates() {
        let config = assemble_with(Some(json!({"resolve": {"modules": {"not": "a list"}}})));
        assert_eq!(config.resolve.modules, json!({"not": "a list"}));
    }

    #[test]
    fn test_invalid_cache_groups_fail() {
        let base = BaseConfig::default();
        let doc = OverrideDocument::from_value(json!({"cacheGroups": {"x": {"priority": "high"}}}))
            .unwrap();
        let merged = MergedConfig::merge(&base, &doc);
        let err = assemble(&merged, Map::new(), &layout(), Arc::new(WorkerPool::with_size(1)))
            .unwrap_err();
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn test_serialized_shape() {
        let value = assemble_with(None).to_value().unwrap();

        for key in [
            "entry", "output", "watch", "watchOptions", "resolve", "devtool", "devServer",
            "module", "plugins", "optimization", "performance", "mode",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["output"]["chunkFilename"], "./static/js/[name].chunk-[chunkhash].js");
        assert_eq!(value["devServer"]["historyApiFallback"]["index"], "/index.html");
        assert_eq!(value["optimization"]["splitChunks"]["automaticNameDelimiter"], "+");
        assert!(value["optimization"]["splitChunks"].get("rules").is_none());
        assert_eq!(value["performance"]["hints"], false);
    }
}
