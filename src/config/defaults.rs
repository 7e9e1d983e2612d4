//! Baseline configuration (layer 1)
//!
//! Every extension point exists with a neutral value so later stages never
//! have to deal with an absent field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default API host the dev server proxies to
pub const DEFAULT_API_HOST: &str = "127.0.0.1";

/// Default source map mode
pub const DEFAULT_DEVTOOL: &str = "source-map";

/// Default HTML template for the document template injector
pub const DEFAULT_HTML_TEMPLATE: &str = "./template.html";

/// Source map modes the bundler understands
pub const KNOWN_DEVTOOLS: &[&str] = &[
    "eval",
    "eval-source-map",
    "eval-cheap-source-map",
    "eval-cheap-module-source-map",
    "cheap-source-map",
    "cheap-module-source-map",
    "inline-source-map",
    "hidden-source-map",
    "nosources-source-map",
    "source-map",
];

/// Module resolution extension points
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveSection {
    /// Alias name -> path
    #[serde(default)]
    pub alias: Map<String, Value>,

    /// Extra module search paths, searched before the fixed ones
    #[serde(default)]
    pub modules: Vec<Value>,

    /// Extra file extensions, tried before the fixed ones
    #[serde(default)]
    pub extensions: Vec<Value>,
}

/// Transform binding extension points
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleSection {
    #[serde(default)]
    pub rules: Vec<Value>,
}

/// The fixed default configuration skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseConfig {
    pub main_api_host: String,
    pub resolve: ResolveSection,
    pub module: ModuleSection,
    pub dev_server_proxy: Map<String, Value>,
    pub devtool: String,
    pub plugins: Vec<Value>,
    #[serde(rename = "HtmlWebpackPluginConfig")]
    pub html_plugin_config: Map<String, Value>,
    pub css_loader_options: Map<String, Value>,
    pub less_loader_options: Map<String, Value>,
    pub file_loader_options: Map<String, Value>,
    pub cache_groups: Map<String, Value>,
}

impl Default for BaseConfig {
    fn default() -> Self {
        let mut html_plugin_config = Map::new();
        html_plugin_config.insert(
            "template".to_string(),
            Value::String(DEFAULT_HTML_TEMPLATE.to_string()),
        );

        Self {
            main_api_host: DEFAULT_API_HOST.to_string(),
            resolve: ResolveSection::default(),
            module: ModuleSection::default(),
            dev_server_proxy: Map::new(),
            devtool: DEFAULT_DEVTOOL.to_string(),
            plugins: Vec::new(),
            html_plugin_config,
            css_loader_options: Map::new(),
            less_loader_options: Map::new(),
            file_loader_options: Map::new(),
            cache_groups: Map::new(),
        }
    }
}

impl BaseConfig {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "mainApiHost": self.main_api_host,
            "resolve": {
                "alias": self.resolve.alias,
                "modules": self.resolve.modules,
                "extensions": self.resolve.extensions
            },
            "module": {
                "rules": self.module.rules
            },
            "devServerProxy": self.dev_server_proxy,
            "devtool": self.devtool,
            "plugins": self.plugins,
            "HtmlWebpackPluginConfig": self.html_plugin_config,
            "cssLoaderOptions": self.css_loader_options,
            "lessLoaderOptions": self.less_loader_options,
            "fileLoaderOptions": self.file_loader_options,
            "cacheGroups": self.cache_groups
        })
    }
}
