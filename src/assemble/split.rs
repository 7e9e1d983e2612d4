//! Split-chunks policy: built-in cache groups plus user groups

use packcfg_chunks::{RuleError, RuleSet};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::deep_merge;

/// Minimum size of a module promoted to the commons bundle
pub const COMMONS_MIN_SIZE: u64 = 30 * 1024;

/// Minimum number of referencing bundles for the commons bundle
pub const COMMONS_MIN_CHUNKS: usize = 2;

/// Packages kept out of the generic vendor bundle
const REACT_STACK: &str = "react|react-dom|redux|material-ui|react-router|react-router-dom|react-redux|socketIO";

/// Built-in cache group table, in declaration order
pub fn builtin_cache_groups() -> Value {
    json!({
        "vendor": {
            "name": "vendor",
            "test": "node_modules",
            "exclude": format!(r"node_modules[\\/]({})([\\/]|$)", REACT_STACK)
        },
        "reactStack1": {
            "name": "reactStack1",
            "test": "(react-router|react-router-dom|react-redux|socketIO)"
        },
        "reactStack2": {
            "name": "reactStack2",
            "test": "(react|react-dom|redux|material-ui)"
        },
        "config": {
            "name": "directCoreConfig",
            "test": "Core"
        },
        "appWithDirect": {
            "name": "appWithDirect",
            "test": "simple-direct"
        },
        "commons": {
            "minSize": COMMONS_MIN_SIZE,
            "minChunks": COMMONS_MIN_CHUNKS
        }
    })
}

/// `optimization.splitChunks`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitChunks {
    pub chunks: &'static str,
    pub min_size: u64,
    pub min_chunks: usize,
    pub max_async_requests: u32,
    pub max_initial_requests: u32,
    pub automatic_name_delimiter: &'static str,
    pub name: bool,
    pub cache_groups: Value,

    #[serde(skip)]
    pub rules: RuleSet,
}

impl SplitChunks {
    /// Built-in groups with the user's `cacheGroups` merged on top per key
    pub fn new(user_groups: Option<&Value>) -> Result<Self, RuleError> {
        let cache_groups = match user_groups {
            None | Some(Value::Null) => builtin_cache_groups(),
            Some(user) => deep_merge(builtin_cache_groups(), user.clone()),
        };
        let rules = RuleSet::from_value(&cache_groups)?;

        Ok(Self {
            chunks: "all",
            min_size: 0,
            min_chunks: 1,
            max_async_requests: 6,
            max_initial_requests: 6,
            automatic_name_delimiter: "+",
            name: true,
            cache_groups,
            rules,
        })
    }
}
