//! The base configuration with the override layered on top.

use serde::Serialize;
use serde_json::Value;

use super::defaults::BaseConfig;
use super::merge::deep_merge;
use super::overrides::OverrideDocument;

/// Base deep-merged with an optional override. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MergedConfig {
    value: Value,
}

impl MergedConfig {
    /// The base alone (no override applied)
    pub fn from_base(base: &BaseConfig) -> Self {
        Self {
            value: base.to_value(),
        }
    }

    /// Layer an override document over the base
    pub fn merge(base: &BaseConfig, overlay: &OverrideDocument) -> Self {
        Self {
            value: deep_merge(base.to_value(), overlay.to_value()),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Get a value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.value;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a value as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }
}
