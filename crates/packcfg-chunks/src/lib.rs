//! Chunk grouping rules for bundler split policies.
//!
//! A rule set is an ordered table of named groups. Each module identifier is
//! placed in at most one group: the accepting tested rule with the highest
//! priority wins, ties go to the first declared rule, and test-less fallback
//! groups (the "commons" bundle) only see modules no tested rule took.

mod result;
mod rule;

pub use result::{Assignment, AssignmentReason, Partition};
pub use rule::{GroupRule, Pattern, Priority};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rule::RuleSpec;

/// Errors raised while reading a cache group table.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("cache groups must be a mapping of name to rule, got {0}")]
    NotAMapping(&'static str),

    #[error("cache group '{key}' is invalid: {source}")]
    InvalidRule {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A module as seen by the split policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub identifier: String,

    /// Size in bytes.
    #[serde(default)]
    pub size: u64,

    /// Number of distinct bundles referencing this module.
    #[serde(default = "default_chunks")]
    pub chunks: usize,
}

fn default_chunks() -> usize {
    1
}

impl ModuleInfo {
    pub fn new(identifier: &str, size: u64, chunks: usize) -> Self {
        Self {
            identifier: identifier.to_string(),
            size,
            chunks,
        }
    }
}

/// Ordered table of group rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleSet {
    rules: Vec<GroupRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<GroupRule>) -> Self {
        Self { rules }
    }

    /// Read a `cacheGroups`-shaped mapping. Declaration order is kept.
    pub fn from_value(value: &Value) -> Result<Self, RuleError> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::default()),
            other => return Err(RuleError::NotAMapping(type_name(other))),
        };

        let mut rules = Vec::with_capacity(map.len());
        for (key, raw) in map {
            // `false` disables a group
            if raw == &Value::Bool(false) {
                continue;
            }
            let spec: RuleSpec =
                serde_json::from_value(raw.clone()).map_err(|source| RuleError::InvalidRule {
                    key: key.clone(),
                    source,
                })?;
            rules.push(GroupRule::from_spec(key, spec));
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[GroupRule] {
        &self.rules
    }

    /// Place a single module.
    pub fn assign(&self, module: &ModuleInfo) -> Assignment {
        if let Some(rule) = best_rule(self.rules.iter().filter(|r| !r.is_fallback()), module) {
            return Assignment {
                identifier: module.identifier.clone(),
                group: Some(rule.name.clone()),
                reason: AssignmentReason::Matched {
                    key: rule.key.clone(),
                    priority: rule.priority,
                },
            };
        }

        if let Some(rule) = best_rule(self.rules.iter().filter(|r| r.is_fallback()), module) {
            return Assignment {
                identifier: module.identifier.clone(),
                group: Some(rule.name.clone()),
                reason: AssignmentReason::Fallback {
                    key: rule.key.clone(),
                },
            };
        }

        Assignment {
            identifier: module.identifier.clone(),
            group: None,
            reason: AssignmentReason::Unsplit,
        }
    }

    /// Place every module of a synthetic dependency graph.
    pub fn partition(&self, modules: &[ModuleInfo]) -> Partition {
        let mut partition = Partition::default();
        for module in modules {
            match self.assign(module).group {
                Some(group) => partition
                    .groups
                    .entry(group)
                    .or_default()
                    .push(module.identifier.clone()),
                None => partition.unsplit.push(module.identifier.clone()),
            }
        }
        partition
    }
}

/// Highest priority wins; strict comparison keeps the first declared on ties.
fn best_rule<'a>(
    candidates: impl Iterator<Item = &'a GroupRule>,
    module: &ModuleInfo,
) -> Option<&'a GroupRule> {
    candidates
        .filter(|rule| rule.accepts(module))
        .fold(None::<&GroupRule>, |best, rule| match best {
            Some(current) if rule.priority <= current.priority => Some(current),
            _ => Some(rule),
        })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
