//! Chunk group rule definitions.

use regex_lite::Regex;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::ModuleInfo;

/// Group priority. `Infinite` outranks every finite value.
///
/// Finite priorities may be fractional; NaN is rejected when reading.
#[derive(Debug, Clone, Copy)]
pub enum Priority {
    Finite(f64),
    Infinite,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Finite(0.0)
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Priority::Finite(a), Priority::Finite(b)) => a.total_cmp(b),
            (Priority::Finite(_), Priority::Infinite) => Ordering::Less,
            (Priority::Infinite, Priority::Finite(_)) => Ordering::Greater,
            (Priority::Infinite, Priority::Infinite) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Finite(n) => write!(f, "{}", n),
            Priority::Infinite => write!(f, "Infinity"),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // whole numbers keep their integer form
            Priority::Finite(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                serializer.serialize_i64(*n as i64)
            }
            Priority::Finite(n) => serializer.serialize_f64(*n),
            Priority::Infinite => serializer.serialize_str("Infinity"),
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(Priority::default()),
            Some(Raw::Number(n)) if n.is_nan() => {
                Err(de::Error::custom("invalid priority: NaN"))
            }
            Some(Raw::Number(n)) => Ok(Priority::Finite(n)),
            Some(Raw::Text(s)) => match s.to_ascii_lowercase().as_str() {
                "infinity" | "inf" => Ok(Priority::Infinite),
                _ => Err(de::Error::custom(format!(
                    "invalid priority '{}': expected a number or \"Infinity\"",
                    s
                ))),
            },
        }
    }
}

/// A compiled module-identifier pattern that round-trips as its source text.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex_lite::Error> {
        Regex::new(source).map(Pattern)
    }

    pub fn is_match(&self, identifier: &str) -> bool {
        self.0.is_match(identifier)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(de::Error::custom)
    }
}

/// Serialized form of a single cache group entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RuleSpec {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub test: Option<Pattern>,

    #[serde(default)]
    pub exclude: Option<Pattern>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub min_size: u64,

    #[serde(default = "default_min_chunks")]
    pub min_chunks: usize,
}

fn default_min_chunks() -> usize {
    1
}

/// A named group predicate with priority and thresholds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRule {
    /// Key of the rule in the cache group table.
    pub key: String,

    /// Output bundle name (defaults to the key).
    pub name: String,

    /// Identifier test. Rules without a test are fallback groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<Pattern>,

    /// Identifiers matching this pattern are never taken by the rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Pattern>,

    pub priority: Priority,

    /// Size in bytes a module must exceed (0 disables the check).
    pub min_size: u64,

    /// Minimum number of distinct bundles referencing the module.
    pub min_chunks: usize,
}

impl GroupRule {
    /// Create a tested rule with neutral thresholds.
    pub fn new(key: &str, test: Pattern) -> Self {
        Self {
            key: key.to_string(),
            name: key.to_string(),
            test: Some(test),
            exclude: None,
            priority: Priority::default(),
            min_size: 0,
            min_chunks: 1,
        }
    }

    /// Create a fallback rule (no test) with the given thresholds.
    pub fn fallback(key: &str, min_size: u64, min_chunks: usize) -> Self {
        Self {
            key: key.to_string(),
            name: key.to_string(),
            test: None,
            exclude: None,
            priority: Priority::default(),
            min_size,
            min_chunks,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_exclude(mut self, exclude: Pattern) -> Self {
        self.exclude = Some(exclude);
        self
    }

    pub(crate) fn from_spec(key: &str, spec: RuleSpec) -> Self {
        Self {
            key: key.to_string(),
            name: spec.name.unwrap_or_else(|| key.to_string()),
            test: spec.test,
            exclude: spec.exclude,
            priority: spec.priority,
            min_size: spec.min_size,
            min_chunks: spec.min_chunks,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.test.is_none()
    }

    /// Whether this rule would take the module, thresholds included.
    pub fn accepts(&self, module: &ModuleInfo) -> bool {
        if let Some(test) = &self.test {
            if !test.is_match(&module.identifier) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(&module.identifier) {
                return false;
            }
        }
        // a size threshold must be exceeded; zero means no threshold
        let big_enough = self.min_size == 0 || module.size > self.min_size;
        big_enough && module.chunks >= self.min_chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(identifier: &str, size: u64, chunks: usize) -> ModuleInfo {
        ModuleInfo {
            identifier: identifier.to_string(),
            size,
            chunks,
        }
    }

    #[test]
    fn test_infinite_outranks_finite() {
        assert!(Priority::Infinite > Priority::Finite(f64::MAX));
        assert!(Priority::Finite(10.0) > Priority::Finite(-5.0));
        assert!(Priority::Finite(0.5) > Priority::Finite(0.0));
        assert_eq!(Priority::default(), Priority::Finite(0.0));
    }

    #[test]
    fn test_priority_serde() {
        let p: Priority = serde_json::from_str("\"Infinity\"").unwrap();
        assert_eq!(p, Priority::Infinite);
        let p: Priority = serde_json::from_str("-20").unwrap();
        assert_eq!(p, Priority::Finite(-20.0));
        assert_eq!(serde_json::to_string(&Priority::Finite(-20.0)).unwrap(), "-20");
        assert!(serde_json::from_str::<Priority>("\"high\"").is_err());
        assert_eq!(serde_json::to_string(&Priority::Infinite).unwrap(), "\"Infinity\"");
    }

    #[test]
    fn test_rule_defaults() {
        let spec: RuleSpec = serde_json::from_str(r#"{"test": "Core"}"#).unwrap();
        let rule = GroupRule::from_spec("config", spec);
        assert_eq!(rule.name, "config");
        assert_eq!(rule.min_size, 0);
        assert_eq!(rule.min_chunks, 1);
        assert_eq!(rule.priority, Priority::Finite(0.0));
        assert!(!rule.is_fallback());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = serde_json::from_str::<RuleSpec>(r#"{"test": "(unclosed"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_accepts_respects_exclude() {
        let rule = GroupRule::new("vendor", Pattern::new("node_modules").unwrap())
            .with_exclude(Pattern::new("node_modules/react").unwrap());
        assert!(rule.accepts(&module("./node_modules/lodash/index.js", 10, 1)));
        assert!(!rule.accepts(&module("./node_modules/react/index.js", 10, 1)));
        assert!(!rule.accepts(&module("./src/App.jsx", 10, 1)));
    }

    #[test]
    fn test_accepts_respects_thresholds() {
        let rule = GroupRule::fallback("commons", 30 * 1024, 2);
        assert!(rule.accepts(&module("./src/shared.js", 40 * 1024, 3)));
        assert!(!rule.accepts(&module("./src/shared.js", 40 * 1024, 1)));
        assert!(!rule.accepts(&module("./src/shared.js", 1024, 3)));
    }

    #[test]
    fn test_size_threshold_is_exclusive() {
        let rule = GroupRule::fallback("commons", 30 * 1024, 2);
        assert!(!rule.accepts(&module("./src/shared.js", 30 * 1024, 2)));
        assert!(rule.accepts(&module("./src/shared.js", 30 * 1024 + 1, 2)));

        let unbounded = GroupRule::new("vendor", Pattern::new("node_modules").unwrap());
        assert!(unbounded.accepts(&module("./node_modules/empty.js", 0, 1)));
    }
}
