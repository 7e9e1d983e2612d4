//! Assignment result types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rule::Priority;

/// Why a module landed where it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentReason {
    /// Highest-priority tested rule that accepted the module.
    Matched { key: String, priority: Priority },

    /// No tested rule matched; a fallback group's thresholds were met.
    Fallback { key: String },

    /// Stays with its referencing entry.
    Unsplit,
}

/// Where a single module is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub identifier: String,

    /// Output bundle name, `None` when the module is not split out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    pub reason: AssignmentReason,
}

impl Assignment {
    pub fn to_human(&self) -> String {
        match &self.reason {
            AssignmentReason::Matched { key, priority } => format!(
                "{} -> {} (rule '{}', priority {})",
                self.identifier,
                self.group.as_deref().unwrap_or("?"),
                key,
                priority
            ),
            AssignmentReason::Fallback { key } => format!(
                "{} -> {} (fallback '{}')",
                self.identifier,
                self.group.as_deref().unwrap_or("?"),
                key
            ),
            AssignmentReason::Unsplit => format!("{} -> (entry bundle)", self.identifier),
        }
    }
}

/// Modules partitioned into named bundles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Bundle name -> member identifiers, in input order.
    pub groups: BTreeMap<String, Vec<String>>,

    /// Modules left in their natural bundle.
    pub unsplit: Vec<String>,
}

impl Partition {
    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_output() {
        let a = Assignment {
            identifier: "./node_modules/react/index.js".to_string(),
            group: Some("reactStack2".to_string()),
            reason: AssignmentReason::Matched {
                key: "reactStack2".to_string(),
                priority: Priority::Infinite,
            },
        };
        assert_eq!(
            a.to_human(),
            "./node_modules/react/index.js -> reactStack2 (rule 'reactStack2', priority Infinity)"
        );

        let b = Assignment {
            identifier: "./src/App.jsx".to_string(),
            group: None,
            reason: AssignmentReason::Unsplit,
        };
        assert!(b.to_human().contains("entry bundle"));
    }

    #[test]
    fn test_reason_serialization() {
        let reason = AssignmentReason::Fallback {
            key: "commons".to_string(),
        };
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["type"], "FALLBACK");
        assert_eq!(json["key"], "commons");
    }
}
