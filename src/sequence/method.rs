//! Grouping method selection.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Strategy used to partition shots into sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMethod {
    Location,
    Temporal,
    Visual,
    /// Location, then temporal, then visual splits for oversized groups.
    #[default]
    Hybrid,
}

impl GroupingMethod {
    pub const ALL: [GroupingMethod; 4] = [
        GroupingMethod::Location,
        GroupingMethod::Temporal,
        GroupingMethod::Visual,
        GroupingMethod::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingMethod::Location => "location",
            GroupingMethod::Temporal => "temporal",
            GroupingMethod::Visual => "visual",
            GroupingMethod::Hybrid => "hybrid",
        }
    }

    /// Parse a method name case-insensitively. Unknown names map to
    /// [`GroupingMethod::Hybrid`]; the flag reports whether the name was
    /// recognized.
    pub fn parse(name: &str) -> (GroupingMethod, bool) {
        match name.trim().to_ascii_lowercase().as_str() {
            "location" => (GroupingMethod::Location, true),
            "temporal" => (GroupingMethod::Temporal, true),
            "visual" => (GroupingMethod::Visual, true),
            "hybrid" => (GroupingMethod::Hybrid, true),
            _ => (GroupingMethod::Hybrid, false),
        }
    }
}

impl fmt::Display for GroupingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for GroupingMethod {
    fn from(name: &str) -> Self {
        let (method, recognized) = GroupingMethod::parse(name);
        if !recognized {
            warn!(method = name, "unknown grouping method, falling back to hybrid");
        }
        method
    }
}

impl From<&String> for GroupingMethod {
    fn from(name: &String) -> Self {
        GroupingMethod::from(name.as_str())
    }
}
