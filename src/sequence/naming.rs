//! Group names and the coarse context signal used when labels are missing.

use ahash::AHashSet;

use crate::shot::Shot;

/// Name of the overflow group produced by filtering.
pub const MISCELLANEOUS: &str = "miscellaneous";

/// Named groups in creation order, before size filtering.
pub type RawGroups = Vec<(String, Vec<Shot>)>;

/// Lower-case a label, turn spaces and dashes into underscores and drop
/// every other non-alphanumeric character.
pub fn normalize_name(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' => Some('_'),
            c if c.is_alphanumeric() || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}

/// Coarse setting inferred from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Indoor,
    Outdoor,
}

impl Setting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Setting::Indoor => "indoor",
            Setting::Outdoor => "outdoor",
        }
    }

    /// Indoor keywords win over outdoor ones when both appear.
    pub fn detect(text: &str) -> Option<Setting> {
        let text = text.to_lowercase();
        if text.contains("indoor") || text.contains("interior") {
            Some(Setting::Indoor)
        } else if text.contains("outdoor") || text.contains("exterior") {
            Some(Setting::Outdoor)
        } else {
            None
        }
    }

    pub fn of_shot(shot: &Shot) -> Option<Setting> {
        Setting::detect(&shot.context_text())
    }
}

/// Hands out unique group names. [`MISCELLANEOUS`] is always taken.
#[derive(Debug)]
pub(crate) struct NameRegistry {
    used: AHashSet<String>,
}

impl NameRegistry {
    pub(crate) fn new() -> Self {
        let mut used = AHashSet::new();
        used.insert(MISCELLANEOUS.to_string());
        Self { used }
    }

    /// `base` if free, otherwise the first free `base_2`, `base_3`, ...
    pub(crate) fn claim(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{base}_{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
