//! Reference-style link definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a reference label points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub target: String,
    pub title: Option<String>,
}

/// Maps normalized labels to link targets.
///
/// Labels are case-insensitive: they are normalized with
/// [`normalize_label`] on both insert and lookup.
///
/// # Example
///
/// ```
/// use mdscan_core::ReferenceTable;
///
/// let mut table = ReferenceTable::new();
/// table.define("Foo", "/url", Some("title".to_string()));
/// assert_eq!(table.resolve("FOO").map(|t| t.target.as_str()), Some("/url"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTable {
    entries: BTreeMap<String, LinkTarget>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `label`. A later definition of the same label replaces the
    /// earlier one; returns the replaced target, if any.
    pub fn define(
        &mut self,
        label: &str,
        target: impl Into<String>,
        title: Option<String>,
    ) -> Option<LinkTarget> {
        self.entries.insert(
            normalize_label(label),
            LinkTarget {
                target: target.into(),
                title,
            },
        )
    }

    pub fn resolve(&self, label: &str) -> Option<&LinkTarget> {
        self.entries.get(&normalize_label(label))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.resolve(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by normalized label.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkTarget)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Lowercase a label and collapse internal whitespace runs to one space.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
