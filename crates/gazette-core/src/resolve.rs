//! Turning foreign keys into display labels.

use crate::model::ForeignKey;
use crate::reference::ReferenceTable;

/// Returned when the caller's fallback is itself empty.
pub const LAST_RESORT_LABEL: &str = "Unknown";

/// Resolve `key` to a non-empty label.
///
/// An embedded label wins without consulting `table`. Otherwise the id is
/// looked up; absent keys, unknown ids and blank labels all yield `fallback`.
pub fn resolve(key: &ForeignKey, table: &ReferenceTable, fallback: &str) -> String {
    if let Some(label) = key.embedded_label() {
        return label.to_string();
    }
    key.id()
        .and_then(|id| table.get(id))
        .filter(|label| !label.is_empty())
        .map(String::from)
        .unwrap_or_else(|| non_empty(fallback).to_string())
}

fn non_empty(fallback: &str) -> &str {
    if fallback.is_empty() {
        LAST_RESORT_LABEL
    } else {
        fallback
    }
}

/// Fallback text for the category and author slots of one rendering context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackLabels {
    pub category: String,
    pub author: String,
}

impl FallbackLabels {
    pub fn new(category: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            author: author.into(),
        }
    }

    /// Grid cards.
    pub fn card() -> Self {
        Self::new("No category assigned", "Anonymous")
    }

    /// The featured (first) article on the front page.
    pub fn featured() -> Self {
        Self::new("Uncategorized", "Anonymous")
    }

    /// The single-article detail view.
    pub fn detail() -> Self {
        Self::new("Uncategorized", "Anonymous")
    }
}

impl Default for FallbackLabels {
    fn default() -> Self {
        Self::card()
    }
}
