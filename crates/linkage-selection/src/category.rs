//! Toggleable category set for legend and bar-swatch selection

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of selected categories manipulated by toggling
///
/// Toggling is symmetric difference with a single key, so toggling the same
/// key twice leaves the set unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet {
    selected: BTreeSet<String>,
}

impl CategorySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a category, returning whether it is selected afterwards
    pub fn toggle(&mut self, category: &str) -> bool {
        if self.selected.remove(category) {
            false
        } else {
            self.selected.insert(category.to_string());
            true
        }
    }

    /// Check if a category is selected
    pub fn contains(&self, category: &str) -> bool {
        self.selected.contains(category)
    }

    /// Number of selected categories
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Iterate selected categories in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CategorySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().map(Into::into).collect(),
        }
    }
}
