//! Entity model shared by every predicate
//!
//! An entity is one record of a data set with a stable identity. Predicates
//! read its optional position, category, numeric fields and link endpoints;
//! a missing field makes the predicate fail closed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A point in domain space
pub type Point = [f64; 2];

/// Stable identity of an entity within one data set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an id from a natural key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for EntityId {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Position-derived identity, used when the source data has no natural key
impl From<usize> for EntityId {
    fn from(index: usize) -> Self {
        Self(index.to_string())
    }
}

/// One data record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identity
    pub id: EntityId,

    /// Position in domain space
    #[serde(default)]
    pub position: Option<Point>,

    /// Categorical attribute (genre, species, group)
    #[serde(default)]
    pub category: Option<String>,

    /// Numeric attributes addressable by name
    #[serde(default)]
    pub fields: BTreeMap<String, f64>,

    /// Source and target ids when this entity is a graph link
    #[serde(default)]
    pub endpoints: Option<(EntityId, EntityId)>,
}

impl Entity {
    /// Create an entity with only an id
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            position: None,
            category: None,
            fields: BTreeMap::new(),
            endpoints: None,
        }
    }

    /// Create a link entity between two other entities
    pub fn link(
        id: impl Into<EntityId>,
        source: impl Into<EntityId>,
        target: impl Into<EntityId>,
    ) -> Self {
        Self::new(id).with_endpoints(source, target)
    }

    /// Set the domain position
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some([x, y]);
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set a numeric field
    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Set the link endpoints
    pub fn with_endpoints(
        mut self,
        source: impl Into<EntityId>,
        target: impl Into<EntityId>,
    ) -> Self {
        self.endpoints = Some((source.into(), target.into()));
        self
    }

    /// Get a numeric field
    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    /// Check if this entity is a graph link
    pub fn is_link(&self) -> bool {
        self.endpoints.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_derived_id() {
        assert_eq!(EntityId::from(7usize).as_str(), "7");
        assert_eq!(EntityId::from(7usize), EntityId::from("7"));
    }

    #[test]
    fn test_builder() {
        let e = Entity::new("a")
            .at(1.0, 2.0)
            .with_category("Drama")
            .with_field("rating", 7.5);

        assert_eq!(e.position, Some([1.0, 2.0]));
        assert_eq!(e.category.as_deref(), Some("Drama"));
        assert_eq!(e.field("rating"), Some(7.5));
        assert_eq!(e.field("missing"), None);
        assert!(!e.is_link());
    }

    #[test]
    fn test_link() {
        let l = Entity::link("a-b", "a", "b");
        assert!(l.is_link());
        assert_eq!(l.endpoints, Some((EntityId::from("a"), EntityId::from("b"))));
    }
}
