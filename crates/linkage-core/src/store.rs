//! Entity store
//!
//! Holds the data set of one linked group with stable identity, the graph
//! neighbor index built from it, and a spatial index over positions. The
//! store is replaced wholesale on reload; between reloads only positions
//! change, streamed in from a layout engine.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use linkage_selection::{CategorySet, Entity, EntityId, EvalContext, NeighborIndex, Point};

use crate::spatial::RTree;

/// One record as handed over by data loading
///
/// Records without an `id` take the id of their array position. Records with
/// `source` and `target` are links between two other records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub position: Option<Point>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, f64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    /// Precomputed adjacency, merged with link endpoints
    #[serde(default)]
    pub neighbors: Vec<String>,
}

impl EntityRecord {
    fn into_entity(self, position_index: usize) -> (Entity, Vec<String>) {
        let id = match self.id {
            Some(key) => EntityId::new(key),
            None => EntityId::from(position_index),
        };
        let endpoints = match (self.source, self.target) {
            (Some(source), Some(target)) => Some((EntityId::new(source), EntityId::new(target))),
            _ => None,
        };
        let entity = Entity {
            id,
            position: self.position,
            category: self.category,
            fields: self.fields,
            endpoints,
        };
        (entity, self.neighbors)
    }
}

/// A position refresh for one entity, from one layout tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
}

impl PositionUpdate {
    pub fn new(id: impl Into<EntityId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
        }
    }
}

/// Outcome of applying one layout tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionReport {
    /// Updates applied to a known entity
    pub applied: usize,
    /// Updates naming an id not in the store
    pub ignored: usize,
}

/// The data set shared by every view of a linked group
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
    by_id: HashMap<EntityId, usize>,
    neighbors: NeighborIndex,
    spatial: RTree,
    spatial_dirty: bool,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loading records
    pub fn from_records(records: impl IntoIterator<Item = EntityRecord>) -> Self {
        let mut adjacency = Vec::new();
        let entities = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                let (entity, neighbors) = record.into_entity(i);
                for neighbor in neighbors {
                    adjacency.push((entity.id.clone(), EntityId::new(neighbor)));
                }
                entity
            })
            .collect::<Vec<_>>();
        Self::build(entities, adjacency)
    }

    /// Build a store from entities that already carry ids
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        Self::build(entities.into_iter().collect(), Vec::new())
    }

    fn build(loaded: Vec<Entity>, adjacency: Vec<(EntityId, EntityId)>) -> Self {
        let mut entities = Vec::with_capacity(loaded.len());
        let mut by_id = HashMap::with_capacity(loaded.len());
        let mut duplicates = 0usize;

        for entity in loaded {
            if by_id.contains_key(&entity.id) {
                duplicates += 1;
                warn!(id = %entity.id, "Duplicate entity id, keeping the first record");
                continue;
            }
            by_id.insert(entity.id.clone(), entities.len());
            entities.push(entity);
        }

        // Every node is indexed so an isolated focus still highlights itself
        let mut neighbors = NeighborIndex::from_links(&entities);
        for entity in entities.iter().filter(|e| !e.is_link()) {
            neighbors.add_node(entity.id.clone());
        }
        for (a, b) in adjacency {
            neighbors.add_edge(a, b);
        }

        info!(
            entities = entities.len(),
            links = entities.iter().filter(|e| e.is_link()).count(),
            edges = neighbors.edge_count(),
            duplicates,
            "Loaded entity store"
        );

        Self {
            entities,
            by_id,
            neighbors,
            spatial: RTree::default(),
            spatial_dirty: true,
        }
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Check if an id is present
    pub fn contains(&self, id: &EntityId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Iterate entity ids in load order
    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.iter().map(|e| &e.id)
    }

    /// Every distinct category in the store
    pub fn categories(&self) -> CategorySet {
        self.entities
            .iter()
            .filter_map(|e| e.category.as_deref())
            .collect()
    }

    /// Refresh positions from one layout tick
    ///
    /// Unknown ids are ignored. The spatial index is rebuilt on next use.
    pub fn apply_positions(
        &mut self,
        updates: impl IntoIterator<Item = PositionUpdate>,
    ) -> PositionReport {
        let mut report = PositionReport::default();
        for update in updates {
            match self.by_id.get(&update.id) {
                Some(&i) => {
                    self.entities[i].position = Some([update.x, update.y]);
                    report.applied += 1;
                }
                None => report.ignored += 1,
            }
        }
        if report.applied > 0 {
            self.spatial_dirty = true;
        }
        report
    }

    /// Find the positioned entity nearest to a domain point
    ///
    /// Returns `None` for an empty store, a non-finite point, or when the
    /// nearest entity is farther than `max_distance`.
    pub fn nearest(&mut self, point: Point, max_distance: Option<f64>) -> Option<(EntityId, f64)> {
        if !point.iter().all(|c| c.is_finite()) {
            return None;
        }
        let (index, distance) = self.spatial_index().nearest(point)?;
        if max_distance.map_or(false, |max| distance > max) {
            return None;
        }
        Some((self.entities[index].id.clone(), distance))
    }

    /// The spatial index over current positions, rebuilt if stale
    pub fn spatial_index(&mut self) -> &RTree {
        if self.spatial_dirty {
            self.spatial = RTree::build(
                self.entities
                    .iter()
                    .enumerate()
                    .filter_map(|(i, e)| e.position.map(|p| (i, p))),
            );
            self.spatial_dirty = false;
        }
        &self.spatial
    }
}

impl EvalContext for EntityStore {
    fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.by_id.get(id).map(|&i| &self.entities[i])
    }

    fn neighbor_index(&self) -> &NeighborIndex {
        &self.neighbors
    }
}
