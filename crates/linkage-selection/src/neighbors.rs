//! Undirected adjacency index for graph neighborhood highlighting
//!
//! Built once per data load. An edge `(a, b)` makes `b` a neighbor of `a`
//! and `a` a neighbor of `b`.

use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{BTreeSet, HashMap};

use crate::entity::{Entity, EntityId};

/// Mapping from entity id to its adjacent ids
#[derive(Debug, Clone, Default)]
pub struct NeighborIndex {
    graph: UnGraph<EntityId, ()>,
    nodes: HashMap<EntityId, NodeIndex>,
}

impl NeighborIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from an edge list
    pub fn from_edges<I, A, B>(edges: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<EntityId>,
        B: Into<EntityId>,
    {
        let mut index = Self::new();
        for (a, b) in edges {
            index.add_edge(a.into(), b.into());
        }
        index
    }

    /// Build an index from the link entities of a data set
    pub fn from_links<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> Self {
        let mut index = Self::new();
        for entity in entities {
            if let Some((source, target)) = &entity.endpoints {
                index.add_edge(source.clone(), target.clone());
            }
        }
        index
    }

    /// Register an id with no edges yet
    pub fn add_node(&mut self, id: EntityId) -> NodeIndex {
        if let Some(&ix) = self.nodes.get(&id) {
            return ix;
        }
        let ix = self.graph.add_node(id.clone());
        self.nodes.insert(id, ix);
        ix
    }

    /// Add an undirected edge; repeated edges are stored once
    pub fn add_edge(&mut self, a: EntityId, b: EntityId) {
        let a = self.add_node(a);
        let b = self.add_node(b);
        self.graph.update_edge(a, b, ());
    }

    /// Check if an id is known to the index
    pub fn contains(&self, id: &EntityId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Check if `other` is adjacent to `id`
    pub fn is_neighbor(&self, id: &EntityId, other: &EntityId) -> bool {
        match (self.nodes.get(id), self.nodes.get(other)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Get the adjacent ids of `id`, or `None` for an unknown id
    pub fn neighbors(&self, id: &EntityId) -> Option<BTreeSet<EntityId>> {
        let &ix = self.nodes.get(id)?;
        Some(
            self.graph
                .neighbors(ix)
                .map(|n| self.graph[n].clone())
                .collect(),
        )
    }

    /// Number of ids in the index
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
