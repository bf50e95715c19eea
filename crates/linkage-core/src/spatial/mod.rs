//! Spatial indexing for pointer queries
//!
//! Provides a bulk-loaded R-tree for:
//! - Nearest-entity lookup under the pointer
//! - Box range queries

pub mod rtree;

pub use rtree::{BoundingBox, RTree, RTreeConfig};
