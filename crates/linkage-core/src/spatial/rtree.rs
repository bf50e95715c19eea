//! R-tree spatial index over entity positions
//!
//! The tree is bulk-loaded with Sort-Tile-Recursive packing, since positions
//! arrive all at once on load and on every layout tick. It provides:
//! - Nearest neighbor search (hover picking)
//! - Range queries (find all points in a box)

use serde::{Deserialize, Serialize};

use linkage_selection::Point;

/// Configuration for R-tree construction
#[derive(Clone, Debug)]
pub struct RTreeConfig {
    /// Maximum entries per node (default: 16)
    pub max_entries: usize,
}

impl Default for RTreeConfig {
    fn default() -> Self {
        Self { max_entries: 16 }
    }
}

/// A 2D bounding box for spatial indexing
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    /// Create a bounding box from min/max corners
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Create an empty (invalid) bounding box
    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY, f64::INFINITY],
            max: [f64::NEG_INFINITY, f64::NEG_INFINITY],
        }
    }

    /// Check if the bounding box is empty/invalid
    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1]
    }

    /// Expand to include a point
    pub fn expand_to_include(&mut self, point: Point) {
        for (i, &p) in point.iter().enumerate() {
            self.min[i] = self.min[i].min(p);
            self.max[i] = self.max[i].max(p);
        }
    }

    /// Expand to include another bounding box
    pub fn expand_to_include_box(&mut self, other: &BoundingBox) {
        for i in 0..2 {
            self.min[i] = self.min[i].min(other.min[i]);
            self.max[i] = self.max[i].max(other.max[i]);
        }
    }

    /// Check if a point is contained, bounds inclusive
    pub fn contains_point(&self, point: Point) -> bool {
        (0..2).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Check if this box intersects another
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        (0..2).all(|i| self.min[i] <= other.max[i] && self.max[i] >= other.min[i])
    }

    /// Calculate the center of the bounding box
    pub fn center(&self) -> Point {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        ]
    }

    /// Calculate squared distance from a point to the nearest point on the box
    pub fn distance_sq_to_point(&self, point: Point) -> f64 {
        let mut dist_sq = 0.0;
        for (i, &p) in point.iter().enumerate() {
            if p < self.min[i] {
                dist_sq += (self.min[i] - p).powi(2);
            } else if p > self.max[i] {
                dist_sq += (p - self.max[i]).powi(2);
            }
        }
        dist_sq
    }
}

/// An entry in the R-tree (point with index)
#[derive(Clone, Debug)]
struct Entry {
    point: Point,
    index: usize,
}

/// A node in the R-tree
#[derive(Debug)]
enum Node {
    Leaf {
        bounds: BoundingBox,
        entries: Vec<Entry>,
    },
    Internal {
        bounds: BoundingBox,
        children: Vec<Node>,
    },
}

impl Node {
    fn bounds(&self) -> &BoundingBox {
        match self {
            Node::Leaf { bounds, .. } => bounds,
            Node::Internal { bounds, .. } => bounds,
        }
    }

    fn leaf(entries: Vec<Entry>) -> Self {
        let mut bounds = BoundingBox::empty();
        for entry in &entries {
            bounds.expand_to_include(entry.point);
        }
        Node::Leaf { bounds, entries }
    }

    fn internal(children: Vec<Node>) -> Self {
        let mut bounds = BoundingBox::empty();
        for child in &children {
            bounds.expand_to_include_box(child.bounds());
        }
        Node::Internal { bounds, children }
    }
}

/// R-tree spatial index
#[derive(Debug, Default)]
pub struct RTree {
    root: Option<Node>,
    size: usize,
}

impl RTree {
    /// Build an R-tree from `(index, point)` pairs
    ///
    /// Points with a NaN coordinate are skipped.
    pub fn build(points: impl IntoIterator<Item = (usize, Point)>) -> Self {
        Self::build_with_config(points, RTreeConfig::default())
    }

    /// Build an R-tree with custom configuration
    pub fn build_with_config(
        points: impl IntoIterator<Item = (usize, Point)>,
        config: RTreeConfig,
    ) -> Self {
        let capacity = config.max_entries.max(2);
        let entries: Vec<Entry> = points
            .into_iter()
            .filter(|(_, p)| !p[0].is_nan() && !p[1].is_nan())
            .map(|(index, point)| Entry { point, index })
            .collect();
        let size = entries.len();

        if entries.is_empty() {
            return Self::default();
        }

        let mut level: Vec<Node> = tile(entries, capacity, |e| e.point)
            .into_iter()
            .map(Node::leaf)
            .collect();

        while level.len() > 1 {
            level = tile(level, capacity, |n| n.bounds().center())
                .into_iter()
                .map(Node::internal)
                .collect();
        }

        Self {
            root: level.pop(),
            size,
        }
    }

    /// Query indices of points within a bounding box
    pub fn query_box(&self, query_box: &BoundingBox) -> Vec<usize> {
        let mut results = Vec::new();
        if let Some(ref root) = self.root {
            Self::query_box_recursive(root, query_box, &mut results);
        }
        results
    }

    fn query_box_recursive(node: &Node, query_box: &BoundingBox, results: &mut Vec<usize>) {
        if !node.bounds().intersects(query_box) {
            return;
        }

        match node {
            Node::Leaf { entries, .. } => {
                for entry in entries {
                    if query_box.contains_point(entry.point) {
                        results.push(entry.index);
                    }
                }
            }
            Node::Internal { children, .. } => {
                for child in children {
                    Self::query_box_recursive(child, query_box, results);
                }
            }
        }
    }

    /// Find the nearest point, returning its index and Euclidean distance
    pub fn nearest(&self, point: Point) -> Option<(usize, f64)> {
        self.knn(point, 1).into_iter().next()
    }

    /// Find k nearest neighbors, returning indices and Euclidean distances
    ///
    /// Ties in distance resolve to the lower index.
    pub fn knn(&self, point: Point, k: usize) -> Vec<(usize, f64)> {
        let mut results: Vec<(usize, f64)> = Vec::new();
        if k == 0 {
            return results;
        }

        if let Some(ref root) = self.root {
            let mut max_dist_sq = f64::INFINITY;
            Self::knn_recursive(root, point, k, &mut results, &mut max_dist_sq);
        }

        results
            .into_iter()
            .map(|(index, dist_sq)| (index, dist_sq.sqrt()))
            .collect()
    }

    fn knn_recursive(
        node: &Node,
        query: Point,
        k: usize,
        results: &mut Vec<(usize, f64)>,
        max_dist_sq: &mut f64,
    ) {
        // Skip if node is too far
        if node.bounds().distance_sq_to_point(query) > *max_dist_sq {
            return;
        }

        match node {
            Node::Leaf { entries, .. } => {
                for entry in entries {
                    let dist_sq = (entry.point[0] - query[0]).powi(2)
                        + (entry.point[1] - query[1]).powi(2);

                    if dist_sq <= *max_dist_sq || results.len() < k {
                        results.push((entry.index, dist_sq));
                        results.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
                        results.truncate(k);
                        if results.len() == k {
                            *max_dist_sq = results[k - 1].1;
                        }
                    }
                }
            }
            Node::Internal { children, .. } => {
                // Visit closer children first for better pruning
                let mut order: Vec<(usize, f64)> = children
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (i, c.bounds().distance_sq_to_point(query)))
                    .collect();
                order.sort_by(|a, b| a.1.total_cmp(&b.1));

                for (i, _) in order {
                    Self::knn_recursive(&children[i], query, k, results, max_dist_sq);
                }
            }
        }
    }

    /// Get the number of points in the tree
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Get the bounding box of all points
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.root.as_ref().map(|r| *r.bounds())
    }
}

/// Sort-Tile-Recursive packing of items into groups of at most `capacity`
fn tile<T>(mut items: Vec<T>, capacity: usize, key: impl Fn(&T) -> Point) -> Vec<Vec<T>> {
    let groups = items.len().div_ceil(capacity);
    let strips = (groups as f64).sqrt().ceil() as usize;
    let strip_len = strips.max(1) * capacity;

    items.sort_by(|a, b| key(a)[0].total_cmp(&key(b)[0]));

    let mut tiles = Vec::with_capacity(groups);
    let mut rest = items;
    while !rest.is_empty() {
        let tail = rest.split_off(strip_len.min(rest.len()));
        let mut strip = rest;
        rest = tail;

        strip.sort_by(|a, b| key(a)[1].total_cmp(&key(b)[1]));
        while !strip.is_empty() {
            let tail = strip.split_off(capacity.min(strip.len()));
            tiles.push(strip);
            strip = tail;
        }
    }
    tiles
}
