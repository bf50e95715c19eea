//! Pure membership tests
//!
//! Each function decides whether one entity belongs to one selection region.
//! They are deterministic, side-effect free, and fail closed: an entity
//! missing the field a test needs is never a member.

use crate::category::CategorySet;
use crate::entity::{Entity, EntityId, Point};
use crate::ast::DomainRect;
use crate::neighbors::NeighborIndex;

/// Position inside `[x0, x1] × [y0, y1]`, inclusive on both bounds
pub fn rectangle_membership(entity: &Entity, extent: &DomainRect) -> bool {
    entity
        .position
        .map_or(false, |position| extent.contains(&position))
}

/// Euclidean distance to `center` strictly less than `radius`
///
/// The boundary is open: an entity at exactly `radius` is excluded.
pub fn radius_membership(entity: &Entity, center: Point, radius: f64) -> bool {
    entity
        .position
        .map_or(false, |position| distance(&position, &center) < radius)
}

/// The focus itself or one of its neighbors
///
/// An id unknown to the index matches nothing, including itself.
pub fn neighbor_membership(entity: &Entity, focus: &EntityId, index: &NeighborIndex) -> bool {
    if !index.contains(focus) {
        return false;
    }
    entity.id == *focus || index.is_neighbor(focus, &entity.id)
}

/// Category is in the selected set
pub fn category_membership(entity: &Entity, selected: &CategorySet) -> bool {
    entity
        .category
        .as_deref()
        .map_or(false, |category| selected.contains(category))
}

/// Numeric field inside `[low, high]`, inclusive on both bounds
pub fn interval_membership(entity: &Entity, field: &str, low: f64, high: f64) -> bool {
    entity
        .field(field)
        .map_or(false, |value| value >= low && value <= high)
}

/// Euclidean distance between two domain points
pub fn distance(a: &Point, b: &Point) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}
