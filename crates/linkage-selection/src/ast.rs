//! Predicate expression tree
//!
//! A `Predicate` describes which entities belong to a selection. Leaves are
//! the membership tests of [`crate::membership`]; inner nodes combine them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::category::CategorySet;
use crate::entity::{EntityId, Point};

/// A selection predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Every entity (no restriction)
    All,

    /// No entity
    None,

    /// Logical AND of two predicates
    And(Box<Predicate>, Box<Predicate>),

    /// Logical OR of two predicates
    Or(Box<Predicate>, Box<Predicate>),

    /// Logical NOT of a predicate
    Not(Box<Predicate>),

    /// Position inside a rectangle, bounds inclusive
    Rectangle(DomainRect),

    /// Position strictly closer than `radius` to `center`
    Radius { center: Point, radius: f64 },

    /// The focus entity or one of its graph neighbors
    Neighbor { focus: EntityId },

    /// Category is one of the selected categories
    Category(CategorySet),

    /// Numeric field inside `[low, high]`, bounds inclusive
    Interval { field: String, low: f64, high: f64 },

    /// Numeric field comparison
    Comparison(Comparison),

    /// Explicit id set
    Members(BTreeSet<EntityId>),

    /// Link entity with at least one endpoint satisfying the inner predicate
    Incident(Box<Predicate>),
}

impl Predicate {
    /// Create an AND predicate
    pub fn and(left: Predicate, right: Predicate) -> Self {
        Predicate::And(Box::new(left), Box::new(right))
    }

    /// Create an OR predicate
    pub fn or(left: Predicate, right: Predicate) -> Self {
        Predicate::Or(Box::new(left), Box::new(right))
    }

    /// Create a NOT predicate
    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Create a rectangle predicate from two corners
    pub fn rectangle(min: Point, max: Point) -> Self {
        Predicate::Rectangle(DomainRect::new(min, max))
    }

    /// Create a radius predicate
    pub fn radius(center: Point, radius: f64) -> Self {
        Predicate::Radius { center, radius }
    }

    /// Create a neighborhood predicate around a focus id
    pub fn neighbor(focus: impl Into<EntityId>) -> Self {
        Predicate::Neighbor {
            focus: focus.into(),
        }
    }

    /// Create a category predicate
    pub fn category<S: Into<String>>(categories: impl IntoIterator<Item = S>) -> Self {
        Predicate::Category(categories.into_iter().collect())
    }

    /// Create an interval predicate over a numeric field
    pub fn interval(field: impl Into<String>, low: f64, high: f64) -> Self {
        Predicate::Interval {
            field: field.into(),
            low,
            high,
        }
    }

    /// Create an explicit id-set predicate
    pub fn members<I: Into<EntityId>>(ids: impl IntoIterator<Item = I>) -> Self {
        Predicate::Members(ids.into_iter().map(Into::into).collect())
    }

    /// Create an incident-link predicate
    pub fn incident(inner: Predicate) -> Self {
        Predicate::Incident(Box::new(inner))
    }

    /// Conjunction of many predicates, simplifying away `All`
    ///
    /// Returns `All` for an empty input.
    pub fn all_of(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        predicates
            .into_iter()
            .filter(|p| !matches!(p, Predicate::All))
            .reduce(Predicate::and)
            .unwrap_or(Predicate::All)
    }

    /// Check if the result depends on entity positions
    pub fn is_spatial(&self) -> bool {
        match self {
            Predicate::Rectangle(_) | Predicate::Radius { .. } => true,
            Predicate::And(a, b) | Predicate::Or(a, b) => a.is_spatial() || b.is_spatial(),
            Predicate::Not(inner) | Predicate::Incident(inner) => inner.is_spatial(),
            _ => false,
        }
    }

    /// The focus id of the first neighborhood predicate, if any
    pub fn focus(&self) -> Option<&EntityId> {
        match self {
            Predicate::Neighbor { focus } => Some(focus),
            Predicate::And(a, b) | Predicate::Or(a, b) => a.focus().or_else(|| b.focus()),
            _ => None,
        }
    }
}

/// An axis-aligned rectangle in domain coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainRect {
    /// Minimum corner `[x0, y0]`
    pub min: Point,
    /// Maximum corner `[x1, y1]`
    pub max: Point,
}

impl DomainRect {
    /// Create a rectangle from two corners as given
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Create a rectangle from two opposite corners in any order
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: [a[0].min(b[0]), a[1].min(b[1])],
            max: [a[0].max(b[0]), a[1].max(b[1])],
        }
    }

    /// Check if a point lies inside, bounds inclusive
    pub fn contains(&self, point: &Point) -> bool {
        (0..2).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Check for zero area, inverted corners or NaN bounds
    pub fn is_degenerate(&self) -> bool {
        // `!(a < b)` also catches NaN
        (0..2).any(|i| !(self.min[i] < self.max[i]))
    }

    /// Width and height
    pub fn size(&self) -> [f64; 2] {
        [self.max[0] - self.min[0], self.max[1] - self.min[1]]
    }
}

/// A numeric field comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Field name
    pub field: String,
    /// Comparison operator
    pub op: ComparisonOp,
    /// Literal right-hand side
    pub value: f64,
}

impl Comparison {
    /// Create a new comparison
    pub fn new(field: impl Into<String>, op: ComparisonOp, value: f64) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Ne,
}

impl ComparisonOp {
    /// Evaluate the comparison for two f64 values
    pub fn evaluate(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            ComparisonOp::Lt => lhs < rhs,
            ComparisonOp::Le => lhs <= rhs,
            ComparisonOp::Gt => lhs > rhs,
            ComparisonOp::Ge => lhs >= rhs,
            ComparisonOp::Eq => (lhs - rhs).abs() < 1e-10,
            ComparisonOp::Ne => (lhs - rhs).abs() >= 1e-10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_of_simplifies() {
        assert_eq!(Predicate::all_of([]), Predicate::All);
        assert_eq!(
            Predicate::all_of([Predicate::All, Predicate::None]),
            Predicate::None
        );

        let combined = Predicate::all_of([
            Predicate::neighbor("a"),
            Predicate::All,
            Predicate::category(["Drama"]),
        ]);
        assert!(matches!(combined, Predicate::And(_, _)));
    }

    #[test]
    fn test_rect_degenerate() {
        assert!(!DomainRect::new([0.0, 0.0], [1.0, 1.0]).is_degenerate());
        assert!(DomainRect::new([0.0, 0.0], [0.0, 1.0]).is_degenerate());
        assert!(DomainRect::new([1.0, 0.0], [0.0, 1.0]).is_degenerate());
        assert!(DomainRect::new([f64::NAN, 0.0], [1.0, 1.0]).is_degenerate());
    }

    #[test]
    fn test_rect_from_corners() {
        let r = DomainRect::from_corners([10.0, 0.0], [0.0, 5.0]);
        assert_eq!(r.min, [0.0, 0.0]);
        assert_eq!(r.max, [10.0, 5.0]);
        assert_eq!(r.size(), [10.0, 5.0]);
    }

    #[test]
    fn test_is_spatial() {
        assert!(Predicate::radius([0.0, 0.0], 1.0).is_spatial());
        assert!(Predicate::incident(Predicate::rectangle([0.0, 0.0], [1.0, 1.0])).is_spatial());
        assert!(!Predicate::and(Predicate::neighbor("a"), Predicate::All).is_spatial());
    }

    #[test]
    fn test_focus_lookup() {
        let p = Predicate::and(Predicate::category(["x"]), Predicate::neighbor("n1"));
        assert_eq!(p.focus(), Some(&EntityId::from("n1")));
        assert_eq!(Predicate::All.focus(), None);
    }

    #[test]
    fn test_comparison_operators() {
        assert!(ComparisonOp::Lt.evaluate(1.0, 2.0));
        assert!(!ComparisonOp::Lt.evaluate(2.0, 1.0));
        assert!(ComparisonOp::Le.evaluate(1.0, 1.0));
        assert!(ComparisonOp::Gt.evaluate(2.0, 1.0));
        assert!(ComparisonOp::Eq.evaluate(1.0, 1.0));
        assert!(ComparisonOp::Ne.evaluate(1.0, 1.5));
    }
}
