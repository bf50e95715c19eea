//! Interactive region selectors
//!
//! A brush is bound to one view and holds the region the user last dragged,
//! already converted to domain coordinates. A brush without a usable region
//! is inactive and restricts nothing.

use serde::{Deserialize, Serialize};
use std::fmt;

use linkage_selection::{DomainRect, Point, Predicate};

use crate::error::{RegistrationError, RegistrationResult};

/// Identity of a brush
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrushId(String);

impl BrushId {
    /// Create a brush id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BrushId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BrushId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BrushId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Shape of region a brush selects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushKind {
    /// Two-corner region over both axes
    Rectangle,
    /// Circular lens around the pointer
    ///
    /// With `links` set, links touching a lensed node are selected too.
    Radius {
        #[serde(default)]
        links: bool,
    },
    /// One-dimensional range over a numeric field
    Interval { field: String },
    /// Registered for bookkeeping, never restricts
    None,
}

/// A selected region in domain coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DomainExtent {
    Rectangle(DomainRect),
    Radius { center: Point, radius: f64 },
    Interval { low: f64, high: f64 },
}

impl DomainExtent {
    /// Check for zero size, inverted bounds or NaN
    ///
    /// A brush moved to a degenerate extent restricts nothing.
    pub fn is_degenerate(&self) -> bool {
        match self {
            DomainExtent::Rectangle(rect) => rect.is_degenerate(),
            DomainExtent::Radius { center, radius } => {
                !(*radius > 0.0) || center.iter().any(|c| c.is_nan())
            }
            DomainExtent::Interval { low, high } => !(low < high),
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            DomainExtent::Rectangle(_) => "rectangle",
            DomainExtent::Radius { .. } => "radius",
            DomainExtent::Interval { .. } => "interval",
        }
    }
}

/// One interactive region selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub id: BrushId,
    pub kind: BrushKind,
    /// Current region, `None` when cleared
    pub extent: Option<DomainExtent>,
    pub active: bool,
}

impl Brush {
    /// Create an inactive brush
    pub fn new(id: impl Into<BrushId>, kind: BrushKind) -> Self {
        Self {
            id: id.into(),
            kind,
            extent: None,
            active: false,
        }
    }

    fn accepts(&self, extent: &DomainExtent) -> bool {
        matches!(
            (&self.kind, extent),
            (BrushKind::Rectangle, DomainExtent::Rectangle(_))
                | (BrushKind::Radius { .. }, DomainExtent::Radius { .. })
                | (BrushKind::Interval { .. }, DomainExtent::Interval { .. })
        )
    }

    /// Move the brush to a new region, returning whether it is active afterwards
    ///
    /// `None` and degenerate regions clear the brush.
    pub fn set_extent(&mut self, extent: Option<DomainExtent>) -> RegistrationResult<bool> {
        match extent {
            Some(extent) if !self.accepts(&extent) => Err(RegistrationError::ExtentMismatch {
                brush: self.id.to_string(),
                extent: extent.shape(),
            }),
            Some(extent) if !extent.is_degenerate() => {
                self.extent = Some(extent);
                self.active = true;
                Ok(true)
            }
            _ => {
                self.clear();
                Ok(false)
            }
        }
    }

    /// Drop the region and deactivate
    pub fn clear(&mut self) {
        self.extent = None;
        self.active = false;
    }

    /// The predicate this brush contributes, `All` while inactive
    pub fn predicate(&self) -> Predicate {
        if !self.active {
            return Predicate::All;
        }
        match (&self.kind, self.extent) {
            (BrushKind::Rectangle, Some(DomainExtent::Rectangle(rect))) => {
                Predicate::Rectangle(rect)
            }
            (BrushKind::Radius { links }, Some(DomainExtent::Radius { center, radius })) => {
                let lens = Predicate::radius(center, radius);
                if *links {
                    Predicate::or(lens.clone(), Predicate::incident(lens))
                } else {
                    lens
                }
            }
            (BrushKind::Interval { field }, Some(DomainExtent::Interval { low, high })) => {
                Predicate::interval(field.clone(), low, high)
            }
            _ => Predicate::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> DomainExtent {
        DomainExtent::Rectangle(DomainRect::new([x0, y0], [x1, y1]))
    }

    #[test]
    fn test_new_brush_is_unrestricted() {
        let brush = Brush::new("b", BrushKind::Rectangle);
        assert!(!brush.active);
        assert_eq!(brush.predicate(), Predicate::All);
    }

    #[test]
    fn test_set_extent_activates() {
        let mut brush = Brush::new("b", BrushKind::Rectangle);
        assert!(brush.set_extent(Some(rect(0.0, 0.0, 10.0, 10.0))).unwrap());
        assert!(brush.active);
        assert_eq!(
            brush.predicate(),
            Predicate::rectangle([0.0, 0.0], [10.0, 10.0])
        );
    }

    #[test]
    fn test_degenerate_extent_clears() {
        let mut brush = Brush::new("b", BrushKind::Rectangle);
        brush.set_extent(Some(rect(0.0, 0.0, 10.0, 10.0))).unwrap();

        // zero-width drag
        assert!(!brush.set_extent(Some(rect(5.0, 0.0, 5.0, 10.0))).unwrap());
        assert!(!brush.active);
        assert_eq!(brush.extent, None);
        assert_eq!(brush.predicate(), Predicate::All);
    }

    #[test]
    fn test_inverted_extent_clears() {
        let mut brush = Brush::new("b", BrushKind::Rectangle);
        assert!(!brush.set_extent(Some(rect(10.0, 10.0, 0.0, 0.0))).unwrap());
    }

    #[test]
    fn test_radius_and_interval_degenerate() {
        assert!(DomainExtent::Radius {
            center: [0.0, 0.0],
            radius: 0.0
        }
        .is_degenerate());
        assert!(DomainExtent::Interval {
            low: 3.0,
            high: 3.0
        }
        .is_degenerate());
        assert!(!DomainExtent::Interval {
            low: 1.0,
            high: 3.0
        }
        .is_degenerate());
    }

    #[test]
    fn test_interval_predicate_uses_field() {
        let mut brush = Brush::new(
            "hist",
            BrushKind::Interval {
                field: "centrality".to_string(),
            },
        );
        brush
            .set_extent(Some(DomainExtent::Interval {
                low: 10.0,
                high: 20.0,
            }))
            .unwrap();
        assert_eq!(
            brush.predicate(),
            Predicate::interval("centrality", 10.0, 20.0)
        );
    }

    #[test]
    fn test_link_lens_adds_incident_links() {
        let lens = DomainExtent::Radius {
            center: [1.0, 2.0],
            radius: 5.0,
        };
        let mut plain = Brush::new("lens", BrushKind::Radius { links: false });
        plain.set_extent(Some(lens)).unwrap();
        assert_eq!(plain.predicate(), Predicate::radius([1.0, 2.0], 5.0));

        let mut graph = Brush::new("lens", BrushKind::Radius { links: true });
        graph.set_extent(Some(lens)).unwrap();
        assert_eq!(
            graph.predicate(),
            Predicate::or(
                Predicate::radius([1.0, 2.0], 5.0),
                Predicate::incident(Predicate::radius([1.0, 2.0], 5.0)),
            )
        );
    }

    #[test]
    fn test_extent_mismatch() {
        let mut brush = Brush::new("lens", BrushKind::Radius { links: false });
        let err = brush
            .set_extent(Some(rect(0.0, 0.0, 1.0, 1.0)))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::ExtentMismatch { .. }));
        assert!(!brush.active);
    }
}
