//! Interaction controller
//!
//! Translates pixel-space pointer events into domain-space commands using
//! per-axis scale inversion. The controller does no filtering of its own; a
//! [`crate::LinkedGroup`] applies the commands it produces.

use serde::{Deserialize, Serialize};

use linkage_selection::{DomainRect, Point};

use crate::brush::{BrushId, DomainExtent};
use crate::config::LensConfig;

/// A bidirectional mapping between one data axis and pixels
pub trait ScaleMapping {
    /// Domain value to pixel
    fn forward(&self, value: f64) -> f64;

    /// Pixel to domain value
    fn invert(&self, pixel: f64) -> f64;
}

/// Value transform applied before linear interpolation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleTransform {
    #[default]
    Linear,
    Log10,
    /// Symmetric log: sign(x) * log10(1 + |x|)
    SymLog,
}

impl ScaleTransform {
    fn apply(&self, value: f64) -> f64 {
        match self {
            ScaleTransform::Linear => value,
            ScaleTransform::Log10 => value.log10(),
            ScaleTransform::SymLog => value.signum() * (1.0 + value.abs()).log10(),
        }
    }

    fn inverse(&self, value: f64) -> f64 {
        match self {
            ScaleTransform::Linear => value,
            ScaleTransform::Log10 => 10.0_f64.powf(value),
            ScaleTransform::SymLog => value.signum() * (10.0_f64.powf(value.abs()) - 1.0),
        }
    }
}

/// A continuous scale from a domain interval onto a pixel range
///
/// The range may be reversed, as for a y axis that grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
    pub transform: ScaleTransform,
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            range,
            transform: ScaleTransform::Linear,
        }
    }

    pub fn with_transform(mut self, transform: ScaleTransform) -> Self {
        self.transform = transform;
        self
    }

    fn transformed_domain(&self) -> [f64; 2] {
        [
            self.transform.apply(self.domain[0]),
            self.transform.apply(self.domain[1]),
        ]
    }
}

impl ScaleMapping for LinearScale {
    fn forward(&self, value: f64) -> f64 {
        let [d0, d1] = self.transformed_domain();
        let t = (self.transform.apply(value) - d0) / (d1 - d0);
        self.range[0] + t * (self.range[1] - self.range[0])
    }

    fn invert(&self, pixel: f64) -> f64 {
        let [d0, d1] = self.transformed_domain();
        let t = (pixel - self.range[0]) / (self.range[1] - self.range[0]);
        self.transform.inverse(d0 + t * (d1 - d0))
    }
}

/// Screen axis of a one-dimensional brush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// A raw pointer event in pixel space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// A rectangle brush was dragged to two pixel corners
    BrushMove { brush: BrushId, corners: [Point; 2] },
    /// A one-dimensional brush was dragged along an axis
    BrushSpan {
        brush: BrushId,
        axis: Axis,
        span: [f64; 2],
    },
    /// A brush was released empty or cleared
    BrushEnd { brush: BrushId },
    /// The pointer moved with a lens brush attached
    LensMove { brush: BrushId, point: Point },
    /// The pointer left the view carrying a lens
    LensLeave { brush: BrushId },
    /// A category swatch was clicked
    Click { category: String },
    /// The pointer moved over a view with hover picking
    Hover { point: Point },
    /// The pointer left a view with hover picking
    HoverEnd,
}

/// A domain-space instruction for a linked group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Move or clear one brush
    SetExtent {
        brush: BrushId,
        extent: Option<DomainExtent>,
    },
    /// Flip one category in the category control
    ToggleCategory(String),
    /// Pick the entity nearest to a domain point
    Hover(Point),
    /// Drop the hover focus
    ClearHover,
}

/// Event adapter for one view
pub struct InteractionController {
    x: Box<dyn ScaleMapping>,
    y: Box<dyn ScaleMapping>,
    lens_radius: f64,
}

impl InteractionController {
    /// Create a controller over the view's two scales
    pub fn new(x: impl ScaleMapping + 'static, y: impl ScaleMapping + 'static) -> Self {
        Self {
            x: Box::new(x),
            y: Box::new(y),
            lens_radius: LensConfig::default().radius,
        }
    }

    /// Create a controller using the configured lens
    pub fn from_config(
        lens: &LensConfig,
        x: impl ScaleMapping + 'static,
        y: impl ScaleMapping + 'static,
    ) -> Self {
        Self::new(x, y).with_lens_radius(lens.radius)
    }

    /// Set the lens radius in domain units
    pub fn with_lens_radius(mut self, radius: f64) -> Self {
        self.lens_radius = radius;
        self
    }

    pub fn lens_radius(&self) -> f64 {
        self.lens_radius
    }

    /// Pixel point to domain point
    pub fn invert(&self, pixel: Point) -> Point {
        [self.x.invert(pixel[0]), self.y.invert(pixel[1])]
    }

    /// Domain point to pixel point
    pub fn forward(&self, point: Point) -> Point {
        [self.x.forward(point[0]), self.y.forward(point[1])]
    }

    /// Translate one pointer event
    pub fn translate(&self, event: PointerEvent) -> Command {
        match event {
            PointerEvent::BrushMove { brush, corners } => {
                // Scales commonly flip y, so corners are reordered after inversion
                let rect = DomainRect::from_corners(self.invert(corners[0]), self.invert(corners[1]));
                Command::SetExtent {
                    brush,
                    extent: Some(DomainExtent::Rectangle(rect)),
                }
            }
            PointerEvent::BrushSpan { brush, axis, span } => {
                let scale = match axis {
                    Axis::X => &self.x,
                    Axis::Y => &self.y,
                };
                let a = scale.invert(span[0]);
                let b = scale.invert(span[1]);
                Command::SetExtent {
                    brush,
                    extent: Some(DomainExtent::Interval {
                        low: a.min(b),
                        high: a.max(b),
                    }),
                }
            }
            PointerEvent::LensMove { brush, point } => Command::SetExtent {
                brush,
                extent: Some(DomainExtent::Radius {
                    center: self.invert(point),
                    radius: self.lens_radius,
                }),
            },
            PointerEvent::BrushEnd { brush } | PointerEvent::LensLeave { brush } => {
                Command::SetExtent {
                    brush,
                    extent: None,
                }
            }
            PointerEvent::Click { category } => Command::ToggleCategory(category),
            PointerEvent::Hover { point } => Command::Hover(self.invert(point)),
            PointerEvent::HoverEnd => Command::ClearHover,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> InteractionController {
        // 0..100 over 0..500px on x, y flipped over 400..0px
        InteractionController::new(
            LinearScale::new([0.0, 100.0], [0.0, 500.0]),
            LinearScale::new([0.0, 100.0], [400.0, 0.0]),
        )
    }

    fn approx(a: Point, b: Point) -> bool {
        (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9
    }

    #[test]
    fn test_linear_round_trip() {
        let scale = LinearScale::new([10.0, 20.0], [0.0, 200.0]);
        assert_eq!(scale.forward(15.0), 100.0);
        assert_eq!(scale.invert(100.0), 15.0);
    }

    #[test]
    fn test_log_scale() {
        let scale = LinearScale::new([1.0, 1000.0], [0.0, 300.0]).with_transform(ScaleTransform::Log10);
        assert!((scale.forward(10.0) - 100.0).abs() < 1e-9);
        assert!((scale.invert(200.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_brush_move_normalizes_flipped_y() {
        let command = controller().translate(PointerEvent::BrushMove {
            brush: "xy".into(),
            corners: [[50.0, 80.0], [250.0, 240.0]],
        });

        let Command::SetExtent {
            extent: Some(DomainExtent::Rectangle(rect)),
            ..
        } = command
        else {
            panic!("expected a rectangle extent");
        };
        assert!(approx(rect.min, [10.0, 40.0]));
        assert!(approx(rect.max, [50.0, 80.0]));
        assert!(!rect.is_degenerate());
    }

    #[test]
    fn test_zero_width_drag_is_degenerate() {
        let command = controller().translate(PointerEvent::BrushMove {
            brush: "xy".into(),
            corners: [[50.0, 80.0], [50.0, 240.0]],
        });
        match command {
            Command::SetExtent {
                extent: Some(extent),
                ..
            } => assert!(extent.is_degenerate()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_brush_span_y_axis() {
        let command = controller().translate(PointerEvent::BrushSpan {
            brush: "hist".into(),
            axis: Axis::Y,
            span: [0.0, 200.0],
        });
        assert_eq!(
            command,
            Command::SetExtent {
                brush: "hist".into(),
                extent: Some(DomainExtent::Interval {
                    low: 50.0,
                    high: 100.0
                }),
            }
        );
    }

    #[test]
    fn test_lens_uses_domain_radius() {
        let command = controller()
            .with_lens_radius(7.5)
            .translate(PointerEvent::LensMove {
                brush: "lens".into(),
                point: [250.0, 200.0],
            });
        assert_eq!(
            command,
            Command::SetExtent {
                brush: "lens".into(),
                extent: Some(DomainExtent::Radius {
                    center: [50.0, 50.0],
                    radius: 7.5
                }),
            }
        );
    }

    #[test]
    fn test_from_config_applies_lens_radius() {
        let lens = LensConfig { radius: 3.0 };
        let configured = InteractionController::from_config(
            &lens,
            LinearScale::new([0.0, 100.0], [0.0, 500.0]),
            LinearScale::new([0.0, 100.0], [400.0, 0.0]),
        );
        assert_eq!(configured.lens_radius(), 3.0);
        assert_eq!(controller().lens_radius(), 25.0);
    }

    #[test]
    fn test_release_and_leave_clear() {
        let c = controller();
        assert_eq!(
            c.translate(PointerEvent::BrushEnd { brush: "b".into() }),
            Command::SetExtent {
                brush: "b".into(),
                extent: None
            }
        );
        assert_eq!(
            c.translate(PointerEvent::LensLeave { brush: "l".into() }),
            Command::SetExtent {
                brush: "l".into(),
                extent: None
            }
        );
    }

    #[test]
    fn test_click_and_hover() {
        let c = controller();
        assert_eq!(
            c.translate(PointerEvent::Click {
                category: "Drama".into()
            }),
            Command::ToggleCategory("Drama".into())
        );
        assert_eq!(
            c.translate(PointerEvent::Hover {
                point: [500.0, 0.0]
            }),
            Command::Hover([100.0, 100.0])
        );
        assert_eq!(c.translate(PointerEvent::HoverEnd), Command::ClearHover);
        assert!(approx(c.forward([100.0, 100.0]), [500.0, 0.0]));
    }
}
