//! linkage-core - Cross-view selection and linked re-rendering engine
//!
//! Turns pointer, brush and toggle interactions in one view into a selection
//! over a shared data set, and reflects it in every other view of the group
//! through minimal enter/update/exit diffs.
//!
//! # Data flow
//!
//! ```text
//! PointerEvent -> InteractionController -> Command
//!     -> Coordinator (brushes) + category / focus / filter controls
//!     -> SelectionState::replace (generation += 1)
//!     -> ViewBinding::reconcile for each view -> ViewUpdate
//! ```
//!
//! Everything runs synchronously on the caller's thread. Callers that receive
//! pointer moves faster than they draw can queue them in a [`Coalescer`] and
//! dispatch once per frame.
//!
//! # Examples
//!
//! ```ignore
//! use linkage_core::*;
//!
//! let mut group = LinkedGroup::new(LinkConfig::load(path)?)?;
//! group.load(records);
//! group.register_view(group.view("scatter"))?;
//!
//! let controller = InteractionController::new(x_scale, y_scale);
//! for update in group.dispatch(&controller, event)? {
//!     renderer.apply(update);
//! }
//! ```

pub mod binding;
pub mod brush;
pub mod coalesce;
pub mod config;
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod group;
pub mod reconcile;
pub mod spatial;
pub mod state;
pub mod store;

pub use binding::{EntityAccessor, MarkStyle, StyleFn, ViewBinding, ViewId, ViewUpdate};
pub use brush::{Brush, BrushId, BrushKind, DomainExtent};
pub use coalesce::{Coalescer, EventKey};
pub use config::{
    BrushConfig, BrushShape, GroupConfig, HoverConfig, HoverMode, LensConfig, LinkConfig,
};
pub use controller::{
    Axis, Command, InteractionController, LinearScale, PointerEvent, ScaleMapping, ScaleTransform,
};
pub use coordinator::{BrushGroup, CombineMode, Coordinator};
pub use error::{
    ConfigError, ConfigResult, LinkageError, LinkageResult, RegistrationError, RegistrationResult,
};
pub use group::{Focus, LinkedGroup};
pub use reconcile::{diff, Diff, ExitPolicy};
pub use state::{Selection, SelectionSource, SelectionState};
pub use store::{EntityRecord, EntityStore, PositionReport, PositionUpdate};

pub use linkage_selection::{
    parse_predicate, CategorySet, DomainRect, Entity, EntityId, EvalContext, Point, Predicate,
    Relevance,
};
