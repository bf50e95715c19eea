//! linkage-selection - Predicate library for cross-view selection
//!
//! This crate decides which entities of a data set belong to a selection.
//! Everything here is pure: no state, no logging, no I/O.
//!
//! # Predicates
//!
//! - **Rectangle**: position inside a brushed region, bounds inclusive
//! - **Radius**: position strictly inside a lens
//! - **Neighbor**: a focus entity plus its graph neighbors
//! - **Category**: membership in a toggled category set
//! - **Interval**: numeric field inside a 1-D brushed range
//! - **Logic**: `&&`, `||`, `!`, `all`, `none`
//!
//! # Examples
//!
//! ```ignore
//! use linkage_selection::parse_predicate;
//!
//! let p = parse_predicate("rect([50, 50], [150, 150]) && category('Drama')")?;
//! let p = parse_predicate("radius([100, 100], 25) || incident(radius([100, 100], 25))")?;
//! ```

pub mod ast;
pub mod category;
pub mod entity;
pub mod eval;
pub mod membership;
pub mod neighbors;
pub mod parser;

pub use ast::*;
pub use category::CategorySet;
pub use entity::{Entity, EntityId, Point};
pub use eval::*;
pub use membership::*;
pub use neighbors::NeighborIndex;
pub use parser::*;
