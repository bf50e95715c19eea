//! Predicate evaluation over a data set
//!
//! Evaluation never fails. Entities missing a field a leaf needs evaluate to
//! `false` for that leaf, and the miss is tallied in [`Diagnostics`] so the
//! caller can report it once instead of on every pointer event.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::ast::Predicate;
use crate::entity::{Entity, EntityId};
use crate::membership::*;
use crate::neighbors::NeighborIndex;

/// Context for evaluation - provides the entities and their adjacency
pub trait EvalContext {
    /// All entities of the data set, in load order
    fn entities(&self) -> &[Entity];

    /// Look up an entity by id
    fn entity(&self, id: &EntityId) -> Option<&Entity>;

    /// Graph adjacency built for this data set
    fn neighbor_index(&self) -> &NeighborIndex;
}

/// A field some predicate needed but an entity lacked
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RequiredField {
    Position,
    Category,
    Numeric(String),
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredField::Position => f.write_str("position"),
            RequiredField::Category => f.write_str("category"),
            RequiredField::Numeric(name) => write!(f, "field '{}'", name),
        }
    }
}

/// Data problems observed during one evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Number of entities lacking each required field
    pub missing: BTreeMap<RequiredField, usize>,
    /// Focus ids not present in the neighbor index
    pub unknown_focus: BTreeSet<EntityId>,
}

impl Diagnostics {
    /// Check if nothing was observed
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unknown_focus.is_empty()
    }

    fn record_missing(&mut self, field: RequiredField) {
        *self.missing.entry(field).or_insert(0) += 1;
    }
}

/// Result of evaluating a predicate over a whole data set
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Ids of every entity satisfying the predicate
    pub selected: BTreeSet<EntityId>,
    /// Data problems seen along the way
    pub diagnostics: Diagnostics,
}

/// How an entity relates to the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relevance {
    /// The focused entity of a neighborhood selection
    Focal,
    /// Selected, but not the focus
    Member,
    /// Not selected
    Unrelated,
}

impl Relevance {
    /// Classify an id against a selected set and optional focus
    pub fn classify(
        id: &EntityId,
        selected: &BTreeSet<EntityId>,
        focus: Option<&EntityId>,
    ) -> Self {
        if !selected.contains(id) {
            Relevance::Unrelated
        } else if focus == Some(id) {
            Relevance::Focal
        } else {
            Relevance::Member
        }
    }

    /// Binary view of relevance
    pub fn is_selected(&self) -> bool {
        !matches!(self, Relevance::Unrelated)
    }
}

/// Evaluator for predicates
pub struct Evaluator<'a, C: EvalContext> {
    context: &'a C,
}

impl<'a, C: EvalContext> Evaluator<'a, C> {
    /// Create a new evaluator
    pub fn new(context: &'a C) -> Self {
        Self { context }
    }

    /// Evaluate a predicate against every entity
    pub fn evaluate(&self, predicate: &Predicate) -> Evaluation {
        let mut evaluation = Evaluation::default();

        for entity in self.context.entities() {
            if self.evaluate_at(predicate, entity, &mut evaluation.diagnostics) {
                evaluation.selected.insert(entity.id.clone());
            }
        }

        evaluation
    }

    /// Evaluate a predicate against a single entity
    pub fn evaluate_at(
        &self,
        predicate: &Predicate,
        entity: &Entity,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        match predicate {
            Predicate::All => true,
            Predicate::None => false,

            Predicate::And(left, right) => {
                self.evaluate_at(left, entity, diagnostics)
                    && self.evaluate_at(right, entity, diagnostics)
            }

            Predicate::Or(left, right) => {
                self.evaluate_at(left, entity, diagnostics)
                    || self.evaluate_at(right, entity, diagnostics)
            }

            Predicate::Not(inner) => !self.evaluate_at(inner, entity, diagnostics),

            Predicate::Rectangle(extent) => {
                self.check_position(entity, diagnostics);
                rectangle_membership(entity, extent)
            }

            Predicate::Radius { center, radius } => {
                self.check_position(entity, diagnostics);
                radius_membership(entity, *center, *radius)
            }

            Predicate::Neighbor { focus } => {
                let index = self.context.neighbor_index();
                if !index.contains(focus) {
                    diagnostics.unknown_focus.insert(focus.clone());
                    return false;
                }
                neighbor_membership(entity, focus, index)
            }

            Predicate::Category(selected) => {
                if entity.category.is_none() && !entity.is_link() {
                    diagnostics.record_missing(RequiredField::Category);
                }
                category_membership(entity, selected)
            }

            Predicate::Interval { field, low, high } => {
                if entity.field(field).is_none() {
                    diagnostics.record_missing(RequiredField::Numeric(field.clone()));
                }
                interval_membership(entity, field, *low, *high)
            }

            Predicate::Comparison(cmp) => match entity.field(&cmp.field) {
                Some(value) => cmp.op.evaluate(value, cmp.value),
                None => {
                    diagnostics.record_missing(RequiredField::Numeric(cmp.field.clone()));
                    false
                }
            },

            Predicate::Members(ids) => ids.contains(&entity.id),

            Predicate::Incident(inner) => {
                let Some((source, target)) = &entity.endpoints else {
                    return false;
                };
                [source, target].into_iter().any(|endpoint| {
                    self.context
                        .entity(endpoint)
                        .map_or(false, |e| self.evaluate_at(inner, e, diagnostics))
                })
            }
        }
    }

    /// Links have no position of their own, so only node entities count as malformed
    fn check_position(&self, entity: &Entity, diagnostics: &mut Diagnostics) {
        if entity.position.is_none() && !entity.is_link() {
            diagnostics.record_missing(RequiredField::Position);
        }
    }
}
