//! Selection state
//!
//! The one live selection of a linked group. Every replacement re-evaluates
//! the combined predicate over the whole store; membership is never patched
//! incrementally.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use tracing::{debug, warn};

use linkage_selection::{
    Diagnostics, EntityId, EvalContext, Evaluator, Predicate, Relevance, RequiredField,
};

use crate::brush::BrushId;

/// Which interaction produced a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum SelectionSource {
    /// Nothing has been evaluated yet
    Initial,
    /// The entity store was replaced
    Reload,
    /// A brush moved or was cleared
    Brush(BrushId),
    /// The category control was toggled
    Category,
    /// An entity was focused programmatically
    Focus,
    /// The pointer picked an entity
    Hover,
    /// The static filter changed
    Filter,
    /// Positions changed under an active spatial predicate
    Layout,
    /// A view asked for a restyle pass
    Refresh,
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionSource::Initial => f.write_str("initial"),
            SelectionSource::Reload => f.write_str("reload"),
            SelectionSource::Brush(id) => write!(f, "brush:{}", id),
            SelectionSource::Category => f.write_str("category"),
            SelectionSource::Focus => f.write_str("focus"),
            SelectionSource::Hover => f.write_str("hover"),
            SelectionSource::Filter => f.write_str("filter"),
            SelectionSource::Layout => f.write_str("layout"),
            SelectionSource::Refresh => f.write_str("refresh"),
        }
    }
}

/// A generation-stamped snapshot of selected ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub ids: BTreeSet<EntityId>,
    pub source: SelectionSource,
    pub generation: u64,
    /// Focal entity for three-valued relevance
    pub focus: Option<EntityId>,
}

impl Selection {
    fn initial() -> Self {
        Self {
            ids: BTreeSet::new(),
            source: SelectionSource::Initial,
            generation: 0,
            focus: None,
        }
    }

    /// Check if an id is selected
    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids.contains(id)
    }

    /// Relevance of an id to this selection
    pub fn relevance(&self, id: &EntityId) -> Relevance {
        Relevance::classify(id, &self.ids, self.focus.as_ref())
    }
}

/// Owner of the live selection
#[derive(Debug)]
pub struct SelectionState {
    current: Selection,
    reported_missing: HashSet<RequiredField>,
    reported_focus: HashSet<EntityId>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            current: Selection::initial(),
            reported_missing: HashSet::new(),
            reported_focus: HashSet::new(),
        }
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `predicate` over the store and make it the live selection
    ///
    /// The focus for relevance is taken from the first neighborhood leaf.
    pub fn replace<C: EvalContext>(
        &mut self,
        context: &C,
        predicate: &Predicate,
        source: SelectionSource,
    ) -> &Selection {
        let focus = predicate.focus().cloned();
        self.replace_with_focus(context, predicate, source, focus)
    }

    /// Like [`SelectionState::replace`], with an explicit focal entity
    ///
    /// A focal id missing from the store is reported like a stale
    /// neighborhood focus.
    pub fn replace_with_focus<C: EvalContext>(
        &mut self,
        context: &C,
        predicate: &Predicate,
        source: SelectionSource,
        focus: Option<EntityId>,
    ) -> &Selection {
        let mut evaluation = Evaluator::new(context).evaluate(predicate);
        if let Some(id) = focus.as_ref().filter(|id| context.entity(id).is_none()) {
            evaluation.diagnostics.unknown_focus.insert(id.clone());
        }
        self.report(&evaluation.diagnostics);

        let generation = self.current.generation + 1;
        debug!(
            generation,
            source = %source,
            selected = evaluation.selected.len(),
            total = context.entities().len(),
            "Selection replaced"
        );

        // A focus outside the selection has nothing to be focal for
        let focus = focus.filter(|id| evaluation.selected.contains(id));
        self.current = Selection {
            ids: evaluation.selected,
            source,
            generation,
            focus,
        };
        &self.current
    }

    /// The live selection
    pub fn current(&self) -> &Selection {
        &self.current
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.current.generation
    }

    /// Relevance of an id to the live selection
    pub fn relevance(&self, id: &EntityId) -> Relevance {
        self.current.relevance(id)
    }

    /// Forget everything after the store was replaced
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Log each diagnostic kind at most once per load
    fn report(&mut self, diagnostics: &Diagnostics) {
        for (field, &count) in &diagnostics.missing {
            if self.reported_missing.insert(field.clone()) {
                warn!(field = %field, entities = count, "Entities lack a field the selection needs; they are treated as unselected");
            }
        }
        for focus in &diagnostics.unknown_focus {
            if self.reported_focus.insert(focus.clone()) {
                warn!(focus = %focus, "Focus id is not in the data set; selecting nothing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EntityStore;
    use linkage_selection::Entity;

    fn store() -> EntityStore {
        EntityStore::from_entities(vec![
            Entity::new("1").at(1.0, 1.0),
            Entity::new("2").at(2.0, 2.0),
            Entity::new("3").at(3.0, 3.0),
            Entity::new("4"),
            Entity::link("1-2", "1", "2"),
        ])
    }

    fn ids(list: &[&str]) -> BTreeSet<EntityId> {
        list.iter().map(|s| EntityId::from(*s)).collect()
    }

    #[test]
    fn test_initial_state() {
        let state = SelectionState::new();
        assert_eq!(state.generation(), 0);
        assert!(state.current().ids.is_empty());
        assert_eq!(state.current().source, SelectionSource::Initial);
    }

    #[test]
    fn test_replace_increments_generation() {
        let store = store();
        let mut state = SelectionState::new();

        let predicate = Predicate::rectangle([0.0, 0.0], [2.0, 2.0]);
        let selection = state.replace(&store, &predicate, SelectionSource::Brush("b".into()));
        assert_eq!(selection.generation, 1);
        assert_eq!(selection.ids, ids(&["1", "2"]));

        state.replace(&store, &Predicate::All, SelectionSource::Refresh);
        assert_eq!(state.generation(), 2);
        assert_eq!(state.current().ids.len(), 5);
    }

    #[test]
    fn test_replace_never_accumulates() {
        let store = store();
        let mut state = SelectionState::new();

        state.replace(&store, &Predicate::members(["1", "2"]), SelectionSource::Focus);
        state.replace(&store, &Predicate::members(["3"]), SelectionSource::Focus);
        assert_eq!(state.current().ids, ids(&["3"]));
    }

    #[test]
    fn test_neighborhood_relevance() {
        let store = store();
        let mut state = SelectionState::new();

        state.replace(&store, &Predicate::neighbor("1"), SelectionSource::Hover);
        assert_eq!(state.current().focus, Some(EntityId::from("1")));
        assert_eq!(state.relevance(&"1".into()), Relevance::Focal);
        assert_eq!(state.relevance(&"2".into()), Relevance::Member);
        assert_eq!(state.relevance(&"3".into()), Relevance::Unrelated);
    }

    #[test]
    fn test_unknown_focus_selects_nothing() {
        let store = store();
        let mut state = SelectionState::new();

        let selection = state.replace(&store, &Predicate::neighbor("stale"), SelectionSource::Focus);
        assert!(selection.ids.is_empty());
        assert_eq!(selection.focus, None);
        assert!(state.reported_focus.contains(&EntityId::from("stale")));
    }

    #[test]
    fn test_unknown_explicit_focus_is_reported() {
        let store = store();
        let mut state = SelectionState::new();

        let selection = state.replace_with_focus(
            &store,
            &Predicate::members(["gone"]),
            SelectionSource::Hover,
            Some("gone".into()),
        );
        assert!(selection.ids.is_empty());
        assert!(state.reported_focus.contains(&EntityId::from("gone")));
    }

    #[test]
    fn test_diagnostics_reported_once_per_load() {
        let store = store();
        let mut state = SelectionState::new();
        let predicate = Predicate::rectangle([0.0, 0.0], [9.0, 9.0]);

        state.replace(&store, &predicate, SelectionSource::Brush("b".into()));
        state.replace(&store, &predicate, SelectionSource::Brush("b".into()));
        assert_eq!(state.reported_missing.len(), 1);
        assert!(state.reported_missing.contains(&RequiredField::Position));

        state.reset();
        assert!(state.reported_missing.is_empty());
        assert_eq!(state.generation(), 0);
    }

    #[test]
    fn test_explicit_focus() {
        let store = store();
        let mut state = SelectionState::new();

        state.replace_with_focus(
            &store,
            &Predicate::members(["3"]),
            SelectionSource::Hover,
            Some("3".into()),
        );
        assert_eq!(state.relevance(&"3".into()), Relevance::Focal);
    }
}
