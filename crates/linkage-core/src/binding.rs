//! View bindings
//!
//! A binding ties a rendering target to the shared selection. It owns no
//! entities: it picks which entities its view draws, maps each to visual
//! attributes given its relevance, and remembers the id set it last rendered
//! so the next pass can be diffed against it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use linkage_selection::{Entity, EntityId, EvalContext, Relevance};

use crate::reconcile::{Diff, ExitPolicy};
use crate::state::Selection;
use crate::store::EntityStore;

/// Identity of a view
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ViewId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Visual attributes for one mark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkStyle {
    pub opacity: f64,
    /// Size multiplier relative to the view's base mark size
    pub size: f64,
    pub stroke_width: f64,
    /// Override color, `None` keeps the view's encoding
    pub color: Option<String>,
    /// Draw above unraised marks
    pub raised: bool,
}

impl Default for MarkStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            size: 1.0,
            stroke_width: 1.0,
            color: None,
            raised: false,
        }
    }
}

impl MarkStyle {
    /// Default linked-highlighting treatment
    pub fn for_relevance(relevance: Relevance) -> Self {
        match relevance {
            Relevance::Focal => Self {
                size: 1.5,
                stroke_width: 2.0,
                raised: true,
                ..Self::default()
            },
            Relevance::Member => Self {
                raised: true,
                ..Self::default()
            },
            Relevance::Unrelated => Self {
                opacity: 0.2,
                ..Self::default()
            },
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Picks the entities a view draws
pub type EntityAccessor = Box<dyn Fn(&Entity) -> bool>;

/// Maps an entity and its relevance to visual attributes
pub type StyleFn = Box<dyn Fn(&Entity, Relevance) -> MarkStyle>;

/// Result of one reconciliation pass for one view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewUpdate {
    pub view: ViewId,
    /// Generation of the selection this pass reflects
    pub generation: u64,
    pub exit_policy: ExitPolicy,
    pub diff: Diff,
    /// Styles for entered and updated ids, and for exited ids under `Restyle`
    pub styles: BTreeMap<EntityId, MarkStyle>,
}

impl ViewUpdate {
    /// Ids whose marks must be removed
    pub fn removals(&self) -> impl Iterator<Item = &EntityId> {
        let remove = self.exit_policy == ExitPolicy::Remove;
        self.diff.exit.iter().filter(move |_| remove)
    }
}

/// A registered rendering target
pub struct ViewBinding {
    id: ViewId,
    accessor: EntityAccessor,
    style: StyleFn,
    exit_policy: ExitPolicy,
    previous: BTreeSet<EntityId>,
}

impl fmt::Debug for ViewBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewBinding")
            .field("id", &self.id)
            .field("exit_policy", &self.exit_policy)
            .field("previous", &self.previous.len())
            .finish_non_exhaustive()
    }
}

impl ViewBinding {
    /// Bind a view drawing every entity with the default highlighting
    pub fn new(id: impl Into<ViewId>) -> Self {
        Self {
            id: id.into(),
            accessor: Box::new(|_| true),
            style: Box::new(|_, relevance| MarkStyle::for_relevance(relevance)),
            exit_policy: ExitPolicy::default(),
            previous: BTreeSet::new(),
        }
    }

    /// Restrict the view to some entities (e.g. only links)
    pub fn with_accessor(mut self, accessor: impl Fn(&Entity) -> bool + 'static) -> Self {
        self.accessor = Box::new(accessor);
        self
    }

    pub fn with_style(mut self, style: impl Fn(&Entity, Relevance) -> MarkStyle + 'static) -> Self {
        self.style = Box::new(style);
        self
    }

    pub fn with_exit_policy(mut self, exit_policy: ExitPolicy) -> Self {
        self.exit_policy = exit_policy;
        self
    }

    pub fn id(&self) -> &ViewId {
        &self.id
    }

    pub fn exit_policy(&self) -> ExitPolicy {
        self.exit_policy
    }

    /// The id set rendered by the last pass
    pub fn previous(&self) -> &BTreeSet<EntityId> {
        &self.previous
    }

    /// Diff the selection against the last pass and remember the result
    pub fn reconcile(&mut self, store: &EntityStore, selection: &Selection) -> ViewUpdate {
        let next: BTreeSet<EntityId> = selection
            .ids
            .iter()
            .filter(|id| store.entity(id).map_or(false, |e| (self.accessor)(e)))
            .cloned()
            .collect();
        let diff = Diff::between(&self.previous, &next);

        let mut styles = BTreeMap::new();
        for id in diff.enter.iter().chain(&diff.update) {
            if let Some(entity) = store.entity(id) {
                styles.insert(id.clone(), (self.style)(entity, selection.relevance(id)));
            }
        }
        if self.exit_policy == ExitPolicy::Restyle {
            for id in &diff.exit {
                if let Some(entity) = store.entity(id) {
                    styles.insert(id.clone(), (self.style)(entity, Relevance::Unrelated));
                }
            }
        }

        self.previous = next;
        ViewUpdate {
            view: self.id.clone(),
            generation: selection.generation,
            exit_policy: self.exit_policy,
            diff,
            styles,
        }
    }

    /// Forget the last pass so the next one enters everything
    pub fn clear_previous(&mut self) {
        self.previous.clear();
    }
}
