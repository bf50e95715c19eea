//! Linked group engine
//!
//! A [`LinkedGroup`] is one set of views sharing one data set and one
//! selection. It owns the entity store, the brush coordinator, the category,
//! focus and filter controls, and every view binding. Each call that changes
//! what is selected re-evaluates the combined predicate and reconciles every
//! view synchronously, returning one [`ViewUpdate`] per view in registration
//! order.

use std::collections::BTreeSet;
use tracing::debug;

use linkage_selection::{
    parse_predicate, CategorySet, Entity, EntityId, Predicate, Relevance,
};

use crate::binding::{ViewBinding, ViewId, ViewUpdate};
use crate::brush::{BrushId, BrushKind, DomainExtent};
use crate::config::{HoverMode, LinkConfig};
use crate::controller::{Command, InteractionController, PointerEvent, ScaleMapping};
use crate::coordinator::{CombineMode, Coordinator};
use crate::error::{LinkageResult, RegistrationError};
use crate::state::{Selection, SelectionSource, SelectionState};
use crate::store::{EntityRecord, EntityStore, PositionUpdate};

/// The focused entity and how far its highlight reaches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focus {
    pub id: EntityId,
    pub mode: HoverMode,
}

impl Focus {
    fn predicate(&self) -> Predicate {
        match self.mode {
            HoverMode::Nearest => Predicate::members([self.id.clone()]),
            HoverMode::Neighborhood => Predicate::neighbor(self.id.clone()),
        }
    }
}

/// One group of linked views
#[derive(Debug)]
pub struct LinkedGroup {
    config: LinkConfig,
    store: EntityStore,
    coordinator: Coordinator,
    state: SelectionState,
    categories: Option<CategorySet>,
    focus: Option<Focus>,
    filter: Option<Predicate>,
    views: Vec<ViewBinding>,
}

impl LinkedGroup {
    /// Create a group with the configured brush groups and brushes
    pub fn new(config: LinkConfig) -> LinkageResult<Self> {
        config.validate()?;

        let mut coordinator = Coordinator::new();
        for group in &config.groups {
            coordinator.define_group(&group.name, group.mode)?;
        }
        for brush in &config.brushes {
            coordinator.register_brush(brush.brush_id(), brush.brush_kind()?, &brush.group)?;
        }

        Ok(Self {
            config,
            store: EntityStore::new(),
            coordinator,
            state: SelectionState::new(),
            categories: None,
            focus: None,
            filter: None,
            views: Vec::new(),
        })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Replace the data set from loading records
    ///
    /// The generation restarts and every view forgets its last pass, so the
    /// returned updates enter the whole selection. Brushes and controls are
    /// kept; a focus on an id that no longer exists selects nothing.
    pub fn load(&mut self, records: impl IntoIterator<Item = EntityRecord>) -> Vec<ViewUpdate> {
        self.replace_store(EntityStore::from_records(records))
    }

    /// Replace the data set from entities that already carry ids
    pub fn load_entities(&mut self, entities: impl IntoIterator<Item = Entity>) -> Vec<ViewUpdate> {
        self.replace_store(EntityStore::from_entities(entities))
    }

    fn replace_store(&mut self, store: EntityStore) -> Vec<ViewUpdate> {
        self.store = store;
        self.state.reset();
        for view in &mut self.views {
            view.clear_previous();
        }
        self.propagate(SelectionSource::Reload)
    }

    /// Define a brush group
    pub fn define_group(&mut self, name: &str, mode: CombineMode) -> LinkageResult<()> {
        Ok(self.coordinator.define_group(name, mode)?)
    }

    /// Register a brush in a group
    pub fn register_brush(
        &mut self,
        id: impl Into<BrushId>,
        kind: BrushKind,
        group: &str,
    ) -> LinkageResult<()> {
        Ok(self.coordinator.register_brush(id, kind, group)?)
    }

    /// Create a controller for one view using this group's lens radius
    pub fn controller(
        &self,
        x: impl ScaleMapping + 'static,
        y: impl ScaleMapping + 'static,
    ) -> InteractionController {
        InteractionController::from_config(&self.config.lens, x, y)
    }

    /// Start a binding that uses this group's exit policy
    pub fn view(&self, id: impl Into<ViewId>) -> ViewBinding {
        ViewBinding::new(id).with_exit_policy(self.config.exit)
    }

    /// Bind a view and render the live selection into it
    pub fn register_view(&mut self, binding: ViewBinding) -> LinkageResult<ViewUpdate> {
        if self.views.iter().any(|v| v.id() == binding.id()) {
            return Err(RegistrationError::DuplicateView(binding.id().to_string()).into());
        }
        self.views.push(binding);
        let index = self.views.len() - 1;
        Ok(self.views[index].reconcile(&self.store, self.state.current()))
    }

    /// Remove a view binding
    pub fn unregister_view(&mut self, id: &ViewId) -> LinkageResult<ViewBinding> {
        let index = self.view_index(id)?;
        Ok(self.views.remove(index))
    }

    /// Registered view ids in registration order
    pub fn view_ids(&self) -> impl Iterator<Item = &ViewId> {
        self.views.iter().map(ViewBinding::id)
    }

    /// Re-emit a pass for one view without re-evaluating
    pub fn refresh(&mut self, id: &ViewId) -> LinkageResult<ViewUpdate> {
        let index = self.view_index(id)?;
        Ok(self.views[index].reconcile(&self.store, self.state.current()))
    }

    /// Translate a pointer event and apply it
    pub fn dispatch(
        &mut self,
        controller: &InteractionController,
        event: PointerEvent,
    ) -> LinkageResult<Vec<ViewUpdate>> {
        self.apply(controller.translate(event))
    }

    /// Apply a domain-space command
    pub fn apply(&mut self, command: Command) -> LinkageResult<Vec<ViewUpdate>> {
        match command {
            Command::SetExtent { brush, extent } => self.update_brush(&brush, extent),
            Command::ToggleCategory(category) => Ok(self.toggle_category(&category)),
            Command::Hover(point) => Ok(self.hover(point)),
            Command::ClearHover => Ok(self.clear_focus()),
        }
    }

    /// Move or clear one brush
    pub fn update_brush(
        &mut self,
        id: &BrushId,
        extent: Option<DomainExtent>,
    ) -> LinkageResult<Vec<ViewUpdate>> {
        self.coordinator.update(id, extent)?;
        Ok(self.propagate(SelectionSource::Brush(id.clone())))
    }

    /// Apply several brush moves from one event tick, then evaluate once
    pub fn update_brushes(
        &mut self,
        updates: impl IntoIterator<Item = (BrushId, Option<DomainExtent>)>,
    ) -> LinkageResult<Vec<ViewUpdate>> {
        let updates: Vec<_> = updates.into_iter().collect();
        let Some(last) = updates.last().map(|(id, _)| id.clone()) else {
            return Ok(Vec::new());
        };
        self.coordinator.update_many(updates)?;
        Ok(self.propagate(SelectionSource::Brush(last)))
    }

    /// Clear every brush
    pub fn clear_brushes(&mut self) -> Vec<ViewUpdate> {
        self.coordinator.clear_all();
        self.propagate(SelectionSource::Refresh)
    }

    /// Flip one category
    ///
    /// While unrestricted, every category in the store counts as selected,
    /// so the first click hides the clicked category.
    pub fn toggle_category(&mut self, category: &str) -> Vec<ViewUpdate> {
        let store = &self.store;
        self.categories
            .get_or_insert_with(|| store.categories())
            .toggle(category);
        self.propagate(SelectionSource::Category)
    }

    /// Replace the category control; `None` lifts the restriction
    pub fn set_categories(&mut self, categories: Option<CategorySet>) -> Vec<ViewUpdate> {
        self.categories = categories;
        self.propagate(SelectionSource::Category)
    }

    pub fn categories(&self) -> Option<&CategorySet> {
        self.categories.as_ref()
    }

    /// Focus an entity
    pub fn focus(&mut self, id: impl Into<EntityId>, mode: HoverMode) -> Vec<ViewUpdate> {
        self.focus = Some(Focus {
            id: id.into(),
            mode,
        });
        self.propagate(SelectionSource::Focus)
    }

    /// Drop the focus; nothing happens if none is set
    pub fn clear_focus(&mut self) -> Vec<ViewUpdate> {
        if self.focus.take().is_none() {
            return Vec::new();
        }
        self.propagate(SelectionSource::Focus)
    }

    pub fn current_focus(&self) -> Option<&Focus> {
        self.focus.as_ref()
    }

    /// Focus the entity nearest to a domain point
    ///
    /// Nothing within reach clears the focus. Hovering the already focused
    /// entity produces no updates.
    pub fn hover(&mut self, point: linkage_selection::Point) -> Vec<ViewUpdate> {
        let picked = self
            .store
            .nearest(point, self.config.hover.max_distance)
            .map(|(id, _)| Focus {
                id,
                mode: self.config.hover.mode,
            });

        if picked == self.focus {
            return Vec::new();
        }
        self.focus = picked;
        self.propagate(SelectionSource::Hover)
    }

    /// Set a static filter from predicate text; empty text lifts it
    pub fn set_filter(&mut self, text: &str) -> LinkageResult<Vec<ViewUpdate>> {
        let predicate = parse_predicate(text)?;
        self.filter = match predicate {
            Predicate::All => None,
            other => Some(other),
        };
        Ok(self.propagate(SelectionSource::Filter))
    }

    /// Refresh positions from one layout tick
    ///
    /// Views are only reconciled while a spatial predicate is active.
    pub fn apply_positions(
        &mut self,
        updates: impl IntoIterator<Item = PositionUpdate>,
    ) -> Vec<ViewUpdate> {
        let report = self.store.apply_positions(updates);
        if report.ignored > 0 {
            debug!(ignored = report.ignored, "Position updates for unknown entities");
        }
        if report.applied == 0 || !self.combined_predicate().is_spatial() {
            return Vec::new();
        }
        self.propagate(SelectionSource::Layout)
    }

    /// The conjunction of brushes, categories, focus and filter
    pub fn combined_predicate(&self) -> Predicate {
        Predicate::all_of([
            self.coordinator.combined(),
            self.categories
                .as_ref()
                .map_or(Predicate::All, |c| Predicate::Category(c.clone())),
            self.focus.as_ref().map_or(Predicate::All, Focus::predicate),
            self.filter.clone().unwrap_or(Predicate::All),
        ])
    }

    /// The live selection
    pub fn current(&self) -> &Selection {
        self.state.current()
    }

    /// Selected ids of the live selection
    pub fn selected(&self) -> &BTreeSet<EntityId> {
        &self.state.current().ids
    }

    /// Relevance of an id to the live selection
    pub fn relevance(&self, id: &EntityId) -> Relevance {
        self.state.relevance(id)
    }

    fn view_index(&self, id: &ViewId) -> LinkageResult<usize> {
        self.views
            .iter()
            .position(|v| v.id() == id)
            .ok_or_else(|| RegistrationError::UnknownView(id.to_string()).into())
    }

    fn propagate(&mut self, source: SelectionSource) -> Vec<ViewUpdate> {
        let predicate = self.combined_predicate();
        let focus = self.focus.as_ref().map(|f| f.id.clone());
        let selection = self
            .state
            .replace_with_focus(&self.store, &predicate, source, focus);

        let store = &self.store;
        self.views
            .iter_mut()
            .map(|view| view.reconcile(store, selection))
            .collect()
    }
}
