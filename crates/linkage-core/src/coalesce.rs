//! Per-frame event coalescing
//!
//! Pointer moves arrive far more often than a frame is drawn. A [`Coalescer`]
//! keeps at most one pending event per source (the latest) and hands them
//! back once per frame in the order the sources first fired.

use std::collections::HashMap;
use std::hash::Hash;

use crate::brush::BrushId;
use crate::controller::PointerEvent;

/// Source of a coalescible pointer event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    Brush(BrushId),
    Hover,
}

impl PointerEvent {
    /// Key under which this event supersedes earlier ones
    ///
    /// Clicks toggle state, so every click is kept.
    pub fn coalesce_key(&self) -> Option<EventKey> {
        match self {
            PointerEvent::BrushMove { brush, .. }
            | PointerEvent::BrushSpan { brush, .. }
            | PointerEvent::BrushEnd { brush }
            | PointerEvent::LensMove { brush, .. }
            | PointerEvent::LensLeave { brush } => Some(EventKey::Brush(brush.clone())),
            PointerEvent::Hover { .. } | PointerEvent::HoverEnd => Some(EventKey::Hover),
            PointerEvent::Click { .. } => None,
        }
    }
}

/// Last-event-wins buffer keyed by event source
#[derive(Debug)]
pub struct Coalescer<K, E> {
    pending: Vec<E>,
    slots: HashMap<K, usize>,
}

impl<K, E> Default for Coalescer<K, E> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, E> Coalescer<K, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event, replacing any pending event with the same key
    pub fn push(&mut self, key: K, event: E) {
        match self.slots.get(&key) {
            Some(&slot) => self.pending[slot] = event,
            None => {
                self.slots.insert(key, self.pending.len());
                self.pending.push(event);
            }
        }
    }

    /// Queue an event that never replaces or is replaced
    pub fn push_unkeyed(&mut self, event: E) {
        self.pending.push(event);
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending event in first-arrival order
    pub fn drain(&mut self) -> Vec<E> {
        self.slots.clear();
        std::mem::take(&mut self.pending)
    }
}

impl Coalescer<EventKey, PointerEvent> {
    /// Queue a pointer event under its own key
    pub fn push_pointer(&mut self, event: PointerEvent) {
        match event.coalesce_key() {
            Some(key) => self.push(key, event),
            None => self.push_unkeyed(event),
        }
    }
}
