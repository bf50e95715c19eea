//! Multi-brush coordination
//!
//! Brushes are registered into named groups. A conjunctive (`And`) group lets
//! every member brush stay active and intersects their regions. A `Replace`
//! group is mutually exclusive: activating one member clears all the others
//! before anything is evaluated, so only the most recent region applies.
//! Groups are intersected with each other.

use serde::{Deserialize, Serialize};
use tracing::debug;

use linkage_selection::Predicate;

use crate::brush::{Brush, BrushId, BrushKind, DomainExtent};
use crate::error::{RegistrationError, RegistrationResult};

/// How the active brushes of a group combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    /// Entity must satisfy every active brush
    And,
    /// Only the most recently manipulated brush applies; members are exclusive
    Replace,
}

/// A named exclusivity group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushGroup {
    pub name: String,
    pub mode: CombineMode,
}

impl BrushGroup {
    /// Check if at most one member may be active at a time
    pub fn is_exclusive(&self) -> bool {
        self.mode == CombineMode::Replace
    }
}

#[derive(Debug, Clone)]
struct Slot {
    brush: Brush,
    group: String,
    /// Logical time of the last update, for most-recent-wins
    touched: u64,
}

/// Combines concurrently active brushes into one predicate
#[derive(Debug, Clone, Default)]
pub struct Coordinator {
    groups: Vec<BrushGroup>,
    slots: Vec<Slot>,
    clock: u64,
}

impl Coordinator {
    /// Create a coordinator with no groups
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a group; redefining with the same mode is a no-op
    pub fn define_group(&mut self, name: &str, mode: CombineMode) -> RegistrationResult<()> {
        match self.group(name) {
            Some(existing) if existing.mode == mode => Ok(()),
            Some(_) => Err(RegistrationError::ConflictingGroupMode(name.to_string())),
            None => {
                self.groups.push(BrushGroup {
                    name: name.to_string(),
                    mode,
                });
                Ok(())
            }
        }
    }

    /// Get a group by name
    pub fn group(&self, name: &str) -> Option<&BrushGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Register a brush in a group
    ///
    /// A brush belongs to exactly one group. Registering it again in the same
    /// group with the same kind is a no-op; anything else is rejected.
    pub fn register_brush(
        &mut self,
        id: impl Into<BrushId>,
        kind: BrushKind,
        group: &str,
    ) -> RegistrationResult<()> {
        let id = id.into();
        if self.group(group).is_none() {
            return Err(RegistrationError::UnknownGroup(group.to_string()));
        }

        if let Some(slot) = self.slots.iter().find(|s| s.brush.id == id) {
            if slot.group != group {
                return Err(RegistrationError::ConflictingGroups {
                    brush: id.to_string(),
                    existing: slot.group.clone(),
                    requested: group.to_string(),
                });
            }
            if slot.brush.kind != kind {
                return Err(RegistrationError::ConflictingKind {
                    brush: id.to_string(),
                });
            }
            return Ok(());
        }

        self.slots.push(Slot {
            brush: Brush::new(id, kind),
            group: group.to_string(),
            touched: 0,
        });
        Ok(())
    }

    /// Get a brush by id
    pub fn brush(&self, id: &BrushId) -> Option<&Brush> {
        self.slot(id).map(|s| &s.brush)
    }

    /// All brushes in registration order
    pub fn brushes(&self) -> impl Iterator<Item = &Brush> {
        self.slots.iter().map(|s| &s.brush)
    }

    /// Name of the group a brush belongs to
    pub fn group_of(&self, id: &BrushId) -> Option<&str> {
        self.slot(id).map(|s| s.group.as_str())
    }

    /// Check if any brush is active
    pub fn has_active(&self) -> bool {
        self.slots.iter().any(|s| s.brush.active)
    }

    /// Move one brush, returning the ids of brushes cleared by exclusion
    ///
    /// In an exclusive group every other member is cleared before the call
    /// returns, so no stale region can reach [`Coordinator::combined`].
    pub fn update(
        &mut self,
        id: &BrushId,
        extent: Option<DomainExtent>,
    ) -> RegistrationResult<Vec<BrushId>> {
        let position = self
            .slots
            .iter()
            .position(|s| s.brush.id == *id)
            .ok_or_else(|| RegistrationError::UnknownBrush(id.to_string()))?;

        self.clock += 1;
        let slot = &mut self.slots[position];
        let active = slot.brush.set_extent(extent)?;
        slot.touched = self.clock;

        let group = slot.group.clone();
        let exclusive = self.group(&group).map_or(false, BrushGroup::is_exclusive);
        if !(active && exclusive) {
            return Ok(Vec::new());
        }

        let mut cleared = Vec::new();
        for (i, other) in self.slots.iter_mut().enumerate() {
            if i != position && other.group == group && other.brush.active {
                other.brush.clear();
                cleared.push(other.brush.id.clone());
            }
        }
        if !cleared.is_empty() {
            debug!(brush = %id, group = %group, cleared = cleared.len(), "Exclusive brush cleared siblings");
        }
        Ok(cleared)
    }

    /// Apply several updates from one event tick, in order
    ///
    /// In an exclusive group the later update wins.
    pub fn update_many(
        &mut self,
        updates: impl IntoIterator<Item = (BrushId, Option<DomainExtent>)>,
    ) -> RegistrationResult<Vec<BrushId>> {
        let mut cleared = Vec::new();
        for (id, extent) in updates {
            cleared.extend(self.update(&id, extent)?);
        }
        Ok(cleared)
    }

    /// Clear every brush
    pub fn clear_all(&mut self) {
        for slot in &mut self.slots {
            slot.brush.clear();
        }
    }

    /// The combined predicate of all active brushes
    ///
    /// `All` when nothing is active: unselected means everything visible.
    pub fn combined(&self) -> Predicate {
        Predicate::all_of(self.groups.iter().map(|group| self.group_predicate(group)))
    }

    fn group_predicate(&self, group: &BrushGroup) -> Predicate {
        let active = self
            .slots
            .iter()
            .filter(|s| s.group == group.name && s.brush.active);

        match group.mode {
            CombineMode::And => Predicate::all_of(active.map(|s| s.brush.predicate())),
            CombineMode::Replace => active
                .max_by_key(|s| s.touched)
                .map_or(Predicate::All, |s| s.brush.predicate()),
        }
    }

    fn slot(&self, id: &BrushId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.brush.id == *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkage_selection::DomainRect;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Option<DomainExtent> {
        Some(DomainExtent::Rectangle(DomainRect::new([x0, y0], [x1, y1])))
    }

    fn setup(mode: CombineMode) -> Coordinator {
        let mut c = Coordinator::new();
        c.define_group("g", mode).unwrap();
        c.register_brush("a", BrushKind::Rectangle, "g").unwrap();
        c.register_brush("b", BrushKind::Rectangle, "g").unwrap();
        c
    }

    #[test]
    fn test_nothing_active_is_all() {
        let c = setup(CombineMode::And);
        assert_eq!(c.combined(), Predicate::All);
        assert!(!c.has_active());
    }

    #[test]
    fn test_and_mode_keeps_both() {
        let mut c = setup(CombineMode::And);
        c.update(&"a".into(), rect(0.0, 0.0, 2.0, 2.0)).unwrap();
        let cleared = c.update(&"b".into(), rect(1.0, 1.0, 3.0, 3.0)).unwrap();

        assert!(cleared.is_empty());
        assert!(c.brush(&"a".into()).unwrap().active);
        assert_eq!(
            c.combined(),
            Predicate::and(
                Predicate::rectangle([0.0, 0.0], [2.0, 2.0]),
                Predicate::rectangle([1.0, 1.0], [3.0, 3.0]),
            )
        );
    }

    #[test]
    fn test_exclusive_clears_siblings() {
        let mut c = setup(CombineMode::Replace);
        c.update(&"a".into(), rect(0.0, 0.0, 2.0, 2.0)).unwrap();
        let cleared = c.update(&"b".into(), rect(1.0, 1.0, 3.0, 3.0)).unwrap();

        assert_eq!(cleared, vec![BrushId::from("a")]);
        let a = c.brush(&"a".into()).unwrap();
        assert!(!a.active);
        assert_eq!(a.extent, None);
        assert_eq!(c.combined(), Predicate::rectangle([1.0, 1.0], [3.0, 3.0]));
    }

    #[test]
    fn test_clearing_does_not_clear_siblings() {
        let mut c = setup(CombineMode::Replace);
        c.update(&"a".into(), rect(0.0, 0.0, 2.0, 2.0)).unwrap();
        // zero-area release on b
        let cleared = c.update(&"b".into(), rect(1.0, 1.0, 1.0, 1.0)).unwrap();

        assert!(cleared.is_empty());
        assert!(c.brush(&"a".into()).unwrap().active);
    }

    #[test]
    fn test_same_tick_later_update_wins() {
        let mut c = setup(CombineMode::Replace);
        c.update_many([
            (BrushId::from("b"), rect(5.0, 5.0, 6.0, 6.0)),
            (BrushId::from("a"), rect(0.0, 0.0, 1.0, 1.0)),
        ])
        .unwrap();

        assert_eq!(c.combined(), Predicate::rectangle([0.0, 0.0], [1.0, 1.0]));
    }

    #[test]
    fn test_groups_intersect() {
        let mut c = Coordinator::new();
        c.define_group("scatter", CombineMode::Replace).unwrap();
        c.define_group("hist", CombineMode::Replace).unwrap();
        c.register_brush("s", BrushKind::Rectangle, "scatter").unwrap();
        c.register_brush(
            "h",
            BrushKind::Interval {
                field: "n".to_string(),
            },
            "hist",
        )
        .unwrap();

        c.update(&"s".into(), rect(0.0, 0.0, 1.0, 1.0)).unwrap();
        c.update(
            &"h".into(),
            Some(DomainExtent::Interval {
                low: 1.0,
                high: 2.0,
            }),
        )
        .unwrap();

        assert!(c.brush(&"s".into()).unwrap().active);
        assert!(matches!(c.combined(), Predicate::And(_, _)));
    }

    #[test]
    fn test_conflicting_group_registration() {
        let mut c = setup(CombineMode::And);
        c.define_group("other", CombineMode::Replace).unwrap();

        let err = c
            .register_brush("a", BrushKind::Rectangle, "other")
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::ConflictingGroups {
                brush: "a".to_string(),
                existing: "g".to_string(),
                requested: "other".to_string(),
            }
        );
        assert_eq!(c.group_of(&"a".into()), Some("g"));
    }

    #[test]
    fn test_reregistration_is_idempotent() {
        let mut c = setup(CombineMode::And);
        assert!(c.register_brush("a", BrushKind::Rectangle, "g").is_ok());
        assert_eq!(c.brushes().count(), 2);
        assert!(matches!(
            c.register_brush("a", BrushKind::Radius { links: false }, "g"),
            Err(RegistrationError::ConflictingKind { .. })
        ));
    }

    #[test]
    fn test_group_mode_conflict() {
        let mut c = Coordinator::new();
        c.define_group("g", CombineMode::And).unwrap();
        assert!(c.define_group("g", CombineMode::And).is_ok());
        assert!(c.define_group("g", CombineMode::Replace).is_err());
    }

    #[test]
    fn test_unknown_brush_and_group() {
        let mut c = setup(CombineMode::And);
        assert!(matches!(
            c.update(&"zz".into(), None),
            Err(RegistrationError::UnknownBrush(_))
        ));
        assert!(matches!(
            c.register_brush("x", BrushKind::Rectangle, "missing"),
            Err(RegistrationError::UnknownGroup(_))
        ));
    }
}
