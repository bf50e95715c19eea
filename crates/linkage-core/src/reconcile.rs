//! Keyed enter/update/exit reconciliation
//!
//! Given the id set a view last rendered and the newly selected id set, the
//! reconciler splits their union into three disjoint parts so the view only
//! touches marks whose membership changed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use linkage_selection::EntityId;

/// What a view does with marks that leave the selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitPolicy {
    /// Keep the mark and restyle it as unrelated (linked highlighting)
    #[default]
    Restyle,
    /// Remove the mark (data-driven add/remove views)
    Remove,
}

/// Minimal delta between two rendered id sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    /// Newly selected: `next \ previous`
    pub enter: BTreeSet<EntityId>,
    /// Still selected: `next ∩ previous`
    pub update: BTreeSet<EntityId>,
    /// No longer selected: `previous \ next`
    pub exit: BTreeSet<EntityId>,
}

impl Diff {
    /// Compute the diff from `previous` to `next`
    pub fn between(previous: &BTreeSet<EntityId>, next: &BTreeSet<EntityId>) -> Self {
        Self {
            enter: next.difference(previous).cloned().collect(),
            update: next.intersection(previous).cloned().collect(),
            exit: previous.difference(next).cloned().collect(),
        }
    }

    /// Check if membership is unchanged
    pub fn is_unchanged(&self) -> bool {
        self.enter.is_empty() && self.exit.is_empty()
    }

    /// Check if the diff touches no ids at all
    pub fn is_empty(&self) -> bool {
        self.is_unchanged() && self.update.is_empty()
    }

    /// Size of `previous ∪ next`
    pub fn len(&self) -> usize {
        self.enter.len() + self.update.len() + self.exit.len()
    }

    /// The id set the view renders after applying this diff
    pub fn rendered(&self) -> BTreeSet<EntityId> {
        self.enter.union(&self.update).cloned().collect()
    }
}

/// Compute the diff from `previous` to `next`
pub fn diff(previous: &BTreeSet<EntityId>, next: &BTreeSet<EntityId>) -> Diff {
    Diff::between(previous, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(list: &[u32]) -> BTreeSet<EntityId> {
        list.iter().map(|&i| EntityId::from(i as usize)).collect()
    }

    #[test]
    fn test_diff_example() {
        let d = diff(&ids(&[1, 2, 3]), &ids(&[2, 3, 4]));

        assert_eq!(d.enter, ids(&[4]));
        assert_eq!(d.update, ids(&[2, 3]));
        assert_eq!(d.exit, ids(&[1]));
        assert_eq!(d.len(), 4);
    }

    #[test]
    fn test_fixed_point() {
        let first = diff(&ids(&[1, 2, 3]), &ids(&[2, 3, 4]));
        let second = diff(&first.rendered(), &ids(&[2, 3, 4]));

        assert!(second.enter.is_empty());
        assert!(second.exit.is_empty());
        assert_eq!(second.update, ids(&[2, 3, 4]));
        assert!(second.is_unchanged());
    }

    #[test]
    fn test_empty_previous_enters_everything() {
        let d = diff(&BTreeSet::new(), &ids(&[7, 8]));
        assert_eq!(d.enter, ids(&[7, 8]));
        assert!(d.update.is_empty() && d.exit.is_empty());
    }

    #[test]
    fn test_both_empty() {
        let d = diff(&BTreeSet::new(), &BTreeSet::new());
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
    }

    proptest! {
        #[test]
        fn test_diff_partitions_union(
            previous in proptest::collection::btree_set(0u32..50, 0..30),
            next in proptest::collection::btree_set(0u32..50, 0..30),
        ) {
            let previous: BTreeSet<EntityId> =
                previous.into_iter().map(|i| EntityId::from(i as usize)).collect();
            let next: BTreeSet<EntityId> =
                next.into_iter().map(|i| EntityId::from(i as usize)).collect();
            let d = diff(&previous, &next);

            let union: BTreeSet<EntityId> = previous.union(&next).cloned().collect();
            prop_assert_eq!(d.len(), union.len());
            prop_assert!(d.enter.is_disjoint(&d.update));
            prop_assert!(d.enter.is_disjoint(&d.exit));
            prop_assert!(d.update.is_disjoint(&d.exit));
            prop_assert_eq!(d.rendered(), next);
        }
    }
}
