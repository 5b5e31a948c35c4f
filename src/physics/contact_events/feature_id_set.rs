use crate::physics::collision_detection::contact_manifold::{ContactManifold, MAXIMUM_CONTACT_COUNT};
use std::fmt;

/// Number of feature ids tracked per side of a pair. Matches the manifold contact capacity.
pub const FEATURE_ID_CAPACITY: usize = MAXIMUM_CONTACT_COUNT;

/// Feature ids of the contacts currently tracked for one side of a pair.
///
/// Slots carry no order; removal swaps the last live slot into the hole.
#[derive(Clone, Copy, Default)]
pub struct FeatureIdSet {
    ids: [i32; FEATURE_ID_CAPACITY],
    count: u8,
}

/// Result of comparing a [`FeatureIdSet`] with a new manifold.
///
/// Bit `i` of `remove_mask` marks slot `i` of the set as gone; bit `j` of `add_mask` marks
/// contact `j` of the manifold as new.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureIdDiff {
    pub remove_mask: u8,
    pub add_mask: u8,
}

impl FeatureIdDiff {
    #[inline(always)]
    pub fn removes(&self, slot: usize) -> bool {
        self.remove_mask & (1 << slot) != 0
    }

    #[inline(always)]
    pub fn adds(&self, contact_index: usize) -> bool {
        self.add_mask & (1 << contact_index) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.remove_mask == 0 && self.add_mask == 0
    }
}

impl FeatureIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.len() == FEATURE_ID_CAPACITY
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[i32] {
        &self.ids[..self.len()]
    }

    #[inline(always)]
    pub fn get(&self, slot: usize) -> i32 {
        self.as_slice()[slot]
    }

    pub fn contains(&self, feature_id: i32) -> bool {
        self.as_slice().contains(&feature_id)
    }

    /// Slot holding the feature id, if tracked.
    pub fn position(&self, feature_id: i32) -> Option<usize> {
        self.as_slice().iter().position(|&id| id == feature_id)
    }

    /// Adds a feature id unless it is already tracked or the set is full.
    /// Returns whether the id was added.
    pub fn insert(&mut self, feature_id: i32) -> bool {
        if self.contains(feature_id) || self.is_full() {
            return false;
        }
        self.ids[self.len()] = feature_id;
        self.count += 1;
        true
    }

    /// Removes the id in the given slot by moving the last live slot into it. Returns the removed id.
    pub fn swap_remove(&mut self, slot: usize) -> i32 {
        let removed = self.get(slot);
        self.count -= 1;
        self.ids[slot] = self.ids[self.len()];
        removed
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = i32> + '_ {
        self.as_slice().iter().copied()
    }

    /// Ids the diff removes, from the highest slot to the lowest.
    pub fn removed_by(&self, diff: &FeatureIdDiff) -> FeatureIdSet {
        (0..self.len())
            .rev()
            .filter(|&slot| diff.removes(slot))
            .map(|slot| self.get(slot))
            .collect()
    }

    /// Compares the tracked ids against a manifold's contacts by pairwise id comparison.
    ///
    /// Only the first [`FEATURE_ID_CAPACITY`] contacts of the manifold are considered.
    pub fn diff<M: ContactManifold + ?Sized>(&self, manifold: &M) -> FeatureIdDiff {
        let count = manifold.count().min(FEATURE_ID_CAPACITY);
        let mut diff = FeatureIdDiff::default();
        for (slot, &tracked) in self.as_slice().iter().enumerate() {
            if !(0..count).any(|j| manifold.feature_id(j) == tracked) {
                diff.remove_mask |= 1 << slot;
            }
        }
        for j in 0..count {
            if !self.contains(manifold.feature_id(j)) {
                diff.add_mask |= 1 << j;
            }
        }
        diff
    }
}

impl PartialEq for FeatureIdSet {
    /// Order-independent comparison.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|id| other.contains(id))
    }
}

impl Eq for FeatureIdSet {}

impl fmt::Debug for FeatureIdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.as_slice()).finish()
    }
}

impl FromIterator<i32> for FeatureIdSet {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        let mut set = FeatureIdSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision_detection::contact_manifold::{Contact, NonconvexContactManifold};
    use proptest::prelude::*;

    fn manifold(ids: &[i32]) -> NonconvexContactManifold {
        let mut manifold = NonconvexContactManifold::default();
        for &feature_id in ids {
            manifold.add(Contact { feature_id, depth: 0.1, ..Contact::default() });
        }
        manifold
    }

    /// Applies a diff the same way the tracker does: removals high to low, additions low to high.
    fn apply(set: &mut FeatureIdSet, ids: &[i32]) -> (Vec<i32>, Vec<i32>) {
        let manifold = manifold(ids);
        let diff = set.diff(&manifold);
        let mut removed = Vec::new();
        for slot in (0..FEATURE_ID_CAPACITY).rev() {
            if diff.removes(slot) {
                removed.push(set.swap_remove(slot));
            }
        }
        let mut added = Vec::new();
        for j in 0..manifold.count() {
            if diff.adds(j) && set.insert(manifold.feature_id(j)) {
                added.push(manifold.feature_id(j));
            }
        }
        (removed, added)
    }

    #[test]
    fn test_swap_remove_moves_last() {
        let mut set: FeatureIdSet = [10, 20, 30].into_iter().collect();
        assert_eq!(set.swap_remove(0), 10);
        assert_eq!(set.as_slice(), &[30, 20]);
        assert_eq!(set.swap_remove(1), 20);
        assert_eq!(set.as_slice(), &[30]);
    }

    #[test]
    fn test_insert_rejects_duplicates_and_overflow() {
        let mut set = FeatureIdSet::new();
        assert!(set.insert(4));
        assert!(!set.insert(4));
        assert_eq!(set.len(), 1);
        for id in 5..8 {
            assert!(set.insert(id));
        }
        assert!(set.is_full());
        assert!(!set.insert(9));
        assert_eq!(set.position(6), Some(2));
        assert_eq!(set.position(9), None);
    }

    #[test]
    fn test_removed_by_lists_high_slots_first() {
        let set: FeatureIdSet = [1, 2, 3].into_iter().collect();
        let diff = set.diff(&manifold(&[2]));
        assert_eq!(set.removed_by(&diff).as_slice(), &[3, 1]);
    }

    #[test]
    fn test_diff_replaces_one_feature() {
        let mut set: FeatureIdSet = [1, 2, 3].into_iter().collect();
        let (removed, added) = apply(&mut set, &[2, 3, 4]);
        assert_eq!(removed, vec![1]);
        assert_eq!(added, vec![4]);
        assert_eq!(set, [2, 3, 4].into_iter().collect());
    }

    #[test]
    fn test_diff_against_empty_manifold_removes_all() {
        let set: FeatureIdSet = [7, 8].into_iter().collect();
        let diff = set.diff(&manifold(&[]));
        assert_eq!(diff.remove_mask, 0b11);
        assert_eq!(diff.add_mask, 0);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: FeatureIdSet = [1, 2].into_iter().collect();
        let b: FeatureIdSet = [2, 1].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, [1].into_iter().collect());
    }

    proptest! {
        #[test]
        fn diff_converges_to_manifold_ids(
            previous in proptest::collection::vec(0i32..8, 0..=4),
            next in proptest::collection::vec(0i32..8, 0..=4),
        ) {
            let mut set: FeatureIdSet = previous.iter().copied().collect();
            let before = set;
            let (removed, added) = apply(&mut set, &next);

            let expected: FeatureIdSet = next.iter().copied().collect();
            prop_assert_eq!(set, expected);
            for id in &removed {
                prop_assert!(before.contains(*id) && !next.contains(id));
            }
            for id in &added {
                prop_assert!(!before.contains(*id) && next.contains(id));
            }
            prop_assert_eq!(before.len() - removed.len() + added.len(), set.len());
        }
    }
}
