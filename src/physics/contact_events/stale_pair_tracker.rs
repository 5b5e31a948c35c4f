use super::error::ContactEventResult;
use super::ordered_pair_key::OrderedPairKey;
use super::pair_state::PairTable;
use crate::physics::collidable_source::CollidableSource;
use std::collections::BTreeSet;
use tracing::trace;

/// Pairs expected to receive a manifold this step.
///
/// The narrow phase stops reporting pairs whose bounding boxes no longer overlap, so a tracked
/// pair with an awake body that gets no manifold during a step has separated and must be ended.
#[derive(Debug, Clone, Default)]
pub struct StalePairTracker {
    outdated: BTreeSet<OrderedPairKey>,
}

impl StalePairTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the outdated set with every tracked pair that has at least one awake body.
    /// Returns the number of pairs marked.
    ///
    /// Fails with a stale reference error if either side of any tracked pair no longer exists.
    /// The previous set is left untouched on failure.
    pub fn mark_active_pairs(
        &mut self,
        pairs: &PairTable,
        source: &dyn CollidableSource,
    ) -> ContactEventResult<usize> {
        let mut outdated = BTreeSet::new();
        for key in pairs.sorted_keys() {
            let a = source.activity(key.a())?;
            let b = source.activity(key.b())?;
            let active = (key.a().is_body() && a.awake) || (key.b().is_body() && b.awake);
            if active {
                trace!(pair = %key, "pair expects an update");
                outdated.insert(key);
            }
        }
        self.outdated = outdated;
        Ok(self.outdated.len())
    }

    /// The pair received its update.
    #[inline(always)]
    pub fn refresh(&mut self, key: &OrderedPairKey) {
        self.outdated.remove(key);
    }

    /// The pair stopped being tracked.
    #[inline(always)]
    pub fn forget(&mut self, key: &OrderedPairKey) {
        self.outdated.remove(key);
    }

    /// Empties the set, returning the pairs that never received their update in ascending order.
    pub fn take_outdated(&mut self) -> Vec<OrderedPairKey> {
        std::mem::take(&mut self.outdated).into_iter().collect()
    }

    pub fn contains(&self, key: &OrderedPairKey) -> bool {
        self.outdated.contains(key)
    }

    pub fn len(&self) -> usize {
        self.outdated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outdated.is_empty()
    }

    pub fn clear(&mut self) {
        self.outdated.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body_properties::RigidPose;
    use crate::physics::collidable_source::CollidableActivity;
    use crate::physics::collidables::collidable_reference::CollidableReference;
    use crate::physics::contact_events::error::ContactEventError;
    use crate::physics::contact_events::pair_state::PairState;
    use crate::physics::handles::{BodyHandle, StaticHandle};
    use std::collections::HashMap;

    #[derive(Default)]
    struct World(HashMap<CollidableReference, bool>);

    impl CollidableSource for World {
        fn resolve(&self, collidable: CollidableReference) -> Option<CollidableActivity> {
            self.0.get(&collidable).map(|&awake| CollidableActivity {
                pose: RigidPose::IDENTITY,
                awake,
            })
        }
    }

    fn body(handle: i32) -> CollidableReference {
        CollidableReference::dynamic(BodyHandle(handle))
    }

    fn ground() -> CollidableReference {
        CollidableReference::from_static(StaticHandle(0))
    }

    fn track(table: &mut PairTable, a: CollidableReference, b: CollidableReference) -> OrderedPairKey {
        let key = OrderedPairKey::new(a, b);
        table.get_or_insert_with(key, || PairState::new(true, None, true, None));
        key
    }

    #[test]
    fn test_only_awake_bodies_are_marked() {
        let mut world = World::default();
        world.0.insert(body(0), true);
        world.0.insert(body(1), false);
        world.0.insert(ground(), false);

        let mut table = PairTable::default();
        let awake = track(&mut table, body(0), ground());
        let asleep = track(&mut table, body(1), ground());
        let mixed = track(&mut table, body(0), body(1));

        let mut tracker = StalePairTracker::new();
        assert_eq!(tracker.mark_active_pairs(&table, &world), Ok(2));
        assert!(tracker.contains(&awake));
        assert!(tracker.contains(&mixed));
        assert!(!tracker.contains(&asleep));

        tracker.refresh(&awake);
        assert_eq!(tracker.take_outdated(), vec![mixed]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_marking_restarts_from_empty() {
        let mut world = World::default();
        world.0.insert(body(0), true);
        world.0.insert(ground(), false);
        let mut table = PairTable::default();
        let key = track(&mut table, body(0), ground());

        let mut tracker = StalePairTracker::new();
        tracker.mark_active_pairs(&table, &world).unwrap();
        table.remove(&key);
        assert_eq!(tracker.mark_active_pairs(&table, &world), Ok(0));
    }

    #[test]
    fn test_missing_collidable_is_stale() {
        let mut world = World::default();
        world.0.insert(body(0), true);
        world.0.insert(body(4), true);
        world.0.insert(ground(), false);
        let mut table = PairTable::default();
        let first = track(&mut table, body(0), ground());
        let removed = track(&mut table, body(4), ground());

        let mut tracker = StalePairTracker::new();
        assert_eq!(tracker.mark_active_pairs(&table, &world), Ok(2));

        // The pair with the live body sorts first and must not leave a partial set behind.
        world.0.remove(&body(4));
        assert_eq!(
            tracker.mark_active_pairs(&table, &world),
            Err(ContactEventError::stale_reference(body(4)))
        );
        assert_eq!(tracker.len(), 2);
        assert!(tracker.contains(&first));
        assert!(tracker.contains(&removed));
    }
}
