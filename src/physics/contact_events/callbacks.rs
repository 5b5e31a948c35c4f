use super::ContactEvents;
use crate::physics::collidables::collidable_reference::CollidableReference;
use crate::physics::collision_detection::collidable_pair::CollidablePair;
use crate::physics::collision_detection::contact_manifold::{
    ContactManifold, ConvexContactManifold,
};
use crate::physics::collision_detection::narrow_phase_callbacks::{
    NarrowPhaseCallbacks, PairMaterialProperties,
};

/// Narrow phase callbacks that feed every manifold involving a listener into a [`ContactEvents`]
/// tracker.
///
/// Recorded manifolds are buffered per worker and only turn into events on
/// [`ContactEvents::flush`].
pub struct ContactEventCallbacks<'a> {
    events: &'a ContactEvents,
    material: PairMaterialProperties,
    maximum_speculative_margin: f32,
}

impl<'a> ContactEventCallbacks<'a> {
    /// Uses the tracker's configured material and speculative margin.
    pub fn new(events: &'a ContactEvents) -> Self {
        let config = events.config();
        Self {
            events,
            material: config.default_material,
            maximum_speculative_margin: config.maximum_speculative_margin,
        }
    }

    pub fn with_material(mut self, material: PairMaterialProperties) -> Self {
        self.material = material;
        self
    }

    #[inline(always)]
    pub fn events(&self) -> &ContactEvents {
        self.events
    }
}

impl NarrowPhaseCallbacks for ContactEventCallbacks<'_> {
    fn allow_contact_generation(
        &self,
        _worker_index: usize,
        a: CollidableReference,
        b: CollidableReference,
        speculative_margin: &mut f32,
    ) -> bool {
        *speculative_margin = speculative_margin.min(self.maximum_speculative_margin);
        // Two statics never generate contacts.
        a.is_body() || b.is_body()
    }

    fn configure_contact_manifold<M: ContactManifold>(
        &self,
        worker_index: usize,
        pair: CollidablePair,
        manifold: &mut M,
        pair_material: &mut PairMaterialProperties,
    ) -> bool {
        *pair_material = self.material;
        self.events.record_manifold(worker_index, pair.a, pair.b, manifold);
        !self.events.suppresses_contact_response(pair.a, pair.b)
    }

    fn allow_contact_generation_for_children(
        &self,
        _worker_index: usize,
        _pair: CollidablePair,
        _child_index_a: usize,
        _child_index_b: usize,
    ) -> bool {
        true
    }

    fn configure_child_contact_manifold(
        &self,
        _worker_index: usize,
        _pair: CollidablePair,
        _child_index_a: usize,
        _child_index_b: usize,
        _manifold: &mut ConvexContactManifold,
    ) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::constraints::spring_settings::SpringSettings;
    use crate::physics::contact_events::config::ContactEventsConfig;
    use crate::physics::contact_events::contacts::ContactEventHandler;
    use crate::physics::handles::{BodyHandle, StaticHandle};
    use std::sync::Arc;

    struct Trigger;

    impl ContactEventHandler for Trigger {
        fn no_contact_response(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_margin_is_clamped() {
        let config = ContactEventsConfig {
            maximum_speculative_margin: 0.5,
            ..ContactEventsConfig::default()
        };
        let events = ContactEvents::new(config);
        let callbacks = ContactEventCallbacks::new(&events);
        let body = CollidableReference::dynamic(BodyHandle(0));
        let ground = CollidableReference::from_static(StaticHandle(0));

        let mut margin = 2.0;
        assert!(callbacks.allow_contact_generation(0, body, ground, &mut margin));
        assert_eq!(margin, 0.5);
        let mut margin = 2.0;
        assert!(!callbacks.allow_contact_generation(
            0,
            ground,
            CollidableReference::from_static(StaticHandle(1)),
            &mut margin
        ));
    }

    #[test]
    fn test_configure_records_listened_pairs_only() {
        let mut events = ContactEvents::default();
        let listener = CollidableReference::dynamic(BodyHandle(1));
        let trigger = CollidableReference::from_static(StaticHandle(1));
        let bystander = CollidableReference::dynamic(BodyHandle(2));
        events.register(listener, None);
        events.register(trigger, Some(Arc::new(Trigger)));

        let material = PairMaterialProperties::new(0.3, 1.0, SpringSettings::new(20.0, 1.0));
        {
            let callbacks = ContactEventCallbacks::new(&events).with_material(material);
            let mut pair_material = PairMaterialProperties::default();
            let mut manifold = ConvexContactManifold::default();

            let pair = CollidablePair::new(listener, bystander);
            assert!(callbacks.configure_contact_manifold(0, pair, &mut manifold, &mut pair_material));
            assert_eq!(pair_material, material);

            let pair = CollidablePair::new(bystander, CollidableReference::dynamic(BodyHandle(3)));
            assert!(callbacks.configure_contact_manifold(0, pair, &mut manifold, &mut pair_material));

            let pair = CollidablePair::new(bystander, trigger);
            assert!(!callbacks.configure_contact_manifold(0, pair, &mut manifold, &mut pair_material));
        }
        assert_eq!(events.pending_manifold_count(), 2);
    }
}
