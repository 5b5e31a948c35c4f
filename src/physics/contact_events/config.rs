use crate::physics::collision_detection::narrow_phase_callbacks::PairMaterialProperties;
use crate::physics::constraints::spring_settings::SpringSettings;

/// Allocation sizes and narrow phase defaults for a [`ContactEvents`](super::ContactEvents) tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEventsConfig {
    /// The number of tracked pairs to allocate space for.
    pub initial_pair_capacity: usize,
    /// The number of listener handles (per namespace) to allocate space for.
    pub initial_listener_capacity: usize,
    /// Number of narrow phase workers that may record manifolds concurrently.
    pub worker_count: usize,
    /// Material handed to the narrow phase for every pair.
    pub default_material: PairMaterialProperties,
    /// Upper bound applied to the speculative margin requested by the narrow phase.
    pub maximum_speculative_margin: f32,
}

impl ContactEventsConfig {
    pub fn new(
        initial_pair_capacity: usize,
        initial_listener_capacity: usize,
        worker_count: usize,
        default_material: PairMaterialProperties,
        maximum_speculative_margin: f32,
    ) -> Self {
        Self {
            initial_pair_capacity,
            initial_listener_capacity,
            worker_count,
            default_material,
            maximum_speculative_margin,
        }
    }
}

impl Default for ContactEventsConfig {
    fn default() -> Self {
        Self {
            initial_pair_capacity: 256,
            initial_listener_capacity: 64,
            worker_count: 1,
            default_material: PairMaterialProperties::new(1.0, 2.0, SpringSettings::new(30.0, 1.0)),
            maximum_speculative_margin: f32::MAX,
        }
    }
}
