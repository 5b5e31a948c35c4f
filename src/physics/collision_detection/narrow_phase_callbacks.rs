use super::collidable_pair::CollidablePair;
use super::contact_manifold::{ContactManifold, ConvexContactManifold};
use crate::physics::collidables::collidable_reference::CollidableReference;
use crate::physics::constraints::spring_settings::SpringSettings;

/// Material properties governing the interaction between colliding bodies.
/// Used by the narrow phase to create constraints of the appropriate configuration.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairMaterialProperties {
    /// Coefficient of friction to apply for the constraint.
    /// Maximum friction force will be equal to the normal force times the friction coefficient.
    pub friction_coefficient: f32,
    /// Maximum relative velocity along the contact normal at which the collision constraint will recover from penetration.
    /// Clamps the velocity goal created from the spring settings.
    pub maximum_recovery_velocity: f32,
    /// Defines the constraint's penetration recovery spring properties.
    pub spring_settings: SpringSettings,
}

impl PairMaterialProperties {
    /// Constructs a pair's material properties.
    #[inline(always)]
    pub fn new(
        friction_coefficient: f32,
        maximum_recovery_velocity: f32,
        spring_settings: SpringSettings,
    ) -> Self {
        Self {
            friction_coefficient,
            maximum_recovery_velocity,
            spring_settings,
        }
    }
}

/// Defines handlers for narrow phase events.
///
/// Every method takes `&self`: the narrow phase calls them concurrently from its workers.
pub trait NarrowPhaseCallbacks: Sync {
    /// Chooses whether to allow contact generation to proceed for two overlapping collidables.
    fn allow_contact_generation(
        &self,
        worker_index: usize,
        a: CollidableReference,
        b: CollidableReference,
        speculative_margin: &mut f32,
    ) -> bool;

    /// Provides a notification that a manifold has been created for a pair.
    /// Offers an opportunity to change the manifold's details.
    /// Returns true if a constraint should be created for the manifold, false otherwise.
    fn configure_contact_manifold<M: ContactManifold>(
        &self,
        worker_index: usize,
        pair: CollidablePair,
        manifold: &mut M,
        pair_material: &mut PairMaterialProperties,
    ) -> bool;

    /// Chooses whether to allow contact generation to proceed for the children of two overlapping collidables
    /// in a compound-including pair.
    fn allow_contact_generation_for_children(
        &self,
        worker_index: usize,
        pair: CollidablePair,
        child_index_a: usize,
        child_index_b: usize,
    ) -> bool;

    /// Provides a notification that a manifold has been created between the children of two collidables
    /// in a compound-including pair.
    /// Returns true if this manifold should be considered for the parent pair's contact manifold generation, false otherwise.
    fn configure_child_contact_manifold(
        &self,
        worker_index: usize,
        pair: CollidablePair,
        child_index_a: usize,
        child_index_b: usize,
        manifold: &mut ConvexContactManifold,
    ) -> bool;
}
