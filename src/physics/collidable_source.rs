use crate::physics::body_properties::RigidPose;
use crate::physics::collidables::collidable_reference::CollidableReference;
use crate::physics::contact_events::error::{ContactEventError, ContactEventResult};

/// Live state of a collidable as seen by the simulation at the start of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollidableActivity {
    /// Current pose of the collidable's owner.
    pub pose: RigidPose,
    /// Whether the owner is in the active set. Statics are never awake.
    pub awake: bool,
}

impl CollidableActivity {
    pub fn awake(pose: RigidPose) -> Self {
        Self { pose, awake: true }
    }
}

/// Resolves collidable references into pose and activity data owned by the simulation.
pub trait CollidableSource {
    /// Looks up a collidable. `None` means the backing body or static no longer exists.
    fn resolve(&self, collidable: CollidableReference) -> Option<CollidableActivity>;

    /// Looks up a collidable, treating a missing one as a stale reference.
    fn activity(&self, collidable: CollidableReference) -> ContactEventResult<CollidableActivity> {
        self.resolve(collidable)
            .ok_or_else(|| ContactEventError::stale_reference(collidable))
    }
}
