//! Contact lifecycle events for a Bepu-style narrow phase.
//!
//! Collidables register with [`ContactEvents`] and receive pair created, touching, contact
//! added/removed and pair ended callbacks through a [`ContactEventHandler`]. The narrow phase
//! feeds manifolds in through [`ContactEventCallbacks`]; see [`physics::contact_events`] for the
//! per-step protocol.

pub mod physics;
pub mod utilities;

pub use physics::body_properties::RigidPose;
pub use physics::collidable_source::{CollidableActivity, CollidableSource};
pub use physics::collidables::collidable_reference::{CollidableMobility, CollidableReference};
pub use physics::collision_detection::collidable_pair::CollidablePair;
pub use physics::collision_detection::contact_manifold::{
    Contact, ContactManifold, ConvexContact, ConvexContactManifold, EmptyManifold,
    ManifoldSnapshot, NonconvexContactManifold, MAXIMUM_CONTACT_COUNT,
};
pub use physics::collision_detection::narrow_phase_callbacks::{
    NarrowPhaseCallbacks, PairMaterialProperties,
};
pub use physics::constraints::spring_settings::SpringSettings;
pub use physics::contact_events::{
    ContactData, ContactEventCallbacks, ContactEventError, ContactEventHandler,
    ContactEventResult, ContactEvents, ContactEventsConfig, Contacts, SharedContactHandler,
};
pub use physics::handles::{BodyHandle, StaticHandle};
