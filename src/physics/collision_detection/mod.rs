pub mod collidable_pair;
pub mod contact_manifold;
pub mod narrow_phase_callbacks;
