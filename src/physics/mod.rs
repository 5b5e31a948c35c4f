pub mod body_properties;
pub mod collidable_property;
pub mod collidable_source;
pub mod collidables;
pub mod collision_detection;
pub mod constraints;
pub mod contact_events;
pub mod handles;
