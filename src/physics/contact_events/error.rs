//! Error types for contact event tracking.

use crate::physics::collidables::collidable_reference::CollidableReference;
use thiserror::Error;

/// Result type alias for contact event operations.
pub type ContactEventResult<T> = Result<T, ContactEventError>;

/// Errors raised by the contact event tracker.
///
/// All of these indicate a lifecycle bug in the integration layer; none are recoverable
/// runtime conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactEventError {
    /// The collidable already listens for contacts.
    #[error("{0} is already registered for contact events")]
    AlreadyRegistered(CollidableReference),

    /// The collidable was never registered, or has already been unregistered.
    #[error("{0} is not registered for contact events")]
    NotRegistered(CollidableReference),

    /// A tracked pair refers to a collidable the simulation can no longer resolve.
    /// The collidable was removed without being unregistered first.
    #[error("{0} is referenced by a tracked contact pair but no longer exists in the simulation")]
    StaleReference(CollidableReference),
}

impl ContactEventError {
    #[must_use]
    pub const fn already_registered(collidable: CollidableReference) -> Self {
        Self::AlreadyRegistered(collidable)
    }

    #[must_use]
    pub const fn not_registered(collidable: CollidableReference) -> Self {
        Self::NotRegistered(collidable)
    }

    #[must_use]
    pub const fn stale_reference(collidable: CollidableReference) -> Self {
        Self::StaleReference(collidable)
    }

    /// The collidable the error is about.
    pub fn collidable(&self) -> CollidableReference {
        match *self {
            Self::AlreadyRegistered(c) | Self::NotRegistered(c) | Self::StaleReference(c) => c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::handles::{BodyHandle, StaticHandle};

    #[test]
    fn test_error_display() {
        let body = CollidableReference::dynamic(BodyHandle(4));
        let err = ContactEventError::already_registered(body);
        assert_eq!(err.to_string(), "Dynamic[4] is already registered for contact events");

        let stat = CollidableReference::from_static(StaticHandle(1));
        let err = ContactEventError::stale_reference(stat);
        assert!(err.to_string().contains("no longer exists"));
        assert_eq!(err.collidable(), stat);
    }
}
