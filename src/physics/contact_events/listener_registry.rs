use super::contacts::SharedContactHandler;
use super::error::{ContactEventError, ContactEventResult};
use crate::physics::collidable_property::CollidableProperty;
use crate::physics::collidables::collidable_reference::CollidableReference;
use crate::utilities::collections::IndexSet;
use tracing::debug;

/// Membership of collidables that listen for contact events, with their optional handlers.
///
/// Statics and bodies live in separate handle namespaces, so each gets its own set. A body keeps
/// its registration when it switches between dynamic and kinematic.
#[derive(Default)]
pub struct ListenerRegistry {
    static_listeners: IndexSet,
    body_listeners: IndexSet,
    handlers: CollidableProperty<Option<SharedContactHandler>>,
}

impl ListenerRegistry {
    pub fn with_capacity(handle_capacity: usize) -> Self {
        Self {
            static_listeners: IndexSet::new(handle_capacity),
            body_listeners: IndexSet::new(handle_capacity),
            handlers: CollidableProperty::with_capacity(handle_capacity, handle_capacity),
        }
    }

    #[inline(always)]
    fn set(&self, collidable: CollidableReference) -> &IndexSet {
        if collidable.is_static() {
            &self.static_listeners
        } else {
            &self.body_listeners
        }
    }

    #[inline(always)]
    fn set_mut(&mut self, collidable: CollidableReference) -> &mut IndexSet {
        if collidable.is_static() {
            &mut self.static_listeners
        } else {
            &mut self.body_listeners
        }
    }

    /// Number of registered collidables across both namespaces.
    pub fn len(&self) -> usize {
        self.static_listeners.len() + self.body_listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub fn is_registered(&self, collidable: CollidableReference) -> bool {
        self.set(collidable)
            .contains(collidable.raw_handle_value() as usize)
    }

    /// The handler registered for the collidable. `None` if it is not registered or listens
    /// without a handler.
    pub fn handler(&self, collidable: CollidableReference) -> Option<&SharedContactHandler> {
        if !self.is_registered(collidable) {
            return None;
        }
        self.handlers
            .get_collidable(collidable)
            .and_then(Option::as_ref)
    }

    pub fn register(
        &mut self,
        collidable: CollidableReference,
        handler: Option<SharedContactHandler>,
    ) -> ContactEventResult<()> {
        if !self
            .set_mut(collidable)
            .add(collidable.raw_handle_value() as usize)
        {
            return Err(ContactEventError::already_registered(collidable));
        }
        debug!(
            collidable = %collidable,
            has_handler = handler.is_some(),
            "registered contact listener"
        );
        *self.handlers.allocate(collidable) = handler;
        Ok(())
    }

    /// Removes the collidable and hands back its handler.
    pub fn unregister(
        &mut self,
        collidable: CollidableReference,
    ) -> ContactEventResult<Option<SharedContactHandler>> {
        if !self
            .set_mut(collidable)
            .remove(collidable.raw_handle_value() as usize)
        {
            return Err(ContactEventError::not_registered(collidable));
        }
        debug!(collidable = %collidable, "unregistered contact listener");
        Ok(self.handlers.take(collidable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_namespaces_are_disjoint() {
        let mut registry = ListenerRegistry::with_capacity(8);
        let body = CollidableReference::dynamic(BodyHandle(3));
        let stat = CollidableReference::from_static(StaticHandle(3));

        registry.register(body, None).unwrap();
        assert!(registry.is_registered(body));
        assert!(registry.is_registered(CollidableReference::kinematic(BodyHandle(3))));
        assert!(!registry.is_registered(stat));

        registry.register(stat, Some(Arc::new(Trigger))).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.handler(body).is_none());
        assert!(registry.handler(stat).is_some_and(|h| h.no_contact_response()));
    }

    #[test]
    fn test_double_registration_fails() {
        let mut registry = ListenerRegistry::default();
        let body = CollidableReference::dynamic(BodyHandle(1000));
        registry.register(body, None).unwrap();
        assert_eq!(
            registry.register(body, None),
            Err(ContactEventError::already_registered(body))
        );
    }

    #[test]
    fn test_unregister_returns_handler() {
        let mut registry = ListenerRegistry::default();
        let stat = CollidableReference::from_static(StaticHandle(2));
        registry.register(stat, Some(Arc::new(Trigger))).unwrap();

        let handler = registry.unregister(stat).unwrap();
        assert!(handler.is_some());
        assert!(!registry.is_registered(stat));
        assert!(registry.handler(stat).is_none());
        assert!(matches!(
            registry.unregister(stat),
            Err(ContactEventError::NotRegistered(_))
        ));
        assert!(registry.is_empty());
    }
}
