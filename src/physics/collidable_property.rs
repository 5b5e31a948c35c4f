use crate::physics::collidables::collidable_reference::CollidableReference;
use crate::physics::handles::{BodyHandle, StaticHandle};

/// Stores extra properties about bodies and statics, indexed by the body or static handle.
///
/// Body handles and static handles occupy independent namespaces, so each gets its own buffer.
/// Slots that were never written read as `T::default()`.
#[derive(Debug, Clone, Default)]
pub struct CollidableProperty<T: Clone + Default> {
    body_data: Vec<T>,
    static_data: Vec<T>,
}

impl<T: Clone + Default> CollidableProperty<T> {
    /// Constructs a new collection with initial capacity.
    pub fn with_capacity(body_handle_capacity: usize, static_handle_capacity: usize) -> Self {
        Self {
            body_data: Vec::with_capacity(body_handle_capacity),
            static_data: Vec::with_capacity(static_handle_capacity),
        }
    }

    /// Gets the properties associated with a body handle, if a slot exists for it.
    #[inline(always)]
    pub fn get_body(&self, body_handle: BodyHandle) -> Option<&T> {
        self.body_data.get(body_handle.slot())
    }

    /// Gets the properties associated with a static handle, if a slot exists for it.
    #[inline(always)]
    pub fn get_static(&self, static_handle: StaticHandle) -> Option<&T> {
        self.static_data.get(static_handle.slot())
    }

    /// Gets the properties associated with a collidable reference.
    #[inline(always)]
    pub fn get_collidable(&self, collidable: CollidableReference) -> Option<&T> {
        if collidable.is_static() {
            self.get_static(collidable.static_handle())
        } else {
            self.get_body(collidable.body_handle())
        }
    }

    /// Ensures there is space for the collidable and returns a mutable reference to its slot.
    pub fn allocate(&mut self, collidable: CollidableReference) -> &mut T {
        let (data, slot) = if collidable.is_static() {
            (&mut self.static_data, collidable.static_handle().slot())
        } else {
            (&mut self.body_data, collidable.body_handle().slot())
        };
        if slot >= data.len() {
            data.resize(slot + 1, T::default());
        }
        &mut data[slot]
    }

    /// Resets the collidable's slot to the default value and returns what it held.
    pub fn take(&mut self, collidable: CollidableReference) -> T {
        let (data, slot) = if collidable.is_static() {
            (&mut self.static_data, collidable.static_handle().slot())
        } else {
            (&mut self.body_data, collidable.body_handle().slot())
        };
        data.get_mut(slot).map(std::mem::take).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_are_independent() {
        let mut property = CollidableProperty::<u32>::with_capacity(4, 4);
        *property.allocate(CollidableReference::dynamic(BodyHandle(2))) = 10;
        *property.allocate(CollidableReference::from_static(StaticHandle(2))) = 20;

        assert_eq!(property.get_body(BodyHandle(2)), Some(&10));
        assert_eq!(property.get_static(StaticHandle(2)), Some(&20));
        assert_eq!(property.get_body(BodyHandle(0)), Some(&0));
        assert_eq!(property.get_body(BodyHandle(9)), None);
    }

    #[test]
    fn test_take_resets_slot() {
        let mut property = CollidableProperty::<u32>::default();
        let collidable = CollidableReference::kinematic(BodyHandle(1));
        *property.allocate(collidable) = 5;
        assert_eq!(property.take(collidable), 5);
        assert_eq!(property.get_collidable(collidable), Some(&0));
        assert_eq!(property.take(CollidableReference::dynamic(BodyHandle(77))), 0);
    }
}
