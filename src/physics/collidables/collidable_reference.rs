use crate::physics::handles::{BodyHandle, StaticHandle};
use std::fmt;

/// Represents how a collidable can interact and move.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollidableMobility {
    /// Marks a collidable as owned by a dynamic body.
    Dynamic = 0,
    /// Marks a collidable as owned by a kinematic body.
    Kinematic = 1,
    /// Marks the collidable as an independent immobile collidable.
    Static = 2,
}

/// Uses a bitpacked representation to refer to a body or static collidable.
///
/// The upper two bits hold the [`CollidableMobility`], the lower 30 bits hold the handle.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CollidableReference {
    packed: u32,
}

const _: () = {
    assert!(std::mem::size_of::<CollidableReference>() == 4);
};

impl CollidableReference {
    const HANDLE_MASK: u32 = 0x3FFF_FFFF;

    /// Gets the mobility state of the owner of this collidable.
    #[inline(always)]
    pub fn mobility(&self) -> CollidableMobility {
        match self.packed >> 30 {
            0 => CollidableMobility::Dynamic,
            1 => CollidableMobility::Kinematic,
            _ => CollidableMobility::Static,
        }
    }

    /// Gets whether the collidable belongs to a static.
    #[inline(always)]
    pub fn is_static(&self) -> bool {
        self.mobility() == CollidableMobility::Static
    }

    /// Gets whether the collidable belongs to a body, dynamic or kinematic.
    #[inline(always)]
    pub fn is_body(&self) -> bool {
        !self.is_static()
    }

    /// Gets the body handle of the owner of the collidable referred to by this instance.
    #[inline(always)]
    pub fn body_handle(&self) -> BodyHandle {
        debug_assert!(
            self.is_body(),
            "Extracting a body handle from a collidable reference requires that the collidable is owned by a body."
        );
        BodyHandle(self.raw_handle_value())
    }

    /// Gets the static handle of the owner of the collidable referred to by this instance.
    #[inline(always)]
    pub fn static_handle(&self) -> StaticHandle {
        debug_assert!(
            self.is_static(),
            "Extracting a static handle from a collidable reference requires that the collidable is owned by a static."
        );
        StaticHandle(self.raw_handle_value())
    }

    /// Gets the integer value of the handle of the owner of the collidable.
    #[inline(always)]
    pub fn raw_handle_value(&self) -> i32 {
        (self.packed & Self::HANDLE_MASK) as i32
    }

    /// Gets the bitpacked value.
    #[inline(always)]
    pub fn packed(&self) -> u32 {
        self.packed
    }

    /// Identity of the collidable that survives a body switching between dynamic and kinematic.
    ///
    /// Statics sort after every body; within a namespace, lower handles sort first.
    #[inline(always)]
    pub fn stable_index(&self) -> u64 {
        ((self.is_static() as u64) << 32) | self.raw_handle_value() as u64
    }

    /// Whether both references point at the same collidable, ignoring dynamic/kinematic changes.
    #[inline(always)]
    pub fn same_collidable(&self, other: CollidableReference) -> bool {
        self.stable_index() == other.stable_index()
    }

    #[inline(always)]
    pub(crate) fn from_raw(mobility: CollidableMobility, handle: i32) -> Self {
        debug_assert!(
            handle >= 0 && handle < (1 << 30),
            "Do you actually have more than 2^30 collidables?"
        );
        Self {
            packed: ((mobility as u32) << 30) | (handle as u32 & Self::HANDLE_MASK),
        }
    }

    /// Creates a collidable reference for a body.
    #[inline(always)]
    pub fn from_body(mobility: CollidableMobility, handle: BodyHandle) -> Self {
        debug_assert!(
            mobility != CollidableMobility::Static,
            "Creating a collidable reference associated with a body requires a body-related mobility."
        );
        Self::from_raw(mobility, handle.0)
    }

    /// Creates a collidable reference for a dynamic body.
    #[inline(always)]
    pub fn dynamic(handle: BodyHandle) -> Self {
        Self::from_raw(CollidableMobility::Dynamic, handle.0)
    }

    /// Creates a collidable reference for a kinematic body.
    #[inline(always)]
    pub fn kinematic(handle: BodyHandle) -> Self {
        Self::from_raw(CollidableMobility::Kinematic, handle.0)
    }

    /// Creates a collidable reference for a static.
    #[inline(always)]
    pub fn from_static(handle: StaticHandle) -> Self {
        Self::from_raw(CollidableMobility::Static, handle.0)
    }
}

impl fmt::Display for CollidableReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}[{}]", self.mobility(), self.raw_handle_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing() {
        let body = CollidableReference::kinematic(BodyHandle(42));
        assert_eq!(body.mobility(), CollidableMobility::Kinematic);
        assert_eq!(body.body_handle(), BodyHandle(42));
        assert!(body.is_body());

        let stat = CollidableReference::from_static(StaticHandle(42));
        assert_eq!(stat.mobility(), CollidableMobility::Static);
        assert_eq!(stat.static_handle(), StaticHandle(42));
        assert_ne!(body, stat);
    }

    #[test]
    fn test_stable_index_ignores_body_mobility() {
        let dynamic = CollidableReference::dynamic(BodyHandle(5));
        let kinematic = CollidableReference::kinematic(BodyHandle(5));
        assert_ne!(dynamic, kinematic);
        assert!(dynamic.same_collidable(kinematic));

        let stat = CollidableReference::from_static(StaticHandle(5));
        assert!(!stat.same_collidable(dynamic));
        assert!(stat.stable_index() > CollidableReference::dynamic(BodyHandle(1 << 29)).stable_index());
    }

    #[test]
    fn test_display() {
        let stat = CollidableReference::from_static(StaticHandle(3));
        assert_eq!(stat.to_string(), "Static[3]");
    }
}
