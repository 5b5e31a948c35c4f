use crate::physics::collidables::collidable_reference::CollidableReference;
use std::fmt;

/// Packed pair of collidable references, in the order the narrow phase reported them.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CollidablePair {
    pub a: CollidableReference,
    pub b: CollidableReference,
}

const _: () = {
    assert!(std::mem::size_of::<CollidablePair>() == 8);
};

impl CollidablePair {
    #[inline(always)]
    pub fn new(a: CollidableReference, b: CollidableReference) -> Self {
        Self { a, b }
    }
}

impl fmt::Display for CollidablePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.a, self.b)
    }
}
