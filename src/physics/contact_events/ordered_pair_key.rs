use crate::physics::collidables::collidable_reference::CollidableReference;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Order-independent key of a collidable pair.
///
/// Sides are sorted by [`CollidableReference::stable_index`], so `new(x, y) == new(y, x)` and the
/// same pair always lands on the same side regardless of which collidable the narrow phase
/// reported first. Stable indices are unique per collidable, so the only tie is the reflexive
/// pair `(x, x)`.
#[derive(Debug, Clone, Copy)]
pub struct OrderedPairKey {
    a: CollidableReference,
    b: CollidableReference,
}

/// One side of an [`OrderedPairKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairSide {
    A,
    B,
}

impl PairSide {
    pub const BOTH: [PairSide; 2] = [PairSide::A, PairSide::B];

    #[inline(always)]
    pub fn opposite(self) -> PairSide {
        match self {
            PairSide::A => PairSide::B,
            PairSide::B => PairSide::A,
        }
    }
}

impl OrderedPairKey {
    pub fn new(x: CollidableReference, y: CollidableReference) -> Self {
        if y.stable_index() < x.stable_index() {
            Self { a: y, b: x }
        } else {
            Self { a: x, b: y }
        }
    }

    /// The side with the lower stable index.
    #[inline(always)]
    pub fn a(&self) -> CollidableReference {
        self.a
    }

    /// The side with the higher stable index.
    #[inline(always)]
    pub fn b(&self) -> CollidableReference {
        self.b
    }

    /// Which side the collidable occupies, if it is part of the pair.
    pub fn side_of(&self, collidable: CollidableReference) -> Option<PairSide> {
        if self.a.same_collidable(collidable) {
            Some(PairSide::A)
        } else if self.b.same_collidable(collidable) {
            Some(PairSide::B)
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn contains(&self, collidable: CollidableReference) -> bool {
        self.side_of(collidable).is_some()
    }

    #[inline(always)]
    fn ordinal(&self) -> (u64, u64) {
        (self.a.stable_index(), self.b.stable_index())
    }
}

impl PartialEq for OrderedPairKey {
    fn eq(&self, other: &Self) -> bool {
        self.ordinal() == other.ordinal()
    }
}

impl Eq for OrderedPairKey {}

impl Hash for OrderedPairKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordinal().hash(state);
    }
}

impl PartialOrd for OrderedPairKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedPairKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for OrderedPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.a, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collidables::collidable_reference::CollidableMobility;
    use crate::physics::handles::{BodyHandle, StaticHandle};
    use proptest::prelude::*;

    fn collidable(mobility: u8, handle: i32) -> CollidableReference {
        match mobility % 3 {
            0 => CollidableReference::dynamic(BodyHandle(handle)),
            1 => CollidableReference::kinematic(BodyHandle(handle)),
            _ => CollidableReference::from_static(StaticHandle(handle)),
        }
    }

    #[test]
    fn test_bodies_sort_before_statics() {
        let stat = CollidableReference::from_static(StaticHandle(0));
        let body = CollidableReference::dynamic(BodyHandle(100));
        let key = OrderedPairKey::new(stat, body);
        assert_eq!(key.a(), body);
        assert_eq!(key.b(), stat);
        assert_eq!(key.side_of(stat), Some(PairSide::B));
        assert_eq!(key.side_of(CollidableReference::dynamic(BodyHandle(1))), None);
    }

    #[test]
    fn test_key_survives_mobility_change() {
        let other = CollidableReference::from_static(StaticHandle(2));
        let dynamic = OrderedPairKey::new(CollidableReference::dynamic(BodyHandle(9)), other);
        let kinematic = OrderedPairKey::new(
            other,
            CollidableReference::from_body(CollidableMobility::Kinematic, BodyHandle(9)),
        );
        assert_eq!(dynamic, kinematic);
    }

    #[test]
    fn test_reflexive_pair() {
        let body = CollidableReference::dynamic(BodyHandle(3));
        let key = OrderedPairKey::new(body, body);
        assert_eq!(key.a(), key.b());
        assert_eq!(key.side_of(body), Some(PairSide::A));
    }

    proptest! {
        #[test]
        fn key_is_order_independent(
            mx in 0u8..3, hx in 0i32..1000,
            my in 0u8..3, hy in 0i32..1000,
        ) {
            let x = collidable(mx, hx);
            let y = collidable(my, hy);
            let forward = OrderedPairKey::new(x, y);
            let backward = OrderedPairKey::new(y, x);
            prop_assert_eq!(forward, backward);
            prop_assert_eq!(forward.a().stable_index(), backward.a().stable_index());
            prop_assert_eq!(forward.b().stable_index(), backward.b().stable_index());
            prop_assert!(forward.a().stable_index() <= forward.b().stable_index());
            prop_assert_eq!(forward, OrderedPairKey::new(x, y));
        }
    }
}
