use glam::Vec3;
use tracing::warn;

/// The maximum number of contacts that can exist within a manifold.
pub const MAXIMUM_CONTACT_COUNT: usize = 4;

/// Information about a single contact.
/// This type contains a field for the normal; it can be used to represent contacts within nonconvex contact manifolds or convex manifolds.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Contact {
    /// Offset from the position of collidable A to the contact position.
    pub offset: Vec3,
    /// Penetration depth between the two collidables at this contact. Negative values represent separation.
    pub depth: f32,
    /// Surface basis of the contact. Points from collidable B to collidable A.
    pub normal: Vec3,
    /// Id of the features involved in the collision that generated this contact.
    pub feature_id: i32,
}

/// Information about a single contact in a convex collidable pair.
/// Convex collidable pairs share one surface basis across the manifold.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConvexContact {
    /// Offset from the position of collidable A to the contact position.
    pub offset: Vec3,
    /// Penetration depth between the two collidables at this contact. Negative values represent separation.
    pub depth: f32,
    /// Id of the features involved in the collision that generated this contact.
    pub feature_id: i32,
}

/// Read access to the contacts the narrow phase produced for one pair.
///
/// Contact indices must be below [`count`](ContactManifold::count).
pub trait ContactManifold {
    /// Gets the number of contacts in the manifold.
    fn count(&self) -> usize;

    /// Gets whether the contact manifold was created by a pair of convex objects.
    fn convex(&self) -> bool;

    /// Offset from collidable A to collidable B.
    fn offset_b(&self) -> Vec3;

    /// Gets the feature id associated with a requested contact.
    fn feature_id(&self, contact_index: usize) -> i32;

    /// Gets the depth associated with a requested contact.
    fn depth(&self, contact_index: usize) -> f32;

    /// Gets a contact's normal. Points from collidable B to collidable A.
    fn normal(&self, contact_index: usize) -> Vec3;

    /// Gets the offset from collidable A to the requested contact.
    fn offset(&self, contact_index: usize) -> Vec3;

    /// Gets a copy of a contact's data.
    fn contact(&self, contact_index: usize) -> Contact {
        Contact {
            offset: self.offset(contact_index),
            depth: self.depth(contact_index),
            normal: self.normal(contact_index),
            feature_id: self.feature_id(contact_index),
        }
    }

    /// Whether any contact has nonnegative depth.
    /// Only the first [`MAXIMUM_CONTACT_COUNT`] contacts are considered.
    fn is_touching(&self) -> bool {
        (0..self.count().min(MAXIMUM_CONTACT_COUNT)).any(|i| self.depth(i) >= 0.0)
    }
}

/// Contains the data associated with a nonconvex contact manifold.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NonconvexContactManifold {
    /// Offset from collidable A to collidable B.
    pub offset_b: Vec3,
    count: usize,
    contacts: [Contact; MAXIMUM_CONTACT_COUNT],
}

impl NonconvexContactManifold {
    pub fn new(offset_b: Vec3) -> Self {
        Self {
            offset_b,
            ..Self::default()
        }
    }

    /// Live contacts of the manifold.
    #[inline(always)]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts[..self.count]
    }

    /// Appends a contact. Returns false when the manifold is already full.
    pub fn add(&mut self, contact: Contact) -> bool {
        if self.count == MAXIMUM_CONTACT_COUNT {
            return false;
        }
        self.contacts[self.count] = contact;
        self.count += 1;
        true
    }
}

impl ContactManifold for NonconvexContactManifold {
    #[inline(always)]
    fn count(&self) -> usize {
        self.count
    }

    #[inline(always)]
    fn convex(&self) -> bool {
        false
    }

    #[inline(always)]
    fn offset_b(&self) -> Vec3 {
        self.offset_b
    }

    #[inline(always)]
    fn feature_id(&self, contact_index: usize) -> i32 {
        self.contacts()[contact_index].feature_id
    }

    #[inline(always)]
    fn depth(&self, contact_index: usize) -> f32 {
        self.contacts()[contact_index].depth
    }

    #[inline(always)]
    fn normal(&self, contact_index: usize) -> Vec3 {
        self.contacts()[contact_index].normal
    }

    #[inline(always)]
    fn offset(&self, contact_index: usize) -> Vec3 {
        self.contacts()[contact_index].offset
    }

    fn contact(&self, contact_index: usize) -> Contact {
        self.contacts()[contact_index]
    }
}

/// Contains the data associated with a convex contact manifold.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConvexContactManifold {
    /// Offset from collidable A to collidable B.
    pub offset_b: Vec3,
    /// Surface normal shared by all contacts. Points from collidable B to collidable A.
    pub normal: Vec3,
    count: usize,
    contacts: [ConvexContact; MAXIMUM_CONTACT_COUNT],
}

impl ConvexContactManifold {
    pub fn new(offset_b: Vec3, normal: Vec3) -> Self {
        Self {
            offset_b,
            normal,
            ..Self::default()
        }
    }

    #[inline(always)]
    pub fn contacts(&self) -> &[ConvexContact] {
        &self.contacts[..self.count]
    }

    /// Appends a contact. Returns false when the manifold is already full.
    pub fn add(&mut self, contact: ConvexContact) -> bool {
        if self.count == MAXIMUM_CONTACT_COUNT {
            return false;
        }
        self.contacts[self.count] = contact;
        self.count += 1;
        true
    }
}

impl ContactManifold for ConvexContactManifold {
    #[inline(always)]
    fn count(&self) -> usize {
        self.count
    }

    #[inline(always)]
    fn convex(&self) -> bool {
        true
    }

    #[inline(always)]
    fn offset_b(&self) -> Vec3 {
        self.offset_b
    }

    #[inline(always)]
    fn feature_id(&self, contact_index: usize) -> i32 {
        self.contacts()[contact_index].feature_id
    }

    #[inline(always)]
    fn depth(&self, contact_index: usize) -> f32 {
        self.contacts()[contact_index].depth
    }

    #[inline(always)]
    fn normal(&self, _contact_index: usize) -> Vec3 {
        self.normal
    }

    #[inline(always)]
    fn offset(&self, contact_index: usize) -> Vec3 {
        self.contacts()[contact_index].offset
    }
}

/// A manifold without contacts, used when a pair is torn down without a narrow phase update.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyManifold;

impl ContactManifold for EmptyManifold {
    fn count(&self) -> usize {
        0
    }

    fn convex(&self) -> bool {
        true
    }

    fn offset_b(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn feature_id(&self, contact_index: usize) -> i32 {
        panic!("Empty manifold has no contact {contact_index}.")
    }

    fn depth(&self, contact_index: usize) -> f32 {
        panic!("Empty manifold has no contact {contact_index}.")
    }

    fn normal(&self, contact_index: usize) -> Vec3 {
        panic!("Empty manifold has no contact {contact_index}.")
    }

    fn offset(&self, contact_index: usize) -> Vec3 {
        panic!("Empty manifold has no contact {contact_index}.")
    }
}

/// Owned copy of a manifold, taken on a narrow phase worker and processed later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManifoldSnapshot {
    Convex(ConvexContactManifold),
    Nonconvex(NonconvexContactManifold),
}

impl ManifoldSnapshot {
    /// Copies the manifold's contacts. Contacts beyond [`MAXIMUM_CONTACT_COUNT`] are dropped.
    pub fn capture<M: ContactManifold + ?Sized>(manifold: &M) -> Self {
        let count = manifold.count();
        if count > MAXIMUM_CONTACT_COUNT {
            warn!(
                count,
                capacity = MAXIMUM_CONTACT_COUNT,
                "manifold exceeds contact capacity, truncating"
            );
        }
        let count = count.min(MAXIMUM_CONTACT_COUNT);
        if manifold.convex() {
            let normal = if count > 0 { manifold.normal(0) } else { Vec3::ZERO };
            let mut snapshot = ConvexContactManifold::new(manifold.offset_b(), normal);
            for i in 0..count {
                snapshot.add(ConvexContact {
                    offset: manifold.offset(i),
                    depth: manifold.depth(i),
                    feature_id: manifold.feature_id(i),
                });
            }
            ManifoldSnapshot::Convex(snapshot)
        } else {
            let mut snapshot = NonconvexContactManifold::new(manifold.offset_b());
            for i in 0..count {
                snapshot.add(manifold.contact(i));
            }
            ManifoldSnapshot::Nonconvex(snapshot)
        }
    }

    fn inner(&self) -> &dyn ContactManifold {
        match self {
            ManifoldSnapshot::Convex(manifold) => manifold,
            ManifoldSnapshot::Nonconvex(manifold) => manifold,
        }
    }
}

impl ContactManifold for ManifoldSnapshot {
    fn count(&self) -> usize {
        self.inner().count()
    }

    fn convex(&self) -> bool {
        self.inner().convex()
    }

    fn offset_b(&self) -> Vec3 {
        self.inner().offset_b()
    }

    fn feature_id(&self, contact_index: usize) -> i32 {
        self.inner().feature_id(contact_index)
    }

    fn depth(&self, contact_index: usize) -> f32 {
        self.inner().depth(contact_index)
    }

    fn normal(&self, contact_index: usize) -> Vec3 {
        self.inner().normal(contact_index)
    }

    fn offset(&self, contact_index: usize) -> Vec3 {
        self.inner().offset(contact_index)
    }
}

impl From<ConvexContactManifold> for ManifoldSnapshot {
    fn from(manifold: ConvexContactManifold) -> Self {
        ManifoldSnapshot::Convex(manifold)
    }
}

impl From<NonconvexContactManifold> for ManifoldSnapshot {
    fn from(manifold: NonconvexContactManifold) -> Self {
        ManifoldSnapshot::Nonconvex(manifold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(feature_id: i32, depth: f32) -> Contact {
        Contact {
            offset: Vec3::new(feature_id as f32, 0.0, 0.0),
            depth,
            normal: Vec3::Y,
            feature_id,
        }
    }

    #[test]
    fn test_nonconvex_capacity() {
        let mut manifold = NonconvexContactManifold::new(Vec3::X);
        for i in 0..4 {
            assert!(manifold.add(contact(i, 0.1)));
        }
        assert!(!manifold.add(contact(9, 0.1)));
        assert_eq!(manifold.count(), 4);

        let ids: Vec<i32> = manifold.contacts().iter().map(|c| c.feature_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_convex_shares_normal() {
        let mut manifold = ConvexContactManifold::new(Vec3::ZERO, Vec3::Z);
        manifold.add(ConvexContact { offset: Vec3::X, depth: -0.5, feature_id: 7 });
        manifold.add(ConvexContact { offset: Vec3::Y, depth: 0.25, feature_id: 8 });
        assert_eq!(manifold.normal(1), Vec3::Z);
        assert!(manifold.is_touching());
        assert_eq!(manifold.contact(0).feature_id, 7);
    }

    #[test]
    fn test_touching_requires_nonnegative_depth() {
        let mut manifold = NonconvexContactManifold::default();
        manifold.add(contact(1, -0.01));
        assert!(!manifold.is_touching());
        manifold.add(contact(2, 0.0));
        assert!(manifold.is_touching());
        assert!(!EmptyManifold.is_touching());
    }

    /// Manifold backed by a slice, free to report more contacts than a manifold can hold.
    struct Unbounded<'a>(&'a [Contact]);

    impl ContactManifold for Unbounded<'_> {
        fn count(&self) -> usize {
            self.0.len()
        }

        fn convex(&self) -> bool {
            false
        }

        fn offset_b(&self) -> Vec3 {
            Vec3::ZERO
        }

        fn feature_id(&self, contact_index: usize) -> i32 {
            self.0[contact_index].feature_id
        }

        fn depth(&self, contact_index: usize) -> f32 {
            self.0[contact_index].depth
        }

        fn normal(&self, contact_index: usize) -> Vec3 {
            self.0[contact_index].normal
        }

        fn offset(&self, contact_index: usize) -> Vec3 {
            self.0[contact_index].offset
        }
    }

    #[test]
    fn test_touching_ignores_contacts_past_capacity() {
        let mut contacts: Vec<Contact> = (0..4).map(|i| contact(i, -0.1)).collect();
        contacts.push(contact(4, 0.1));
        let manifold = Unbounded(&contacts);
        assert!(!manifold.is_touching());
        assert!(!ManifoldSnapshot::capture(&manifold).is_touching());

        contacts[3].depth = 0.0;
        assert!(Unbounded(&contacts).is_touching());
    }

    #[test]
    fn test_snapshot_preserves_contacts() {
        let mut manifold = NonconvexContactManifold::new(Vec3::new(0.0, 2.0, 0.0));
        manifold.add(contact(4, 0.3));
        manifold.add(contact(5, -0.2));
        let snapshot = ManifoldSnapshot::capture(&manifold);
        assert!(!snapshot.convex());
        assert_eq!(snapshot.count(), 2);
        assert_eq!(snapshot.contact(1), manifold.contact(1));
        assert_eq!(snapshot.offset_b(), Vec3::new(0.0, 2.0, 0.0));

        let convex = ManifoldSnapshot::capture(&ConvexContactManifold::new(Vec3::ZERO, Vec3::X));
        assert!(convex.convex());
        assert_eq!(convex.count(), 0);
    }
}
