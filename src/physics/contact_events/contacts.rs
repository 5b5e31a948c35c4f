use super::error::ContactEventResult;
use super::ContactEvents;
use crate::physics::collidable_source::CollidableSource;
use crate::physics::collidables::collidable_reference::CollidableReference;
use crate::physics::collision_detection::contact_manifold::ContactManifold;
use glam::Vec3;
use std::sync::Arc;

/// Handler shared between the listener registry and every pair that involves its collidable.
pub type SharedContactHandler = Arc<dyn ContactEventHandler>;

/// Receives contact lifecycle events for a registered collidable.
///
/// Every method defaults to a no-op. Callbacks run on the thread that flushes the tracker and may
/// reenter it through [`Contacts::events`], for example to unregister a collidable.
#[allow(unused_variables)]
pub trait ContactEventHandler: Send + Sync {
    /// Whether pairs involving this handler's collidable should skip constraint creation.
    fn no_contact_response(&self) -> bool {
        false
    }

    /// First manifold between the two collidables.
    fn on_pair_created(&self, contacts: &mut Contacts<'_>) {}

    /// The pair went from no touching contact to at least one.
    fn on_started_touching(&self, contacts: &mut Contacts<'_>) {}

    /// Every update in which at least one contact has nonnegative depth.
    fn on_touching(&self, contacts: &mut Contacts<'_>) {}

    /// The pair went from touching to no touching contact.
    fn on_stopped_touching(&self, contacts: &mut Contacts<'_>) {}

    /// A contact with a feature id not seen in the previous update appeared.
    fn on_contact_added(&self, contacts: &mut Contacts<'_>, contact_index: usize) {}

    /// A previously tracked feature id is no longer part of the manifold.
    fn on_contact_removed(&self, contacts: &mut Contacts<'_>, removed_feature_id: i32) {}

    /// End of every update the pair received.
    fn on_pair_updated(&self, contacts: &mut Contacts<'_>) {}

    /// The pair stopped being tracked.
    fn on_pair_ended(&self, contacts: &mut Contacts<'_>) {}
}

/// A contact expressed relative to the collidable that raised the event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactData {
    /// Offset from the event source's position to the contact.
    pub offset: Vec3,
    /// Contact normal, pointing toward the event source.
    pub normal: Vec3,
    pub depth: f32,
    pub feature_id: i32,
}

/// View of a pair's manifold handed to a [`ContactEventHandler`].
pub struct Contacts<'a> {
    event_source: CollidableReference,
    other: CollidableReference,
    flipped: bool,
    manifold: &'a dyn ContactManifold,
    events: &'a mut ContactEvents,
}

impl<'a> Contacts<'a> {
    pub(crate) fn new(
        event_source: CollidableReference,
        other: CollidableReference,
        flipped: bool,
        manifold: &'a dyn ContactManifold,
        events: &'a mut ContactEvents,
    ) -> Self {
        Self {
            event_source,
            other,
            flipped,
            manifold,
            events,
        }
    }

    /// The collidable whose handler receives the event.
    #[inline(always)]
    pub fn event_source(&self) -> CollidableReference {
        self.event_source
    }

    #[inline(always)]
    pub fn other(&self) -> CollidableReference {
        self.other
    }

    /// Whether the event source is collidable B of the underlying manifold.
    #[inline(always)]
    pub fn flipped(&self) -> bool {
        self.flipped
    }

    /// The manifold in narrow phase orientation.
    #[inline(always)]
    pub fn manifold(&self) -> &dyn ContactManifold {
        self.manifold
    }

    #[inline(always)]
    pub fn count(&self) -> usize {
        self.manifold.count()
    }

    pub fn is_touching(&self) -> bool {
        self.manifold.is_touching()
    }

    pub fn contact(&self, contact_index: usize) -> ContactData {
        let contact = self.manifold.contact(contact_index);
        if self.flipped {
            ContactData {
                offset: contact.offset - self.manifold.offset_b(),
                normal: -contact.normal,
                depth: contact.depth,
                feature_id: contact.feature_id,
            }
        } else {
            ContactData {
                offset: contact.offset,
                normal: contact.normal,
                depth: contact.depth,
                feature_id: contact.feature_id,
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ContactData> + '_ {
        (0..self.count()).map(move |i| self.contact(i))
    }

    /// World space location of a contact, using the event source's current pose.
    pub fn world_point(
        &self,
        source: &dyn CollidableSource,
        contact_index: usize,
    ) -> ContactEventResult<Vec3> {
        let activity = source.activity(self.event_source)?;
        Ok(activity.pose.position + self.contact(contact_index).offset)
    }

    /// The tracker that raised the event.
    #[inline(always)]
    pub fn events(&mut self) -> &mut ContactEvents {
        self.events
    }
}
