//! Contact lifecycle events for registered collidables.
//!
//! The narrow phase reports one manifold per overlapping pair per step, in no particular order
//! and from many workers. [`ContactEvents`] turns those reports into per-pair events: created,
//! started touching, touching, stopped touching, contact added/removed, updated and ended.
//!
//! A step looks like this:
//! 1. [`ContactEvents::before_collision_detection`] marks every tracked pair with an awake body
//!    as expecting an update.
//! 2. The narrow phase runs with [`ContactEventCallbacks`], which records manifolds per worker.
//! 3. [`ContactEvents::flush`] processes the recorded manifolds in pair order, then ends every
//!    pair that expected an update and did not get one.
//!
//! Handlers may call back into the tracker from any event. If a callback ends the pair it is
//! running for, the rest of that pair's update is skipped.

pub mod callbacks;
pub mod config;
pub mod contacts;
pub mod error;
pub mod feature_id_set;
pub mod listener_registry;
pub mod ordered_pair_key;
pub mod pair_state;
pub mod stale_pair_tracker;
pub mod worker_manifolds;

pub use self::callbacks::ContactEventCallbacks;
pub use self::config::ContactEventsConfig;
pub use self::contacts::{ContactData, ContactEventHandler, Contacts, SharedContactHandler};
pub use self::error::{ContactEventError, ContactEventResult};
pub use self::feature_id_set::{FeatureIdDiff, FeatureIdSet, FEATURE_ID_CAPACITY};
pub use self::listener_registry::ListenerRegistry;
pub use self::ordered_pair_key::{OrderedPairKey, PairSide};
pub use self::pair_state::{PairEventFlags, PairHandle, PairState, PairTable};
pub use self::stale_pair_tracker::StalePairTracker;
pub use self::worker_manifolds::{PendingManifold, WorkerManifolds};

use crate::physics::collidable_source::CollidableSource;
use crate::physics::collidables::collidable_reference::CollidableReference;
use crate::physics::collision_detection::contact_manifold::{
    ContactManifold, EmptyManifold, ManifoldSnapshot,
};
use std::ops::ControlFlow;
use tracing::{debug, trace};

/// A callback ended the pair whose update was being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PairTornDown;

type Dispatch = ControlFlow<PairTornDown>;

/// One manifold update, seen from the pair's key order.
struct PairUpdate<'m> {
    /// Key sides A and B, with the mobility the narrow phase reported.
    sides: [CollidableReference; 2],
    /// Whether key side A is collidable B of the manifold.
    manifold_flipped: bool,
    manifold: &'m dyn ContactManifold,
}

impl PairUpdate<'_> {
    #[inline(always)]
    fn source(&self, side: PairSide) -> CollidableReference {
        match side {
            PairSide::A => self.sides[0],
            PairSide::B => self.sides[1],
        }
    }

    #[inline(always)]
    fn flipped(&self, side: PairSide) -> bool {
        match side {
            PairSide::A => self.manifold_flipped,
            PairSide::B => !self.manifold_flipped,
        }
    }
}

/// Tracks contact pairs involving registered collidables and raises their lifecycle events.
pub struct ContactEvents {
    config: ContactEventsConfig,
    listeners: ListenerRegistry,
    pairs: PairTable,
    stale: StalePairTracker,
    manifolds: WorkerManifolds,
}

impl Default for ContactEvents {
    fn default() -> Self {
        Self::new(ContactEventsConfig::default())
    }
}

impl ContactEvents {
    pub fn new(config: ContactEventsConfig) -> Self {
        Self {
            listeners: ListenerRegistry::with_capacity(config.initial_listener_capacity),
            pairs: PairTable::with_capacity(config.initial_pair_capacity),
            stale: StalePairTracker::new(),
            manifolds: WorkerManifolds::new(config.worker_count),
            config,
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &ContactEventsConfig {
        &self.config
    }

    /// Starts listening for contacts on the collidable.
    ///
    /// A listener without a handler is still tracked, so its touching state and feature ids can be
    /// queried. If the collidable is already part of tracked pairs, its side of each pair joins from
    /// the next event raised for that side. Registering from inside a handler can therefore deliver
    /// events within the update being dispatched.
    ///
    /// # Panics
    /// Panics if the collidable is already registered.
    pub fn register(&mut self, collidable: CollidableReference, handler: Option<SharedContactHandler>) {
        if let Err(err) = self.try_register(collidable, handler) {
            panic!("{err}");
        }
    }

    pub fn try_register(
        &mut self,
        collidable: CollidableReference,
        handler: Option<SharedContactHandler>,
    ) -> ContactEventResult<()> {
        self.listeners.register(collidable, handler.clone())?;
        for key in self.pairs.sorted_keys_involving(collidable) {
            let Some(side) = key.side_of(collidable) else {
                continue;
            };
            let Some(handle) = self.pairs.find(&key) else {
                continue;
            };
            if let Some(state) = self.pairs.get_mut(handle) {
                match side {
                    PairSide::A => {
                        state.listening_a = true;
                        state.handler_a = handler.clone();
                    }
                    PairSide::B => {
                        state.listening_b = true;
                        state.handler_b = handler.clone();
                    }
                }
            }
        }
        Ok(())
    }

    /// Stops listening for contacts on the collidable and ends every tracked pair involving it.
    ///
    /// Both sides of each ended pair are notified before this returns, the departing collidable
    /// included.
    ///
    /// # Panics
    /// Panics if the collidable is not registered.
    pub fn unregister(&mut self, collidable: CollidableReference) {
        if let Err(err) = self.try_unregister(collidable) {
            panic!("{err}");
        }
    }

    pub fn try_unregister(&mut self, collidable: CollidableReference) -> ContactEventResult<()> {
        self.listeners.unregister(collidable)?;
        self.clear_collisions_of(collidable);
        Ok(())
    }

    #[inline(always)]
    pub fn is_registered(&self, collidable: CollidableReference) -> bool {
        self.listeners.is_registered(collidable)
    }

    /// Ends every tracked pair involving the collidable, in ascending key order.
    pub fn clear_collisions_of(&mut self, collidable: CollidableReference) {
        for key in self.pairs.sorted_keys_involving(collidable) {
            self.tear_down(key, Some(collidable));
        }
    }

    /// Ends every tracked pair and drops any manifolds still waiting for a flush.
    pub fn clear_all(&mut self) {
        self.manifolds.drain();
        for key in self.pairs.sorted_keys() {
            self.tear_down(key, None);
        }
        self.stale.clear();
    }

    /// Marks every tracked pair with an awake body as expecting an update this step.
    /// Returns the number of pairs marked.
    ///
    /// A stale reference error means a collidable was removed from the simulation while still
    /// registered or tracked; the step must not continue.
    pub fn before_collision_detection(
        &mut self,
        source: &dyn CollidableSource,
    ) -> ContactEventResult<usize> {
        let marked = self.stale.mark_active_pairs(&self.pairs, source)?;
        trace!(marked, tracked = self.pairs.len(), "marked pairs expecting updates");
        Ok(marked)
    }

    /// Records a manifold from a narrow phase worker for processing on the next [`flush`](Self::flush).
    /// Manifolds between two collidables that are not registered are ignored.
    pub fn record_manifold<M: ContactManifold + ?Sized>(
        &self,
        worker_index: usize,
        a: CollidableReference,
        b: CollidableReference,
        manifold: &M,
    ) {
        if !self.is_registered(a) && !self.is_registered(b) {
            return;
        }
        self.manifolds.push(PendingManifold {
            worker_index,
            a,
            b,
            manifold: ManifoldSnapshot::capture(manifold),
        });
    }

    /// Whether a registered side of the pair asks for no constraint to be created.
    pub fn suppresses_contact_response(&self, a: CollidableReference, b: CollidableReference) -> bool {
        [a, b].into_iter().any(|collidable| {
            self.listeners
                .handler(collidable)
                .is_some_and(|handler| handler.no_contact_response())
        })
    }

    /// Processes recorded manifolds in pair order, then ends every pair that expected an update
    /// but received none. Call once per step, after collision detection.
    pub fn flush(&mut self) {
        let pending = self.manifolds.drain();
        for update in &pending {
            self.handle_manifold(update.worker_index, update.a, update.b, &update.manifold);
        }
        let outdated = self.stale.take_outdated();
        if !outdated.is_empty() {
            debug!(count = outdated.len(), "ending pairs that received no update");
        }
        for key in outdated {
            self.tear_down(key, None);
        }
    }

    /// Processes one manifold between `a` and `b` immediately.
    ///
    /// `a` and `b` follow the manifold's orientation: normals point from `b` to `a` and offsets
    /// are measured from `a`.
    pub fn handle_manifold<M: ContactManifold>(
        &mut self,
        worker_index: usize,
        a: CollidableReference,
        b: CollidableReference,
        manifold: &M,
    ) {
        if !self.is_registered(a) && !self.is_registered(b) {
            return;
        }
        let key = OrderedPairKey::new(a, b);
        let manifold_flipped = !key.a().same_collidable(a);
        let listeners = &self.listeners;
        let (handle, already_existed) = self.pairs.get_or_insert_with(key, || {
            PairState::new(
                listeners.is_registered(key.a()),
                listeners.handler(key.a()).cloned(),
                listeners.is_registered(key.b()),
                listeners.handler(key.b()).cloned(),
            )
        });
        if !already_existed {
            trace!(pair = %key, worker_index, "tracking new pair");
        }
        let update = PairUpdate {
            sides: if manifold_flipped { [b, a] } else { [a, b] },
            manifold_flipped,
            manifold,
        };
        if self.update_pair(handle, &update).is_continue() {
            self.stale.refresh(&key);
        }
    }

    fn update_pair(&mut self, handle: PairHandle, update: &PairUpdate<'_>) -> Dispatch {
        for side in PairSide::BOTH {
            if self.transition(handle, side, PairEventFlags::created(side), true) {
                self.fire(handle, side, update, |handler, contacts| {
                    handler.on_pair_created(contacts)
                })?;
            }
        }
        let touching = update.manifold.is_touching();
        for side in PairSide::BOTH {
            self.update_touching(handle, side, touching, update)?;
        }
        for side in PairSide::BOTH {
            self.update_feature_ids(handle, side, update)?;
        }
        for side in PairSide::BOTH {
            self.fire(handle, side, update, |handler, contacts| {
                handler.on_pair_updated(contacts)
            })?;
        }
        ControlFlow::Continue(())
    }

    fn update_touching(
        &mut self,
        handle: PairHandle,
        side: PairSide,
        touching: bool,
        update: &PairUpdate<'_>,
    ) -> Dispatch {
        let flag = PairEventFlags::touching(side);
        if touching {
            if self.transition(handle, side, flag, true) {
                trace!(source = %update.source(side), "started touching");
                self.fire(handle, side, update, |handler, contacts| {
                    handler.on_started_touching(contacts)
                })?;
            }
            self.fire(handle, side, update, |handler, contacts| {
                handler.on_touching(contacts)
            })?;
        } else if self.transition(handle, side, flag, false) {
            trace!(source = %update.source(side), "stopped touching");
            self.fire(handle, side, update, |handler, contacts| {
                handler.on_stopped_touching(contacts)
            })?;
        }
        ControlFlow::Continue(())
    }

    fn update_feature_ids(
        &mut self,
        handle: PairHandle,
        side: PairSide,
        update: &PairUpdate<'_>,
    ) -> Dispatch {
        let Some(state) = self.pairs.get(handle) else {
            return ControlFlow::Break(PairTornDown);
        };
        if !state.listens(side) {
            return ControlFlow::Continue(());
        }
        let tracked = state.feature_ids(side);
        let diff = tracked.diff(update.manifold);
        if diff.is_empty() {
            return ControlFlow::Continue(());
        }
        let removals = tracked.removed_by(&diff);
        // Callbacks may reenter with another update for this pair, so each change is resolved
        // against the set as it is when the change is applied.
        for removed in removals.iter() {
            let Some(state) = self.pairs.get_mut(handle) else {
                return ControlFlow::Break(PairTornDown);
            };
            let ids = state.feature_ids_mut(side);
            let Some(slot) = ids.position(removed) else {
                continue;
            };
            ids.swap_remove(slot);
            self.fire(handle, side, update, |handler, contacts| {
                handler.on_contact_removed(contacts, removed)
            })?;
        }
        let count = update.manifold.count().min(FEATURE_ID_CAPACITY);
        for contact_index in 0..count {
            if !diff.adds(contact_index) {
                continue;
            }
            let Some(state) = self.pairs.get_mut(handle) else {
                return ControlFlow::Break(PairTornDown);
            };
            // Duplicate ids within one manifold only count once.
            // An id already tracked or a full set means a nested update got there first.
            if !state
                .feature_ids_mut(side)
                .insert(update.manifold.feature_id(contact_index))
            {
                continue;
            }
            self.fire(handle, side, update, |handler, contacts| {
                handler.on_contact_added(contacts, contact_index)
            })?;
        }
        ControlFlow::Continue(())
    }

    /// Sets or clears a flag on a listening side. Returns whether the flag changed.
    fn transition(&mut self, handle: PairHandle, side: PairSide, flag: PairEventFlags, set: bool) -> bool {
        self.pairs.get_mut(handle).is_some_and(|state| {
            state.listens(side)
                && if set {
                    state.events_triggered.try_set(flag)
                } else {
                    state.events_triggered.try_clear(flag)
                }
        })
    }

    /// Invokes the side's handler, then reports whether the pair survived the callback.
    fn fire(
        &mut self,
        handle: PairHandle,
        side: PairSide,
        update: &PairUpdate<'_>,
        invoke: impl FnOnce(&dyn ContactEventHandler, &mut Contacts<'_>),
    ) -> Dispatch {
        let handler = match self.pairs.get(handle) {
            Some(state) if state.listens(side) => state.handler(side).cloned(),
            Some(_) => None,
            None => return ControlFlow::Break(PairTornDown),
        };
        if let Some(handler) = handler {
            let mut contacts = Contacts::new(
                update.source(side),
                update.source(side.opposite()),
                update.flipped(side),
                update.manifold,
                self,
            );
            invoke(&*handler, &mut contacts);
        }
        if self.pairs.is_alive(handle) {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(PairTornDown)
        }
    }

    /// Removes the pair and notifies its listening sides against an empty manifold.
    ///
    /// `departing` is the collidable being unregistered, if any. Its handler still receives the
    /// teardown events even though it is no longer registered.
    fn tear_down(&mut self, key: OrderedPairKey, departing: Option<CollidableReference>) {
        let Some(state) = self.pairs.remove(&key) else {
            return;
        };
        self.stale.forget(&key);
        debug!(pair = %key, departing = ?departing, "ending tracked pair");

        let update = PairUpdate {
            sides: [key.a(), key.b()],
            manifold_flipped: false,
            manifold: &EmptyManifold,
        };
        for side in PairSide::BOTH {
            if state.is_touching(side) {
                self.notify_ended(&state, side, departing, &update, |handler, contacts| {
                    handler.on_stopped_touching(contacts)
                });
            }
        }
        for side in PairSide::BOTH {
            for removed in state.feature_ids(side).iter().rev() {
                self.notify_ended(&state, side, departing, &update, |handler, contacts| {
                    handler.on_contact_removed(contacts, removed)
                });
            }
        }
        for side in PairSide::BOTH {
            self.notify_ended(&state, side, departing, &update, |handler, contacts| {
                handler.on_pair_ended(contacts)
            });
        }
    }

    fn notify_ended(
        &mut self,
        state: &PairState,
        side: PairSide,
        departing: Option<CollidableReference>,
        update: &PairUpdate<'_>,
        invoke: impl FnOnce(&dyn ContactEventHandler, &mut Contacts<'_>),
    ) {
        if !state.listens(side) {
            return;
        }
        let Some(handler) = state.handler(side) else {
            return;
        };
        let source = update.source(side);
        // A side unregistered by an earlier teardown callback gets nothing further.
        let still_listening = departing.is_some_and(|departing| departing.same_collidable(source))
            || self.listeners.is_registered(source);
        if !still_listening {
            return;
        }
        let mut contacts = Contacts::new(
            source,
            update.source(side.opposite()),
            update.flipped(side),
            update.manifold,
            self,
        );
        invoke(&**handler, &mut contacts);
    }

    /// Number of pairs currently tracked.
    pub fn tracked_pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_tracked(&self, a: CollidableReference, b: CollidableReference) -> bool {
        self.pairs.find(&OrderedPairKey::new(a, b)).is_some()
    }

    fn pair_side(
        &self,
        source: CollidableReference,
        other: CollidableReference,
    ) -> Option<(&PairState, PairSide)> {
        let key = OrderedPairKey::new(source, other);
        let side = key.side_of(source)?;
        let state = self.pairs.get(self.pairs.find(&key)?)?;
        Some((state, side))
    }

    /// Feature ids currently tracked for `source` in its pair with `other`.
    pub fn tracked_feature_ids(
        &self,
        source: CollidableReference,
        other: CollidableReference,
    ) -> Option<FeatureIdSet> {
        self.pair_side(source, other)
            .map(|(state, side)| *state.feature_ids(side))
    }

    /// Whether `source` is currently touching `other`, as seen by `source`'s side of the pair.
    pub fn is_touching(&self, source: CollidableReference, other: CollidableReference) -> bool {
        self.pair_side(source, other)
            .is_some_and(|(state, side)| state.is_touching(side))
    }

    /// Number of pairs still expecting an update this step.
    pub fn outdated_pair_count(&self) -> usize {
        self.stale.len()
    }

    /// Number of manifolds recorded by workers and not yet flushed.
    pub fn pending_manifold_count(&self) -> usize {
        self.manifolds.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
