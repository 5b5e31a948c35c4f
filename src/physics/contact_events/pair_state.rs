use super::contacts::SharedContactHandler;
use super::feature_id_set::FeatureIdSet;
use super::ordered_pair_key::{OrderedPairKey, PairSide};
use crate::physics::collidables::collidable_reference::CollidableReference;
use bitflags::bitflags;
use rustc_hash::FxHashMap;

bitflags! {
    /// One-shot and state bits of a tracked pair.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PairEventFlags: u8 {
        const CREATED_A = 0b0001;
        const CREATED_B = 0b0010;
        const TOUCHING_A = 0b0100;
        const TOUCHING_B = 0b1000;
    }
}

impl PairEventFlags {
    #[inline(always)]
    pub fn created(side: PairSide) -> Self {
        match side {
            PairSide::A => Self::CREATED_A,
            PairSide::B => Self::CREATED_B,
        }
    }

    #[inline(always)]
    pub fn touching(side: PairSide) -> Self {
        match side {
            PairSide::A => Self::TOUCHING_A,
            PairSide::B => Self::TOUCHING_B,
        }
    }

    /// Sets the flag. Returns false if it was already set.
    #[inline(always)]
    pub fn try_set(&mut self, flag: Self) -> bool {
        if self.contains(flag) {
            return false;
        }
        self.insert(flag);
        true
    }

    /// Clears the flag. Returns false if it was not set.
    #[inline(always)]
    pub fn try_clear(&mut self, flag: Self) -> bool {
        if !self.contains(flag) {
            return false;
        }
        self.remove(flag);
        true
    }
}

/// Lifecycle record of one tracked pair. Sides follow the pair's [`OrderedPairKey`].
#[derive(Clone, Default)]
pub struct PairState {
    /// False once the pair has been torn down. A dead state must not be read or written.
    pub alive: bool,
    pub events_triggered: PairEventFlags,
    pub listening_a: bool,
    pub listening_b: bool,
    pub handler_a: Option<SharedContactHandler>,
    pub handler_b: Option<SharedContactHandler>,
    pub feature_ids_a: FeatureIdSet,
    pub feature_ids_b: FeatureIdSet,
}

impl PairState {
    pub fn new(
        listening_a: bool,
        handler_a: Option<SharedContactHandler>,
        listening_b: bool,
        handler_b: Option<SharedContactHandler>,
    ) -> Self {
        debug_assert!(
            listening_a || listening_b,
            "A pair is only tracked when at least one side listens."
        );
        Self {
            alive: true,
            events_triggered: PairEventFlags::empty(),
            listening_a,
            listening_b,
            handler_a,
            handler_b,
            feature_ids_a: FeatureIdSet::new(),
            feature_ids_b: FeatureIdSet::new(),
        }
    }

    #[inline(always)]
    pub fn listens(&self, side: PairSide) -> bool {
        match side {
            PairSide::A => self.listening_a,
            PairSide::B => self.listening_b,
        }
    }

    #[inline(always)]
    pub fn handler(&self, side: PairSide) -> Option<&SharedContactHandler> {
        match side {
            PairSide::A => self.handler_a.as_ref(),
            PairSide::B => self.handler_b.as_ref(),
        }
    }

    #[inline(always)]
    pub fn feature_ids(&self, side: PairSide) -> &FeatureIdSet {
        match side {
            PairSide::A => &self.feature_ids_a,
            PairSide::B => &self.feature_ids_b,
        }
    }

    #[inline(always)]
    pub fn feature_ids_mut(&mut self, side: PairSide) -> &mut FeatureIdSet {
        match side {
            PairSide::A => &mut self.feature_ids_a,
            PairSide::B => &mut self.feature_ids_b,
        }
    }

    #[inline(always)]
    pub fn is_touching(&self, side: PairSide) -> bool {
        self.events_triggered.contains(PairEventFlags::touching(side))
    }
}

/// Generation-checked reference to a slot of a [`PairTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairHandle {
    index: u32,
    generation: u32,
}

struct PairSlot {
    generation: u32,
    state: PairState,
}

/// Arena of tracked pairs indexed by their [`OrderedPairKey`].
///
/// Removing a pair kills its slot and bumps the slot generation, so handles taken before the
/// removal stop resolving even after the slot is reused.
#[derive(Default)]
pub struct PairTable {
    index: FxHashMap<OrderedPairKey, u32>,
    slots: Vec<PairSlot>,
    free_slots: Vec<u32>,
}

impl PairTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            slots: Vec::with_capacity(capacity),
            free_slots: Vec::new(),
        }
    }

    /// Number of live pairs.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Finds the pair's slot, creating it with `create` when missing.
    /// Returns the handle and whether the pair already existed.
    pub fn get_or_insert_with(
        &mut self,
        key: OrderedPairKey,
        create: impl FnOnce() -> PairState,
    ) -> (PairHandle, bool) {
        if let Some(&index) = self.index.get(&key) {
            let slot = &self.slots[index as usize];
            return (
                PairHandle {
                    index,
                    generation: slot.generation,
                },
                true,
            );
        }
        let state = create();
        let index = match self.free_slots.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.state = state;
                index
            }
            None => {
                self.slots.push(PairSlot {
                    generation: 0,
                    state,
                });
                (self.slots.len() - 1) as u32
            }
        };
        self.index.insert(key, index);
        (
            PairHandle {
                index,
                generation: self.slots[index as usize].generation,
            },
            false,
        )
    }

    pub fn find(&self, key: &OrderedPairKey) -> Option<PairHandle> {
        self.index.get(key).map(|&index| PairHandle {
            index,
            generation: self.slots[index as usize].generation,
        })
    }

    fn live_slot(&self, handle: PairHandle) -> Option<&PairSlot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.state.alive)
    }

    #[inline(always)]
    pub fn is_alive(&self, handle: PairHandle) -> bool {
        self.live_slot(handle).is_some()
    }

    pub fn get(&self, handle: PairHandle) -> Option<&PairState> {
        self.live_slot(handle).map(|slot| &slot.state)
    }

    pub fn get_mut(&mut self, handle: PairHandle) -> Option<&mut PairState> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.state.alive)
            .map(|slot| &mut slot.state)
    }

    /// Kills the pair's slot and hands back its last state, with `alive` cleared.
    pub fn remove(&mut self, key: &OrderedPairKey) -> Option<PairState> {
        let index = self.index.remove(key)?;
        let slot = &mut self.slots[index as usize];
        let mut state = std::mem::take(&mut slot.state);
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(index);
        state.alive = false;
        Some(state)
    }

    /// Keys of every live pair, ascending.
    pub fn sorted_keys(&self) -> Vec<OrderedPairKey> {
        let mut keys: Vec<OrderedPairKey> = self.index.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Keys of every live pair involving the collidable, ascending.
    pub fn sorted_keys_involving(&self, collidable: CollidableReference) -> Vec<OrderedPairKey> {
        let mut keys: Vec<OrderedPairKey> = self
            .index
            .keys()
            .filter(|key| key.contains(collidable))
            .copied()
            .collect();
        keys.sort_unstable();
        keys
    }
}
