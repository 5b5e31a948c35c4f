use crate::physics::collidables::collidable_reference::CollidableReference;
use crate::physics::collision_detection::contact_manifold::ManifoldSnapshot;
use crate::physics::contact_events::ordered_pair_key::OrderedPairKey;
use crossbeam_utils::CachePadded;
use std::sync::{Mutex, PoisonError};

/// Manifold recorded by a narrow phase worker, waiting for the flush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingManifold {
    pub worker_index: usize,
    /// Collidable A of the manifold, as reported by the narrow phase.
    pub a: CollidableReference,
    /// Collidable B of the manifold, as reported by the narrow phase.
    pub b: CollidableReference,
    pub manifold: ManifoldSnapshot,
}

impl PendingManifold {
    #[inline(always)]
    pub fn key(&self) -> OrderedPairKey {
        OrderedPairKey::new(self.a, self.b)
    }
}

/// Per-worker accumulation of manifolds.
///
/// Each worker owns one slot, so the locks are only contended if two threads claim the same
/// worker index. Slots are padded to keep workers off each other's cache lines.
pub struct WorkerManifolds {
    workers: Vec<CachePadded<Mutex<Vec<PendingManifold>>>>,
}

impl WorkerManifolds {
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        Self {
            workers: (0..worker_count)
                .map(|_| CachePadded::new(Mutex::new(Vec::new())))
                .collect(),
        }
    }

    /// Records a manifold from the given worker. The worker index must be below the configured
    /// worker count.
    pub fn push(&self, pending: PendingManifold) {
        debug_assert!(
            pending.worker_index < self.workers.len(),
            "Worker index {} is outside the {} configured workers.",
            pending.worker_index,
            self.workers.len()
        );
        self.workers[pending.worker_index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(pending);
    }

    /// Number of manifolds waiting across all workers.
    pub fn len(&self) -> usize {
        self.workers
            .iter()
            .map(|worker| worker.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes every recorded manifold, ordered by pair key. Updates of the same pair keep their
    /// worker order.
    pub fn drain(&mut self) -> Vec<PendingManifold> {
        let mut drained = Vec::new();
        for worker in self.workers.iter_mut() {
            drained.append(worker.get_mut().unwrap_or_else(PoisonError::into_inner));
        }
        drained.sort_by_key(PendingManifold::key);
        drained
    }
}
