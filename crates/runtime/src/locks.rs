//! Per-resource lock table with admission order.
//!
//! A mutating request is admitted when it is dispatched and may only take
//! the lock once every request admitted before it for the same resource has
//! released it. Requests for different resources never wait on each other.

use std::collections::{HashMap, VecDeque};

use geocat_core::{ExecutionId, ResourceKey};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Slot {
    holder: Option<ExecutionId>,
    waiting: VecDeque<ExecutionId>,
}

impl Slot {
    fn is_idle(&self) -> bool {
        self.holder.is_none() && self.waiting.is_empty()
    }
}

/// The lock table.
#[derive(Debug, Default)]
pub struct ResourceLocks {
    slots: Mutex<HashMap<ResourceKey, Slot>>,
}

impl ResourceLocks {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `id` behind everything already admitted for `key`.
    pub fn admit(&self, key: &ResourceKey, id: ExecutionId) {
        let mut slots = self.slots.lock();
        let slot = slots.entry(key.clone()).or_default();
        if slot.holder != Some(id) && !slot.waiting.contains(&id) {
            slot.waiting.push_back(id);
        }
    }

    /// Take the lock if it is free and `id` is next in line. A request that
    /// was never admitted joins the back of the line first. Holding the lock
    /// already counts as success.
    pub fn try_acquire(&self, key: &ResourceKey, id: ExecutionId) -> bool {
        let mut slots = self.slots.lock();
        let slot = slots.entry(key.clone()).or_default();
        if slot.holder == Some(id) {
            return true;
        }
        if !slot.waiting.contains(&id) {
            slot.waiting.push_back(id);
        }
        if slot.holder.is_none() && slot.waiting.front() == Some(&id) {
            slot.waiting.pop_front();
            slot.holder = Some(id);
            return true;
        }
        false
    }

    /// Release the lock if `id` holds it. Returns whether it did.
    pub fn release(&self, key: &ResourceKey, id: ExecutionId) -> bool {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(key) else {
            return false;
        };
        let released = slot.holder == Some(id);
        if released {
            slot.holder = None;
        }
        if slot.is_idle() {
            slots.remove(key);
        }
        released
    }

    /// Drop `id` from the line without touching the holder, for requests
    /// that will never run.
    pub fn forget(&self, key: &ResourceKey, id: ExecutionId) {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get_mut(key) {
            slot.waiting.retain(|waiting| *waiting != id);
            if slot.is_idle() {
                slots.remove(key);
            }
        }
    }

    /// The current holder of `key`.
    #[must_use]
    pub fn holder(&self, key: &ResourceKey) -> Option<ExecutionId> {
        self.slots.lock().get(key).and_then(|slot| slot.holder)
    }

    /// Requests waiting for `key`.
    #[must_use]
    pub fn waiting(&self, key: &ResourceKey) -> usize {
        self.slots.lock().get(key).map_or(0, |slot| slot.waiting.len())
    }

    /// Whether no resource is locked or awaited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> ResourceKey {
        ResourceKey::new(raw).unwrap()
    }

    #[test]
    fn admission_order_is_respected() {
        let locks = ResourceLocks::new();
        let r1 = key("r1");
        let (a, b) = (ExecutionId::v4(), ExecutionId::v4());
        locks.admit(&r1, a);
        locks.admit(&r1, b);

        assert!(!locks.try_acquire(&r1, b), "b must wait for a");
        assert!(locks.try_acquire(&r1, a));
        assert!(!locks.try_acquire(&r1, b));

        assert!(locks.release(&r1, a));
        assert!(locks.try_acquire(&r1, b));
        assert_eq!(locks.holder(&r1), Some(b));
    }

    #[test]
    fn resources_are_independent() {
        let locks = ResourceLocks::new();
        let (a, b) = (ExecutionId::v4(), ExecutionId::v4());
        assert!(locks.try_acquire(&key("r1"), a));
        assert!(locks.try_acquire(&key("r2"), b));
    }

    #[test]
    fn acquire_is_reentrant_and_release_checks_holder() {
        let locks = ResourceLocks::new();
        let r1 = key("r1");
        let (a, b) = (ExecutionId::v4(), ExecutionId::v4());
        assert!(locks.try_acquire(&r1, a));
        assert!(locks.try_acquire(&r1, a));
        assert!(!locks.release(&r1, b));
        assert_eq!(locks.holder(&r1), Some(a));
    }

    #[test]
    fn forgotten_request_unblocks_the_line() {
        let locks = ResourceLocks::new();
        let r1 = key("r1");
        let (a, b) = (ExecutionId::v4(), ExecutionId::v4());
        locks.admit(&r1, a);
        locks.admit(&r1, b);

        locks.forget(&r1, a);
        assert_eq!(locks.waiting(&r1), 1);
        assert!(locks.try_acquire(&r1, b));
        locks.release(&r1, b);
        assert!(locks.is_empty());
    }
}
