// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide store of already-handled event fingerprints.
//!
//! The only mutating operation is [`DedupStore::check_and_insert`], which runs
//! the lookup and the insert in one critical section so that at most one
//! worker proceeds per fingerprint.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

use parley_core::Fingerprint;

/// How long fingerprints are remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupPolicy {
    /// Remember every fingerprint for the lifetime of the process.
    /// Memory grows with the number of distinct events.
    Unbounded,
    /// Remember at most this many fingerprints, evicting the oldest first.
    /// An evicted fingerprint is accepted again if its event reappears.
    Capped(usize),
}

impl DedupPolicy {
    /// `None` means unbounded.
    pub fn from_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(cap) => Self::Capped(cap.max(1)),
            None => Self::Unbounded,
        }
    }
}

/// Result of a check-and-insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupVerdict {
    /// First sighting; the fingerprint is now recorded.
    Accepted,
    /// Already recorded; the caller must stop processing the event.
    Duplicate,
}

#[derive(Default)]
struct Seen {
    set: HashSet<Fingerprint>,
    /// Insertion order, maintained only under [`DedupPolicy::Capped`].
    order: VecDeque<Fingerprint>,
}

pub struct DedupStore {
    policy: DedupPolicy,
    seen: Mutex<Seen>,
}

impl DedupStore {
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            policy,
            seen: Mutex::new(Seen::default()),
        }
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// Atomically records `fingerprint` unless it is already present.
    pub fn check_and_insert(&self, fingerprint: &Fingerprint) -> DedupVerdict {
        // The critical section has no await points and cannot leave the set
        // half-updated, so a poisoned lock is still usable.
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);

        if seen.set.contains(fingerprint) {
            return DedupVerdict::Duplicate;
        }

        seen.set.insert(fingerprint.clone());
        if let DedupPolicy::Capped(cap) = self.policy {
            seen.order.push_back(fingerprint.clone());
            while seen.order.len() > cap {
                if let Some(oldest) = seen.order.pop_front() {
                    seen.set.remove(&oldest);
                }
            }
        }

        DedupVerdict::Accepted
    }

    /// Number of fingerprints currently remembered.
    pub fn len(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DedupStore {
    fn default() -> Self {
        Self::new(DedupPolicy::Unbounded)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parley_core::Event;

    use super::*;

    fn fp(text: &str) -> Fingerprint {
        Event {
            self_id: 1,
            user_id: 42,
            raw_message: text.into(),
            ..Default::default()
        }
        .fingerprint()
    }

    #[test]
    fn second_sighting_is_duplicate() {
        let store = DedupStore::default();
        assert_eq!(store.check_and_insert(&fp("hello")), DedupVerdict::Accepted);
        assert_eq!(store.check_and_insert(&fp("hello")), DedupVerdict::Duplicate);
        assert_eq!(store.check_and_insert(&fp("other")), DedupVerdict::Accepted);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn unbounded_store_never_forgets() {
        let store = DedupStore::new(DedupPolicy::Unbounded);
        for i in 0..1000 {
            store.check_and_insert(&fp(&i.to_string()));
        }
        assert_eq!(store.check_and_insert(&fp("0")), DedupVerdict::Duplicate);
        assert_eq!(store.len(), 1000);
    }

    #[test]
    fn capped_store_evicts_oldest_first() {
        let store = DedupStore::new(DedupPolicy::Capped(2));
        store.check_and_insert(&fp("a"));
        store.check_and_insert(&fp("b"));
        store.check_and_insert(&fp("c"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.check_and_insert(&fp("c")), DedupVerdict::Duplicate);
        assert_eq!(store.check_and_insert(&fp("b")), DedupVerdict::Duplicate);
        // "a" was evicted, so it is accepted again (and evicts "b").
        assert_eq!(store.check_and_insert(&fp("a")), DedupVerdict::Accepted);
        assert_eq!(store.check_and_insert(&fp("b")), DedupVerdict::Accepted);
    }

    #[test]
    fn policy_from_capacity() {
        assert_eq!(DedupPolicy::from_capacity(None), DedupPolicy::Unbounded);
        assert_eq!(DedupPolicy::from_capacity(Some(5)), DedupPolicy::Capped(5));
        assert_eq!(DedupPolicy::from_capacity(Some(0)), DedupPolicy::Capped(1));
    }

    #[test]
    fn concurrent_inserts_accept_exactly_once() {
        let store = Arc::new(DedupStore::default());
        let target = fp("race");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                let target = target.clone();
                std::thread::spawn(move || store.check_and_insert(&target))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|v| *v == DedupVerdict::Accepted)
            .count();
        assert_eq!(accepted, 1);
    }
}
