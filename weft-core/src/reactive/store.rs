//! Dependency Store
//!
//! A three-level associative structure mapping a target to a property key
//! to the set of subscribers that read it: `TargetId -> Key -> Dep`.
//!
//! # Sharing
//!
//! The per-key set is an `Arc`, and the same `Arc` is pushed into each
//! member subscriber's back-reference list when it joins. That shared set
//! object is the bidirectional link between the two sides: the store walks
//! target and key to find subscribers, and a subscriber walks its
//! back-references to remove itself from every set in O(subscriptions)
//! before a re-run.
//!
//! # Lifetime
//!
//! Entries are created lazily on first tracked read and never pruned by
//! writes; only subscriber re-registration empties a set. Dead targets
//! leave empty entries behind. Ids are monotonic, so stale entries can
//! never alias a newer target.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use super::key::Key;
use super::subscriber::SubscriberId;
use crate::value::TargetId;

/// A single dependency set: the subscribers of one `(target, key)` pair.
pub(crate) type Dep = Arc<RwLock<HashSet<SubscriberId>>>;

/// The store proper.
#[derive(Default)]
pub(crate) struct DepStore {
    targets: RwLock<HashMap<TargetId, HashMap<Key, Dep>>>,
}

impl DepStore {
    /// Fetch the dependency set for `(target, key)`, creating the key map
    /// and the set on first use.
    pub fn dep_for(&self, target: TargetId, key: &Key) -> Dep {
        let mut targets = self.targets.write();
        targets
            .entry(target)
            .or_default()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::new(HashSet::new())))
            .clone()
    }

    /// Fetch the dependency set for `(target, key)` if it exists.
    ///
    /// Absence is the common case: most writes touch keys nobody reads.
    pub fn lookup(&self, target: TargetId, key: &Key) -> Option<Dep> {
        self.targets.read().get(&target)?.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_misses_until_first_track() {
        let store = DepStore::default();
        let target = TargetId::fresh();

        assert!(store.lookup(target, &Key::from("x")).is_none());

        store.dep_for(target, &Key::from("x"));
        assert!(store.lookup(target, &Key::from("x")).is_some());
        assert!(store.lookup(target, &Key::from("y")).is_none());
    }

    #[test]
    fn dep_for_returns_the_same_set_for_the_same_pair() {
        let store = DepStore::default();
        let target = TargetId::fresh();
        let id = SubscriberId::new();

        let first = store.dep_for(target, &Key::Length);
        first.write().insert(id);

        let second = store.dep_for(target, &Key::Length);
        assert!(second.read().contains(&id));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn keys_are_independent() {
        let store = DepStore::default();
        let target = TargetId::fresh();
        let id = SubscriberId::new();

        store.dep_for(target, &Key::from("a")).write().insert(id);

        let b = store.dep_for(target, &Key::from("b"));
        assert!(b.read().is_empty());
    }
}
