//! Subscriber types for the reactive system.
//!
//! A Subscriber is the runnable unit of reactive computation: a body
//! closure plus the bookkeeping the engine needs to re-derive its
//! dependency set from scratch on every run.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::store::Dep;

/// Unique identifier for a subscriber.
///
/// Each subscriber (effect or computed's internal runner) gets a unique id
/// when created. Dependency sets store ids, not references, so a dropped
/// subscriber simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber id.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller-supplied replacement for direct re-execution, invoked when a
/// dependency changes instead of re-running the subscriber body.
pub type Scheduler = Arc<dyn Fn() + Send + Sync>;

/// A runnable reactive computation.
///
/// The `deps` list holds the same `Arc`s that appear in the dependency
/// store, one per `(target, key)` set this subscriber currently belongs
/// to. Before every run the engine removes the subscriber from each of
/// those sets and clears the list, so a conditional branch that stops
/// reading a key drops the corresponding subscription.
pub(crate) struct Subscriber {
    id: SubscriberId,
    body: Box<dyn Fn() + Send + Sync>,
    deps: Mutex<SmallVec<[Dep; 4]>>,
    scheduler: Option<Scheduler>,
    disposed: AtomicBool,
    runs: AtomicU64,
}

impl Subscriber {
    pub fn new(body: Box<dyn Fn() + Send + Sync>, scheduler: Option<Scheduler>) -> Arc<Self> {
        Arc::new(Self {
            id: SubscriberId::new(),
            body,
            deps: Mutex::new(SmallVec::new()),
            scheduler,
            disposed: AtomicBool::new(false),
            runs: AtomicU64::new(0),
        })
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn scheduler(&self) -> Option<&Scheduler> {
        self.scheduler.as_ref()
    }

    /// Remember a dependency set this subscriber was just inserted into.
    pub fn record_dep(&self, dep: Dep) {
        self.deps.lock().push(dep);
    }

    /// Remove this subscriber from every set it joined and forget them.
    ///
    /// The list is taken out before the sets are locked; the two locks are
    /// never held together.
    pub fn clear_deps(&self) {
        let deps: SmallVec<[Dep; 4]> = std::mem::take(&mut *self.deps.lock());
        for dep in deps {
            dep.write().remove(&self.id);
        }
    }

    /// Execute the body and count the run.
    pub fn invoke(&self) {
        (self.body)();
        self.runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn run_count(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    pub fn dependency_count(&self) -> usize {
        self.deps.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use parking_lot::RwLock;

    #[test]
    fn subscriber_ids_are_unique() {
        let a = SubscriberId::new();
        let b = SubscriberId::new();
        let c = SubscriberId::new();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn clear_deps_removes_subscriber_from_shared_sets() {
        let subscriber = Subscriber::new(Box::new(|| {}), None);

        let dep: Dep = Arc::new(RwLock::new(HashSet::new()));
        dep.write().insert(subscriber.id());
        subscriber.record_dep(dep.clone());

        assert_eq!(subscriber.dependency_count(), 1);

        subscriber.clear_deps();

        assert!(dep.read().is_empty());
        assert_eq!(subscriber.dependency_count(), 0);
    }

    #[test]
    fn invoke_counts_runs() {
        let subscriber = Subscriber::new(Box::new(|| {}), None);
        assert_eq!(subscriber.run_count(), 0);

        subscriber.invoke();
        subscriber.invoke();
        assert_eq!(subscriber.run_count(), 2);
    }
}
