//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects wrapped values,
//! effects, and computed values. It owns the dependency store, the
//! active-subscriber context, and a registry of live subscribers.
//!
//! # How It Works
//!
//! 1. When an effect (or a computed's internal runner) executes, it is
//!    pushed onto the runtime's active stack.
//!
//! 2. When a wrapped value is read, [`RuntimeInner::track`] records the
//!    active subscriber in the store under that `(target, key)` pair.
//!
//! 3. When a wrapped value is written, [`RuntimeInner::trigger`] looks up
//!    the recorded subscribers and re-runs each one, or invokes its
//!    scheduler instead when it has one.
//!
//! # Isolation
//!
//! All of this state lives inside the runtime instance. Two runtimes are
//! fully independent universes: subscribers of one are invisible to
//! triggers of the other, even when they observe the same underlying
//! value nodes.
//!
//! # Re-entrancy
//!
//! Triggering snapshots a dependency set before iterating, because a
//! re-running subscriber clears and rebuilds the very sets being walked.
//! A subscriber is never re-triggered by its own writes: the snapshot
//! walk skips the currently active subscriber. No runtime-internal lock
//! is held while subscriber code runs.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::trace;

use super::computed::Computed;
use super::context::{ActiveContext, PauseGuard};
use super::effect::{Effect, EffectOptions};
use super::key::Key;
use super::store::DepStore;
use super::subscriber::{Subscriber, SubscriberId};
use super::wrapper::Reactive;
use crate::error::Error;
use crate::value::{TargetId, Value};

/// A reactive universe.
///
/// Cheap to clone; clones share the same store, context, and registry.
///
/// # Example
///
/// ```rust,ignore
/// let rt = Runtime::new();
/// let state = rt.reactive(json!({ "count": 0 }))?;
///
/// let fx = rt.effect({
///     let state = state.clone();
///     move || println!("count is {:?}", state.get("count"))
/// });
///
/// state.set("count", 5); // effect re-runs, prints the new count
/// ```
#[derive(Clone, Default)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

#[derive(Default)]
pub(crate) struct RuntimeInner {
    store: DepStore,
    context: ActiveContext,
    /// Live subscribers by id. Weak: dropping the last handle to an effect
    /// disposes it, and stale ids in dependency sets stop resolving.
    registry: RwLock<HashMap<SubscriberId, Weak<Subscriber>>>,
}

impl RuntimeInner {
    /// Record that the active subscriber depends on `(target, key)`.
    ///
    /// No-op when no subscriber is active or when tracking is paused.
    pub fn track(&self, target: TargetId, key: &Key) {
        if self.context.is_paused() {
            return;
        }
        let Some(active) = self.context.current() else {
            return;
        };

        let dep = self.store.dep_for(target, key);
        let newly_added = dep.write().insert(active.id());
        if newly_added {
            // Bidirectional link: the subscriber remembers the shared set
            // so it can remove itself before its next run.
            active.record_dep(dep);
            trace!(target_id = target.raw(), key = %key, subscriber = ?active.id(), "tracked");
        }
    }

    /// Notify every subscriber of `(target, key)`.
    ///
    /// A missing entry is an expected condition (most writes have no
    /// subscribers) and returns silently.
    pub fn trigger(&self, target: TargetId, key: &Key) {
        let Some(dep) = self.store.lookup(target, key) else {
            return;
        };

        // Snapshot before iterating: a re-running subscriber mutates the
        // live set.
        let snapshot: Vec<SubscriberId> = dep.read().iter().copied().collect();
        if snapshot.is_empty() {
            return;
        }

        let active = self.context.current_id();

        // Resolve strong references first so no lock is held while
        // subscriber code runs.
        let mut to_notify: Vec<Arc<Subscriber>> = Vec::with_capacity(snapshot.len());
        {
            let registry = self.registry.read();
            for id in snapshot {
                // A write from within a running subscriber must not
                // re-enter that same subscriber.
                if Some(id) == active {
                    continue;
                }
                if let Some(subscriber) = registry.get(&id).and_then(Weak::upgrade) {
                    to_notify.push(subscriber);
                }
            }
        }

        trace!(target_id = target.raw(), key = %key, count = to_notify.len(), "triggered");

        for subscriber in to_notify {
            match subscriber.scheduler() {
                Some(scheduler) => scheduler(),
                None => self.run_subscriber(&subscriber),
            }
        }
    }

    /// Run a subscriber, re-deriving its dependency set from scratch.
    pub fn run_subscriber(&self, subscriber: &Arc<Subscriber>) {
        if subscriber.is_disposed() {
            return;
        }

        // Old subscriptions go first; the body's reads repopulate them.
        subscriber.clear_deps();

        let _active = self.context.enter(subscriber.clone());
        subscriber.invoke();
    }

    /// Make a subscriber reachable from triggers.
    pub fn register(&self, subscriber: &Arc<Subscriber>) {
        self.registry
            .write()
            .insert(subscriber.id(), Arc::downgrade(subscriber));
    }

    /// Suspend dependency collection until the guard drops.
    pub fn pause_tracking(&self) -> PauseGuard<'_> {
        self.context.pause()
    }

    /// Whether reads would currently be recorded.
    pub fn is_tracking(&self) -> bool {
        !self.context.is_paused() && self.context.current_id().is_some()
    }
}

impl Runtime {
    /// Create a new, empty reactive universe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a composite value so reads and writes through the returned
    /// wrapper are observed.
    ///
    /// Fails with [`Error::NotComposite`] for primitives; the value is
    /// reported and left unwrapped, never adopted partially.
    pub fn reactive(&self, value: impl Into<Value>) -> Result<Reactive, Error> {
        Reactive::wrap(self.inner.clone(), value.into())
    }

    /// Create an effect that runs `body` now and re-runs it whenever a
    /// value it read changes.
    pub fn effect<F>(&self, body: F) -> Effect
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.effect_with(body, EffectOptions::default())
    }

    /// Create an effect with explicit options.
    ///
    /// `lazy` suppresses the immediate first run; `scheduler` replaces
    /// direct re-execution when the effect is triggered.
    pub fn effect_with<F>(&self, body: F, options: EffectOptions) -> Effect
    where
        F: Fn() + Send + Sync + 'static,
    {
        Effect::new(self.inner.clone(), Box::new(body), options)
    }

    /// Create a lazily evaluated, cached derived value.
    pub fn computed<T, F>(&self, compute: F) -> Computed<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Computed::new(self.inner.clone(), compute)
    }

    /// Run a closure with dependency collection suspended.
    ///
    /// Reads inside the closure are not recorded against the currently
    /// active subscriber.
    pub fn untracked<R>(&self, f: impl FnOnce() -> R) -> R {
        let _pause = self.inner.pause_tracking();
        f()
    }

    /// Whether a subscriber is currently collecting dependencies.
    pub fn is_tracking(&self) -> bool {
        self.inner.is_tracking()
    }
}
