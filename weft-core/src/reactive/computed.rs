//! Computed Value Cache
//!
//! A Computed is a derived value built on top of the effect engine:
//! evaluation is deferred until the first read, a dirty flag gates
//! recomputation, and reading the value is itself tracked, so effects and
//! other computed values that read it are transitively notified.
//!
//! # How Computeds Work
//!
//! 1. Creation allocates a synthetic target handle and a lazy internal
//!    subscriber; nothing is evaluated yet.
//!
//! 2. Reading the value while dirty re-runs the internal subscriber,
//!    which recomputes into the cache and re-collects the computation's
//!    dependencies.
//!
//! 3. The internal subscriber's scheduler, invoked when an upstream
//!    dependency changes, does not recompute. It marks the computed dirty
//!    and triggers the synthetic `(handle, "value")` pair, passing the
//!    change on to whoever read this computed.
//!
//! Chains recompute outside-in on demand: a change deep under computed B
//! marks B dirty and notifies B's readers; an effect that reads computed
//! A (which reads B) recomputes A, which pulls a fresh B, which pulls the
//! changed input. Layers nobody reads stay dirty and cost nothing.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use super::key::Key;
use super::runtime::RuntimeInner;
use super::subscriber::{Scheduler, Subscriber};
use crate::value::TargetId;

/// A lazily evaluated, cached derived value.
///
/// # Example
///
/// ```rust,ignore
/// let state = rt.reactive(json!({ "n": 2 }))?;
/// let doubled = rt.computed({
///     let state = state.clone();
///     move || state.get("n").unwrap().as_i64().unwrap() * 2
/// });
///
/// assert_eq!(doubled.get(), 4);   // computed now, cached
/// assert_eq!(doubled.get(), 4);   // served from cache
/// state.set("n", 5);              // marks doubled dirty
/// assert_eq!(doubled.get(), 10);  // recomputed on read
/// ```
pub struct Computed<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<ComputedInner<T>>,
}

struct ComputedInner<T> {
    runtime: Arc<RuntimeInner>,
    /// Synthetic target identity under which readers subscribe.
    handle: TargetId,
    dirty: Arc<AtomicBool>,
    cache: Arc<RwLock<Option<T>>>,
    subscriber: Arc<Subscriber>,
}

impl<T> Computed<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new<F>(runtime: Arc<RuntimeInner>, compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let handle = TargetId::fresh();
        let dirty = Arc::new(AtomicBool::new(true));
        let cache = Arc::new(RwLock::new(None));

        // The body recomputes into the cache slot. The cache lock is taken
        // only after the user computation returns.
        let body = {
            let cache = Arc::clone(&cache);
            Box::new(move || {
                let value = compute();
                *cache.write() = Some(value);
            })
        };

        // The scheduler propagates "this computed changed" without
        // recomputing anything.
        let scheduler: Scheduler = {
            let dirty = Arc::clone(&dirty);
            let runtime = Arc::clone(&runtime);
            Arc::new(move || {
                trace!(target_id = handle.raw(), "computed invalidated");
                dirty.store(true, Ordering::SeqCst);
                runtime.trigger(handle, &Key::Value);
            })
        };

        let subscriber = Subscriber::new(body, Some(scheduler));
        runtime.register(&subscriber);

        Self {
            inner: Arc::new(ComputedInner {
                runtime,
                handle,
                dirty,
                cache,
                subscriber,
            }),
        }
    }

    /// Current value, recomputing first if an input changed since the
    /// last read.
    ///
    /// The read is tracked under the synthetic handle, so the caller
    /// (an effect or another computed) becomes a dependent of this one.
    pub fn get(&self) -> T {
        let inner = &self.inner;

        if inner.dirty.swap(false, Ordering::SeqCst) {
            inner.runtime.run_subscriber(&inner.subscriber);
        }

        inner.runtime.track(inner.handle, &Key::Value);

        inner
            .cache
            .read()
            .clone()
            .expect("refreshed computed has a cached value")
    }

    /// Whether the next read will recompute.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Whether the value has ever been computed.
    pub fn has_value(&self) -> bool {
        self.inner.cache.read().is_some()
    }

    /// Identity of the synthetic handle readers subscribe under.
    pub fn handle(&self) -> TargetId {
        self.inner.handle
    }
}

impl<T> Clone for Computed<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Computed<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("handle", &self.inner.handle)
            .field("dirty", &self.is_dirty())
            .field("has_value", &self.has_value())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Runtime;
    use serde_json::json;
    use std::sync::atomic::AtomicI32;

    #[test]
    fn computed_is_lazy() {
        let rt = Runtime::new();
        let calls = Arc::new(AtomicI32::new(0));
        let calls_clone = calls.clone();

        let c = rt.computed(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            42
        });

        assert!(c.is_dirty());
        assert!(!c.has_value());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(c.get(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!c.is_dirty());
    }

    #[test]
    fn computed_caches_until_an_input_changes() {
        let rt = Runtime::new();
        let state = rt.reactive(json!({ "foo": 1 })).unwrap();
        let calls = Arc::new(AtomicI32::new(0));

        let c = {
            let state = state.clone();
            let calls = calls.clone();
            rt.computed(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                state.get("foo").unwrap().as_i64().unwrap()
            })
        };

        assert_eq!(c.get(), 1);
        assert_eq!(c.get(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        state.set("foo", 2);
        assert!(c.is_dirty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(c.get(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unread_computed_does_not_recompute_on_writes() {
        let rt = Runtime::new();
        let state = rt.reactive(json!({ "foo": 1 })).unwrap();
        let calls = Arc::new(AtomicI32::new(0));

        let c = {
            let state = state.clone();
            let calls = calls.clone();
            rt.computed(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                state.get("foo").unwrap().as_i64().unwrap()
            })
        };

        let _ = c.get();

        // Two writes, zero reads: stays dirty, recomputes nothing.
        state.set("foo", 2);
        state.set("foo", 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(c.get(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn computed_clone_shares_state() {
        let rt = Runtime::new();
        let c1 = rt.computed(|| 7);
        let c2 = c1.clone();

        assert_eq!(c1.get(), 7);
        assert!(c2.has_value());
        assert_eq!(c1.handle(), c2.handle());
    }
}
