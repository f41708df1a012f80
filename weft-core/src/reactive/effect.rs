//! Effect Implementation
//!
//! An Effect is a side-effecting computation that re-runs whenever a value
//! it previously read changes.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its body immediately to establish
//!    initial dependencies (unless `lazy`).
//!
//! 2. When any dependency changes, the effect re-runs directly, or its
//!    scheduler is invoked instead when one was supplied.
//!
//! 3. Before every run, the effect is removed from all dependency sets it
//!    joined; the run's reads rebuild the set. A branch that stops
//!    reading a key therefore stops subscribing to it.
//!
//! # Ownership
//!
//! The handle owns the underlying subscriber; the runtime's registry holds
//! only a weak reference. Dropping the last handle (clones share state)
//! makes the effect unreachable from triggers.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::runtime::RuntimeInner;
use super::subscriber::{Scheduler, Subscriber, SubscriberId};

/// Creation options for an effect.
#[derive(Clone, Default)]
pub struct EffectOptions {
    /// Suppress the immediate first run.
    pub lazy: bool,
    /// Invoked instead of direct re-execution when the effect is triggered.
    pub scheduler: Option<Scheduler>,
}

impl fmt::Debug for EffectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectOptions")
            .field("lazy", &self.lazy)
            .field("scheduler", &self.scheduler.is_some())
            .finish()
    }
}

/// Handle to a reactive effect.
///
/// The handle is the runnable: [`Effect::run`] re-executes the body
/// manually, exactly as a dependency change would.
///
/// # Example
///
/// ```rust,ignore
/// let state = rt.reactive(json!({ "count": 0 }))?;
/// let fx = rt.effect({
///     let state = state.clone();
///     move || { let _ = state.get("count"); }
/// });
///
/// state.set("count", 1); // re-runs fx
/// fx.run();              // or re-run it by hand
/// ```
pub struct Effect {
    runtime: Arc<RuntimeInner>,
    subscriber: Arc<Subscriber>,
}

impl Effect {
    pub(crate) fn new(
        runtime: Arc<RuntimeInner>,
        body: Box<dyn Fn() + Send + Sync>,
        options: EffectOptions,
    ) -> Self {
        let subscriber = Subscriber::new(body, options.scheduler);
        runtime.register(&subscriber);
        debug!(subscriber = ?subscriber.id(), lazy = options.lazy, "effect created");

        let effect = Self {
            runtime,
            subscriber,
        };
        if !options.lazy {
            effect.run();
        }
        effect
    }

    /// Re-run the body now, re-collecting its dependencies.
    pub fn run(&self) {
        self.runtime.run_subscriber(&self.subscriber);
    }

    /// Id of the underlying subscriber.
    pub fn id(&self) -> SubscriberId {
        self.subscriber.id()
    }

    /// Number of completed runs.
    pub fn run_count(&self) -> u64 {
        self.subscriber.run_count()
    }

    /// Number of dependency sets the effect currently belongs to.
    pub fn dependency_count(&self) -> usize {
        self.subscriber.dependency_count()
    }

    /// Permanently stop the effect. A disposed effect never runs again.
    pub fn dispose(&self) {
        self.subscriber.dispose();
    }

    /// Whether the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.subscriber.is_disposed()
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            runtime: Arc::clone(&self.runtime),
            subscriber: Arc::clone(&self.subscriber),
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id())
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
