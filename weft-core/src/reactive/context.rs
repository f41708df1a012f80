//! Active-Subscriber Context
//!
//! Tracks which subscriber is currently collecting dependencies. When a
//! wrapped value is read, the store consults this context to find out who
//! the read belongs to.
//!
//! # Implementation
//!
//! A stack of currently-executing subscribers supports nesting: entering a
//! context pushes, and the returned guard pops on drop, so the previously
//! active subscriber resumes even if the inner body panics.
//!
//! The context is a plain field of its runtime, not a process global, so
//! independent runtimes never observe each other's active subscriber.
//!
//! The `paused` flag suspends dependency collection without touching the
//! stack; the guarded list append uses it to keep its internal reads from
//! registering the calling subscriber.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::subscriber::{Subscriber, SubscriberId};

#[derive(Default)]
pub(crate) struct ActiveContext {
    stack: RwLock<Vec<Arc<Subscriber>>>,
    paused: AtomicBool,
}

impl ActiveContext {
    /// Push a subscriber as active until the returned guard drops.
    pub fn enter(&self, subscriber: Arc<Subscriber>) -> ContextGuard<'_> {
        let id = subscriber.id();
        self.stack.write().push(subscriber);
        ContextGuard { context: self, id }
    }

    /// The subscriber currently collecting dependencies, if any.
    pub fn current(&self) -> Option<Arc<Subscriber>> {
        self.stack.read().last().cloned()
    }

    /// Id of the current subscriber, if any.
    pub fn current_id(&self) -> Option<SubscriberId> {
        self.stack.read().last().map(|sub| sub.id())
    }

    /// Whether dependency collection is suspended.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Suspend dependency collection until the returned guard drops.
    ///
    /// Pauses nest: the guard restores whatever state it found.
    pub fn pause(&self) -> PauseGuard<'_> {
        let was_paused = self.paused.swap(true, Ordering::SeqCst);
        PauseGuard {
            context: self,
            was_paused,
        }
    }
}

/// Guard that pops the active stack when dropped.
pub(crate) struct ContextGuard<'a> {
    context: &'a ActiveContext,
    id: SubscriberId,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        let popped = self.context.stack.write().pop();

        // Catch mismatched enter/exit pairs early.
        if let Some(subscriber) = popped {
            debug_assert_eq!(
                subscriber.id(),
                self.id,
                "active-subscriber stack mismatch: expected {:?}, got {:?}",
                self.id,
                subscriber.id()
            );
        }
    }
}

/// Guard that restores the previous pause state when dropped.
pub(crate) struct PauseGuard<'a> {
    context: &'a ActiveContext,
    was_paused: bool,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.context.paused.store(self.was_paused, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::subscriber::Subscriber;

    #[test]
    fn context_tracks_current_subscriber() {
        let context = ActiveContext::default();
        let subscriber = Subscriber::new(Box::new(|| {}), None);
        let id = subscriber.id();

        assert!(context.current_id().is_none());

        {
            let _guard = context.enter(subscriber);
            assert_eq!(context.current_id(), Some(id));
        }

        assert!(context.current_id().is_none());
    }

    #[test]
    fn nested_contexts_restore_the_outer_subscriber() {
        let context = ActiveContext::default();
        let outer = Subscriber::new(Box::new(|| {}), None);
        let inner = Subscriber::new(Box::new(|| {}), None);
        let outer_id = outer.id();
        let inner_id = inner.id();

        let _outer_guard = context.enter(outer);
        assert_eq!(context.current_id(), Some(outer_id));

        {
            let _inner_guard = context.enter(inner);
            assert_eq!(context.current_id(), Some(inner_id));
        }

        assert_eq!(context.current_id(), Some(outer_id));
    }

    #[test]
    fn pause_guard_restores_previous_state() {
        let context = ActiveContext::default();
        assert!(!context.is_paused());

        {
            let _outer = context.pause();
            assert!(context.is_paused());

            {
                let _inner = context.pause();
                assert!(context.is_paused());
            }

            // Still paused: the inner guard restores the outer pause.
            assert!(context.is_paused());
        }

        assert!(!context.is_paused());
    }
}
