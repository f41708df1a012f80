//! Reactive Primitives
//!
//! This module implements the core reactive system: wrapped values,
//! effects, and computed values, glued together by a per-runtime
//! dependency store.
//!
//! # Concepts
//!
//! ## Wrapped values
//!
//! [`Runtime::reactive`] turns a plain composite value into a transparent
//! wrapper. Reading a property through the wrapper registers the running
//! computation as a dependent of that `(target, key)` pair; writing a
//! property re-runs everything that depends on it.
//!
//! ## Effects
//!
//! An [`Effect`] is a side-effecting computation that re-runs whenever a
//! value it read changes. Its dependency set is rebuilt from scratch on
//! every run, so dependencies taken in a branch that is no longer
//! executed are dropped.
//!
//! ## Computed values
//!
//! A [`Computed`] is a cached derived value. It recomputes only when read
//! while dirty, and reading it is itself tracked, so computed values
//! chain.
//!
//! # Implementation Notes
//!
//! Dependency detection is automatic: the runtime keeps a stack of
//! currently executing subscribers, and every tracked read consults the
//! top of that stack. The stack is per runtime, not global, so separate
//! runtimes are isolated from one another. This approach (sometimes
//! called "transparent reactivity") is the one used by Vue 3, SolidJS,
//! and Leptos.

mod computed;
mod context;
mod effect;
mod key;
mod runtime;
mod store;
mod subscriber;
mod wrapper;

pub use computed::Computed;
pub use effect::{Effect, EffectOptions};
pub use key::Key;
pub use runtime::Runtime;
pub use subscriber::{Scheduler, SubscriberId};
pub use wrapper::{Reactive, ReactiveValue};
