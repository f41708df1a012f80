//! Weft Core
//!
//! This crate provides the core runtime for the Weft reactive state
//! library. It implements:
//!
//! - Transparent interception of reads and writes on composite values
//! - A dependency store correlating `(target, key)` pairs with subscribers
//! - An effect engine with nesting, per-run dependency re-collection, and
//!   pluggable scheduling
//! - Lazily recomputed, cached derived values
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `value`: the plain data layer (a JSON-like value tree with shared,
//!   identity-carrying composite nodes)
//! - `reactive`: the runtime (dependency store, interception wrapper,
//!   effect engine, computed cache)
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use weft_core::Runtime;
//!
//! let rt = Runtime::new();
//! let state = rt.reactive(json!({ "count": 0 }))?;
//!
//! // Runs once now, and again after every write to `count`.
//! let fx = rt.effect({
//!     let state = state.clone();
//!     move || println!("count: {:?}", state.get("count"))
//! });
//!
//! let doubled = rt.computed({
//!     let state = state.clone();
//!     move || state.get("count").unwrap().as_i64().unwrap() * 2
//! });
//!
//! state.set("count", 5); // fx re-runs; doubled recomputes on next read
//! assert_eq!(doubled.get(), 10);
//! ```

pub mod error;
pub mod reactive;
pub mod value;

pub use error::Error;
pub use reactive::{
    Computed, Effect, EffectOptions, Key, Reactive, ReactiveValue, Runtime, Scheduler,
    SubscriberId,
};
pub use value::{ArrayRef, ObjectRef, TargetId, Value};
