//! Interception Layer
//!
//! [`Reactive`] is a transparent front for one composite value node. Reads
//! and writes through the wrapper behave exactly like reads and writes on
//! the underlying node, with three side effects layered on top:
//!
//! - every read records the active subscriber as a dependent of the
//!   `(target, key)` pair,
//! - every write forwards to the node first and then notifies the pair's
//!   subscribers, so they observe the new value,
//! - a composite value read out of a wrapper comes back wrapped itself.
//!
//! # Lazy wrapping
//!
//! Nested composites are wrapped at the moment they are read, not when the
//! root is wrapped. Two consequences, both intentional:
//!
//! - reading the same nested field twice produces two distinct wrappers
//!   over the same node; the store coalesces them because it keys on the
//!   underlying node's identity, not the wrapper,
//! - a nested node obtained without passing through a wrapper read (via
//!   [`Reactive::raw`] or a retained [`Value`] clone) is invisible to the
//!   dependency store, and mutating it notifies nobody.
//!
//! # Mutating list operations
//!
//! `push` is the only instrumented mutator beyond plain writes, and it is
//! guarded against self-recursion (see [`Reactive::push`]). Other list
//! mutators (insert, remove, splice) would need the same guard and are
//! deliberately not offered here; `raw` exposes the uninstrumented node
//! for callers that need them and accept the consequences.

use std::fmt;
use std::sync::Arc;

use tracing::error;

use super::key::Key;
use super::runtime::RuntimeInner;
use crate::error::Error;
use crate::value::{ArrayRef, ObjectRef, TargetId, Value};

enum Target {
    Object(ObjectRef),
    Array(ArrayRef),
}

/// Transparent wrapper over a composite value.
///
/// Cheap to clone; clones front the same node through the same runtime.
pub struct Reactive {
    runtime: Arc<RuntimeInner>,
    target: Target,
}

impl Reactive {
    /// Wrap a composite value. Primitives are rejected, reported, and left
    /// unwrapped.
    pub(crate) fn wrap(runtime: Arc<RuntimeInner>, value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(obj) => Ok(Self {
                runtime,
                target: Target::Object(obj),
            }),
            Value::Array(arr) => Ok(Self {
                runtime,
                target: Target::Array(arr),
            }),
            other => {
                error!(kind = other.kind(), "reactive target must be an object or array");
                Err(Error::NotComposite { kind: other.kind() })
            }
        }
    }

    /// Identity of the underlying node.
    pub fn target_id(&self) -> TargetId {
        match &self.target {
            Target::Object(obj) => obj.id(),
            Target::Array(arr) => arr.id(),
        }
    }

    /// Whether this wrapper fronts an object.
    pub fn is_object(&self) -> bool {
        matches!(self.target, Target::Object(_))
    }

    /// Whether this wrapper fronts an array.
    pub fn is_array(&self) -> bool {
        matches!(self.target, Target::Array(_))
    }

    /// Read a property.
    ///
    /// The read is tracked whether or not the property exists, so a
    /// subscriber that probes an absent key re-runs once the key appears.
    /// Composite results come back wrapped; primitives come back raw.
    pub fn get(&self, key: impl Into<Key>) -> Option<ReactiveValue> {
        let key = key.into();
        self.runtime.track(self.target_id(), &key);

        let value = match (&self.target, &key) {
            (Target::Object(obj), Key::Prop(name)) => obj.get(name),
            (Target::Array(arr), Key::Index(index)) => arr.get(*index),
            (Target::Array(arr), Key::Length) => Some(Value::Int(arr.len() as i64)),
            _ => None,
        };

        value.map(|value| self.lift(value))
    }

    /// Write a property, then notify its subscribers.
    ///
    /// The write lands before any subscriber runs, so re-runs observe the
    /// new value. Every write notifies; there is no equality gating.
    /// Writing an out-of-range array index grows the array with nulls.
    /// Keys that do not apply to the target's kind are ignored.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) {
        let key = key.into();
        match (&self.target, &key) {
            (Target::Object(obj), Key::Prop(name)) => obj.insert(name.clone(), value.into()),
            (Target::Array(arr), Key::Index(index)) => arr.set(*index, value.into()),
            _ => return,
        }
        self.runtime.trigger(self.target_id(), &key);
    }

    /// Length of an array target, tracked under the length pseudo-key.
    pub fn len(&self) -> Result<usize, Error> {
        match &self.target {
            Target::Array(arr) => {
                self.runtime.track(arr.id(), &Key::Length);
                Ok(arr.len())
            }
            Target::Object(_) => Err(Error::NotAnArray { op: "len" }),
        }
    }

    /// Append to an array target, returning the new length.
    ///
    /// Executed naively, an append performed inside a running subscriber
    /// re-enters that subscriber without bound: the append reads the
    /// length (registering a dependency) and writes it (triggering the
    /// registered subscriber, which appends again). The guard: dependency
    /// collection is paused for the whole call, so the append's internal
    /// reads register nothing, while its index and length writes still
    /// notify existing external subscribers once each.
    pub fn push(&self, value: impl Into<Value>) -> Result<usize, Error> {
        let Target::Array(arr) = &self.target else {
            return Err(Error::NotAnArray { op: "push" });
        };

        let _pause = self.runtime.pause_tracking();

        let index = arr.len();
        let new_len = arr.push(value.into());
        self.runtime.trigger(arr.id(), &Key::Index(index));
        self.runtime.trigger(arr.id(), &Key::Length);

        Ok(new_len)
    }

    /// The underlying shared node, untracked.
    ///
    /// This is the documented bypass path: reads and writes on the
    /// returned value notify nobody.
    pub fn raw(&self) -> Value {
        match &self.target {
            Target::Object(obj) => Value::Object(obj.clone()),
            Target::Array(arr) => Value::Array(arr.clone()),
        }
    }

    /// Wrap composite results lazily; pass primitives through.
    fn lift(&self, value: Value) -> ReactiveValue {
        match value {
            Value::Object(obj) => ReactiveValue::Reactive(Reactive {
                runtime: Arc::clone(&self.runtime),
                target: Target::Object(obj),
            }),
            Value::Array(arr) => ReactiveValue::Reactive(Reactive {
                runtime: Arc::clone(&self.runtime),
                target: Target::Array(arr),
            }),
            Value::Null => ReactiveValue::Null,
            Value::Bool(b) => ReactiveValue::Bool(b),
            Value::Int(i) => ReactiveValue::Int(i),
            Value::Float(f) => ReactiveValue::Float(f),
            Value::Str(s) => ReactiveValue::Str(s),
        }
    }
}

impl Clone for Reactive {
    fn clone(&self) -> Self {
        Self {
            runtime: Arc::clone(&self.runtime),
            target: match &self.target {
                Target::Object(obj) => Target::Object(obj.clone()),
                Target::Array(arr) => Target::Array(arr.clone()),
            },
        }
    }
}

impl fmt::Debug for Reactive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_object() { "object" } else { "array" };
        f.debug_struct("Reactive")
            .field("kind", &kind)
            .field("target_id", &self.target_id())
            .finish()
    }
}

/// Result of reading a property through a wrapper.
#[derive(Debug, Clone)]
pub enum ReactiveValue {
    /// Stored null.
    Null,
    /// Raw boolean.
    Bool(bool),
    /// Raw integer.
    Int(i64),
    /// Raw float.
    Float(f64),
    /// Raw string.
    Str(String),
    /// Composite value, lazily wrapped.
    Reactive(Reactive),
}

impl ReactiveValue {
    /// Whether the stored value was null.
    pub fn is_null(&self) -> bool {
        matches!(self, ReactiveValue::Null)
    }

    /// Boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ReactiveValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if any.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ReactiveValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric payload widened to `f64`, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ReactiveValue::Int(i) => Some(*i as f64),
            ReactiveValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReactiveValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Wrapped composite, if this read produced one.
    pub fn as_reactive(&self) -> Option<&Reactive> {
        match self {
            ReactiveValue::Reactive(r) => Some(r),
            _ => None,
        }
    }

    /// Consume into the wrapped composite, if this read produced one.
    pub fn into_reactive(self) -> Option<Reactive> {
        match self {
            ReactiveValue::Reactive(r) => Some(r),
            _ => None,
        }
    }

    /// Chain a read through a wrapped composite.
    ///
    /// Shorthand for `as_reactive().and_then(|r| r.get(key))`.
    pub fn get(&self, key: impl Into<Key>) -> Option<ReactiveValue> {
        self.as_reactive().and_then(|r| r.get(key))
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

    #[test]
    fn wrap_rejects_primitives() {
        let rt = Runtime::new();

        let err = rt.reactive(42i64).unwrap_err();
        assert_eq!(err, Error::NotComposite { kind: "int" });

        let err = rt.reactive("nope").unwrap_err();
        assert_eq!(err, Error::NotComposite { kind: "string" });
    }

    #[test]
    fn reads_and_writes_forward_to_the_node() {
        let rt = Runtime::new();
        let r = rt.reactive(json!({ "count": 1 })).unwrap();

        assert_eq!(r.get("count").unwrap().as_i64(), Some(1));

        r.set("count", 2);
        assert_eq!(r.get("count").unwrap().as_i64(), Some(2));

        // Writes land on the shared node itself.
        let raw = r.raw();
        assert_eq!(raw.as_object().unwrap().get("count"), Some(Value::Int(2)));
    }

    #[test]
    fn absent_keys_read_as_none() {
        let rt = Runtime::new();
        let r = rt.reactive(json!({})).unwrap();

        assert!(r.get("missing").is_none());
    }

    #[test]
    fn nested_composites_come_back_wrapped() {
        let rt = Runtime::new();
        let r = rt.reactive(json!({ "foo": { "bar": 1 } })).unwrap();

        let foo = r.get("foo").unwrap();
        let inner = foo.as_reactive().unwrap();
        assert!(inner.is_object());
        assert_eq!(inner.get("bar").unwrap().as_i64(), Some(1));

        // Chained shorthand reads the same path.
        assert_eq!(r.get("foo").unwrap().get("bar").unwrap().as_i64(), Some(1));
    }

    #[test]
    fn repeated_nested_reads_wrap_the_same_node() {
        let rt = Runtime::new();
        let r = rt.reactive(json!({ "foo": { "bar": 1 } })).unwrap();

        let first = r.get("foo").unwrap().into_reactive().unwrap();
        let second = r.get("foo").unwrap().into_reactive().unwrap();

        // Fresh wrapper each read, same underlying identity.
        assert_eq!(first.target_id(), second.target_id());
    }

    #[test]
    fn array_reads_by_index_and_length() {
        let rt = Runtime::new();
        let r = rt.reactive(json!([10, 20])).unwrap();

        assert_eq!(r.get(0usize).unwrap().as_i64(), Some(10));
        assert_eq!(r.get(1usize).unwrap().as_i64(), Some(20));
        assert_eq!(r.len().unwrap(), 2);
    }

    #[test]
    fn array_index_write_past_end_grows() {
        let rt = Runtime::new();
        let r = rt.reactive(json!([])).unwrap();

        r.set(2usize, 7);
        assert_eq!(r.len().unwrap(), 3);
        assert!(r.get(0usize).unwrap().is_null());
        assert_eq!(r.get(2usize).unwrap().as_i64(), Some(7));
    }

    #[test]
    fn push_appends_and_reports_new_length() {
        let rt = Runtime::new();
        let r = rt.reactive(json!([1])).unwrap();

        assert_eq!(r.push(2).unwrap(), 2);
        assert_eq!(r.get(1usize).unwrap().as_i64(), Some(2));
    }

    #[test]
    fn list_operations_reject_object_targets() {
        let rt = Runtime::new();
        let r = rt.reactive(json!({})).unwrap();

        assert_eq!(r.len().unwrap_err(), Error::NotAnArray { op: "len" });
        assert_eq!(r.push(1).unwrap_err(), Error::NotAnArray { op: "push" });
    }

    #[test]
    fn mismatched_keys_are_ignored() {
        let rt = Runtime::new();
        let r = rt.reactive(json!({ "x": 1 })).unwrap();

        // Index keys mean nothing to an object target.
        r.set(0usize, 9);
        assert!(r.get(0usize).is_none());
        assert_eq!(r.get("x").unwrap().as_i64(), Some(1));
    }
}
