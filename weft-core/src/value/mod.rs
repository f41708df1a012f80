//! Dynamic Value Model
//!
//! This module defines the plain data layer the reactive system observes:
//! a JSON-like value enum whose composite variants (objects and arrays) are
//! shared, identity-carrying nodes.
//!
//! # Identity
//!
//! The dependency store correlates subscribers with `(target, key)` pairs,
//! where "target" means a specific composite node, not its contents. Every
//! composite node is stamped with a [`TargetId`] from an atomic counter at
//! creation; cloning a [`Value`] clones the `Arc` and therefore preserves
//! identity. Ids are monotonic for the life of the process, so a node that
//! is dropped and whose memory is reused can never alias an older store
//! entry.
//!
//! # Raw access
//!
//! [`ObjectRef`] and [`ArrayRef`] expose plain, uninstrumented reads and
//! writes. Mutating through a raw ref never notifies subscribers; only the
//! reactive wrapper layer does. This is deliberate: a nested value pulled
//! out *without* passing through a wrapper read is invisible to the
//! dependency store.

mod convert;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

/// Unique identity of an observable target.
///
/// Allocated for every composite node and for each computed value's
/// synthetic self-handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(u64);

impl TargetId {
    /// Allocate a fresh, never-before-used id.
    pub fn fresh() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

struct ObjectNode {
    id: TargetId,
    entries: RwLock<IndexMap<String, Value>>,
}

struct ArrayNode {
    id: TargetId,
    items: RwLock<Vec<Value>>,
}

/// Shared handle to a record-like value.
///
/// Cloning the handle shares the underlying node; field order follows
/// insertion order.
#[derive(Clone)]
pub struct ObjectRef {
    node: Arc<ObjectNode>,
}

impl ObjectRef {
    /// Create a new, empty object node.
    pub fn new() -> Self {
        Self {
            node: Arc::new(ObjectNode {
                id: TargetId::fresh(),
                entries: RwLock::new(IndexMap::new()),
            }),
        }
    }

    /// Identity of the underlying node.
    pub fn id(&self) -> TargetId {
        self.node.id
    }

    /// Read a field, cloning the stored value out.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.node.entries.read().get(key).cloned()
    }

    /// Write a field. Inserting a new key appends it in iteration order.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.node.entries.write().insert(key.into(), value.into());
    }

    /// Whether a field with this name exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.node.entries.read().contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.node.entries.read().len()
    }

    /// Whether the object has no fields.
    pub fn is_empty(&self) -> bool {
        self.node.entries.read().is_empty()
    }

    /// Field names in iteration order.
    pub fn keys(&self) -> Vec<String> {
        self.node.entries.read().keys().cloned().collect()
    }

    /// Snapshot of all entries in iteration order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.node
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.node.id == other.node.id
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("id", &self.node.id)
            .field("len", &self.len())
            .finish()
    }
}

/// Shared handle to an ordered list value.
#[derive(Clone)]
pub struct ArrayRef {
    node: Arc<ArrayNode>,
}

impl ArrayRef {
    /// Create a new, empty array node.
    pub fn new() -> Self {
        Self {
            node: Arc::new(ArrayNode {
                id: TargetId::fresh(),
                items: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Identity of the underlying node.
    pub fn id(&self) -> TargetId {
        self.node.id
    }

    /// Read an element, cloning the stored value out.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.node.items.read().get(index).cloned()
    }

    /// Write an element. Indices past the end grow the list with nulls.
    pub fn set(&self, index: usize, value: impl Into<Value>) {
        let mut items = self.node.items.write();
        if index >= items.len() {
            items.resize(index + 1, Value::Null);
        }
        items[index] = value.into();
    }

    /// Append an element, returning the new length.
    pub fn push(&self, value: impl Into<Value>) -> usize {
        let mut items = self.node.items.write();
        items.push(value.into());
        items.len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.node.items.read().len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.node.items.read().is_empty()
    }

    /// Snapshot of all elements.
    pub fn items(&self) -> Vec<Value> {
        self.node.items.read().clone()
    }
}

impl Default for ArrayRef {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ArrayRef {
    fn eq(&self, other: &Self) -> bool {
        self.node.id == other.node.id
    }
}

impl Eq for ArrayRef {}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayRef")
            .field("id", &self.node.id)
            .field("len", &self.len())
            .finish()
    }
}

/// A dynamic value: the data the reactive system observes.
///
/// Primitives are stored inline. Composites are shared nodes, so cloning a
/// `Value` yields another handle to the same object or array.
#[derive(Clone)]
pub enum Value {
    /// Absent-but-present value, also used to pad grown arrays.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Owned string.
    Str(String),
    /// Record-like composite.
    Object(ObjectRef),
    /// Ordered-list composite.
    Array(ArrayRef),
}

impl Value {
    /// Whether this value is a composite (object or array) and can be
    /// wrapped by the interception layer.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Array(_))
    }

    /// Short kind name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
        }
    }

    /// Identity of the underlying node, for composites.
    pub fn target_id(&self) -> Option<TargetId> {
        match self {
            Value::Object(obj) => Some(obj.id()),
            Value::Array(arr) => Some(arr.id()),
            _ => None,
        }
    }

    /// Boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if any.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric payload widened to `f64`, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Object handle, if this value is an object.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Array handle, if this value is an array.
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }
}

/// Primitives compare structurally; composites compare by node identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Object(obj) => obj.fmt(f),
            Value::Array(arr) => arr.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_ids_are_unique() {
        let a = ObjectRef::new();
        let b = ObjectRef::new();
        let c = ArrayRef::new();

        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn object_clone_shares_node() {
        let obj = ObjectRef::new();
        let alias = obj.clone();

        alias.insert("x", 1i64);

        assert_eq!(obj.get("x"), Some(Value::Int(1)));
        assert_eq!(obj.id(), alias.id());
    }

    #[test]
    fn cloned_value_preserves_identity() {
        let obj = ObjectRef::new();
        let v1 = Value::Object(obj.clone());
        let v2 = v1.clone();

        assert_eq!(v1, v2);
        assert_eq!(v2.target_id(), Some(obj.id()));
    }

    #[test]
    fn distinct_nodes_with_same_shape_are_not_equal() {
        let a = ObjectRef::new();
        let b = ObjectRef::new();
        a.insert("x", 1i64);
        b.insert("x", 1i64);

        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn array_set_past_end_pads_with_null() {
        let arr = ArrayRef::new();
        arr.set(2, 7i64);

        assert_eq!(arr.len(), 3);
        assert_eq!(arr.get(0), Some(Value::Null));
        assert_eq!(arr.get(1), Some(Value::Null));
        assert_eq!(arr.get(2), Some(Value::Int(7)));
    }

    #[test]
    fn array_push_returns_new_length() {
        let arr = ArrayRef::new();
        assert_eq!(arr.push(1i64), 1);
        assert_eq!(arr.push(2i64), 2);
        assert_eq!(arr.items(), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn object_keys_follow_insertion_order() {
        let obj = ObjectRef::new();
        obj.insert("b", 1i64);
        obj.insert("a", 2i64);
        obj.insert("c", 3i64);

        assert_eq!(obj.keys(), vec!["b", "a", "c"]);
    }
}
