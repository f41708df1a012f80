//! Conversions between [`Value`] and host types.
//!
//! Targets are usually built from `serde_json::Value` (the `json!` macro is
//! the most convenient constructor), and a value tree can be exported back
//! out the same way. Exporting walks the shared nodes; a cyclic value tree
//! is the caller's responsibility, exactly as it is for `serde_json`.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::{ArrayRef, ObjectRef, Value};

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<ArrayRef> for Value {
    fn from(arr: ArrayRef) -> Self {
        Value::Array(arr)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        let arr = ArrayRef::new();
        for item in items {
            arr.push(item);
        }
        Value::Array(arr)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Null
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                let arr = ArrayRef::new();
                for item in items {
                    arr.push(Value::from(item));
                }
                Value::Array(arr)
            }
            serde_json::Value::Object(map) => {
                let obj = ObjectRef::new();
                for (key, item) in map {
                    obj.insert(key, Value::from(item));
                }
                Value::Object(obj)
            }
        }
    }
}

impl Value {
    /// Export the value tree as `serde_json::Value`.
    ///
    /// Non-finite floats become `null`, as they have no JSON representation.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Object(obj) => {
                let mut map = serde_json::Map::new();
                for (key, item) in obj.entries() {
                    map.insert(key, item.to_json());
                }
                serde_json::Value::Object(map)
            }
            Value::Array(arr) => {
                serde_json::Value::Array(arr.items().iter().map(Value::to_json).collect())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Object(obj) => {
                let entries = obj.entries();
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in &entries {
                    map.serialize_entry(key, item)?;
                }
                map.end()
            }
            Value::Array(arr) => {
                let items = arr.items();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in &items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
