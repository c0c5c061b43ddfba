// Dynamic value tree that receives decoded documents.
//
// The decoder only ever calls `set_key` and `set_index`; the read accessors
// exist for callers, tests and the CLI.

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// String-keyed map that preserves insertion order.
///
/// Assigning an existing key replaces its value in place, keeping the
/// original position.
#[derive(Debug, Clone, Default)]
pub struct Map {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the previous value for `key`, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        if let Some(&slot) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// Recursively nestable tagged value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Undef,
    Int(i64),
    Float(f64),
    /// Byte string; not required to be UTF-8.
    Bytes(Vec<u8>),
    Map(Map),
    /// Dense, index-keyed array.
    Array(Vec<Value>),
}

impl Value {
    /// Assign `value` at string `key`.
    ///
    /// A node that is not already a map is replaced by an empty map first.
    pub fn set_key(&mut self, key: impl Into<String>, value: Value) {
        if !matches!(self, Value::Map(_)) {
            *self = Value::Map(Map::new());
        }
        if let Value::Map(map) = self {
            map.insert(key, value);
        }
    }

    /// Assign `value` at `index`, padding with `Undef` up to it.
    ///
    /// A node that is not already an array is replaced by an empty array
    /// first.
    pub fn set_index(&mut self, index: usize, value: Value) {
        if !matches!(self, Value::Array(_)) {
            *self = Value::Array(Vec::new());
        }
        if let Value::Array(items) = self {
            if index >= items.len() {
                items.resize(index + 1, Value::Undef);
            }
            items[index] = value;
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(items) => items.get(index),
            _ => None,
        }
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, Value::Undef)
    }

    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Byte string as UTF-8, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Number of children for containers, byte length for strings, 0
    /// otherwise.
    pub fn len(&self) -> usize {
        match self {
            Value::Map(map) => map.len(),
            Value::Array(items) => items.len(),
            Value::Bytes(b) => b.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undef => "undef",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bytes(_) => "bytes",
            Value::Map(_) => "map",
            Value::Array(_) => "array",
        }
    }

    /// Render as JSON. Byte strings become JSON strings when they are
    /// valid UTF-8 and lowercase hex otherwise.
    #[cfg(feature = "cli")]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Undef => Json::Null,
            Value::Int(v) => Json::from(*v),
            Value::Float(v) => Json::from(*v),
            Value::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) => Json::String(s.to_owned()),
                Err(_) => Json::String(to_hex(b)),
            },
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_json()))
                    .collect(),
            ),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
        }
    }

    /// Build a tree from JSON. Integers map to `Int`, other numbers to
    /// `Float`, booleans to `Int(0|1)`, null to `Undef`.
    #[cfg(feature = "cli")]
    pub fn from_json(json: &serde_json::Value) -> Value {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Undef,
            Json::Bool(b) => Value::Int(i64::from(*b)),
            Json::Number(n) => match n.as_i64() {
                Some(v) => Value::Int(v),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::from(s.as_str()),
            Json::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
            Json::Object(obj) => Value::Map(
                obj.iter()
                    .map(|(k, v)| (k.as_str(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(feature = "cli")]
pub(crate) fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Bytes(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
