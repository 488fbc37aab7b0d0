//! Raw hierarchical data wrapped by model nodes

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

/// The declared kind of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Sequence,
    Mapping,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Sequence => "sequence",
            Kind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

/// A unit of hierarchical data
///
/// Containers are reference counted, so cloning a value never copies the
/// tree underneath it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Arc<[RawValue]>),
    Mapping(Arc<Mapping>),
}

impl RawValue {
    /// The declared kind of this value
    pub fn kind(&self) -> Kind {
        match self {
            RawValue::Null => Kind::Null,
            RawValue::Bool(_) => Kind::Bool,
            RawValue::Int(_) => Kind::Int,
            RawValue::Float(_) => Kind::Float,
            RawValue::String(_) => Kind::String,
            RawValue::Sequence(_) => Kind::Sequence,
            RawValue::Mapping(_) => Kind::Mapping,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RawValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value of an int or float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Int(n) => Some(*n as f64),
            RawValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[RawValue]> {
        match self {
            RawValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            RawValue::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for RawValue {
    /// Strings print bare; everything else prints in flow form
    /// (`[1, "a"]`, `{"k": true}`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::String(s) => f.write_str(s),
            other => write_flow(other, f),
        }
    }
}

fn write_flow(value: &RawValue, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        RawValue::Null => f.write_str("null"),
        RawValue::Bool(b) => write!(f, "{}", b),
        RawValue::Int(n) => write!(f, "{}", n),
        RawValue::Float(x) => write!(f, "{:?}", x),
        RawValue::String(s) => write!(f, "{:?}", s),
        RawValue::Sequence(items) => {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_flow(item, f)?;
            }
            f.write_str("]")
        }
        RawValue::Mapping(map) => {
            f.write_str("{")?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{:?}: ", key)?;
                write_flow(item, f)?;
            }
            f.write_str("}")
        }
    }
}

/// String-keyed mapping that remembers insertion order
///
/// Keys are unique: inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    entries: Vec<(String, RawValue)>,
    index: HashMap<String, usize>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Option<RawValue> {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for Mapping {
    /// Mappings are equal when they hold the same entries, in any order
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Mapping::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Int(n)
    }
}

impl From<i32> for RawValue {
    fn from(n: i32) -> Self {
        RawValue::Int(n.into())
    }
}

impl From<u32> for RawValue {
    fn from(n: u32) -> Self {
        RawValue::Int(n.into())
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        RawValue::Float(x)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::String(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::String(s)
    }
}

impl From<Mapping> for RawValue {
    fn from(map: Mapping) -> Self {
        RawValue::Mapping(Arc::new(map))
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(items: Vec<T>) -> Self {
        RawValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Null, Into::into)
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawValueVisitor)
    }
}

struct RawValueVisitor;

impl<'de> Visitor<'de> for RawValueVisitor {
    type Value = RawValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a boolean, a number, a string, a sequence or a mapping")
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<RawValue, E> {
        Ok(RawValue::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<RawValue, E> {
        Ok(RawValue::Int(n))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<RawValue, E> {
        Ok(i64::try_from(n).map_or(RawValue::Float(n as f64), RawValue::Int))
    }

    fn visit_f64<E: de::Error>(self, x: f64) -> Result<RawValue, E> {
        Ok(RawValue::Float(x))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<RawValue, E> {
        Ok(RawValue::String(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<RawValue, E> {
        Ok(RawValue::String(s))
    }

    fn visit_none<E: de::Error>(self) -> Result<RawValue, E> {
        Ok(RawValue::Null)
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawValue, E> {
        Ok(RawValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RawValue, D::Error> {
        RawValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<RawValue>()? {
            items.push(item);
        }
        Ok(RawValue::Sequence(items.into()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawValue, A::Error> {
        let mut map = Mapping::new();
        while let Some((key, value)) = access.next_entry::<String, RawValue>()? {
            map.insert(key, value);
        }
        Ok(RawValue::Mapping(Arc::new(map)))
    }
}
