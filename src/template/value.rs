//! Values produced by slot evaluation

use std::fmt;

use crate::model::{Kind, ModelNode, RawValue};

/// What a slot evaluates to
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Renders as nothing; dropped entirely from lists
    #[default]
    Absent,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Node(ModelNode),
    List(Vec<Value>),
}

impl Value {
    /// Absent values, including model nodes holding null
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Absent => true,
            Value::Node(node) => node.is_null(),
            _ => false,
        }
    }

    /// Elements of a list-like value: lists, sequence nodes and wildcard
    /// expansions
    pub fn items(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.clone()),
            Value::Node(node) if node.kind() == Kind::Sequence => {
                Some(node.children().into_iter().map(Value::Node).collect())
            }
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&ModelNode> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Node(node) => node.as_str(),
            _ => None,
        }
    }

    /// Text substituted for a scalar slot
    pub fn to_text(&self) -> String {
        match self {
            Value::Absent => String::new(),
            Value::Text(s) => s.clone(),
            Value::Node(node) if node.is_null() => String::new(),
            other => other.to_raw().to_string(),
        }
    }

    /// Plain data view, as used for selection defaults
    pub fn to_raw(&self) -> RawValue {
        match self {
            Value::Absent => RawValue::Null,
            Value::Text(s) => RawValue::String(s.clone()),
            Value::Int(n) => RawValue::Int(*n),
            Value::Float(x) => RawValue::Float(*x),
            Value::Bool(b) => RawValue::Bool(*b),
            Value::Node(node) => node.to_raw(),
            Value::List(items) => RawValue::Sequence(items.iter().map(Value::to_raw).collect()),
        }
    }

    /// Short description used in error messages
    pub(crate) fn describe(&self) -> String {
        match self {
            Value::Absent => "none".to_string(),
            Value::Node(node) => format!("{} node '{}'", node.kind(), node.name()),
            other => other.to_text(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(Value::Float(n as f64), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<ModelNode> for Value {
    fn from(node: ModelNode) -> Self {
        Value::Node(node)
    }
}

impl From<&ModelNode> for Value {
    fn from(node: &ModelNode) -> Self {
        Value::Node(node.clone())
    }
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Null => Value::Absent,
            RawValue::Bool(b) => Value::Bool(b),
            RawValue::Int(n) => Value::Int(n),
            RawValue::Float(x) => Value::Float(x),
            RawValue::String(s) => Value::Text(s),
            RawValue::Sequence(items) => {
                Value::List(items.iter().cloned().map(Value::from).collect())
            }
            container @ RawValue::Mapping(_) => Value::Node(ModelNode::new("value", container)),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
