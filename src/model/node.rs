//! Immutable model views and path selection

use std::fmt;
use std::sync::Arc;

use super::error::{ModelError, PathError};
use super::path::{segments, Bindings, Segment, DEREF_MARKER};
use super::value::{Kind, RawValue};
use crate::config::Config;

/// Prefix marking a string value as a path into the model
pub const DEFAULT_REF_PREFIX: &str = "#";

/// Top-level document shared by every node selected from it
#[derive(Debug)]
struct Document {
    name: String,
    value: RawValue,
}

#[derive(Debug, Clone)]
enum Content {
    Raw(RawValue),
    /// Result of a final `*` segment
    Expansion(Arc<[ModelNode]>),
}

/// A named, immutable view on a piece of a model
///
/// Every node remembers the document it was selected from, so absolute
/// paths (`/a/b`) resolve against the same root wherever they are issued.
#[derive(Clone)]
pub struct ModelNode {
    name: String,
    content: Content,
    ref_prefix: Arc<str>,
    root: Arc<Document>,
}

impl ModelNode {
    /// Wrap a document using the default `#` reference prefix
    pub fn new(name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        Self::with_ref_prefix(name, value, DEFAULT_REF_PREFIX)
    }

    pub fn with_ref_prefix(
        name: impl Into<String>,
        value: impl Into<RawValue>,
        ref_prefix: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let value = value.into();
        let root = Arc::new(Document {
            name: name.clone(),
            value: value.clone(),
        });
        let ref_prefix: String = ref_prefix.into();
        ModelNode {
            name,
            content: Content::Raw(value),
            ref_prefix: ref_prefix.into(),
            root,
        }
    }

    /// Wrap a document using the reference prefix from `config`
    pub fn from_config(name: impl Into<String>, value: impl Into<RawValue>, config: &Config) -> Self {
        Self::with_ref_prefix(name, value, config.ref_prefix.as_str())
    }

    fn child(&self, name: impl Into<String>, value: RawValue) -> ModelNode {
        ModelNode {
            name: name.into(),
            content: Content::Raw(value),
            ref_prefix: self.ref_prefix.clone(),
            root: self.root.clone(),
        }
    }

    fn expansion(&self, children: Vec<ModelNode>) -> ModelNode {
        ModelNode {
            name: "*".to_string(),
            content: Content::Expansion(children.into()),
            ref_prefix: self.ref_prefix.clone(),
            root: self.root.clone(),
        }
    }

    /// Same content under another name
    pub fn renamed(&self, name: impl Into<String>) -> ModelNode {
        ModelNode {
            name: name.into(),
            ..self.clone()
        }
    }

    /// The document this node was selected from
    pub fn root(&self) -> ModelNode {
        ModelNode {
            name: self.root.name.clone(),
            content: Content::Raw(self.root.value.clone()),
            ref_prefix: self.ref_prefix.clone(),
            root: self.root.clone(),
        }
    }

    /// Whether both nodes were selected from the same document
    pub fn same_root(&self, other: &ModelNode) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    pub fn ref_prefix(&self) -> &str {
        &self.ref_prefix
    }

    fn strip_ref_prefix<'p>(&self, path: &'p str) -> Option<&'p str> {
        if self.ref_prefix.is_empty() {
            return None;
        }
        path.strip_prefix(&*self.ref_prefix)
    }

    // Selection

    pub fn select(&self, path: &str) -> Result<ModelNode, ModelError> {
        self.select_with(path, &Bindings::new(), None)
    }

    /// Select `path`, falling back to `default` when a segment is missing
    pub fn select_or(&self, path: &str, default: impl Into<RawValue>) -> Result<ModelNode, ModelError> {
        self.select_with(path, &Bindings::new(), Some(default.into()))
    }

    /// Select `path`, substituting `<name>` segments from `bindings`
    pub fn select_with(
        &self,
        path: &str,
        bindings: &Bindings,
        default: Option<RawValue>,
    ) -> Result<ModelNode, ModelError> {
        log::trace!("select '{}' from '{}'", path, self.name);

        let mut path = path;
        if let Some(rest) = self.strip_ref_prefix(path) {
            if let Some(target) = rest.strip_suffix(DEREF_MARKER) {
                return self.select_with(target, bindings, default);
            }
            path = rest;
        }

        let mut traversed = Vec::new();
        let start = match path.strip_prefix('/') {
            Some(rest) => {
                path = rest;
                traversed.push(String::new());
                self.root()
            }
            None => self.clone(),
        };
        let path = path.strip_suffix('/').unwrap_or(path);
        if path.is_empty() {
            return Ok(start);
        }

        start.walk(&segments(path), bindings, default, traversed)
    }

    fn walk(
        self,
        segments: &[Segment<'_>],
        bindings: &Bindings,
        default: Option<RawValue>,
        mut traversed: Vec<String>,
    ) -> Result<ModelNode, ModelError> {
        let mut current = self;

        for segment in segments {
            match *segment {
                Segment::Wildcard => {
                    let children = current.wildcard_children().ok_or_else(|| PathError::NotIterable {
                        path: traversed.join("/"),
                    })?;
                    traversed.push("*".to_string());
                    current = current.expansion(children);
                }
                Segment::Key(key) => {
                    traversed.push(key.to_string());
                    match current.step(key)? {
                        Some(next) => current = next,
                        None => return current.missing(&traversed, default),
                    }
                }
                Segment::Deref(key) => {
                    traversed.push(key.to_string());
                    current = match current.step(key)? {
                        Some(reference) => current.follow(key, &reference, bindings, default.clone())?,
                        None => return current.missing(&traversed, default),
                    };
                }
                Segment::Variable { name, deref } => {
                    let value = bindings.resolve(name)?;
                    traversed.push(value.to_string());
                    // A bound reference is already the target; `->` adds nothing
                    if is_reference_text(&current.ref_prefix, value) {
                        current = current.select_with(value, bindings, default.clone())?;
                        continue;
                    }
                    let target = match current.step(value)? {
                        Some(next) => next,
                        None => return current.missing(&traversed, default),
                    };
                    current = if deref {
                        current.follow(value, &target, bindings, default.clone())?
                    } else {
                        target
                    };
                }
            }
        }

        Ok(current)
    }

    /// Resolve the reference held by `reference` from this container
    fn follow(
        &self,
        segment: &str,
        reference: &ModelNode,
        bindings: &Bindings,
        default: Option<RawValue>,
    ) -> Result<ModelNode, ModelError> {
        let Some(target) = reference.as_str() else {
            return Err(PathError::NotAReference {
                segment: segment.to_string(),
                value: reference.to_string(),
            }
            .into());
        };
        self.select_with(target, bindings, default)
    }

    fn missing(&self, traversed: &[String], default: Option<RawValue>) -> Result<ModelNode, ModelError> {
        let name = traversed.last().cloned().unwrap_or_default();
        match default {
            Some(value) => Ok(self.child(name, value)),
            None => Err(ModelError::not_found(traversed.join("/"))),
        }
    }

    /// One navigation step; `Ok(None)` when the key or index is absent
    fn step(&self, segment: &str) -> Result<Option<ModelNode>, PathError> {
        let value = match &self.content {
            Content::Expansion(children) => {
                let found = resolve_index(segment, children.len())?;
                return Ok(found.map(|i| children[i].renamed(segment)));
            }
            Content::Raw(value) => value,
        };

        match value {
            RawValue::Mapping(map) => Ok(map.get(segment).map(|v| self.child(segment, v.clone()))),
            RawValue::Sequence(items) => {
                let found = resolve_index(segment, items.len())?;
                Ok(found.map(|i| self.child(segment, items[i].clone())))
            }
            RawValue::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let found = resolve_index(segment, chars.len())?;
                Ok(found.map(|i| self.child(segment, RawValue::String(chars[i].to_string()))))
            }
            other => Err(PathError::NotAContainer {
                segment: segment.to_string(),
                value: other.to_string(),
            }),
        }
    }

    fn wildcard_children(&self) -> Option<Vec<ModelNode>> {
        match &self.content {
            Content::Expansion(children) => Some(
                children
                    .iter()
                    .enumerate()
                    .map(|(i, child)| child.renamed(i.to_string()))
                    .collect(),
            ),
            Content::Raw(RawValue::Mapping(map)) => Some(
                map.iter()
                    .map(|(key, value)| self.child(key, value.clone()))
                    .collect(),
            ),
            Content::Raw(RawValue::Sequence(items)) => Some(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, value)| self.child(i.to_string(), value.clone()))
                    .collect(),
            ),
            Content::Raw(_) => None,
        }
    }

    // Predicates

    /// Whether `path` resolves; any model error answers `false`
    pub fn has(&self, path: &str) -> bool {
        self.has_with(path, &Bindings::new())
    }

    pub fn has_with(&self, path: &str, bindings: &Bindings) -> bool {
        self.select_with(path, bindings, None).is_ok()
    }

    /// Whether the value at `path` is a string starting with the ref-prefix
    pub fn is_reference(&self, path: &str) -> Result<bool, ModelError> {
        self.is_reference_with(path, &Bindings::new())
    }

    pub fn is_reference_with(&self, path: &str, bindings: &Bindings) -> Result<bool, ModelError> {
        Ok(self.select_with(path, bindings, None)?.holds_reference())
    }

    /// Whether this node itself holds a reference
    pub fn holds_reference(&self) -> bool {
        self.as_str()
            .is_some_and(|s| is_reference_text(&self.ref_prefix, s))
    }

    /// Whether `path` resolves to `true` or a non-zero integer
    pub fn is_enabled(&self, path: &str) -> bool {
        self.is_enabled_with(path, &Bindings::new())
    }

    pub fn is_enabled_with(&self, path: &str, bindings: &Bindings) -> bool {
        self.select_with(path, bindings, None)
            .map(|node| node.enabled())
            .unwrap_or(false)
    }

    /// Whether this node itself is `true` or a non-zero integer
    pub fn enabled(&self) -> bool {
        match self.raw() {
            Some(RawValue::Bool(b)) => *b,
            Some(RawValue::Int(n)) => *n != 0,
            _ => false,
        }
    }

    // Accessors

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        match &self.content {
            Content::Raw(value) => value.kind(),
            Content::Expansion(_) => Kind::Sequence,
        }
    }

    /// The wrapped value, unless this node is a wildcard expansion
    pub fn raw(&self) -> Option<&RawValue> {
        match &self.content {
            Content::Raw(value) => Some(value),
            Content::Expansion(_) => None,
        }
    }

    pub fn is_expansion(&self) -> bool {
        matches!(self.content, Content::Expansion(_))
    }

    /// The content as a plain value; an expansion becomes a sequence
    pub fn to_raw(&self) -> RawValue {
        match &self.content {
            Content::Raw(value) => value.clone(),
            Content::Expansion(children) => {
                RawValue::Sequence(children.iter().map(ModelNode::to_raw).collect())
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.raw().and_then(RawValue::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.raw().and_then(RawValue::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.raw().and_then(RawValue::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.raw().and_then(RawValue::as_bool)
    }

    pub fn is_null(&self) -> bool {
        self.raw().is_some_and(RawValue::is_null)
    }

    /// Number of entries, elements or characters
    pub fn len(&self) -> Option<usize> {
        match &self.content {
            Content::Expansion(children) => Some(children.len()),
            Content::Raw(RawValue::Mapping(map)) => Some(map.len()),
            Content::Raw(RawValue::Sequence(items)) => Some(items.len()),
            Content::Raw(RawValue::String(s)) => Some(s.chars().count()),
            Content::Raw(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Mapping keys in insertion order
    pub fn keys(&self) -> Vec<&str> {
        match &self.content {
            Content::Raw(RawValue::Mapping(map)) => map.keys().collect(),
            _ => Vec::new(),
        }
    }

    /// Child nodes of a mapping, sequence or expansion
    pub fn children(&self) -> Vec<ModelNode> {
        self.wildcard_children().unwrap_or_default()
    }

    pub fn iter(&self) -> std::vec::IntoIter<ModelNode> {
        self.children().into_iter()
    }
}

fn is_reference_text(prefix: &str, value: &str) -> bool {
    !prefix.is_empty() && value.starts_with(prefix)
}

/// Map a possibly negative index onto `0..len`
fn resolve_index(segment: &str, len: usize) -> Result<Option<usize>, PathError> {
    let index: i64 = segment.parse().map_err(|_| PathError::NonIntegerIndex {
        segment: segment.to_string(),
    })?;
    let resolved = if index < 0 {
        i64::try_from(len).ok().map(|len| len + index)
    } else {
        Some(index)
    };
    Ok(resolved
        .and_then(|i| usize::try_from(i).ok())
        .filter(|&i| i < len))
}

impl<'a> IntoIterator for &'a ModelNode {
    type Item = ModelNode;
    type IntoIter = std::vec::IntoIter<ModelNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for ModelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelNode")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("value", &self.to_raw())
            .finish()
    }
}

impl fmt::Display for ModelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.content {
            Content::Raw(value) => fmt::Display::fmt(value, f),
            Content::Expansion(_) => fmt::Display::fmt(&self.to_raw(), f),
        }
    }
}

impl PartialEq for ModelNode {
    fn eq(&self, other: &Self) -> bool {
        self.to_raw() == other.to_raw()
    }
}

impl PartialEq<RawValue> for ModelNode {
    fn eq(&self, other: &RawValue) -> bool {
        match self.raw() {
            Some(value) => value == other,
            None => &self.to_raw() == other,
        }
    }
}

impl PartialEq<&str> for ModelNode {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<i64> for ModelNode {
    fn eq(&self, other: &i64) -> bool {
        self.as_i64() == Some(*other)
    }
}

impl PartialEq<bool> for ModelNode {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}
