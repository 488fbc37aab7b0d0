//! Path expression segments and variable bindings

use std::collections::HashMap;

use super::error::PathError;

/// Marker that turns a segment into a dereference: `parent->`
pub const DEREF_MARKER: &str = "->";

/// Final segment that expands a container into its children
pub const WILDCARD: &str = "*";

/// One `/`-separated piece of a path expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'p> {
    /// Mapping key or sequence index
    Key(&'p str),
    /// `*` in final position
    Wildcard,
    /// `<name>` or `<name>->`
    Variable { name: &'p str, deref: bool },
    /// `key->`
    Deref(&'p str),
}

/// Split a path (already stripped of prefix, leading and trailing `/`)
/// into segments.
///
/// A `*` anywhere but the last position is an ordinary key.
pub fn segments(path: &str) -> Vec<Segment<'_>> {
    let parts: Vec<&str> = path.split('/').collect();
    let last = parts.len() - 1;
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| classify(part, i == last))
        .collect()
}

fn classify(part: &str, is_last: bool) -> Segment<'_> {
    if part == WILDCARD {
        return if is_last {
            Segment::Wildcard
        } else {
            Segment::Key(part)
        };
    }

    if let Some(inner) = part.strip_prefix('<') {
        if let Some(close) = inner.find('>') {
            let name = &inner[..close];
            match &inner[close + 1..] {
                "" => return Segment::Variable { name, deref: false },
                DEREF_MARKER => return Segment::Variable { name, deref: true },
                _ => {}
            }
        }
    }

    match part.strip_suffix(DEREF_MARKER) {
        Some(key) => Segment::Deref(key),
        None => Segment::Key(part),
    }
}

/// Check for an identifier token: a letter or `_` followed by letters,
/// digits or `_`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Values substituted for `<name>` path segments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: HashMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding (builder form)
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up the value substituted for a `<name>` segment
    pub fn resolve(&self, name: &str) -> Result<&str, PathError> {
        if !is_identifier(name) {
            return Err(PathError::InvalidIdentifier {
                name: name.to_string(),
            });
        }
        self.get(name).ok_or_else(|| PathError::UnboundVariable {
            name: name.to_string(),
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut bindings = Bindings::new();
        for (name, value) in iter {
            bindings.insert(name, value);
        }
        bindings
    }
}
