//! Named lookup tables for translating model vocabulary

use std::borrow::Cow;
use std::collections::HashMap;

/// Maps model terms (e.g. type names) onto target-language terms
///
/// A missing key yields a visible marker instead of an error, so the gap
/// shows up in the generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapper {
    name: String,
    mappings: HashMap<String, String>,
}

impl Mapper {
    pub fn new<K, V>(name: impl Into<String>, mappings: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            mappings: mappings
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, key: &str) -> bool {
        self.mappings.contains_key(key)
    }

    /// The mapped text, or `<! MAPPING NOT FOUND IN '<name>': <key> !>`
    pub fn get(&self, key: &str) -> Cow<'_, str> {
        match self.mappings.get(key) {
            Some(value) => Cow::Borrowed(value),
            None => {
                log::debug!("no mapping for '{}' in '{}'", key, self.name);
                Cow::Owned(format!("<! MAPPING NOT FOUND IN '{}': {} !>", self.name, key))
            }
        }
    }
}
