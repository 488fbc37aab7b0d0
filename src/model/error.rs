//! Error types for model navigation

use thiserror::Error;

/// Errors raised while selecting a path in a model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A segment is absent and no default was supplied
    #[error("could not find path '{path}'")]
    PathNotFound { path: String },

    /// The path cannot be navigated at all
    #[error(transparent)]
    Path(#[from] PathError),
}

impl ModelError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::PathNotFound { .. })
    }
}

/// Navigation misuse
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// Wildcard applied to a value without entries
    #[error("cannot iterate over '{path}'")]
    NotIterable { path: String },

    /// Non-integer segment used on a sequence
    #[error("sequence navigation requires integers, got '{segment}'")]
    NonIntegerIndex { segment: String },

    /// Segment applied to a scalar
    #[error("cannot lookup path '{segment}' in value '{value}'")]
    NotAContainer { segment: String, value: String },

    /// `<...>` placeholder that does not hold an identifier
    #[error("'{name}' is not a valid identifier")]
    InvalidIdentifier { name: String },

    /// `<name>` placeholder without a binding
    #[error("could not find '{name}' in bindings")]
    UnboundVariable { name: String },

    /// `key->` where `key` does not hold a string
    #[error("'{segment}' holds '{value}', which is not a reference")]
    NotAReference { segment: String, value: String },
}
