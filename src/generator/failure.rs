//! Failures raised inside generator bodies

use std::fmt;

use thiserror::Error;

use crate::error::{BoxError, TemplateError};
use crate::model::ModelError;
use crate::template::{EvalError, RenderError};

/// Misuse of a generator's own definition
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeneratorError {
    #[error("generator has no template '{key}'")]
    MissingTemplate { key: String },

    #[error("template '{key}' is defined twice")]
    DuplicateTemplate { key: String },
}

/// Anything a generator body can fail with
///
/// Turned into a [`TemplateError`] at the generator boundary; a failure that
/// already is one crosses the boundary unchanged.
#[derive(Debug, Error)]
pub enum Failure {
    /// Raised by a nested generator
    #[error(transparent)]
    Enriched(#[from] TemplateError),

    /// A slot of the template `template` failed
    #[error("{error}")]
    Render {
        template: String,
        #[source]
        error: RenderError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("{0}")]
    Other(#[source] BoxError),
}

impl Failure {
    /// Wrap any user error
    pub fn other(err: impl Into<BoxError>) -> Self {
        Failure::Other(err.into())
    }
}

impl From<EvalError> for Failure {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::Nested(nested) => Failure::Enriched(*nested),
            EvalError::Model(err) => Failure::Model(err),
            other => Failure::Other(Box::new(other)),
        }
    }
}

impl From<fmt::Error> for Failure {
    fn from(err: fmt::Error) -> Self {
        Failure::Other(Box::new(err))
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::Other(message.into())
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure::Other(message.into())
    }
}
