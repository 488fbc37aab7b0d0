//! Error types for template compilation and evaluation

use thiserror::Error;

use crate::error::{BoxError, ExprError, Span, TemplateError};
use crate::model::ModelError;

/// Malformed slot braces in a template
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateSyntaxError {
    /// `{` without a matching `}` on the same line
    #[error("unclosed '{{' on line {line}, column {column}")]
    Unclosed {
        line: usize,
        column: usize,
        span: Span,
    },

    /// `}` outside of a slot
    #[error("unmatched '}}' on line {line}, column {column}")]
    StrayClose {
        line: usize,
        column: usize,
        span: Span,
    },
}

impl TemplateSyntaxError {
    /// One-based line of the offending brace
    pub fn line(&self) -> usize {
        match self {
            TemplateSyntaxError::Unclosed { line, .. }
            | TemplateSyntaxError::StrayClose { line, .. } => *line,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TemplateSyntaxError::Unclosed { span, .. }
            | TemplateSyntaxError::StrayClose { span, .. } => span.clone(),
        }
    }
}

/// A slot that failed to evaluate
#[derive(Debug, Error)]
#[error("cannot render slot '{{{expr}}}' on line {line}: {source}")]
pub struct RenderError {
    /// Expression text between the braces
    pub expr: String,
    /// One-based line of the slot in the normalized template
    pub line: usize,
    /// Byte range of the slot in the normalized template
    pub span: Span,
    #[source]
    pub source: BoxError,
}

/// Errors raised while evaluating a slot expression against a scope
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid expression: {0}")]
    Syntax(#[from] ExprError),

    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    /// Built-in model function used without a model in scope
    #[error("'{function}' needs a model in scope")]
    NoModel { function: String },

    #[error("unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("unknown method '{name}'")]
    UnknownMethod { name: String },

    #[error("'{function}' takes {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: String,
        found: usize,
    },

    #[error("'{function}' expects {expected}, got '{found}'")]
    ArgumentType {
        function: String,
        expected: &'static str,
        found: String,
    },

    #[error("'{found}' is not a model node")]
    NotANode { found: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    /// A scope function failed
    #[error("{source}")]
    Function {
        name: String,
        #[source]
        source: BoxError,
    },

    /// A generator called from a slot failed; already enriched
    #[error(transparent)]
    Nested(Box<TemplateError>),
}

impl EvalError {
    /// Classify an error returned by the scope function `name`
    pub(crate) fn from_function(name: &str, err: BoxError) -> Self {
        match err.downcast::<TemplateError>() {
            Ok(nested) => EvalError::Nested(nested),
            Err(err) => match err.downcast::<EvalError>() {
                Ok(eval) => *eval,
                Err(source) => EvalError::Function {
                    name: name.to_string(),
                    source,
                },
            },
        }
    }

    pub(crate) fn arity(function: &str, expected: &str, found: usize) -> Self {
        EvalError::Arity {
            function: function.to_string(),
            expected: expected.to_string(),
            found,
        }
    }
}
