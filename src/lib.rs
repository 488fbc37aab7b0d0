//! slotgen - generate text artifacts from a hierarchical model
//!
//! This library provides a path query engine over tree-shaped models, an
//! indentation-aware template renderer and named generators that compose
//! templates into whole files.
//!
//! # Example
//!
//! ```rust
//! use slotgen::{generator, ModelNode, RawValue, Scope};
//!
//! let model: RawValue = serde_json::from_str(r#"{"a": {"x": 1, "y": 2}}"#).unwrap();
//! let model = ModelNode::new("model", model);
//!
//! let pair = generator("pair")
//!     .template("main", "{select('/a/x')}-{select('/a/y')}")
//!     .body(|ctx, model: &ModelNode| {
//!         ctx.render("main", &Scope::new().with_model(model.clone()))
//!     })
//!     .unwrap();
//!
//! assert_eq!(pair.call(&model).unwrap().as_deref(), Some("1-2"));
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod mapper;
pub mod model;
pub mod parser;
pub mod template;

pub use config::{Config, ConfigError, Notice};
pub use error::{Excerpt, ExprError, SourceLocation, TemplateError};
pub use generator::{
    generator, Context, Failure, Generator, GeneratorBuilder, GeneratorError, Output,
    OutputRegistry, RegistryError, Rendered,
};
pub use mapper::Mapper;
pub use model::{Bindings, Kind, Mapping, ModelError, ModelNode, PathError, RawValue};
pub use template::{EvalError, RenderError, Scope, Template, TemplateSyntaxError, Value};

use thiserror::Error;

/// Errors a host can meet while producing its outputs
#[derive(Debug, Error)]
pub enum Error {
    /// A generator failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether the failure happened while generating text
    pub fn is_generation_error(&self) -> bool {
        matches!(self, Error::Template(_))
    }
}

/// Render template source once against `scope`
///
/// Convenience for one-off templates outside a generator; failures are
/// reported as a [`TemplateError`] from an anonymous generator.
///
/// # Example
///
/// ```rust
/// use slotgen::{render, Scope};
///
/// let text = render("\n    x:\n      {items}\n", &Scope::new().with("items", vec![1, 2])).unwrap();
/// assert_eq!(text, "x:\n  1\n  2");
/// ```
#[track_caller]
pub fn render(source: &str, scope: &Scope<'_>) -> Result<String, Error> {
    let location = SourceLocation::caller();
    let template = Template::parse(source).map_err(|err| {
        let excerpt = Excerpt {
            template: "template".to_string(),
            source: template::normalize(source),
            line: err.line() - 1,
            span: err.span(),
        };
        TemplateError::new("<template>", location, None, Some(excerpt), Box::new(err))
    })?;

    template.render_scope(scope).map_err(|err| {
        let excerpt = Excerpt {
            template: "template".to_string(),
            source: template.source().to_string(),
            line: err.line.saturating_sub(1),
            span: err.span.clone(),
        };
        TemplateError::new("<template>", location, None, Some(excerpt), Box::new(err)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_list_slot() {
        let scope = Scope::new().with("items", vec!["a", "b"]);
        let text = render("- {items}", &scope).expect("Should render");
        assert_eq!(text, "- a\nb");
    }

    #[test]
    fn test_render_unknown_variable() {
        let err = render("{missing}", &Scope::new()).expect_err("Should fail");
        assert!(err.is_generation_error());
        let Error::Template(err) = err else {
            panic!("Should be a template error");
        };
        assert!(err.message().contains("unknown variable 'missing'"));
        assert_eq!(err.excerpt().map(|e| e.line), Some(0));
    }

    #[test]
    fn test_render_syntax_error() {
        let err = render("\n  a\n  b {\n", &Scope::new()).expect_err("Should fail");
        assert!(err.to_string().contains("b { <- unclosed '{' on line 2, column 3"));
    }

    #[test]
    fn test_registry_error_is_not_generation_error() {
        let err = Error::from(RegistryError::DuplicateOutput {
            id: "out".to_string(),
        });
        assert!(!err.is_generation_error());
        assert_eq!(err.to_string(), "output 'out' is already registered");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: Error = Config::from_str("ref_prefix = [").expect_err("Should fail").into();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }
}
