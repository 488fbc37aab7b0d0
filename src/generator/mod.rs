//! Named generators that render their templates into text
//!
//! A generator owns a set of compiled templates and a body. The body picks
//! the template to render, binds values into a [`Scope`] and returns the
//! text, or `None` when there is nothing to produce. Failures inside the
//! body come out of [`Generator::call`] as a [`TemplateError`] naming the
//! generator and pointing at the failing template line.
//!
//! ```
//! use slotgen::{generator, ModelNode, Scope};
//!
//! let color = generator("gen_color")
//!     .template("main", "color: {select('properties/color')}")
//!     .body(|ctx, component: &ModelNode| {
//!         ctx.render("main", &Scope::new().with_model(component.clone()))
//!     })
//!     .expect("templates compile");
//!
//! let component = ModelNode::new(
//!     "componentA",
//!     slotgen::Mapping::from_iter([(
//!         "properties",
//!         slotgen::RawValue::from(slotgen::Mapping::from_iter([("color", "blue")])),
//!     )]),
//! );
//! assert_eq!(color.call(&component).unwrap(), Some("color: blue".to_string()));
//! ```

mod failure;
mod registry;

pub use failure::{Failure, GeneratorError};
pub use registry::{OutputRegistry, RegistryError, Rendered};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, Excerpt, SourceLocation, TemplateError};
use crate::model::ModelNode;
use crate::template::{dedent, normalize, EvalError, RenderError, Scope, Slot, Template, Value};

/// What a generator produces: text, or nothing at all
pub type Output = Option<String>;

type Body<I> = dyn Fn(&Context<'_>, &I) -> Result<Output, Failure> + Send + Sync;

/// Start defining a generator
#[track_caller]
pub fn generator(name: impl Into<String>) -> GeneratorBuilder {
    GeneratorBuilder::new(name)
}

struct Compiled {
    template: Template,
    /// Where `.template(..)` was called
    location: SourceLocation,
}

struct Definition {
    name: String,
    location: SourceLocation,
    templates: HashMap<String, Compiled>,
}

struct Inner<I> {
    definition: Definition,
    body: Box<Body<I>>,
}

/// A named, reusable text generator taking `I` as input
pub struct Generator<I = ModelNode> {
    inner: Arc<Inner<I>>,
}

impl<I> Clone for Generator<I> {
    fn clone(&self) -> Self {
        Generator {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I> fmt::Debug for Generator<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let definition = &self.inner.definition;
        let mut templates: Vec<&str> = definition.templates.keys().map(String::as_str).collect();
        templates.sort_unstable();
        f.debug_struct("Generator")
            .field("name", &definition.name)
            .field("location", &definition.location)
            .field("templates", &templates)
            .finish()
    }
}

impl Generator {
    /// Start defining a generator; same as [`generator`]
    ///
    /// The builder's [`body`](GeneratorBuilder::body) decides the input type.
    #[track_caller]
    pub fn new(name: impl Into<String>) -> GeneratorBuilder {
        GeneratorBuilder::new(name)
    }
}

impl<I> Generator<I> {
    pub fn name(&self) -> &str {
        &self.inner.definition.name
    }

    /// Where the generator was defined
    pub fn location(&self) -> SourceLocation {
        self.inner.definition.location
    }

    pub fn template(&self, key: &str) -> Option<&Template> {
        self.inner
            .definition
            .templates
            .get(key)
            .map(|compiled| &compiled.template)
    }

    /// Run the generator
    ///
    /// Text output is dedented; `None` passes through.
    pub fn call(&self, input: &I) -> Result<Output, TemplateError> {
        let definition = &self.inner.definition;
        log::debug!("calling generator '{}'", definition.name);

        let context = Context { definition };
        match (self.inner.body)(&context, input) {
            Ok(output) => Ok(output.map(|text| dedent(&text))),
            Err(failure) => {
                let err = definition.enrich(failure);
                log::debug!("generator '{}' failed: {}", definition.name, err.message());
                Err(err)
            }
        }
    }
}

/// Collects templates before the body is attached
pub struct GeneratorBuilder {
    name: String,
    location: SourceLocation,
    templates: HashMap<String, Compiled>,
    error: Option<TemplateError>,
}

impl GeneratorBuilder {
    #[track_caller]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: SourceLocation::caller(),
            templates: HashMap::new(),
            error: None,
        }
    }

    /// Compile `source` and register it under `key`
    ///
    /// The first compile failure is reported by [`body`](Self::body).
    #[track_caller]
    pub fn template(mut self, key: impl Into<String>, source: &str) -> Self {
        let location = SourceLocation::caller();
        let key = key.into();
        if self.error.is_some() {
            return self;
        }

        if self.templates.contains_key(&key) {
            let err = GeneratorError::DuplicateTemplate { key };
            self.error = Some(TemplateError::new(&self.name, location, None, None, Box::new(err)));
            return self;
        }

        match Template::parse(source) {
            Ok(template) => {
                self.templates.insert(key, Compiled { template, location });
            }
            Err(err) => {
                let index = err.line() - 1;
                let excerpt = Excerpt {
                    template: key,
                    source: normalize(source),
                    line: index,
                    span: err.span(),
                };
                let location = location.offset(usize::from(source.starts_with('\n')) + index);
                self.error = Some(TemplateError::new(
                    &self.name,
                    location,
                    None,
                    Some(excerpt),
                    Box::new(err),
                ));
            }
        }
        self
    }

    /// Attach the body, finishing the generator
    pub fn body<I, R, F>(self, body: F) -> Result<Generator<I>, TemplateError>
    where
        I: 'static,
        R: Into<Output>,
        F: Fn(&Context<'_>, &I) -> Result<R, Failure> + Send + Sync + 'static,
    {
        if let Some(err) = self.error {
            return Err(err);
        }

        log::debug!(
            "defined generator '{}' at {} with {} template(s)",
            self.name,
            self.location,
            self.templates.len()
        );
        Ok(Generator {
            inner: Arc::new(Inner {
                definition: Definition {
                    name: self.name,
                    location: self.location,
                    templates: self.templates,
                },
                body: Box::new(move |ctx: &Context<'_>, input: &I| body(ctx, input).map(Into::into)),
            }),
        })
    }
}

/// Access to a generator's templates from inside its body
pub struct Context<'g> {
    definition: &'g Definition,
}

impl Context<'_> {
    /// Name of the running generator
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn template(&self, key: &str) -> Result<&Template, Failure> {
        self.definition
            .templates
            .get(key)
            .map(|compiled| &compiled.template)
            .ok_or_else(|| {
                GeneratorError::MissingTemplate {
                    key: key.to_string(),
                }
                .into()
            })
    }

    /// Render the template `key` against `scope`
    pub fn render(&self, key: &str, scope: &Scope<'_>) -> Result<String, Failure> {
        self.template(key)?
            .render_scope(scope)
            .map_err(|error| Failure::Render {
                template: key.to_string(),
                error,
            })
    }

    /// Render the template `key`, answering each slot with `eval`
    pub fn render_with<F, E>(&self, key: &str, eval: F) -> Result<String, Failure>
    where
        F: FnMut(&Slot) -> Result<Value, E>,
        E: Into<BoxError>,
    {
        self.template(key)?
            .render(eval)
            .map_err(|error| Failure::Render {
                template: key.to_string(),
                error,
            })
    }
}

impl Definition {
    fn enrich(&self, failure: Failure) -> TemplateError {
        match failure {
            Failure::Enriched(err) => err,
            Failure::Render { template, error } => self.enrich_render(&template, error),
            Failure::Model(err) => self.at_definition(Box::new(err)),
            Failure::Generator(err) => self.at_definition(Box::new(err)),
            Failure::Other(err) => match err.downcast::<TemplateError>() {
                Ok(nested) => *nested,
                Err(err) => self.at_definition(err),
            },
        }
    }

    fn at_definition(&self, cause: BoxError) -> TemplateError {
        TemplateError::new(&self.name, self.location, None, None, cause)
    }

    /// Point a slot failure at its template line
    fn enrich_render(&self, key: &str, error: RenderError) -> TemplateError {
        let RenderError {
            line, span, source, ..
        } = error;

        // Slot closures may answer with a body failure
        let source: BoxError = match source.downcast::<Failure>() {
            Ok(failure) => match *failure {
                Failure::Enriched(nested) => return nested,
                Failure::Other(other) => other,
                other => Box::new(other),
            },
            Err(source) => source,
        };

        let mut function = None;
        let cause: BoxError = match source.downcast::<EvalError>() {
            Ok(eval) => match *eval {
                EvalError::Nested(nested) => return *nested,
                EvalError::Function { name, source } => {
                    function = Some(name);
                    source
                }
                other => Box::new(other),
            },
            Err(source) => match source.downcast::<TemplateError>() {
                Ok(nested) => return *nested,
                Err(source) => source,
            },
        };

        let index = line.saturating_sub(1);
        match self.templates.get(key) {
            Some(compiled) => {
                let location = compiled
                    .location
                    .offset(compiled.template.first_line_offset() + index);
                let excerpt = Excerpt {
                    template: key.to_string(),
                    source: compiled.template.source().to_string(),
                    line: index,
                    span,
                };
                TemplateError::new(&self.name, location, function, Some(excerpt), cause)
            }
            None => TemplateError::new(&self.name, self.location, function, None, cause),
        }
    }
}
