//! Deferred outputs, rendered together on demand

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::config::Config;
use crate::error::TemplateError;

use super::{Generator, Output};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("output '{id}' is already registered")]
    DuplicateOutput { id: String },
}

type Job = Box<dyn FnOnce() -> Result<Output, TemplateError> + Send>;

struct Entry {
    id: String,
    preamble: Option<String>,
    job: Job,
}

/// One drained output
#[derive(Debug)]
pub struct Rendered {
    pub id: String,
    /// Preamble followed by the generator's text
    pub result: Result<String, TemplateError>,
}

/// Outputs waiting to be rendered, keyed by an identifier (usually a file name)
#[derive(Default)]
pub struct OutputRegistry {
    entries: Vec<Entry>,
    ids: HashSet<String>,
    default_preamble: Option<String>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose outputs start with the configured notice
    pub fn with_config(config: &Config) -> Self {
        Self {
            default_preamble: config.preamble(),
            ..Self::default()
        }
    }

    /// Queue `generator` to run on `input` when the registry is drained
    ///
    /// `preamble` replaces the configured one for this output.
    pub fn register<I>(
        &mut self,
        id: impl Into<String>,
        generator: &Generator<I>,
        input: I,
        preamble: Option<String>,
    ) -> Result<(), RegistryError>
    where
        I: Send + 'static,
    {
        let id = id.into();
        if !self.ids.insert(id.clone()) {
            return Err(RegistryError::DuplicateOutput { id });
        }

        log::debug!("registered output '{}' from generator '{}'", id, generator.name());
        let generator = generator.clone();
        self.entries.push(Entry {
            id,
            preamble,
            job: Box::new(move || generator.call(&input)),
        });
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered identifiers, in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.id.as_str())
    }

    /// Render every registered output in registration order, emptying the
    /// registry
    ///
    /// A failing output does not stop the others.
    pub fn drain(&mut self) -> Vec<Rendered> {
        self.ids.clear();
        let entries = std::mem::take(&mut self.entries);
        log::debug!("rendering {} output(s)", entries.len());

        entries
            .into_iter()
            .map(|Entry { id, preamble, job }| {
                let result = job().map(|output| {
                    let mut text = preamble
                        .or_else(|| self.default_preamble.clone())
                        .unwrap_or_default();
                    text.push_str(&output.unwrap_or_default());
                    text
                });
                if let Err(err) = &result {
                    log::warn!("output '{}' failed: {}", id, err.message());
                }
                Rendered { id, result }
            })
            .collect()
    }
}

impl fmt::Debug for OutputRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputRegistry")
            .field("ids", &self.ids().collect::<Vec<_>>())
            .field("default_preamble", &self.default_preamble)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Notice;
    use crate::generator::generator;
    use crate::template::Scope;
    use pretty_assertions::assert_eq;

    fn echo() -> Generator<String> {
        generator("echo")
            .template("main", "value: {v}")
            .body(|ctx, v: &String| ctx.render("main", &Scope::new().with("v", v)))
            .expect("Should build")
    }

    #[test]
    fn test_drain_in_registration_order() {
        let gen = echo();
        let mut registry = OutputRegistry::new();
        registry.register("b.txt", &gen, "2".to_string(), None).expect("ok");
        registry.register("a.txt", &gen, "1".to_string(), None).expect("ok");
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["b.txt", "a.txt"]);

        let rendered = registry.drain();
        let texts: Vec<(&str, &str)> = rendered
            .iter()
            .map(|r| (r.id.as_str(), r.result.as_deref().expect("ok")))
            .collect();
        assert_eq!(texts, vec![("b.txt", "value: 2"), ("a.txt", "value: 1")]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let gen = echo();
        let mut registry = OutputRegistry::new();
        registry.register("out", &gen, "1".to_string(), None).expect("ok");
        let err = registry
            .register("out", &gen, "2".to_string(), None)
            .expect_err("Should reject");
        assert_eq!(err, RegistryError::DuplicateOutput { id: "out".to_string() });
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_preamble_from_config_and_override() {
        let gen = echo();
        let config = Config::new().with_notice(Notice::new("#").with_text("generated"));
        let mut registry = OutputRegistry::with_config(&config);
        registry.register("default", &gen, "1".to_string(), None).expect("ok");
        registry
            .register("custom", &gen, "2".to_string(), Some("// custom\n".to_string()))
            .expect("ok");

        let rendered = registry.drain();
        assert_eq!(rendered[0].result.as_deref().expect("ok"), "# generated\n\nvalue: 1");
        assert_eq!(rendered[1].result.as_deref().expect("ok"), "// custom\nvalue: 2");
    }

    #[test]
    fn test_failure_does_not_stop_other_outputs() {
        let failing = generator("failing")
            .body(|_, _: &String| -> Result<String, crate::generator::Failure> { Err("boom".into()) })
            .expect("Should build");
        let gen = echo();
        let mut registry = OutputRegistry::new();
        registry.register("bad", &failing, String::new(), None).expect("ok");
        registry.register("good", &gen, "1".to_string(), None).expect("ok");

        let rendered = registry.drain();
        assert_eq!(rendered[0].result.as_ref().expect_err("Should fail").message(), "boom");
        assert_eq!(rendered[1].result.as_deref().expect("ok"), "value: 1");
    }
}
