//! Slot substitution

use crate::error::BoxError;

use super::compile::{Piece, Slot, Template};
use super::error::RenderError;
use super::scope::Scope;
use super::text::{dedent, indent_newlines};
use super::value::Value;

impl Template {
    /// Render by asking `eval` for the value of every slot
    pub fn render<F, E>(&self, mut eval: F) -> Result<String, RenderError>
    where
        F: FnMut(&Slot) -> Result<Value, E>,
        E: Into<BoxError>,
    {
        let mut out = String::with_capacity(self.source().len());
        for piece in self.pieces() {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Slot(slot) => {
                    let value = eval(slot).map_err(|err| RenderError {
                        expr: slot.expr().to_string(),
                        line: slot.line(),
                        span: slot.span(),
                        source: err.into(),
                    })?;
                    log::trace!("slot '{{{}}}' -> {:?}", slot.expr(), value);
                    put(&mut out, &value, slot.indent());
                }
            }
        }
        Ok(out)
    }

    /// Render with slot expressions evaluated against `scope`
    pub fn render_scope(&self, scope: &Scope<'_>) -> Result<String, RenderError> {
        self.render(|slot| scope.eval_slot(slot))
    }
}

/// Substitute `value` for a slot whose line starts with `indent`
fn put(out: &mut String, value: &Value, indent: &str) {
    if let Some(items) = value.items() {
        let separator = format!("\n{}", indent);
        let rendered: Vec<String> = items
            .iter()
            .filter(|item| !item.is_absent())
            .map(|item| indent_newlines(&dedent(&item.to_text()), indent))
            .collect();
        out.push_str(&rendered.join(&separator));
    } else if !value.is_absent() {
        out.push_str(&indent_newlines(&value.to_text(), indent));
    }
}
