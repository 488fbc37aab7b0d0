//! Indentation-aware text templates
//!
//! A template is plain text with `{expression}` slots. Preprocessing strips
//! the indentation the text picks up from surrounding code, and every value
//! substituted into a slot inherits the indentation of the slot's line.
//!
//! # Example
//!
//! ```text
//! x:
//!   {items}
//! ```
//!
//! With `items = [1, 2]` this renders `x:\n  1\n  2`.

mod compile;
mod error;
mod render;
mod scope;
mod text;
mod value;

pub use compile::{Slot, Template};
pub use error::{EvalError, RenderError, TemplateSyntaxError};
pub use scope::{FromArgs, Function, Scope};
pub use text::{dedent, indent_newlines, leading_whitespace, normalize};
pub use value::Value;
