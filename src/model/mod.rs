//! Hierarchical models and the path language used to query them

mod error;
mod node;
mod path;
mod value;

pub use error::{ModelError, PathError};
pub use node::{ModelNode, DEFAULT_REF_PREFIX};
pub use path::{is_identifier, segments, Bindings, Segment, DEREF_MARKER, WILDCARD};
pub use value::{Kind, Mapping, RawValue};
