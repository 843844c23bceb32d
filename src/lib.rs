pub use crate::errors::{ErrorKind, ErrorReporting, GraftError, SourceContext};

pub mod ast;
pub mod convert;
pub mod errors;
pub mod syntax;

pub use crate::ast::NodeRef;
pub use crate::convert::{to_nodes, to_nodes_named, to_text};
