//! Source <-> tree conversion
//!
//! The two high-level entry points of the crate. [`to_nodes`] parses source
//! text into fully linked top-level statement trees and [`to_text`] renders
//! trees back into source text. Round-tripping preserves structure and
//! literal spellings, not incidental whitespace.

use crate::ast::{parentize, NodeKind, NodeRef};
use crate::errors::{GraftError, SourceContext};
use crate::syntax;

/// Parses `source_text` into its top-level statements. Each returned tree is
/// fully parent-linked and rooted at the statement itself, so statements can
/// be rearranged, spliced, and dropped independently of one another.
pub fn to_nodes(source_text: &str) -> Result<Vec<NodeRef>, GraftError> {
    to_nodes_named(source_text, SourceContext::from_file("<input>", source_text))
}

/// [`to_nodes`] with an explicit source context for diagnostics, typically
/// built with [`SourceContext::from_file`].
pub fn to_nodes_named(
    source_text: &str,
    context: SourceContext,
) -> Result<Vec<NodeRef>, GraftError> {
    let program = syntax::parse(source_text, context)?;
    let body = match &program.borrow().kind {
        NodeKind::Program { body } => body.clone(),
        _ => Vec::new(),
    };
    for statement in &body {
        parentize(statement);
    }
    Ok(body)
}

/// Renders trees back into source text, one top-level statement per line
/// group. Literals annotated with their original spelling come back exactly
/// as written.
pub fn to_text(nodes: &[NodeRef]) -> String {
    nodes
        .iter()
        .map(syntax::generate)
        .collect::<Vec<_>>()
        .join("\n")
}
