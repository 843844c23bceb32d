//! Graft Error Handling - Unified Encapsulated API
//!
//! Every failure surfaced by this crate is a [`GraftError`]: one struct, one
//! kind enum, full miette diagnostics. Errors are created through an
//! [`ErrorReporting`] context so that source attribution is never forgotten.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Represents source context for error reporting with explicit hierarchy
/// between real sources (preferred) and fallbacks (tolerated when necessary)
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from real file content
    /// This is the preferred method for error reporting
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Create a fallback when real source is unavailable
    /// Use only when real source cannot be obtained
    pub fn fallback(context: &str) -> Self {
        Self {
            name: "fallback".to_string(),
            content: format!("// {}", context),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::fallback("default context")
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// The single error type - no wrapper, no variants, just essential data
#[derive(Debug)]
pub struct GraftError {
    /// What went wrong (type-specific data)
    pub kind: ErrorKind,
    /// Where it happened (context-specific source information)
    pub source_info: SourceInfo,
    /// How to help (auto-populated based on context)
    pub diagnostic_info: DiagnosticInfo,
}

/// All error types as a clean enum - no duplicate fields
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// Malformed source text rejected by the parser
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    /// A literal token that matched the grammar but has no sensible value
    #[error("Syntax error: invalid {literal_type} literal '{value}'")]
    InvalidLiteral { literal_type: String, value: String },

    /// Assignment whose left-hand side is neither an identifier nor a member access
    #[error("Syntax error: invalid assignment target")]
    InvalidAssignmentTarget,

    /// A grammar rule produced a shape the tree builder does not recognize
    #[error("Syntax error: malformed {construct}")]
    MalformedConstruct { construct: String },
}

impl ErrorKind {
    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "syntax",
            Self::InvalidLiteral { .. } => "invalid_literal",
            Self::InvalidAssignmentTarget => "invalid_assignment_target",
            Self::MalformedConstruct { .. } => "malformed_construct",
        }
    }
}

/// Context-specific source information
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: String,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

impl std::error::Error for GraftError {}

impl fmt::Display for GraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Diagnostic for GraftError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

impl GraftError {
    fn primary_label(&self) -> String {
        match &self.kind {
            ErrorKind::Syntax { .. } => "invalid syntax".into(),
            ErrorKind::InvalidLiteral { .. } => "invalid literal".into(),
            ErrorKind::InvalidAssignmentTarget => "cannot assign to this".into(),
            ErrorKind::MalformedConstruct { .. } => "malformed syntax".into(),
        }
    }
}

// ============================================================================
// ERROR CREATION
// ============================================================================

/// Context-aware error creation - each context knows how to create appropriate errors
pub trait ErrorReporting {
    /// Create an error with context-appropriate enhancements
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> GraftError;

    fn syntax_error(&self, message: impl Into<String>, span: SourceSpan) -> GraftError {
        self.report(
            ErrorKind::Syntax {
                message: message.into(),
            },
            span,
        )
    }

    fn invalid_literal(&self, literal_type: &str, value: &str, span: SourceSpan) -> GraftError {
        self.report(
            ErrorKind::InvalidLiteral {
                literal_type: literal_type.into(),
                value: value.into(),
            },
            span,
        )
    }

    fn malformed_construct(&self, construct: impl Into<String>, span: SourceSpan) -> GraftError {
        self.report(
            ErrorKind::MalformedConstruct {
                construct: construct.into(),
            },
            span,
        )
    }
}

/// General-purpose error creation context used by the parsing phase
/// for creating properly contextualized GraftError instances
pub struct ParseContext {
    pub source: SourceContext,
    pub phase: String,
}

impl ParseContext {
    pub fn new(source: SourceContext) -> Self {
        Self {
            source,
            phase: "parse".into(),
        }
    }
}

impl ErrorReporting for ParseContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> GraftError {
        let error_code = format!("graft::{}::{}", self.phase, kind.code_suffix());

        GraftError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
                phase: self.phase.clone(),
            },
            diagnostic_info: DiagnosticInfo {
                help: None,
                error_code,
            },
        }
    }
}

/// Creates a placeholder span for errors not tied to a specific source code
/// location. This makes the intent of using an empty span explicit and searchable.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_kind_message() {
        let ctx = ParseContext::new(SourceContext::from_file("test.js", "let x ="));
        let err = ctx.syntax_error("unexpected end of input", unspanned());
        assert_eq!(format!("{}", err), "Syntax error: unexpected end of input");
    }

    #[test]
    fn error_code_carries_phase_and_kind() {
        let ctx = ParseContext::new(SourceContext::default());
        let err = ctx.invalid_literal("number", "0xzz", unspanned());
        assert_eq!(
            err.diagnostic_info.error_code,
            "graft::parse::invalid_literal"
        );
    }
}
