//! Parse errors.

use spel_ir::{Span, SpanError};

/// Error produced while turning source text into an expression tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unrecognized input `{text}`")]
    InvalidToken { text: String, span: Span },

    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        span: Span,
    },

    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str, span: Span },

    #[error("expression source is too large: {0}")]
    SourceTooLarge(#[from] SpanError),
}

impl ParseError {
    /// Location of the offending input.
    pub fn span(&self) -> Span {
        match self {
            ParseError::InvalidToken { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEnd { span, .. } => *span,
            ParseError::SourceTooLarge(_) => Span::DUMMY,
        }
    }
}
