//! Spel Parse - turns expression source text into a `spel_ir::Expr` tree.
//!
//! Lexing is done up front with `logos`; parsing is plain recursive descent
//! guarded by `spel_stack::ensure_sufficient_stack`, so pathological nesting
//! such as `((((...))))` grows the stack instead of overflowing it.

mod error;
mod lexer;
mod parser;

pub use error::ParseError;

use spel_ir::{Expr, Span};

/// Parse `source` into an expression tree.
///
/// Spans in the returned tree are byte offsets into `source`.
#[tracing::instrument(level = "trace", skip_all, fields(len = source.len()))]
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = lexer::lex(source)?;
    let eof = Span::try_from_range(source.len()..source.len())?.end;
    let expr = parser::Parser::new(tokens, eof).parse_complete()?;
    tracing::trace!(rendered = %expr, "parsed expression");
    Ok(expr)
}

#[cfg(test)]
mod tests;
