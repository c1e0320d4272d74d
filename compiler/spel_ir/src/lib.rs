//! Spel IR - syntax tree types for chained property/method expressions.
//!
//! The parser (`spel_parse`) builds these nodes and the evaluator
//! (`spel_eval`) walks them. Nothing in this crate evaluates anything:
//! it only describes the shape of an expression, where each piece came
//! from, and how to render it back to text.
//!
//! # Chains
//!
//! `a.b[0].size()` parses into one [`ExprKind::Compound`] node whose
//! [`CompoundChain`] holds four segments: property `a`, property `.b`,
//! indexer `[0]`, method `.size()`. Segments carry their own punctuation,
//! so rendering the chain concatenates the segment renderings.

mod expr;
mod span;

pub use expr::{CompoundChain, Expr, ExprKind, Literal, MethodCall, PropertyRef};
pub use span::{Span, SpanError};
