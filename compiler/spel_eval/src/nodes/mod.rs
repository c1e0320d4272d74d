//! Leaf node semantics for parsed trees.
//!
//! Each submodule implements one `ExprKind` variant as free functions taking
//! the node payload, its span and the evaluation state. Errors raised here
//! carry the node's own span; an enclosing compound may overwrite it.

pub(crate) mod assign;
pub(crate) mod indexer;
pub(crate) mod literal;
pub(crate) mod method;
pub(crate) mod property;
pub(crate) mod variable;

use spel_ir::Span;

use crate::errors::{EvalError, EvalFailure};
use crate::{Field, TypedValue};

/// Attach `span` to a domain error.
#[inline]
fn fail(err: EvalError, span: Span) -> EvalFailure {
    EvalFailure::Eval(err.with_span(span))
}

/// Value of an object field, typed by its declaration when it has one.
fn field_value(field: Field) -> TypedValue {
    match field.declared {
        Some(ty) => TypedValue::with_type(field.value, ty),
        None => TypedValue::new(field.value),
    }
}

/// Length as an expression-level integer.
#[inline]
fn len_value(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Position `index` inside a sequence of `len` items, if it is one.
fn slot(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|&i| i < len)
}
