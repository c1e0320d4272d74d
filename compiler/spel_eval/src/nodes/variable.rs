//! `#name` references.
//!
//! `#this` is the innermost active context and `#root` the root object;
//! both are read-only. Every other name is a variable binding in the state.

use spel_ir::Span;

use super::fail;
use crate::errors::{not_assignable, undefined_variable};
use crate::{EvalResult, EvaluationState, TypedValue};

const THIS: &str = "this";
const ROOT: &str = "root";

pub(crate) fn evaluate(name: &str, span: Span, state: &EvaluationState) -> EvalResult {
    match name {
        THIS => Ok(state.current_active_context().clone()),
        ROOT => Ok(state.root().clone()),
        _ => state
            .lookup_variable(name)
            .cloned()
            .ok_or_else(|| fail(undefined_variable(name), span)),
    }
}

pub(crate) fn assign(
    name: &str,
    span: Span,
    state: &mut EvaluationState,
    value: TypedValue,
) -> EvalResult<()> {
    if !is_assignable(name) {
        return Err(fail(not_assignable(&format!("#{name}")), span));
    }
    state.set_variable(name, value);
    Ok(())
}

pub(crate) fn is_assignable(name: &str) -> bool {
    !matches!(name, THIS | ROOT)
}
