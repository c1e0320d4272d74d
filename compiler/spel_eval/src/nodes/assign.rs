use spel_ir::{Expr, Span};

use super::fail;
use crate::errors::not_assignable;
use crate::{EvalResult, EvaluationState, ExpressionNode};

/// Evaluate `value` in the current context, store it through `target` and
/// yield it.
pub(crate) fn evaluate(target: &Expr, value: &Expr, state: &mut EvaluationState) -> EvalResult {
    let value = value.evaluate(state)?;
    target.assign(state, value.clone())?;
    Ok(value)
}

pub(crate) fn assign(span: Span) -> EvalResult<()> {
    Err(fail(not_assignable("an assignment"), span))
}
