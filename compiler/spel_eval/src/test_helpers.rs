//! Shared helpers for unit tests.

use std::fmt::Debug;

use spel_ir::Expr;

use crate::{EvalError, EvalFailure, EvalResult, EvaluationState, ExpressionNode, Value};

pub(crate) fn parse(source: &str) -> Expr {
    match spel_parse::parse(source) {
        Ok(expr) => expr,
        Err(err) => panic!("failed to parse `{source}`: {err}"),
    }
}

pub(crate) fn ok<T>(result: EvalResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("unexpected failure: {err}"),
    }
}

/// The domain error inside `result`; panics on success or a host error.
pub(crate) fn domain_error<T: Debug>(result: EvalResult<T>) -> EvalError {
    match result {
        Err(EvalFailure::Eval(err)) => err,
        Err(EvalFailure::Host(err)) => panic!("expected a domain error, got host error: {err}"),
        Ok(value) => panic!("expected a domain error, got {value:?}"),
    }
}

/// Parse and evaluate `source`, returning the plain value.
pub(crate) fn eval(source: &str, state: &mut EvaluationState) -> Value {
    ok(parse(source).evaluate(state)).into_value()
}
