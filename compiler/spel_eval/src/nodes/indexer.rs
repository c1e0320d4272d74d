//! `[index]` applied to the active context.
//!
//! The index expression is evaluated with the root object as its active
//! context, so `list[#this.size]` looks at the root rather than the list.

use spel_ir::{Expr, Span};

use super::{fail, field_value, slot};
use crate::errors::{
    cannot_index, index_out_of_bounds, invalid_index, null_context, property_not_found,
    read_only_property,
};
use crate::{EvalResult, EvaluationState, ExpressionNode, TypedValue, Value};

fn evaluate_index(index: &Expr, state: &mut EvaluationState) -> EvalResult<Value> {
    let root = state.root().clone();
    let mut scoped = state.scoped_context(root);
    index.evaluate(&mut scoped).map(TypedValue::into_value)
}

pub(crate) fn evaluate(index: &Expr, span: Span, state: &mut EvaluationState) -> EvalResult {
    let target = state.current_active_context().value().clone();
    let key = evaluate_index(index, state)?;
    match (&target, &key) {
        (Value::Null, _) => Err(fail(null_context("index"), span)),
        (Value::List(list), Value::Int(i)) => slot(*i, list.len())
            .and_then(|i| list.get(i))
            .map(TypedValue::new)
            .ok_or_else(|| fail(index_out_of_bounds(*i, list.len()), span)),
        (Value::Str(s), Value::Int(i)) => {
            let len = s.chars().count();
            slot(*i, len)
                .and_then(|i| s.chars().nth(i))
                .map(|c| TypedValue::new(Value::string(c.to_string())))
                .ok_or_else(|| fail(index_out_of_bounds(*i, len), span))
        }
        (Value::List(_) | Value::Str(_), other) => {
            Err(fail(invalid_index("an int", &other.type_name()), span))
        }
        (Value::Object(obj), Value::Str(name)) => obj
            .field(name)
            .map(field_value)
            .ok_or_else(|| fail(property_not_found(name, &target.type_name()), span)),
        (Value::Host(host), Value::Str(name)) => match host.read(name)? {
            Some(value) => Ok(TypedValue::new(value)),
            None => Err(fail(property_not_found(name, host.type_name()), span)),
        },
        (Value::Object(_) | Value::Host(_), other) => {
            Err(fail(invalid_index("a string", &other.type_name()), span))
        }
        (other, _) => Err(fail(cannot_index(&other.type_name()), span)),
    }
}

pub(crate) fn assign(
    index: &Expr,
    span: Span,
    state: &mut EvaluationState,
    value: TypedValue,
) -> EvalResult<()> {
    let target = state.current_active_context().value().clone();
    let key = evaluate_index(index, state)?;
    match (&target, &key) {
        (Value::Null, _) => Err(fail(null_context("index"), span)),
        (Value::List(list), Value::Int(i)) => {
            let len = list.len();
            match slot(*i, len) {
                Some(at) if list.set(at, value.into_value()) => Ok(()),
                _ => Err(fail(index_out_of_bounds(*i, len), span)),
            }
        }
        (Value::List(_), other) => Err(fail(invalid_index("an int", &other.type_name()), span)),
        (Value::Object(obj), Value::Str(name)) => {
            if obj.set(name, value.into_value()) {
                Ok(())
            } else {
                Err(fail(read_only_property(name, &target.type_name()), span))
            }
        }
        (Value::Host(host), Value::Str(name)) => {
            if host.write(name, value.into_value())? {
                Ok(())
            } else {
                Err(fail(read_only_property(name, host.type_name()), span))
            }
        }
        (Value::Object(_) | Value::Host(_), other) => {
            Err(fail(invalid_index("a string", &other.type_name()), span))
        }
        (other, _) => Err(fail(cannot_index(&other.type_name()), span)),
    }
}

/// Never mutates the target. The index expression itself is still evaluated.
pub(crate) fn is_assignable(index: &Expr, state: &mut EvaluationState) -> EvalResult<bool> {
    let target = state.current_active_context().value().clone();
    let key = evaluate_index(index, state)?;
    Ok(match (&target, &key) {
        (Value::List(list), Value::Int(i)) => slot(*i, list.len()).is_some(),
        (Value::Object(obj), Value::Str(name)) => obj.is_writable(name),
        (Value::Host(host), Value::Str(name)) => host.can_write(name)?,
        _ => false,
    })
}
