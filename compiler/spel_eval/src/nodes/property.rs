//! Property access on the active context.

use spel_ir::{PropertyRef, Span};

use super::{fail, field_value, len_value};
use crate::errors::{null_context, property_not_found, read_only_property};
use crate::{EvalResult, EvaluationState, TypedValue, Value};

/// Read-only pseudo-property of a built-in container.
fn pseudo_property(value: &Value, name: &str) -> Option<i64> {
    match (value, name) {
        (Value::List(list), "size") => Some(len_value(list.len())),
        (Value::Str(s), "length") => Some(len_value(s.chars().count())),
        _ => None,
    }
}

pub(crate) fn evaluate(prop: &PropertyRef, span: Span, state: &EvaluationState) -> EvalResult {
    let name = prop.name.as_str();
    let context = state.current_active_context().value();
    match context {
        Value::Null => Err(fail(null_context(&format!("read property '{name}'")), span)),
        Value::Object(obj) => obj
            .field(name)
            .map(field_value)
            .ok_or_else(|| fail(property_not_found(name, &context.type_name()), span)),
        Value::Host(host) => match host.read(name)? {
            Some(value) => Ok(TypedValue::new(value)),
            None => Err(fail(property_not_found(name, host.type_name()), span)),
        },
        other => pseudo_property(other, name)
            .map(|n| TypedValue::new(Value::Int(n)))
            .ok_or_else(|| fail(property_not_found(name, &other.type_name()), span)),
    }
}

pub(crate) fn assign(
    prop: &PropertyRef,
    span: Span,
    state: &EvaluationState,
    value: TypedValue,
) -> EvalResult<()> {
    let name = prop.name.as_str();
    let context = state.current_active_context().value();
    let written = match context {
        Value::Null => {
            return Err(fail(null_context(&format!("write property '{name}'")), span));
        }
        Value::Object(obj) => obj.set(name, value.into_value()),
        Value::Host(host) => host.write(name, value.into_value())?,
        other if pseudo_property(other, name).is_some() => false,
        other => return Err(fail(property_not_found(name, &other.type_name()), span)),
    };
    if written {
        Ok(())
    } else {
        Err(fail(read_only_property(name, &context.type_name()), span))
    }
}

/// Never mutates the context.
pub(crate) fn is_assignable(prop: &PropertyRef, state: &EvaluationState) -> EvalResult<bool> {
    let name = prop.name.as_str();
    match state.current_active_context().value() {
        Value::Object(obj) => Ok(obj.is_writable(name)),
        Value::Host(host) => Ok(host.can_write(name)?),
        _ => Ok(false),
    }
}
