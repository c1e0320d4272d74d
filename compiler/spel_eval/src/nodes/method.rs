//! `name(args)` invoked on the active context.
//!
//! Arguments are evaluated left to right with the root object as active
//! context. Built-in methods exist for strings, lists and objects; host
//! objects dispatch through [`HostObject::invoke`](crate::HostObject::invoke).

use smallvec::SmallVec;
use spel_ir::{Expr, MethodCall, Span};

use super::{fail, len_value, slot};
use crate::errors::{
    argument_type, arity_mismatch, index_out_of_bounds, method_not_found, not_assignable,
    null_context, EvalError,
};
use crate::{EvalResult, EvaluationState, ExpressionNode, ListRef, ObjectRef, TypedValue, Value};

type Args = SmallVec<[Value; 4]>;

fn evaluate_args(args: &[Expr], state: &mut EvaluationState) -> EvalResult<Args> {
    if args.is_empty() {
        return Ok(Args::new());
    }
    let root = state.root().clone();
    let mut scoped = state.scoped_context(root);
    args.iter()
        .map(|arg| arg.evaluate(&mut scoped).map(TypedValue::into_value))
        .collect()
}

pub(crate) fn evaluate(call: &MethodCall, span: Span, state: &mut EvaluationState) -> EvalResult {
    let name = call.name.as_str();
    let target = state.current_active_context().value().clone();
    let args = evaluate_args(&call.args, state)?;
    let result = match &target {
        Value::Null => Err(null_context(&format!("call method '{name}'"))),
        Value::Str(s) => string_method(s, name, &args),
        Value::List(list) => list_method(list, name, &args),
        Value::Object(obj) => object_method(obj, name, &args),
        Value::Host(host) => {
            tracing::trace!(method = name, host = host.type_name(), "invoking host method");
            return match host.invoke(name, &args)? {
                Some(value) => Ok(TypedValue::new(value)),
                None => Err(fail(method_not_found(name, host.type_name()), span)),
            };
        }
        other => Err(method_not_found(name, &other.type_name())),
    };
    result.map(TypedValue::new).map_err(|err| fail(err, span))
}

pub(crate) fn assign(span: Span) -> EvalResult<()> {
    Err(fail(not_assignable("a method call"), span))
}

fn arity(method: &str, args: &Args, expected: usize) -> Result<(), EvalError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(arity_mismatch(method, &expected.to_string(), args.len()))
    }
}

fn int_arg(method: &str, arg: &Value) -> Result<i64, EvalError> {
    match arg {
        Value::Int(n) => Ok(*n),
        other => Err(argument_type(method, "an int", &other.type_name())),
    }
}

fn string_method(s: &str, name: &str, args: &Args) -> Result<Value, EvalError> {
    let value = match name {
        "length" => {
            arity(name, args, 0)?;
            Value::Int(len_value(s.chars().count()))
        }
        "toUpperCase" => {
            arity(name, args, 0)?;
            Value::string(s.to_uppercase())
        }
        "toLowerCase" => {
            arity(name, args, 0)?;
            Value::string(s.to_lowercase())
        }
        "isEmpty" => {
            arity(name, args, 0)?;
            Value::Bool(s.is_empty())
        }
        "trim" => {
            arity(name, args, 0)?;
            Value::string(s.trim())
        }
        "substring" => substring(s, args)?,
        _ => return Err(method_not_found(name, "string")),
    };
    Ok(value)
}

/// `substring(begin)` or `substring(begin, end)`, in characters.
fn substring(s: &str, args: &Args) -> Result<Value, EvalError> {
    const NAME: &str = "substring";
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let (begin, end) = match args.as_slice() {
        [begin] => (int_arg(NAME, begin)?, len_value(len)),
        [begin, end] => (int_arg(NAME, begin)?, int_arg(NAME, end)?),
        _ => return Err(arity_mismatch(NAME, "1 or 2", args.len())),
    };
    // `end` may equal the length, so check it against `len + 1`
    let start = slot(begin, len + 1).ok_or_else(|| index_out_of_bounds(begin, len))?;
    let stop = slot(end, len + 1).ok_or_else(|| index_out_of_bounds(end, len))?;
    if start > stop {
        return Err(index_out_of_bounds(begin, stop));
    }
    Ok(Value::string(chars[start..stop].iter().collect::<String>()))
}

fn list_method(list: &ListRef, name: &str, args: &Args) -> Result<Value, EvalError> {
    let value = match name {
        "size" => {
            arity(name, args, 0)?;
            Value::Int(len_value(list.len()))
        }
        "isEmpty" => {
            arity(name, args, 0)?;
            Value::Bool(list.is_empty())
        }
        "get" => {
            arity(name, args, 1)?;
            let index = int_arg(name, &args[0])?;
            slot(index, list.len())
                .and_then(|i| list.get(i))
                .ok_or_else(|| index_out_of_bounds(index, list.len()))?
        }
        "contains" => {
            arity(name, args, 1)?;
            Value::Bool(list.contains(&args[0]))
        }
        _ => return Err(method_not_found(name, "list")),
    };
    Ok(value)
}

fn object_method(obj: &ObjectRef, name: &str, args: &Args) -> Result<Value, EvalError> {
    let type_name = || obj.type_name().unwrap_or_else(|| "object".to_string());
    let value = match name {
        "size" => {
            arity(name, args, 0)?;
            Value::Int(len_value(obj.len()))
        }
        "containsKey" => {
            arity(name, args, 1)?;
            match &args[0] {
                Value::Str(key) => Value::Bool(obj.contains_key(key)),
                other => return Err(argument_type(name, "a string", &other.type_name())),
            }
        }
        _ => return Err(method_not_found(name, &type_name())),
    };
    Ok(value)
}
