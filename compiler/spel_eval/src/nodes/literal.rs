use spel_ir::{Literal, Span};

use super::fail;
use crate::errors::not_assignable;
use crate::{EvalResult, TypedValue, Value};

pub(crate) fn evaluate(lit: &Literal) -> TypedValue {
    let value = match lit {
        Literal::Null => return TypedValue::NULL,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(n) => Value::Int(*n),
        Literal::Float(x) => Value::Float(*x),
        Literal::Str(s) => Value::string(s.as_str()),
    };
    TypedValue::new(value)
}

pub(crate) fn assign(span: Span) -> EvalResult<()> {
    Err(fail(not_assignable("a literal"), span))
}
