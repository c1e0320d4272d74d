//! Conversion between JSON documents and runtime values.
//!
//! JSON objects become [`ObjectRef`]s with writable fields, arrays become
//! lists. Integers that fit `i64` stay integers; other numbers are floats.

use serde_json::{Map, Number};
use spel_eval::{ObjectRef, Value};

/// Parse `text` as JSON and convert it.
pub fn parse_root(text: &str) -> Result<Value, serde_json::Error> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(to_value(&json))
}

pub fn to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        serde_json::Value::String(s) => Value::string(s.as_str()),
        serde_json::Value::Array(items) => Value::list(items.iter().map(to_value).collect()),
        serde_json::Value::Object(fields) => {
            let obj = ObjectRef::new();
            for (name, field) in fields {
                obj.set(name, to_value(field));
            }
            Value::Object(obj)
        }
    }
}

/// Marker emitted where a container refers back to one of its ancestors.
pub const CYCLE_MARKER: &str = "<cycle>";

/// Inverse of [`to_value`]. Host objects and non-finite floats have no JSON
/// form; they are rendered as their display string and `null`. A container
/// reached again from inside itself becomes [`CYCLE_MARKER`].
pub fn from_value(value: &Value) -> serde_json::Value {
    from_value_below(value, &mut Vec::new())
}

/// `open` holds the containers currently being converted, innermost last.
fn from_value_below(value: &Value, open: &mut Vec<Value>) -> serde_json::Value {
    let is_open = |open: &[Value]| {
        open.iter().any(|outer| match (outer, value) {
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        })
    };
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::Number(Number::from(*n)),
        Value::Float(x) => {
            Number::from_f64(*x).map_or(serde_json::Value::Null, serde_json::Value::Number)
        }
        Value::Str(s) => serde_json::Value::String(s.to_string()),
        Value::List(_) | Value::Object(_) if is_open(open.as_slice()) => {
            serde_json::Value::String(CYCLE_MARKER.to_string())
        }
        Value::List(list) => {
            open.push(value.clone());
            let items = list
                .snapshot()
                .iter()
                .map(|item| from_value_below(item, open))
                .collect();
            open.pop();
            serde_json::Value::Array(items)
        }
        Value::Object(obj) => {
            open.push(value.clone());
            let mut fields = Map::new();
            for (name, field) in obj.entries() {
                let converted = from_value_below(&field, open);
                fields.insert(name, converted);
            }
            open.pop();
            serde_json::Value::Object(fields)
        }
        Value::Host(_) => serde_json::Value::String(value.to_string()),
    }
}
