//! Values paired with their static type.

use std::fmt;
use std::sync::Arc;

use crate::Value;

/// Declared or inferred type of a value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Null,
    Bool,
    Int,
    Float,
    String,
    List,
    Object,
    /// Named object or host type.
    Named(Arc<str>),
}

impl TypeDescriptor {
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        TypeDescriptor::Named(name.into())
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Null => f.write_str("null"),
            TypeDescriptor::Bool => f.write_str("bool"),
            TypeDescriptor::Int => f.write_str("int"),
            TypeDescriptor::Float => f.write_str("float"),
            TypeDescriptor::String => f.write_str("string"),
            TypeDescriptor::List => f.write_str("list"),
            TypeDescriptor::Object => f.write_str("object"),
            TypeDescriptor::Named(name) => f.write_str(name),
        }
    }
}

/// A runtime value and its static type.
///
/// Every successful evaluation produces one. Cloning is cheap: scalars are
/// copied, containers share their handle.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedValue {
    value: Value,
    ty: TypeDescriptor,
}

impl TypedValue {
    pub const NULL: TypedValue = TypedValue {
        value: Value::Null,
        ty: TypeDescriptor::Null,
    };

    /// Pair `value` with the type inferred from it.
    pub fn new(value: Value) -> Self {
        let ty = value.type_descriptor();
        TypedValue { value, ty }
    }

    /// Pair `value` with an explicitly declared type.
    pub fn with_type(value: Value, ty: TypeDescriptor) -> Self {
        TypedValue { value, ty }
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl From<Value> for TypedValue {
    fn from(value: Value) -> Self {
        TypedValue::new(value)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.ty)
    }
}
