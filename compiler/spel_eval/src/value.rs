//! Runtime values.
//!
//! Scalars are stored inline. Objects and lists are shared handles
//! (`Arc<RwLock<..>>`): evaluating `a.b` yields a handle to the same object
//! that `a` holds, so an assignment at the end of a chain is visible from the
//! root. Values are `Send + Sync`.
//!
//! Because handles are shared, an object can end up containing itself.
//! Printing and comparison stop at such back-references; the `Arc` cycle
//! itself is leaked when the last outside handle is dropped.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::HostError;
use crate::TypeDescriptor;

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    List(ListRef),
    Object(ObjectRef),
    /// Object implemented by the embedding application.
    Host(Arc<dyn HostObject>),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(ListRef::new(items))
    }

    pub fn host(object: impl HostObject + 'static) -> Self {
        Value::Host(Arc::new(object))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the runtime type, used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Object(obj) => obj.type_name().unwrap_or_else(|| "object".to_string()),
            Value::Host(host) => host.type_name().to_string(),
        }
    }

    /// Static type this value would be declared with if nothing else is known.
    pub fn type_descriptor(&self) -> TypeDescriptor {
        match self {
            Value::Null => TypeDescriptor::Null,
            Value::Bool(_) => TypeDescriptor::Bool,
            Value::Int(_) => TypeDescriptor::Int,
            Value::Float(_) => TypeDescriptor::Float,
            Value::Str(_) => TypeDescriptor::String,
            Value::List(_) => TypeDescriptor::List,
            Value::Object(obj) => match obj.type_name() {
                Some(name) => TypeDescriptor::named(name),
                None => TypeDescriptor::Object,
            },
            Value::Host(host) => TypeDescriptor::named(host.type_name()),
        }
    }
}

/// Containers currently open above the value being printed or compared.
///
/// Assignments can make an object reach itself (`me = #root`), so every
/// traversal that descends into containers checks this path and stops at
/// a handle it is already inside.
type OpenPath = RefCell<Vec<*const ()>>;

/// Marker printed where a container refers back to one of its ancestors.
const CYCLE: &str = "<cycle>";

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_eq(self, other, &mut Vec::new())
    }
}

/// Structural equality. A pair of containers already being compared is
/// assumed equal, which makes isomorphic cycles compare equal.
fn values_eq(a: &Value, b: &Value, open: &mut Vec<(*const (), *const ())>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits() || a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            let pair = (a.addr(), b.addr());
            if a.ptr_eq(b) || open.contains(&pair) {
                return true;
            }
            let (xs, ys) = (a.snapshot(), b.snapshot());
            open.push(pair);
            let equal = xs.len() == ys.len()
                && xs.iter().zip(&ys).all(|(x, y)| values_eq(x, y, open));
            open.pop();
            equal
        }
        (Value::Object(a), Value::Object(b)) => {
            let pair = (a.addr(), b.addr());
            if a.ptr_eq(b) || open.contains(&pair) {
                return true;
            }
            if a.type_name() != b.type_name() {
                return false;
            }
            let (xs, ys) = (a.entries(), b.entries());
            open.push(pair);
            let equal = xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(&ys)
                    .all(|((ka, va), (kb, vb))| ka == kb && values_eq(va, vb, open));
            open.pop();
            equal
        }
        (Value::Host(a), Value::Host(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

/// A value being formatted below the containers in `open`.
struct Nested<'a> {
    value: &'a Value,
    open: &'a OpenPath,
}

impl Nested<'_> {
    /// Run `body` with `addr` marked open, or print the cycle marker if it
    /// already is.
    fn descend(
        &self,
        f: &mut fmt::Formatter<'_>,
        addr: *const (),
        body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
    ) -> fmt::Result {
        if self.open.borrow().contains(&addr) {
            return f.write_str(CYCLE);
        }
        self.open.borrow_mut().push(addr);
        let result = body(f);
        self.open.borrow_mut().pop();
        result
    }

    fn child<'b>(&'b self, value: &'b Value) -> Nested<'b> {
        Nested {
            value,
            open: self.open,
        }
    }
}

impl fmt::Debug for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::List(list) => self.descend(f, list.addr(), |f| {
                let items = list.snapshot();
                f.debug_list()
                    .entries(items.iter().map(|item| self.child(item)))
                    .finish()
            }),
            Value::Object(obj) => self.descend(f, obj.addr(), |f| {
                let entries = obj.entries();
                f.debug_map()
                    .entries(entries.iter().map(|(name, value)| (name, self.child(value))))
                    .finish()
            }),
            Value::Host(host) => write!(f, "Host({host:?})"),
        }
    }
}

impl fmt::Display for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::List(list) => self.descend(f, list.addr(), |f| {
                f.write_str("[")?;
                for (i, item) in list.snapshot().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", self.child(item))?;
                }
                f.write_str("]")
            }),
            Value::Object(obj) => self.descend(f, obj.addr(), |f| {
                f.write_str("{")?;
                for (i, (name, value)) in obj.entries().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {}", self.child(value))?;
                }
                f.write_str("}")
            }),
            Value::Host(host) => write!(f, "<{}>", host.type_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = OpenPath::default();
        fmt::Debug::fmt(&Nested { value: self, open: &open }, f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = OpenPath::default();
        fmt::Display::fmt(&Nested { value: self, open: &open }, f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<ListRef> for Value {
    fn from(list: ListRef) -> Self {
        Value::List(list)
    }
}

/// Object provided by the embedding application.
///
/// All methods except [`type_name`](HostObject::type_name) and
/// [`read`](HostObject::read) default to "not supported". Errors returned
/// here reach the caller unchanged.
pub trait HostObject: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    /// Read a property; `Ok(None)` when there is no such property.
    fn read(&self, name: &str) -> Result<Option<Value>, HostError>;

    /// Write a property; `Ok(false)` when the property is read-only.
    fn write(&self, name: &str, value: Value) -> Result<bool, HostError> {
        let _ = (name, value);
        Ok(false)
    }

    /// Whether [`write`](HostObject::write) would accept `name`.
    fn can_write(&self, name: &str) -> Result<bool, HostError> {
        let _ = name;
        Ok(false)
    }

    /// Invoke a method; `Ok(None)` when there is no such method.
    fn invoke(&self, name: &str, args: &[Value]) -> Result<Option<Value>, HostError> {
        let _ = (name, args);
        Ok(None)
    }
}

/// A property slot on an object.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub value: Value,
    pub writable: bool,
    /// Declared type, reported instead of the value's own type when set.
    pub declared: Option<TypeDescriptor>,
}

#[derive(Debug, Default)]
struct ObjectData {
    type_name: Option<String>,
    fields: BTreeMap<String, Field>,
}

/// Shared handle to a mutable object.
#[derive(Clone, Default)]
pub struct ObjectRef(Arc<RwLock<ObjectData>>);

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object reporting `type_name` in error messages and type descriptors.
    pub fn named(type_name: impl Into<String>) -> Self {
        ObjectRef(Arc::new(RwLock::new(ObjectData {
            type_name: Some(type_name.into()),
            fields: BTreeMap::new(),
        })))
    }

    /// Add a writable field.
    #[must_use]
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value.into(), true);
        self
    }

    /// Add a read-only field.
    #[must_use]
    pub fn with_readonly(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value.into(), false);
        self
    }

    /// Add a field with full control over writability and declared type.
    pub fn define(&self, name: impl Into<String>, field: Field) {
        self.0.write().fields.insert(name.into(), field);
    }

    fn insert(&self, name: impl Into<String>, value: Value, writable: bool) {
        self.define(
            name,
            Field {
                value,
                writable,
                declared: None,
            },
        );
    }

    pub fn type_name(&self) -> Option<String> {
        self.0.read().type_name.clone()
    }

    pub fn field(&self, name: &str) -> Option<Field> {
        self.0.read().fields.get(name).cloned()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.read().fields.get(name).map(|f| f.value.clone())
    }

    /// Whether `name` can be assigned: absent fields are created on write.
    pub fn is_writable(&self, name: &str) -> bool {
        self.0.read().fields.get(name).map_or(true, |f| f.writable)
    }

    /// Store `value` under `name`, creating the field if needed.
    ///
    /// Returns `false` and leaves the object untouched if the field is
    /// read-only.
    pub fn set(&self, name: &str, value: Value) -> bool {
        let mut data = self.0.write();
        match data.fields.get_mut(name) {
            Some(field) if !field.writable => false,
            Some(field) => {
                field.value = value;
                true
            }
            None => {
                data.fields.insert(
                    name.to_string(),
                    Field {
                        value,
                        writable: true,
                        declared: None,
                    },
                );
                true
            }
        }
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.read().fields.contains_key(name)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.read().fields.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.read().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().fields.is_empty()
    }

    /// Copy of the current fields and their values, in name order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        let data = self.0.read();
        data.fields
            .iter()
            .map(|(name, field)| (name.clone(), field.value.clone()))
            .collect()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Value::Object(self.clone()) == Value::Object(other.clone())
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Value::Object(self.clone()), f)
    }
}

/// Shared handle to a mutable list.
#[derive(Clone, Default)]
pub struct ListRef(Arc<RwLock<Vec<Value>>>);

impl ListRef {
    pub fn new(items: Vec<Value>) -> Self {
        ListRef(Arc::new(RwLock::new(items)))
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Replace the item at `index`; `false` when out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.0.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: Value) {
        self.0.write().push(value);
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.snapshot().iter().any(|item| item == value)
    }

    /// Copy of the current items.
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast()
    }
}

impl PartialEq for ListRef {
    fn eq(&self, other: &Self) -> bool {
        Value::List(self.clone()) == Value::List(other.clone())
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Value::List(self.clone()), f)
    }
}
