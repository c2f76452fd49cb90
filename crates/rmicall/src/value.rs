//! # Values
//!
//! The dynamic values carried as call arguments and return payloads.
//!
//! Primitive variants correspond one-to-one with the primitive keyword tokens,
//! so a value always knows which parameter type it satisfies exactly. Live
//! objects travel as `ObjectRef`, compared by reference identity only.

use std::any::Any;
use std::any::TypeId;
use std::sync::Arc;
use std::sync::Weak;

use crate::identity::RemoteObjectIdentity;
use crate::types;
use crate::types::ParamType;
use crate::types::Primitive;

/// A shared handle to a live object.
///
/// Two `ObjectRef`s are equal only if they point at the same allocation.
#[derive(Clone)]
pub struct ObjectRef {
    class_name: &'static str,
    interfaces: Arc<[Arc<str>]>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    pub fn new<T: Any + Send + Sync>(class_name: &'static str, object: Arc<T>) -> Self {
        Self::with_interfaces(class_name, Arc::from([]), object)
    }

    /// A reference that also knows which interfaces its class implements.
    pub fn with_interfaces<T: Any + Send + Sync>(
        class_name: &'static str,
        interfaces: Arc<[Arc<str>]>,
        object: Arc<T>,
    ) -> Self {
        Self {
            class_name,
            interfaces,
            inner: object,
        }
    }

    /// Fully qualified class name of the referenced object.
    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    pub fn interfaces(&self) -> &[Arc<str>] {
        &self.interfaces
    }

    /// Whether the referenced object's class is, or implements, `name`.
    pub fn implements(&self, name: &str) -> bool {
        self.class_name == name || self.interfaces.iter().any(|i| &**i == name)
    }

    /// `TypeId` of the concrete referenced type.
    pub fn concrete_type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    pub fn downgrade(&self) -> Weak<dyn Any + Send + Sync> {
        Arc::downgrade(&self.inner)
    }

    pub fn as_any(&self) -> &(dyn Any + Send + Sync) {
        &*self.inner
    }

    /// The allocation address, the key for identity comparisons.
    pub fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        self.address() == other.address()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl std::fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectRef({}@{:#x})", self.class_name, self.address())
    }
}

/// A dynamic value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absence of an object. Accepted wherever a named type is expected.
    Null,
    /// The result of a method that returns nothing.
    Void,
    Bool(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    List(Vec<Value>),
    /// A handle to an exported object on the other side of the boundary.
    Remote(RemoteObjectIdentity),
    /// A live local object.
    Object(ObjectRef),
}

impl Value {
    /// The exact parameter type this value satisfies. `Null` has none.
    pub fn param_type(&self) -> Option<ParamType> {
        let ty = match self {
            Value::Null => return None,
            Value::Void => ParamType::Primitive(Primitive::Void),
            Value::Bool(_) => ParamType::Primitive(Primitive::Bool),
            Value::Char(_) => ParamType::Primitive(Primitive::Char),
            Value::Byte(_) => ParamType::Primitive(Primitive::Byte),
            Value::Short(_) => ParamType::Primitive(Primitive::Short),
            Value::Int(_) => ParamType::Primitive(Primitive::Int),
            Value::Long(_) => ParamType::Primitive(Primitive::Long),
            Value::Float(_) => ParamType::Primitive(Primitive::Float),
            Value::Double(_) => ParamType::Primitive(Primitive::Double),
            Value::Str(_) => ParamType::named(types::STRING),
            Value::List(_) => ParamType::named(types::LIST),
            Value::Remote(_) => ParamType::named(types::REMOTE),
            Value::Object(obj) => ParamType::named(obj.class_name()),
        };
        Some(ty)
    }

    /// Short description used in diagnostics.
    pub fn describe(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Str(_) => types::STRING,
            Value::List(_) => types::LIST,
            Value::Remote(_) => types::REMOTE,
            Value::Object(obj) => obj.class_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_remote(&self) -> Option<&RemoteObjectIdentity> {
        match self {
            Value::Remote(id) => Some(id),
            _ => None,
        }
    }

    /// Typed extraction; `None` if the variant does not match.
    pub fn get<T: FromValue>(&self) -> Option<T> {
        T::from_value(self)
    }
}

// ============================================================================
//  CONVERSIONS
// ============================================================================

/// Extraction of a Rust value from a `Value` of exactly the matching variant.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! scalar_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

scalar_conversions! {
    bool => Bool,
    char => Char,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => Str,
    Vec<Value> => List,
    RemoteObjectIdentity => Remote,
    ObjectRef => Object,
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for () {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Void => Some(()),
            _ => None,
        }
    }
}

/// `Null` reads as `None`; anything else must match `T`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Void
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
