//! # Dispatch Tables
//!
//! A `Class` is the method table of one implementing Rust type: for every
//! exact signature, a type-erased invoker that downcasts the receiver and runs
//! the typed method body.
//!
//! Tables are built once per type, when the type is first registered, from the
//! type's own `Remote::describe`.

use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::collections::hash_map;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::OnceLock;

use dashmap::DashMap;
use rmicall::Failure;
use rmicall::FromValue;
use rmicall::ObjectRef;
use rmicall::ParamType;
use rmicall::Value;

use crate::error::Error;
use crate::error::Result;

/// A type whose instances can be exported.
///
/// ```ignore
/// impl Remote for CalculatorImpl {
///     const CLASS: &'static str = "demo.CalculatorImpl";
///
///     fn describe(class: &mut ClassBuilder<Self>) {
///         class
///             .implements("demo.Calculator")
///             .method("add", [Primitive::Int, Primitive::Int], |_, args| {
///                 Ok(Value::Int(args.get::<i32>(0)? + args.get::<i32>(1)?))
///             });
///     }
/// }
/// ```
pub trait Remote: Any + Send + Sync + Sized {
    /// Fully qualified name of the implementing type.
    const CLASS: &'static str;

    /// Populates the method table for this type.
    fn describe(class: &mut ClassBuilder<Self>);

    /// Wraps a shared instance as a value, e.g. to return it from a method.
    ///
    /// The value carries the interfaces this type implements, so it can be
    /// passed where one of them is expected even if the type was never
    /// registered.
    fn object(this: &Arc<Self>) -> Value {
        Value::Object(ObjectRef::with_interfaces(Self::CLASS, interfaces_of::<Self>(), Arc::clone(this)))
    }
}

/// The interfaces `T` declares in its description, computed once per type.
pub(crate) fn interfaces_of<T: Remote>() -> Arc<[Arc<str>]> {
    static INTERFACES: OnceLock<DashMap<TypeId, Arc<[Arc<str>]>>> = OnceLock::new();
    let cache = INTERFACES.get_or_init(DashMap::new);
    if let Some(found) = cache.get(&TypeId::of::<T>()) {
        return Arc::clone(found.value());
    }

    let mut builder = ClassBuilder::<T>::new();
    T::describe(&mut builder);
    let interfaces: Arc<[Arc<str>]> = builder.interfaces.into();
    Arc::clone(cache.entry(TypeId::of::<T>()).or_insert(interfaces).value())
}

/// Method name plus ordered parameter types. Two methods with the same key are
/// the same method.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct SignatureKey {
    name: Arc<str>,
    params: Vec<ParamType>,
}

impl SignatureKey {
    pub fn new(name: impl Into<Arc<str>>, params: Vec<ParamType>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }
}

impl std::fmt::Display for SignatureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(p.token())?;
        }
        f.write_str(")")
    }
}

type Invoker = Box<dyn Fn(&(dyn Any + Send + Sync), &[Value]) -> std::result::Result<Value, Failure> + Send + Sync>;

/// One invocable method.
pub struct Method {
    key: SignatureKey,
    invoker: Invoker,
}

impl Method {
    pub fn name(&self) -> &str {
        self.key.name()
    }

    pub fn params(&self) -> &[ParamType] {
        self.key.params()
    }

    pub fn key(&self) -> &SignatureKey {
        &self.key
    }

    /// Runs the method body. The receiver must be of the type the method was
    /// described for.
    pub fn invoke(&self, receiver: &(dyn Any + Send + Sync), args: &[Value]) -> std::result::Result<Value, Failure> {
        (self.invoker)(receiver, args)
    }
}

impl std::fmt::Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Method({})", self.key)
    }
}

/// Positional access to call arguments from inside a method body.
#[derive(Copy, Clone, Debug)]
pub struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    /// Typed argument at `index`.
    ///
    /// Arguments are checked against the parameter types before the body runs,
    /// so this only fails if the body reads a type other than the one it declared.
    pub fn get<T: FromValue>(&self, index: usize) -> std::result::Result<T, Failure> {
        let value = self.raw(index)?;
        T::from_value(value).ok_or_else(|| {
            Failure::new(
                "rmirun::ArgumentType",
                format!("argument {} is {}, not {}", index, value.describe(), std::any::type_name::<T>()),
            )
        })
    }

    pub fn raw(&self, index: usize) -> std::result::Result<&'a Value, Failure> {
        self.values.get(index).ok_or_else(|| {
            Failure::new("rmirun::ArgumentIndex", format!("no argument at index {}", index))
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The method table of one implementing type.
pub struct Class {
    name: &'static str,
    type_id: TypeId,
    interfaces: Vec<Arc<str>>,
    methods: HashMap<SignatureKey, Arc<Method>>,
    /// Canonical `name(params)` text to method, filled by the resolver.
    pub(crate) resolved: DashMap<Box<str>, Arc<Method>>,
}

impl Class {
    /// Builds the table for `T` from its description.
    pub fn of<T: Remote>() -> Result<Self> {
        let mut builder = ClassBuilder::<T>::new();
        T::describe(&mut builder);
        builder.build()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn interfaces(&self) -> &[Arc<str>] {
        &self.interfaces
    }

    /// Whether this class is, or declares that it implements, `interface`.
    pub fn implements(&self, interface: &str) -> bool {
        self.name == interface || self.interfaces.iter().any(|i| &**i == interface)
    }

    pub fn method(&self, key: &SignatureKey) -> Option<&Arc<Method>> {
        self.methods.get(key)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Arc<Method>> {
        self.methods.values()
    }

    /// Every named type this class mentions: itself, its interfaces, and its
    /// parameter types.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        let params = self.methods.keys().flat_map(|k| k.params()).filter_map(|p| match p {
            ParamType::Named(name) => Some(&**name),
            ParamType::Primitive(_) => None,
        });
        let own: &str = self.name;
        std::iter::once(own)
            .chain(self.interfaces.iter().map(|i| &**i))
            .chain(params)
    }
}

impl std::fmt::Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("interfaces", &self.interfaces)
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Collects the interfaces and methods of `T`.
pub struct ClassBuilder<T> {
    interfaces: Vec<Arc<str>>,
    methods: Vec<Method>,
    _receiver: PhantomData<fn(&T)>,
}

impl<T: Remote> ClassBuilder<T> {
    fn new() -> Self {
        Self {
            interfaces: Vec::new(),
            methods: Vec::new(),
            _receiver: PhantomData,
        }
    }

    pub fn implements(&mut self, interface: impl Into<Arc<str>>) -> &mut Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Adds a method. `params` is the exact signature callers must name.
    pub fn method<P, F>(&mut self, name: &str, params: impl IntoIterator<Item = P>, body: F) -> &mut Self
    where
        P: Into<ParamType>,
        F: Fn(&T, Args<'_>) -> std::result::Result<Value, Failure> + Send + Sync + 'static,
    {
        let key = SignatureKey::new(name, params.into_iter().map(Into::into).collect());
        let invoker: Invoker = Box::new(move |receiver: &(dyn Any + Send + Sync), args: &[Value]| {
            let this = receiver.downcast_ref::<T>().ok_or_else(|| {
                Failure::new("rmirun::ReceiverType", format!("receiver is not {}", T::CLASS))
            })?;
            body(this, Args::new(args))
        });
        self.methods.push(Method { key, invoker });
        self
    }

    fn build(self) -> Result<Class> {
        let mut methods = HashMap::with_capacity(self.methods.len());
        for method in self.methods {
            match methods.entry(method.key.clone()) {
                hash_map::Entry::Occupied(_) => {
                    return Err(Error::DuplicateMethod {
                        class: T::CLASS.to_string(),
                        signature: method.key.to_string(),
                    });
                }
                hash_map::Entry::Vacant(slot) => {
                    slot.insert(Arc::new(method));
                }
            }
        }

        Ok(Class {
            name: T::CLASS,
            type_id: TypeId::of::<T>(),
            interfaces: self.interfaces,
            methods,
            resolved: DashMap::new(),
        })
    }
}
