//! Values produced by resolution and passed to function bodies.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::registration::{Meta, Producer};
use crate::subject::Function;
use crate::ty::{Erased, Ty};

/// A type-erased shared object together with its concrete [`Ty`].
///
/// Clones share the object: two clones are [`Instance::ptr_eq`].
///
/// # Examples
///
/// ```rust
/// use autowire::{Instance, Ty};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// let ty = Ty::class::<English>()
///     .implements::<dyn Greeter>(Ty::of::<dyn Greeter>(), |e| e)
///     .build();
/// let instance = Instance::new(ty, English);
///
/// let concrete: Arc<English> = instance.get().unwrap();
/// let greeter: Arc<dyn Greeter> = instance.get().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// assert!(instance.get::<String>().is_none());
/// # let _ = concrete;
/// ```
#[derive(Clone)]
pub struct Instance {
    value: Arc<Erased>,
    ty: Ty,
    producer: Option<Arc<Producer>>,
}

impl Instance {
    /// Wraps `value`, whose type must be the one `ty` describes.
    pub fn new<T: Send + Sync + 'static>(ty: Ty, value: T) -> Self {
        Self::from_arc(ty, Arc::new(value))
    }

    /// Wraps an already shared value.
    pub fn from_arc<T: Send + Sync + 'static>(ty: Ty, value: Arc<T>) -> Self {
        debug_assert!(ty.is::<T>(), "instance of {} described as {:?}", std::any::type_name::<T>(), ty);
        Self {
            value: Arc::new(value),
            ty,
            producer: None,
        }
    }

    /// Wraps `value` with a bare `Ty::of::<T>()`.
    pub fn of<T: Send + Sync + 'static>(value: T) -> Self {
        Self::new(Ty::of::<T>(), value)
    }

    pub(crate) fn with_producer(mut self, producer: &Arc<Producer>) -> Self {
        self.producer = Some(Arc::clone(producer));
        self
    }

    /// Concrete type of the wrapped object.
    pub fn ty(&self) -> &Ty {
        &self.ty
    }

    /// The producer that created this instance, when it came from a registry.
    pub fn producer(&self) -> Option<&Producer> {
        self.producer.as_deref()
    }

    /// Metadata of the producer that created this instance.
    pub fn meta(&self) -> Option<&Meta> {
        self.producer().map(Producer::meta)
    }

    /// Views the object as `T`: its concrete type or any supertype reachable
    /// through declared upcasts.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        if let Some(direct) = self.value.downcast_ref::<Arc<T>>() {
            return Some(Arc::clone(direct));
        }
        let viewed = self.ty.upcast(&*self.value, TypeId::of::<T>())?;
        (*viewed).downcast_ref::<Arc<T>>().cloned()
    }

    pub fn is<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// Identity comparison.
    pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
        Arc::ptr_eq(&a.value, &b.value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("ty", &self.ty)
            .field("producer", &self.producer.as_ref().map(|p| p.name()))
            .finish()
    }
}

/// Anything resolution can produce.
#[derive(Clone, Debug)]
pub enum Value {
    /// Result of a function returning nothing
    Unit,
    /// An object
    Instance(Instance),
    /// A type itself, produced for `Type[..]` requests
    Type(Ty),
    /// A function, produced for `Callable[..]` requests
    Function(Function),
    /// Aggregate produced for `List[..]` requests
    List(Vec<Value>),
}

impl Value {
    /// Shorthand for an instance of `value` with a bare type identity.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Value::Instance(Instance::of(value))
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&Ty> {
        match self {
            Value::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    /// Views an instance value as `T`.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.as_instance().and_then(Instance::get::<T>)
    }

    /// Views every element of a list value as `T`; fails on the first
    /// element that is not one.
    pub fn get_all<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<T>>> {
        let values = self
            .as_list()
            .ok_or_else(|| DiError::TypeMismatch(format!("expected a list, found {}", self.kind())))?;
        values
            .iter()
            .map(|value| {
                value
                    .get::<T>()
                    .ok_or_else(|| DiError::TypeMismatch(std::any::type_name::<T>().to_owned()))
            })
            .collect()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Instance(_) => "instance",
            Value::Type(_) => "type",
            Value::Function(_) => "function",
            Value::List(_) => "list",
        }
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Instance(instance)
    }
}

impl From<Ty> for Value {
    fn from(ty: Ty) -> Self {
        Value::Type(ty)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}

/// Arguments a caller supplies explicitly to a wrapped function.
///
/// Positional values bind to the declared parameters in order; keyword
/// values bind by name. Both bypass resolution.
#[derive(Clone, Debug, Default)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.keyword.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.keyword.push((name, value)),
        }
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keywords(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.keyword.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keyword
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }
}

/// The final name to value binding a function body receives.
#[derive(Clone, Debug, Default)]
pub struct Arguments {
    entries: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the binding for `name`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name.into(), value.into());
        self
    }

    pub(crate) fn insert(&mut self, name: String, value: Value) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    fn required(&self, name: &str) -> DiResult<&Value> {
        self.value(name)
            .ok_or_else(|| DiError::InvalidUsage(format!("no argument named `{}`", name)))
    }

    /// The instance bound to `name`, viewed as `T`.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        self.required(name)?.get::<T>().ok_or_else(|| {
            DiError::TypeMismatch(format!("argument `{}` as {}", name, std::any::type_name::<T>()))
        })
    }

    /// The list bound to `name`, every element viewed as `T`.
    pub fn get_all<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Vec<Arc<T>>> {
        self.required(name)?.get_all::<T>()
    }

    pub fn ty(&self, name: &str) -> DiResult<&Ty> {
        let value = self.required(name)?;
        value
            .as_type()
            .ok_or_else(|| DiError::TypeMismatch(format!("argument `{}` is a {}, not a type", name, value.kind())))
    }

    pub fn function(&self, name: &str) -> DiResult<&Function> {
        let value = self.required(name)?;
        value.as_function().ok_or_else(|| {
            DiError::TypeMismatch(format!("argument `{}` is a {}, not a function", name, value.kind()))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Port(u16);

    #[test]
    fn clones_share_identity() {
        let a = Instance::of(Port(80));
        let b = a.clone();
        let c = Instance::of(Port(80));
        assert!(Instance::ptr_eq(&a, &b));
        assert!(!Instance::ptr_eq(&a, &c));
        assert!(Arc::ptr_eq(&a.get::<Port>().unwrap(), &b.get::<Port>().unwrap()));
    }

    #[test]
    fn typed_argument_access() {
        let args = Arguments::new()
            .with("port", Value::new(Port(8080)))
            .with("ports", Value::List(vec![Value::new(Port(1)), Value::new(Port(2))]))
            .with("kind", Ty::of::<Port>());

        assert_eq!(*args.get::<Port>("port").unwrap(), Port(8080));
        assert_eq!(args.get_all::<Port>("ports").unwrap().len(), 2);
        assert!(args.ty("kind").unwrap().is::<Port>());
        assert!(matches!(args.get::<String>("port"), Err(DiError::TypeMismatch(_))));
        assert!(matches!(args.get::<Port>("missing"), Err(DiError::InvalidUsage(_))));
        assert!(matches!(args.function("port"), Err(DiError::TypeMismatch(_))));
    }

    #[test]
    fn later_keywords_replace_earlier_ones() {
        let args = CallArgs::new().kwarg("a", Value::new(1u8)).kwarg("a", Value::new(2u8));
        assert_eq!(args.keywords().count(), 1);
        assert_eq!(*args.keyword("a").unwrap().get::<u8>().unwrap(), 2);
    }
}
