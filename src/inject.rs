//! Wrapping functions for automatic argument injection.

use crate::error::{DiError, DiResult};
use crate::registry::Registry;
use crate::resolver::Resolver;
use crate::subject::{Function, Subject};
use crate::value::{Arguments, CallArgs, Value};

/// A function whose missing arguments are resolved on every call.
///
/// Resolution runs against the registry's contents at call time, so
/// producers registered after wrapping are seen by later calls.
///
/// # Examples
///
/// ```rust
/// use autowire::{inject, CallArgs, Function, Injectable, Registry, Ty, TypeDesc, Value};
///
/// #[derive(Default)]
/// struct Clock;
/// impl Clock {
///     fn now(&self) -> u64 { 42 }
/// }
///
/// let registry = Registry::new();
/// Injectable::new(Ty::class::<Clock>().default_constructor()).register_in(&registry);
///
/// let stamp = Function::builder("stamp")
///     .param("clock", TypeDesc::plain::<Clock>())
///     .returns(TypeDesc::plain::<u64>())
///     .build(|args| Ok(Value::new(args.get::<Clock>("clock")?.now())));
///
/// let stamp = inject(stamp, &registry).unwrap();
/// let out = stamp.call(CallArgs::new()).unwrap();
/// assert_eq!(*out.get::<u64>().unwrap(), 42);
/// ```
#[derive(Clone, Debug)]
pub struct Injected {
    function: Function,
    registry: Registry,
}

/// Wraps `subject` for injection from `registry`.
///
/// Only functions can be wrapped; classes are rejected here, once.
pub fn inject(subject: impl Into<Subject>, registry: &Registry) -> DiResult<Injected> {
    match subject.into() {
        Subject::Function(function) => Ok(Injected {
            function,
            registry: registry.clone(),
        }),
        Subject::Class(class) => Err(DiError::InvalidUsage(format!(
            "`{}` is a class; only functions and methods can be injected",
            class.name()
        ))),
    }
}

/// Wraps `subject` for injection from the process-wide default registry.
pub fn inject_default(subject: impl Into<Subject>) -> DiResult<Injected> {
    inject(subject, Registry::global())
}

impl Injected {
    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn name(&self) -> &str {
        self.function.name()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The complete argument set a call with `supplied` would receive.
    ///
    /// Supplied values are never resolved; keyword values take precedence
    /// over everything else. Bindings follow the declaration order.
    pub fn arguments(&self, supplied: CallArgs) -> DiResult<Arguments> {
        let mut resolved =
            Resolver::new(&self.registry).resolve_parameters(self.function.signature(), &supplied)?;

        let mut args = Arguments::new();
        for (index, param) in self.function.signature().params().iter().enumerate() {
            let name = param.name();
            let value = match supplied.keyword(name) {
                Some(value) => Some(value.clone()),
                None => supplied.positional().get(index).cloned().or_else(|| {
                    let at = resolved.iter().position(|(bound, _)| bound == name)?;
                    Some(resolved.swap_remove(at).1)
                }),
            };
            if let Some(value) = value {
                args.insert(name.to_owned(), value);
            }
        }
        Ok(args)
    }

    /// Resolves, merges and invokes a synchronous function.
    pub fn call(&self, supplied: CallArgs) -> DiResult<Value> {
        if self.function.is_async() {
            return Err(DiError::InvalidUsage(format!(
                "`{}` is asynchronous; use call_async",
                self.function.name()
            )));
        }
        let args = self.arguments(supplied)?;
        self.function.call(args)
    }

    /// Resolves and merges synchronously, then awaits the function.
    pub async fn call_async(&self, supplied: CallArgs) -> DiResult<Value> {
        let args = self.arguments(supplied)?;
        self.function.call_async(args).await
    }
}
