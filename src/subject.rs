//! Registrable subjects: classes and functions.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::descriptors::TypeDesc;
use crate::error::{BoxError, DiError, DiResult};
use crate::resolver::Resolver;
use crate::ty::Ty;
use crate::value::{Arguments, Instance, Value};

/// Boxed future returned by asynchronous function bodies.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

pub(crate) type Ctor = Arc<dyn Fn(&Resolver<'_>) -> Result<Instance, BoxError> + Send + Sync>;

type SyncBody = Arc<dyn Fn(Arguments) -> Result<Value, BoxError> + Send + Sync>;
type AsyncBody = Arc<dyn Fn(Arguments) -> BoxFuture<Result<Value, BoxError>> + Send + Sync>;

/// A type that can be produced, built with [`Ty::class`].
///
/// Abstract classes have no constructor. They still satisfy `Type[..]`
/// requests but are never instantiated.
#[derive(Clone)]
pub struct Class {
    ty: Ty,
    ctor: Option<Ctor>,
}

impl Class {
    pub(crate) fn from_parts(ty: Ty, ctor: Option<Ctor>) -> Self {
        Self { ty, ctor }
    }

    pub fn ty(&self) -> &Ty {
        &self.ty
    }

    /// Declared name: the short name of the type.
    pub fn name(&self) -> &'static str {
        self.ty.short_name()
    }

    pub fn is_abstract(&self) -> bool {
        self.ctor.is_none()
    }

    /// Runs the constructor. Engine errors raised inside it come back as
    /// they were; any other error is wrapped in [`DiError::Construction`].
    pub(crate) fn construct(&self, resolver: &Resolver<'_>) -> DiResult<Instance> {
        let ctor = self.ctor.as_ref().ok_or_else(|| {
            DiError::InvalidUsage(format!("`{}` is abstract and cannot be constructed", self.name()))
        })?;
        ctor(resolver).map_err(|source| {
            DiError::from_boxed(source, |source| DiError::Construction {
                class: self.name().to_owned(),
                source,
            })
        })
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("ty", &self.ty)
            .field("abstract", &self.is_abstract())
            .finish()
    }
}

/// A declared parameter of a function.
#[derive(Clone, Debug)]
pub struct Param {
    name: String,
    desc: TypeDesc,
    default: Option<Value>,
}

impl Param {
    pub fn new(name: impl Into<String>, desc: impl Into<TypeDesc>) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> &TypeDesc {
        &self.desc
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Receivers are bound by the caller, never resolved.
    pub fn is_receiver(&self) -> bool {
        self.name == "self" || self.name == "cls"
    }
}

/// Parameters and return type of a function.
#[derive(Clone, Debug)]
pub struct Signature {
    params: Vec<Param>,
    ret: TypeDesc,
    is_async: bool,
}

impl Signature {
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Return type as written, before any async wrapping.
    pub fn ret(&self) -> &TypeDesc {
        &self.ret
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Return type as seen by matching: `Eventually[R]` for async functions.
    pub fn declared_return(&self) -> TypeDesc {
        if self.is_async {
            TypeDesc::eventually(self.ret.clone())
        } else {
            self.ret.clone()
        }
    }

    /// The whole signature as a `Callable` descriptor.
    pub fn desc(&self) -> TypeDesc {
        TypeDesc::callable(self.params.iter().map(|p| p.desc.clone()), self.declared_return())
    }
}

#[derive(Clone)]
enum Body {
    Sync(SyncBody),
    Async(AsyncBody),
}

/// A named function with a declared signature.
///
/// Bound methods are functions whose body captures the receiver.
///
/// # Examples
///
/// ```rust
/// use autowire::{Arguments, Function, TypeDesc, Value};
///
/// let double = Function::builder("double")
///     .param("n", TypeDesc::plain::<u32>())
///     .returns(TypeDesc::plain::<u32>())
///     .build(|args| {
///         let n = args.get::<u32>("n")?;
///         Ok(Value::new(*n * 2))
///     });
///
/// let out = double.call(Arguments::new().with("n", Value::new(21u32))).unwrap();
/// assert_eq!(*out.get::<u32>().unwrap(), 42);
/// ```
#[derive(Clone)]
pub struct Function {
    name: String,
    signature: Signature,
    body: Body,
}

impl Function {
    pub fn builder(name: impl Into<String>) -> FunctionBuilder {
        FunctionBuilder {
            name: name.into(),
            params: Vec::new(),
            ret: TypeDesc::plain::<()>(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn is_async(&self) -> bool {
        self.signature.is_async
    }

    /// The function's type as a `Callable` descriptor.
    pub fn desc(&self) -> TypeDesc {
        self.signature.desc()
    }

    /// Invokes a synchronous body.
    pub fn call(&self, args: Arguments) -> DiResult<Value> {
        match &self.body {
            Body::Sync(body) => body(args).map_err(|source| self.invocation_error(source)),
            Body::Async(_) => Err(DiError::InvalidUsage(format!(
                "`{}` is asynchronous; use call_async",
                self.name
            ))),
        }
    }

    /// Invokes either kind of body, awaiting asynchronous ones.
    pub async fn call_async(&self, args: Arguments) -> DiResult<Value> {
        let result = match &self.body {
            Body::Sync(body) => body(args),
            Body::Async(body) => body(args).await,
        };
        result.map_err(|source| self.invocation_error(source))
    }

    fn invocation_error(&self, source: BoxError) -> DiError {
        DiError::from_boxed(source, |source| DiError::Invocation {
            function: self.name.clone(),
            source,
        })
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("signature", &self.desc().to_string())
            .finish()
    }
}

/// Builder for [`Function`].
pub struct FunctionBuilder {
    name: String,
    params: Vec<Param>,
    ret: TypeDesc,
}

impl FunctionBuilder {
    pub fn param(mut self, name: impl Into<String>, desc: impl Into<TypeDesc>) -> Self {
        self.params.push(Param::new(name, desc));
        self
    }

    pub fn param_with_default(
        mut self,
        name: impl Into<String>,
        desc: impl Into<TypeDesc>,
        default: impl Into<Value>,
    ) -> Self {
        self.params.push(Param::new(name, desc).with_default(default));
        self
    }

    /// Declares the return type; `()` when never called.
    pub fn returns(mut self, ret: impl Into<TypeDesc>) -> Self {
        self.ret = ret.into();
        self
    }

    pub fn build<F>(self, body: F) -> Function
    where
        F: Fn(Arguments) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.finish(false, Body::Sync(Arc::new(body)))
    }

    pub fn build_async<F, Fut>(self, body: F) -> Function
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
    {
        let body: AsyncBody = Arc::new(move |args| Box::pin(body(args)));
        self.finish(true, Body::Async(body))
    }

    fn finish(self, is_async: bool, body: Body) -> Function {
        Function {
            name: self.name,
            signature: Signature {
                params: self.params,
                ret: self.ret,
                is_async,
            },
            body,
        }
    }
}

/// Anything that can be registered as a producer.
#[derive(Clone, Debug)]
pub enum Subject {
    Class(Class),
    Function(Function),
}

impl Subject {
    /// Declared name used when registration does not supply one.
    pub fn name(&self) -> &str {
        match self {
            Subject::Class(class) => class.name(),
            Subject::Function(function) => function.name(),
        }
    }

    pub fn as_class(&self) -> Option<&Class> {
        match self {
            Subject::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Subject::Function(function) => Some(function),
            _ => None,
        }
    }
}

impl From<Class> for Subject {
    fn from(class: Class) -> Self {
        Subject::Class(class)
    }
}

impl From<Function> for Subject {
    fn from(function: Function) -> Self {
        Subject::Function(function)
    }
}
