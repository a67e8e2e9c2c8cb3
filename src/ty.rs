//! Plain type identities and their declared supertype edges.
//!
//! Rust has no class hierarchy to inspect at runtime, so every type taking
//! part in resolution is described explicitly by a [`Ty`]: its `TypeId`, a
//! display name, and the supertypes it declares. A supertype edge may carry
//! an upcast, which is how an `Arc<Dog>` is later handed out as an
//! `Arc<dyn Animal>`.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::BoxError;
use crate::resolver::Resolver;
use crate::subject::{Class, Ctor};
use crate::value::Instance;

/// Type-erased storage. Always holds an `Arc<X>` for some (possibly unsized) `X`.
pub(crate) type Erased = dyn Any + Send + Sync;

type UpcastFn = Arc<dyn Fn(&Erased) -> Option<Box<Erased>> + Send + Sync>;

#[derive(Clone)]
struct Supertype {
    ty: Ty,
    upcast: Option<UpcastFn>,
}

struct TyInner {
    id: TypeId,
    name: &'static str,
    supertypes: Vec<Supertype>,
}

/// Identity of a plain type, plus the supertypes it declares.
///
/// Equality and hashing only look at the `TypeId`, so a bare `Ty::of::<Dog>()`
/// built at a request site equals the fully declared `Ty` a producer carries.
///
/// # Examples
///
/// ```rust
/// use autowire::Ty;
/// use std::sync::Arc;
///
/// trait Animal: Send + Sync {
///     fn sound(&self) -> &'static str;
/// }
///
/// struct Dog;
/// impl Animal for Dog {
///     fn sound(&self) -> &'static str { "bark" }
/// }
///
/// let animal = Ty::of::<dyn Animal>();
/// let dog = Ty::class::<Dog>()
///     .implements::<dyn Animal>(animal.clone(), |dog| dog)
///     .build();
///
/// assert!(dog.is_subtype_of(&animal));
/// assert!(!animal.is_subtype_of(&dog));
/// assert_eq!(dog.short_name(), "Dog");
/// ```
#[derive(Clone)]
pub struct Ty {
    inner: Arc<TyInner>,
}

impl Ty {
    /// Identity of `T` without any declared supertypes.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::class::<T>().build()
    }

    /// Starts declaring `T` together with its supertypes.
    pub fn class<T: ?Sized + 'static>() -> TypeBuilder<T> {
        TypeBuilder {
            name: std::any::type_name::<T>(),
            supertypes: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> TypeId {
        self.inner.id
    }

    /// Full name as reported by `std::any::type_name` (or overridden).
    pub fn type_name(&self) -> &'static str {
        self.inner.name
    }

    /// Last path segment of the name, without a leading `dyn`.
    pub fn short_name(&self) -> &'static str {
        let name = self.inner.name.trim_start_matches("dyn ");
        let base_end = name.find('<').unwrap_or(name.len());
        let start = name[..base_end].rfind("::").map(|idx| idx + 2).unwrap_or(0);
        &name[start..]
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.inner.id == TypeId::of::<T>()
    }

    /// Directly declared supertypes, in declaration order.
    pub fn supertypes(&self) -> impl Iterator<Item = &Ty> {
        self.inner.supertypes.iter().map(|s| &s.ty)
    }

    /// `true` when `self` is `other` or declares it, directly or transitively.
    pub fn is_subtype_of(&self, other: &Ty) -> bool {
        self == other || self.supertypes().any(|parent| parent.is_subtype_of(other))
    }

    /// Walks the upcast edges from `value` (an `Arc` of this type) towards
    /// `target`, returning the boxed `Arc<target>` when a path exists.
    ///
    /// Direct edges are preferred over paths through intermediate supertypes.
    pub(crate) fn upcast(&self, value: &Erased, target: TypeId) -> Option<Box<Erased>> {
        let edges = || {
            self.inner
                .supertypes
                .iter()
                .filter_map(|parent| parent.upcast.as_ref().map(|upcast| (&parent.ty, upcast)))
        };
        if let Some((_, upcast)) = edges().find(|(ty, _)| ty.id() == target) {
            return upcast(value);
        }
        edges().find_map(|(ty, upcast)| {
            let step = upcast(value)?;
            ty.upcast(&*step, target)
        })
    }
}

impl PartialEq for Ty {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Ty {}

impl Hash for Ty {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.inner.name)
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Builder declaring a type's supertypes and, optionally, how to construct it.
pub struct TypeBuilder<T: ?Sized> {
    name: &'static str,
    supertypes: Vec<Supertype>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: ?Sized + 'static> TypeBuilder<T> {
    /// Overrides the display name.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Declares `parent` as a supertype without a way to view instances as it.
    ///
    /// Enough for matching and for `Type[..]` requests; instances produced for
    /// a `parent` request can then only be read back as `T` itself.
    pub fn extends(mut self, parent: Ty) -> Self {
        self.supertypes.push(Supertype { ty: parent, upcast: None });
        self
    }

    /// Declares `parent` as a supertype, viewing instances through `cast`.
    pub fn implements<S>(mut self, parent: Ty, cast: fn(Arc<T>) -> Arc<S>) -> Self
    where
        T: Send + Sync,
        S: ?Sized + Send + Sync + 'static,
    {
        debug_assert!(parent.is::<S>(), "upcast target does not match {:?}", parent);
        let upcast: UpcastFn = Arc::new(move |value: &Erased| {
            value
                .downcast_ref::<Arc<T>>()
                .map(|arc| Box::new(cast(Arc::clone(arc))) as Box<Erased>)
        });
        self.supertypes.push(Supertype { ty: parent, upcast: Some(upcast) });
        self
    }

    pub fn build(self) -> Ty {
        Ty {
            inner: Arc::new(TyInner {
                id: TypeId::of::<T>(),
                name: self.name,
                supertypes: self.supertypes,
            }),
        }
    }

    /// A class without a constructor: usable for `Type[..]` requests and as a
    /// supertype, never instantiated.
    pub fn abstract_class(self) -> Class {
        Class::from_parts(self.build(), None)
    }
}

impl<T: Send + Sync + 'static> TypeBuilder<T> {
    /// A class built by `ctor`, which may resolve its own dependencies.
    pub fn constructor<F>(self, build: F) -> Class
    where
        F: Fn(&Resolver<'_>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let ty = self.build();
        let instance_ty = ty.clone();
        let ctor: Ctor = Arc::new(move |resolver: &Resolver| -> Result<Instance, BoxError> {
            build(resolver).map(|value| Instance::new(instance_ty.clone(), value))
        });
        Class::from_parts(ty, Some(ctor))
    }

    /// A class built with `T::default()`.
    pub fn default_constructor(self) -> Class
    where
        T: Default,
    {
        self.constructor(|_| Ok(T::default()))
    }
}
