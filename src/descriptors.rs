//! Type descriptors for requests and declarations.

use std::fmt;

use crate::ty::Ty;

/// Structural description of a requested or declared type.
///
/// The set of forms is closed: matching strategies and the compatibility
/// rules in [`crate::compat`] are written against exactly these variants.
///
/// # Examples
///
/// ```rust
/// use autowire::{Shape, TypeDesc};
///
/// trait Animal: Send + Sync {}
///
/// let animals = TypeDesc::list_of(TypeDesc::plain::<dyn Animal>());
/// assert_eq!(animals.shape(), Shape::ListOf);
/// assert_eq!(animals.to_string(), "List[Animal]");
///
/// let handler = TypeDesc::callable([TypeDesc::plain::<String>()], TypeDesc::Any);
/// assert_eq!(handler.to_string(), "Callable[[String], Any]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    /// Wildcard
    Any,
    /// A concrete type or trait object; produced values are instances
    Plain(Ty),
    /// Every compatible value, aggregated
    ListOf(Box<TypeDesc>),
    /// The type itself rather than an instance
    TypeOf(Box<TypeDesc>),
    /// A function with positional parameters and a return type
    Callable {
        params: Vec<TypeDesc>,
        ret: Box<TypeDesc>,
    },
    /// The eventual result of an asynchronous function
    Eventually(Box<TypeDesc>),
}

/// The outermost form of a [`TypeDesc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Any,
    Plain,
    ListOf,
    TypeOf,
    Callable,
    Eventually,
}

impl TypeDesc {
    /// `Plain` descriptor for `T` without declared supertypes.
    ///
    /// This is what request sites use: a request only needs the identity.
    pub fn plain<T: ?Sized + 'static>() -> Self {
        TypeDesc::Plain(Ty::of::<T>())
    }

    pub fn list_of(element: impl Into<TypeDesc>) -> Self {
        TypeDesc::ListOf(Box::new(element.into()))
    }

    pub fn type_of(element: impl Into<TypeDesc>) -> Self {
        TypeDesc::TypeOf(Box::new(element.into()))
    }

    pub fn callable(params: impl IntoIterator<Item = TypeDesc>, ret: impl Into<TypeDesc>) -> Self {
        TypeDesc::Callable {
            params: params.into_iter().collect(),
            ret: Box::new(ret.into()),
        }
    }

    pub fn eventually(inner: impl Into<TypeDesc>) -> Self {
        TypeDesc::Eventually(Box::new(inner.into()))
    }

    pub fn shape(&self) -> Shape {
        match self {
            TypeDesc::Any => Shape::Any,
            TypeDesc::Plain(_) => Shape::Plain,
            TypeDesc::ListOf(_) => Shape::ListOf,
            TypeDesc::TypeOf(_) => Shape::TypeOf,
            TypeDesc::Callable { .. } => Shape::Callable,
            TypeDesc::Eventually(_) => Shape::Eventually,
        }
    }

    /// Directly nested descriptors: the element, or the parameters followed
    /// by the return type.
    pub fn nested(&self) -> Vec<&TypeDesc> {
        match self {
            TypeDesc::Any | TypeDesc::Plain(_) => Vec::new(),
            TypeDesc::ListOf(inner) | TypeDesc::TypeOf(inner) | TypeDesc::Eventually(inner) => {
                vec![inner.as_ref()]
            }
            TypeDesc::Callable { params, ret } => {
                params.iter().chain(std::iter::once(ret.as_ref())).collect()
            }
        }
    }

    /// Element of a `ListOf`, `TypeOf` or `Eventually` descriptor.
    pub fn element(&self) -> Option<&TypeDesc> {
        match self {
            TypeDesc::ListOf(inner) | TypeDesc::TypeOf(inner) | TypeDesc::Eventually(inner) => {
                Some(inner)
            }
            _ => None,
        }
    }

    pub fn as_plain(&self) -> Option<&Ty> {
        match self {
            TypeDesc::Plain(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeDesc::Any)
    }
}

impl From<Ty> for TypeDesc {
    fn from(ty: Ty) -> Self {
        TypeDesc::Plain(ty)
    }
}

impl From<&Ty> for TypeDesc {
    fn from(ty: &Ty) -> Self {
        TypeDesc::Plain(ty.clone())
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Any => f.write_str("Any"),
            TypeDesc::Plain(ty) => write!(f, "{}", ty),
            TypeDesc::ListOf(inner) => write!(f, "List[{}]", inner),
            TypeDesc::TypeOf(inner) => write!(f, "Type[{}]", inner),
            TypeDesc::Eventually(inner) => write!(f, "Eventually[{}]", inner),
            TypeDesc::Callable { params, ret } => {
                f.write_str("Callable[[")?;
                for (idx, param) in params.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, "], {}]", ret)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dog;

    #[test]
    fn display_is_stable() {
        let nested = TypeDesc::list_of(TypeDesc::type_of(TypeDesc::plain::<Dog>()));
        assert_eq!(nested.to_string(), "List[Type[Dog]]");
        assert_eq!(
            TypeDesc::eventually(TypeDesc::plain::<u32>()).to_string(),
            "Eventually[u32]"
        );
        assert_eq!(TypeDesc::callable([], TypeDesc::Any).to_string(), "Callable[[], Any]");
    }

    #[test]
    fn nested_descriptors() {
        let callable = TypeDesc::callable(
            [TypeDesc::plain::<u8>(), TypeDesc::Any],
            TypeDesc::plain::<String>(),
        );
        assert_eq!(callable.shape(), Shape::Callable);
        assert_eq!(callable.nested().len(), 3);
        assert!(callable.element().is_none());

        let list = TypeDesc::list_of(Ty::of::<Dog>());
        assert_eq!(list.element(), Some(&TypeDesc::plain::<Dog>()));
        assert!(TypeDesc::Any.nested().is_empty());
    }

    #[test]
    fn structural_equality() {
        let a = TypeDesc::list_of(TypeDesc::plain::<Dog>());
        let b = TypeDesc::list_of(Ty::class::<Dog>().extends(Ty::of::<u8>()).build());
        assert_eq!(a, b);
        assert_ne!(a, TypeDesc::type_of(TypeDesc::plain::<Dog>()));
    }
}
