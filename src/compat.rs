//! The type-relation engine.
//!
//! Decides whether a candidate's declared descriptor satisfies a requested
//! one. The rules recurse over every level of nesting.

use crate::descriptors::TypeDesc;
use crate::ty::Ty;

/// Returns `true` when a value described by `candidate` satisfies `requested`.
///
/// | requested              | compatible candidate                                  |
/// |------------------------|-------------------------------------------------------|
/// | `Any`                  | anything                                              |
/// | `Plain(T)`             | `Plain(C)` with `C` a subtype of `T`                   |
/// | `ListOf(E)`            | `ListOf(E')` with `E'` compatible with `E`             |
/// | `TypeOf(E)`            | `TypeOf(E')` with `E'` compatible with `E`             |
/// | `Eventually(E)`        | `Eventually(E')` with `E'` compatible with `E`         |
/// | `Callable(P.. -> R)`   | same arity, each parameter and the return compatible   |
///
/// # Examples
///
/// ```rust
/// use autowire::{compat, TypeDesc};
///
/// let strings = TypeDesc::list_of(TypeDesc::plain::<String>());
/// let anything = TypeDesc::list_of(TypeDesc::Any);
///
/// assert!(compat::is_compatible(&strings, &anything));
/// assert!(!compat::is_compatible(&anything, &strings));
/// ```
pub fn is_compatible(candidate: &TypeDesc, requested: &TypeDesc) -> bool {
    match (candidate, requested) {
        (_, TypeDesc::Any) => true,
        (TypeDesc::Plain(c), TypeDesc::Plain(t)) => subject_matches(c, t),
        (TypeDesc::ListOf(c), TypeDesc::ListOf(t))
        | (TypeDesc::TypeOf(c), TypeDesc::TypeOf(t))
        | (TypeDesc::Eventually(c), TypeDesc::Eventually(t)) => is_compatible(c, t),
        (
            TypeDesc::Callable { params: cp, ret: cr },
            TypeDesc::Callable { params: tp, ret: tr },
        ) => params_match(cp, tp) && return_matches(cr, tr),
        _ => false,
    }
}

/// Plain subtype check used when the request reduces to "an instance of `requested`".
pub fn subject_matches(subject: &Ty, requested: &Ty) -> bool {
    subject.is_subtype_of(requested)
}

fn params_match(declared: &[TypeDesc], requested: &[TypeDesc]) -> bool {
    declared.len() == requested.len()
        && declared
            .iter()
            .zip(requested)
            .all(|(declared, requested)| requested.is_any() || is_compatible(declared, requested))
}

// An asynchronous candidate declares `Eventually(X)`; it satisfies both an
// explicit `Eventually(Y)` and a bare `Y`.
fn return_matches(declared: &TypeDesc, requested: &TypeDesc) -> bool {
    if requested.is_any() || is_compatible(declared, requested) {
        return true;
    }
    match (declared, requested) {
        (TypeDesc::Eventually(inner), requested) if !matches!(requested, TypeDesc::Eventually(_)) => {
            is_compatible(inner, requested)
        }
        _ => false,
    }
}
