//! Producer lifetime definitions.

use serde::{Deserialize, Serialize};

/// Producer lifetimes controlling instance caching behavior.
///
/// # Examples
///
/// ```rust
/// use autowire::{Injectable, Registry, Ty};
///
/// #[derive(Default)]
/// struct Database;
/// #[derive(Default)]
/// struct Request;
///
/// let registry = Registry::new();
/// Injectable::new(Ty::class::<Database>().default_constructor())
///     .singleton(true)
///     .register_in(&registry);
/// Injectable::new(Ty::class::<Request>().default_constructor())
///     .register_in(&registry);
///
/// // Singleton: the same instance on every resolution
/// let db1 = registry.get::<Database>().unwrap();
/// let db2 = registry.get::<Database>().unwrap();
/// assert!(std::sync::Arc::ptr_eq(&db1, &db2));
///
/// // Transient: a new instance every time
/// let r1 = registry.get::<Request>().unwrap();
/// let r2 = registry.get::<Request>().unwrap();
/// assert!(!std::sync::Arc::ptr_eq(&r1, &r2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// New instance per resolution, never cached
    #[default]
    Transient,
    /// One instance per registry and requested type, created on first use
    ///
    /// When several singleton producers satisfy the same request, the one
    /// with the highest priority supplies the cached instance. The cache is
    /// keyed by the requested descriptor, so a list request yields that one
    /// instance once for every matching singleton producer.
    Singleton,
}
