//! # autowire
//!
//! Type-compatibility driven dependency resolution for Rust.
//!
//! Producers (classes and functions) are registered into a [`Registry`]
//! with a name, a priority and a lifetime. A request is a [`TypeDesc`]:
//! an instance of a type, a list of every compatible value, the type itself,
//! or a function of a given signature. The engine answers it from whatever
//! compatible producers are registered, without the caller wiring anything.
//!
//! ## Features
//!
//! - **Subtype matching**: declared supertype edges with upcasts, so an
//!   `Arc<Dog>` satisfies a request for `dyn Animal`
//! - **Structural requests**: `List[..]`, `Type[..]`, `Callable[..]` and
//!   `Eventually[..]` at any nesting depth
//! - **Singletons with priority override**: one instance per registry and
//!   request, replaced only by a higher priority producer
//! - **Isolated registries**: any number of registries, plus a lazily
//!   created process-wide default
//! - **Injection**: wrap a function and call it with only the arguments you
//!   want to supply
//! - **Circular dependency detection** with the full construction path
//! - **Discovery**: producer manifests on disk and link-time strategies
//!
//! ## Quick Start
//!
//! ```rust
//! use autowire::{inject, CallArgs, Function, Injectable, Registry, Ty, TypeDesc, Value};
//! use std::sync::Arc;
//!
//! trait Animal: Send + Sync {
//!     fn sound(&self) -> &'static str;
//! }
//!
//! #[derive(Default)]
//! struct Dog;
//! impl Animal for Dog {
//!     fn sound(&self) -> &'static str { "bark" }
//! }
//!
//! #[derive(Default)]
//! struct Cat;
//! impl Animal for Cat {
//!     fn sound(&self) -> &'static str { "meow" }
//! }
//!
//! let animal = Ty::of::<dyn Animal>();
//! let registry = Registry::new();
//! Injectable::new(
//!     Ty::class::<Dog>()
//!         .implements::<dyn Animal>(animal.clone(), |d| d)
//!         .default_constructor(),
//! )
//! .register_in(&registry);
//! Injectable::new(
//!     Ty::class::<Cat>()
//!         .implements::<dyn Animal>(animal.clone(), |c| c)
//!         .default_constructor(),
//! )
//! .register_in(&registry);
//!
//! let chorus = Function::builder("chorus")
//!     .param("animals", TypeDesc::list_of(animal.clone()))
//!     .returns(TypeDesc::plain::<String>())
//!     .build(|args| {
//!         let animals = args.get_all::<dyn Animal>("animals")?;
//!         let sounds: Vec<_> = animals.iter().map(|a| a.sound()).collect();
//!         Ok(Value::new(sounds.join(" ")))
//!     });
//!
//! let chorus = inject(chorus, &registry).unwrap();
//! let out = chorus.call(CallArgs::new()).unwrap();
//! assert_eq!(out.get::<String>().unwrap().as_str(), "bark meow");
//! ```
//!
//! ## Lifetimes
//!
//! - **Transient**: constructed on every resolution (the default)
//! - **Singleton**: constructed once per registry and requested type
//!
//! ## Matching
//!
//! Requests are routed through a [`StrategyChain`]. The first strategy that
//! claims a request's shape handles it alone; see [`strategy`] for the
//! built-in strategies and how to add more.

pub mod compat;
pub mod config;
pub mod descriptors;
pub mod discovery;
pub mod error;
pub mod inject;
pub mod lifetime;
pub mod observer;
pub mod registration;
pub mod registry;
pub mod resolver;
pub mod strategy;
pub mod subject;
pub mod ty;
pub mod value;

mod internal;

pub use config::{
    ConfigProvider, ConfigSource, ConfigValue, EngineSettings, EnvironmentConfigSource, JsonConfigSource,
    MemoryConfigSource,
};
pub use descriptors::{Shape, TypeDesc};
pub use discovery::{discover, discover_manifests, Catalog, LoadedManifest, Manifest, ManifestEntry, ManifestLoader, UnitLoader};
pub use error::{BoxError, DiError, DiResult};
pub use inject::{inject, inject_default, Injected};
pub use lifetime::Lifetime;
pub use observer::{LoggingObserver, ResolutionObserver, TracingObserver};
pub use registration::{register_producer, Injectable, Meta, Producer};
pub use registry::{Registry, RegistryBuilder};
pub use resolver::{collect_candidates, resolve_one, resolve_parameters, Resolver};
pub use strategy::{MatchStrategy, StrategyChain, StrategyEntry, STRATEGIES};
pub use subject::{BoxFuture, Class, Function, FunctionBuilder, Param, Signature, Subject};
pub use ty::{Ty, TypeBuilder};
pub use value::{Arguments, CallArgs, Instance, Value};

/// Resolves `requested` against `registry`.
pub fn resolve(requested: &TypeDesc, registry: &Registry) -> DiResult<Value> {
    resolve_one(requested, registry)
}

/// Resolves `requested` against the process-wide default registry.
pub fn resolve_default(requested: &TypeDesc) -> DiResult<Value> {
    resolve_one(requested, Registry::global())
}
