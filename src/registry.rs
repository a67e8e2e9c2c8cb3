//! Isolated stores of producers and singleton instances.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

use crate::config::EngineSettings;
use crate::descriptors::TypeDesc;
use crate::error::{DiError, DiResult};
use crate::observer::{Observers, ResolutionObserver, TracingObserver};
use crate::registration::Producer;
use crate::resolver::Resolver;
use crate::strategy::StrategyChain;
use crate::ty::Ty;
use crate::value::{Instance, Value};

static GLOBAL: Lazy<Registry> = Lazy::new(|| {
    let settings = EngineSettings::from_env().unwrap_or_else(|error| {
        tracing::warn!(%error, "ignoring invalid engine settings from the environment");
        EngineSettings::default()
    });
    Registry::with_settings(settings)
});

struct CachedInstance {
    instance: Instance,
    priority: i32,
}

struct RegistryInner {
    producers: RwLock<Vec<Arc<Producer>>>,
    instances: Mutex<HashMap<TypeDesc, CachedInstance>>,
    strategies: StrategyChain,
    observers: RwLock<Observers>,
    settings: EngineSettings,
}

/// An isolated store of producers and cached singleton instances.
///
/// `Registry` is a cheap handle: clones share the same store. Registries
/// never see each other's producers or instances.
///
/// # Examples
///
/// ```rust
/// use autowire::{Injectable, Registry, Ty};
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
/// let registry = Registry::new();
/// let class = Ty::class::<English>()
///     .implements::<dyn Greeter>(Ty::of::<dyn Greeter>(), |e| e)
///     .constructor(|_| Ok(English));
/// Injectable::new(class).register_in(&registry);
///
/// let greeter = registry.get::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// assert!(Registry::new().get::<dyn Greeter>().is_err());
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// A registry using the discovered strategy chain and default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn with_strategies(strategies: StrategyChain) -> Self {
        Self::builder().strategies(strategies).build()
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self::builder().settings(settings).build()
    }

    /// The process-wide default registry, created on first use.
    ///
    /// Its settings come from `AUTOWIRE_*` environment variables.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Adds `producer` unless one with the same name exists. Returns whether
    /// it was added.
    pub fn register(&self, producer: Arc<Producer>) -> bool {
        let mut producers = self.inner.producers.write();
        if producers.iter().any(|existing| existing.name() == producer.name()) {
            tracing::debug!(name = producer.name(), "producer already registered, skipping");
            return false;
        }
        tracing::debug!(
            name = producer.name(),
            priority = producer.priority(),
            lifetime = ?producer.lifetime(),
            "registered producer"
        );
        producers.push(producer);
        true
    }

    /// Snapshot of the producers in registration order.
    pub fn producers(&self) -> Vec<Arc<Producer>> {
        self.inner.producers.read().clone()
    }

    pub fn producer(&self, name: &str) -> Option<Arc<Producer>> {
        self.inner
            .producers
            .read()
            .iter()
            .find(|producer| producer.name() == name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.producers.read().iter().any(|producer| producer.name() == name)
    }

    pub fn len(&self) -> usize {
        self.inner.producers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.producers.read().is_empty()
    }

    /// The singleton instance cached for `requested`.
    pub fn get_cached(&self, requested: &TypeDesc) -> Option<Instance> {
        self.inner
            .instances
            .lock()
            .get(requested)
            .map(|cached| cached.instance.clone())
    }

    /// Priority of the producer whose instance is cached for `requested`.
    pub fn cached_priority(&self, requested: &TypeDesc) -> Option<i32> {
        self.inner.instances.lock().get(requested).map(|cached| cached.priority)
    }

    /// Caches `instance` for `requested` unless an instance of equal or
    /// higher priority is already cached. Returns whether it was stored.
    pub fn set_cached(&self, requested: TypeDesc, instance: Instance, priority: i32) -> bool {
        let mut instances = self.inner.instances.lock();
        match instances.get(&requested).map(|cached| cached.priority) {
            Some(cached) if cached >= priority => {
                tracing::trace!(%requested, priority, cached, "kept cached singleton");
                return false;
            }
            Some(replaced) => tracing::debug!(%requested, priority, replaced, "overrode cached singleton"),
            None => tracing::debug!(%requested, priority, "cached singleton"),
        }
        instances.insert(requested, CachedInstance { instance, priority });
        true
    }

    pub fn strategies(&self) -> &StrategyChain {
        &self.inner.strategies
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.inner.settings
    }

    pub fn add_observer(&self, observer: Arc<dyn ResolutionObserver>) {
        self.inner.observers.write().add(observer);
    }

    /// Snapshot of the observers, or `None` when there are none.
    pub(crate) fn observers(&self) -> Option<Observers> {
        let observers = self.inner.observers.read();
        observers.has_observers().then(|| observers.clone())
    }

    /// Identity of the shared store.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    /// Whether both handles point at the same store.
    pub fn ptr_eq(a: &Registry, b: &Registry) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Resolves `requested` to a single value.
    pub fn resolve(&self, requested: &TypeDesc) -> DiResult<Value> {
        Resolver::new(self).resolve(requested)
    }

    /// Every candidate for `requested`, in registration order.
    pub fn resolve_all(&self, requested: &TypeDesc) -> DiResult<Vec<Value>> {
        Resolver::new(self).candidates(requested)
    }

    /// Resolves an instance of `T`.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        Resolver::new(self).get::<T>()
    }

    /// Resolves every instance of `T`.
    pub fn get_all<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<T>>> {
        Resolver::new(self).get_all::<T>()
    }

    /// Resolves a registered class satisfying `Type[ty]`.
    pub fn get_type(&self, ty: &Ty) -> DiResult<Ty> {
        let value = self.resolve(&TypeDesc::type_of(ty))?;
        value
            .as_type()
            .cloned()
            .ok_or_else(|| DiError::TypeMismatch(format!("Type[{}] resolved to a {}", ty, value.kind())))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("producers", &self.len())
            .field("cached", &self.inner.instances.lock().len())
            .field("strategies", &self.inner.strategies)
            .field("observers", &self.inner.observers.read().len())
            .field("settings", &self.inner.settings)
            .finish()
    }
}

/// Builder for [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    strategies: Option<StrategyChain>,
    settings: EngineSettings,
    observers: Observers,
}

impl RegistryBuilder {
    /// Replaces the discovered strategy chain.
    pub fn strategies(mut self, strategies: StrategyChain) -> Self {
        self.strategies = Some(strategies);
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ResolutionObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn build(self) -> Registry {
        let mut observers = self.observers;
        if self.settings.trace_resolutions {
            observers.add(Arc::new(TracingObserver::new()));
        }
        Registry {
            inner: Arc::new(RegistryInner {
                producers: RwLock::new(Vec::new()),
                instances: Mutex::new(HashMap::new()),
                strategies: self.strategies.unwrap_or_else(StrategyChain::discovered),
                observers: RwLock::new(observers),
                settings: self.settings,
            }),
        }
    }
}
