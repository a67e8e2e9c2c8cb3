//! Resolution contexts and argument collection.

use std::sync::Arc;
use std::time::Instant;

use crate::descriptors::TypeDesc;
use crate::error::{DiError, DiResult};
use crate::internal::ResolutionStack;
use crate::registration::Producer;
use crate::registry::Registry;
use crate::subject::{Class, Signature};
use crate::value::{CallArgs, Instance, Value};

/// The context of one resolution.
///
/// Strategies receive it to reach the registry and recurse; constructors
/// receive it to pull their own dependencies. Producers under construction
/// are tracked per thread and registry, so a constructor that needs itself,
/// directly or through others, fails with [`DiError::Circular`] instead of
/// recursing. This holds even when it resolves through a cloned [`Registry`].
///
/// # Examples
///
/// ```rust
/// use autowire::{Injectable, Registry, Ty};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Config { url: String }
/// struct Database { config: Arc<Config> }
///
/// let registry = Registry::new();
/// Injectable::new(Ty::class::<Config>().default_constructor())
///     .singleton(true)
///     .register_in(&registry);
/// Injectable::new(Ty::class::<Database>().constructor(|resolver| {
///     Ok(Database { config: resolver.get::<Config>()? })
/// }))
/// .register_in(&registry);
///
/// let db = registry.get::<Database>().unwrap();
/// assert!(Arc::ptr_eq(&db.config, &registry.get::<Config>().unwrap()));
/// ```
pub struct Resolver<'r> {
    registry: &'r Registry,
    stack: ResolutionStack,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            stack: ResolutionStack::new(registry.id(), registry.settings().max_depth),
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Number of constructors of this registry running on this thread.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Names of the producers under construction, outermost first.
    pub fn path(&self) -> Vec<String> {
        self.stack.path()
    }

    /// Every value the owning strategy produces for `requested`; empty when
    /// no strategy claims it.
    pub fn candidates(&self, requested: &TypeDesc) -> DiResult<Vec<Value>> {
        match self.registry.strategies().select(requested) {
            Some(strategy) => {
                tracing::trace!(%requested, strategy = strategy.name(), "selected strategy");
                strategy.candidates(requested, self)
            }
            None => {
                tracing::trace!(%requested, "no strategy claims request");
                Ok(Vec::new())
            }
        }
    }

    /// The first candidate for `requested`.
    pub fn resolve(&self, requested: &TypeDesc) -> DiResult<Value> {
        self.observed(requested, |resolver| {
            let candidates = resolver.candidates(requested)?;
            let count = candidates.len();
            candidates
                .into_iter()
                .next()
                .map(|value| (value, count))
                .ok_or_else(|| DiError::Resolution(requested.clone()))
        })
    }

    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let requested = TypeDesc::plain::<T>();
        let value = self.resolve(&requested)?;
        value
            .get::<T>()
            .ok_or_else(|| DiError::TypeMismatch(requested.to_string()))
    }

    pub fn get_all<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<T>>> {
        self.resolve(&TypeDesc::list_of(TypeDesc::plain::<T>()))?.get_all::<T>()
    }

    /// Binds every declared parameter the caller did not supply.
    ///
    /// Positional values cover the leading parameters, keyword values cover
    /// parameters by name, and receivers (`self`, `cls`) are left to the
    /// caller. Each remaining parameter takes its first candidate, then its
    /// default, and otherwise fails with [`DiError::Injection`].
    pub fn resolve_parameters(
        &self,
        signature: &Signature,
        supplied: &CallArgs,
    ) -> DiResult<Vec<(String, Value)>> {
        validate_supplied(signature, supplied)?;
        let positional = supplied.positional().len();
        let mut bound = Vec::new();
        for (index, param) in signature.params().iter().enumerate() {
            if index < positional || param.is_receiver() || supplied.keyword(param.name()).is_some() {
                continue;
            }
            let value = self.observed(param.desc(), |resolver| {
                let candidates = resolver.candidates(param.desc())?;
                let count = candidates.len();
                match candidates.into_iter().next() {
                    Some(value) => Ok((value, count)),
                    None => param.default().cloned().map(|value| (value, 0)).ok_or_else(|| {
                        DiError::Injection {
                            parameter: param.name().to_owned(),
                            requested: param.desc().clone(),
                        }
                    }),
                }
            })?;
            bound.push((param.name().to_owned(), value));
        }
        Ok(bound)
    }

    /// Runs `producer`'s constructor inside this context.
    pub(crate) fn construct(&self, producer: &Arc<Producer>, class: &Class) -> DiResult<Instance> {
        let _guard = self.stack.enter(producer.name())?;
        tracing::trace!(producer = producer.name(), depth = self.stack.depth(), "constructing");
        class.construct(self).map(|instance| instance.with_producer(producer))
    }

    fn observed<T>(
        &self,
        requested: &TypeDesc,
        run: impl FnOnce(&Self) -> DiResult<(T, usize)>,
    ) -> DiResult<T> {
        let Some(observers) = self.registry.observers() else {
            return run(self).map(|(value, _)| value);
        };
        observers.resolving(requested);
        let started = Instant::now();
        match run(self) {
            Ok((value, candidates)) => {
                observers.resolved(requested, started.elapsed(), candidates);
                Ok(value)
            }
            Err(error) => {
                observers.failed(requested, &error);
                Err(error)
            }
        }
    }
}

fn validate_supplied(signature: &Signature, supplied: &CallArgs) -> DiResult<()> {
    let params = signature.params();
    if supplied.positional().len() > params.len() {
        return Err(DiError::InvalidUsage(format!(
            "takes {} arguments but {} were given",
            params.len(),
            supplied.positional().len()
        )));
    }
    for (name, _) in supplied.keywords() {
        let index = params
            .iter()
            .position(|param| param.name() == name)
            .ok_or_else(|| DiError::InvalidUsage(format!("unexpected keyword argument `{}`", name)))?;
        if index < supplied.positional().len() {
            return Err(DiError::InvalidUsage(format!("multiple values for argument `{}`", name)));
        }
    }
    Ok(())
}

/// Resolves `requested` against `registry`.
pub fn resolve_one(requested: &TypeDesc, registry: &Registry) -> DiResult<Value> {
    Resolver::new(registry).resolve(requested)
}

/// Every candidate `registry` offers for `requested`.
pub fn collect_candidates(requested: &TypeDesc, registry: &Registry) -> DiResult<Vec<Value>> {
    Resolver::new(registry).candidates(requested)
}

/// Binds the parameters of `signature` not covered by `supplied`.
pub fn resolve_parameters(
    signature: &Signature,
    registry: &Registry,
    supplied: &CallArgs,
) -> DiResult<Vec<(String, Value)>> {
    Resolver::new(registry).resolve_parameters(signature, supplied)
}
