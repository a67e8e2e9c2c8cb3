use std::sync::Arc;

use crate::compat::subject_matches;
use crate::descriptors::TypeDesc;
use crate::error::DiResult;
use crate::registration::Producer;
use crate::resolver::Resolver;
use crate::strategy::MatchStrategy;
use crate::subject::Class;
use crate::value::Value;

/// Answers plain and `Any` requests with class instances.
///
/// Transient producers construct on every call. Singleton producers share
/// one instance per registry and requested descriptor: among the matching
/// singletons the highest priority one (first registered on ties) supplies
/// it, and only replaces a cached instance of strictly lower priority.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectStrategy;

impl ObjectStrategy {
    fn instantiable<'p>(requested: &TypeDesc, producer: &'p Producer) -> Option<&'p Class> {
        let class = producer.subject().as_class()?;
        if class.is_abstract() {
            return None;
        }
        let accepted = match requested {
            TypeDesc::Any => true,
            TypeDesc::Plain(ty) => subject_matches(class.ty(), ty),
            _ => false,
        };
        accepted.then_some(class)
    }

    /// Constructs `producer` into the cache unless an instance of equal or
    /// higher priority is already there.
    fn ensure_cached(
        requested: &TypeDesc,
        producer: &Arc<Producer>,
        class: &Class,
        resolver: &Resolver<'_>,
    ) -> DiResult<()> {
        let registry = resolver.registry();
        let stale = registry
            .cached_priority(requested)
            .map_or(true, |cached| cached < producer.priority());
        if stale {
            let instance = resolver.construct(producer, class)?;
            registry.set_cached(requested.clone(), instance, producer.priority());
        }
        Ok(())
    }
}

impl MatchStrategy for ObjectStrategy {
    fn name(&self) -> &str {
        "object"
    }

    fn priority(&self) -> i32 {
        0
    }

    fn can_match(&self, requested: &TypeDesc) -> bool {
        matches!(requested, TypeDesc::Plain(_) | TypeDesc::Any)
    }

    fn match_producer(
        &self,
        requested: &TypeDesc,
        producer: &Arc<Producer>,
        resolver: &Resolver<'_>,
    ) -> DiResult<Option<Value>> {
        let Some(class) = Self::instantiable(requested, producer) else {
            return Ok(None);
        };
        if !producer.is_singleton() {
            return resolver.construct(producer, class).map(|instance| Some(Value::Instance(instance)));
        }
        Self::ensure_cached(requested, producer, class, resolver)?;
        Ok(resolver.registry().get_cached(requested).map(Value::Instance))
    }

    fn candidates(&self, requested: &TypeDesc, resolver: &Resolver<'_>) -> DiResult<Vec<Value>> {
        let producers = resolver.registry().producers();
        let matching: Vec<(&Arc<Producer>, &Class)> = producers
            .iter()
            .filter_map(|producer| Self::instantiable(requested, producer).map(|class| (producer, class)))
            .collect();

        let mut winner: Option<(&Arc<Producer>, &Class)> = None;
        for &(producer, class) in matching.iter().filter(|(producer, _)| producer.is_singleton()) {
            if winner.map_or(true, |(best, _)| producer.priority() > best.priority()) {
                winner = Some((producer, class));
            }
        }
        if let Some((producer, class)) = winner {
            Self::ensure_cached(requested, producer, class, resolver)?;
        }

        let mut found = Vec::with_capacity(matching.len());
        for (producer, class) in matching {
            if producer.is_singleton() {
                if let Some(cached) = resolver.registry().get_cached(requested) {
                    found.push(Value::Instance(cached));
                }
            } else {
                found.push(Value::Instance(resolver.construct(producer, class)?));
            }
        }
        tracing::trace!(%requested, candidates = found.len(), "object candidates");
        Ok(found)
    }
}
