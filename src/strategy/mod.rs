//! Matching strategies.
//!
//! Each strategy owns one request shape and knows how a producer can
//! satisfy it. A [`StrategyChain`] keeps strategies ordered by descending
//! priority; the first strategy whose [`MatchStrategy::can_match`] accepts a
//! request handles it alone.
//!
//! Strategies defined outside this crate join the discovered chain by adding
//! a [`StrategyEntry`] to the [`STRATEGIES`] distributed slice:
//!
//! ```rust,ignore
//! use autowire::strategy::{StrategyEntry, STRATEGIES};
//!
//! #[linkme::distributed_slice(STRATEGIES)]
//! static SETTINGS_STRATEGY: StrategyEntry = StrategyEntry {
//!     name: "settings",
//!     factory: || std::sync::Arc::new(SettingsStrategy),
//! };
//! ```

mod callable;
mod list;
mod object;
mod type_of;

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::descriptors::TypeDesc;
use crate::error::DiResult;
use crate::registration::Producer;
use crate::resolver::Resolver;
use crate::value::Value;

pub use callable::CallableStrategy;
pub use list::ListStrategy;
pub use object::ObjectStrategy;
pub use type_of::TypeOfStrategy;

/// A policy producing values for one shape of request.
pub trait MatchStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Higher priorities are consulted first.
    fn priority(&self) -> i32 {
        0
    }

    /// Whether this strategy handles `requested`.
    fn can_match(&self, requested: &TypeDesc) -> bool;

    /// The value `producer` yields for `requested`, if it is compatible.
    fn match_producer(
        &self,
        _requested: &TypeDesc,
        _producer: &Arc<Producer>,
        _resolver: &Resolver<'_>,
    ) -> DiResult<Option<Value>> {
        Ok(None)
    }

    /// Every value satisfying `requested`, in registration order.
    ///
    /// Strategies that aggregate or arbitrate between producers override this.
    fn candidates(&self, requested: &TypeDesc, resolver: &Resolver<'_>) -> DiResult<Vec<Value>> {
        let mut found = Vec::new();
        for producer in resolver.registry().producers() {
            if let Some(value) = self.match_producer(requested, &producer, resolver)? {
                found.push(value);
            }
        }
        Ok(found)
    }
}

/// Link-time registration of a [`MatchStrategy`].
pub struct StrategyEntry {
    pub name: &'static str,
    pub factory: fn() -> Arc<dyn MatchStrategy>,
}

/// Strategies contributed by linked crates and modules.
#[linkme::distributed_slice]
pub static STRATEGIES: [StrategyEntry] = [..];

static DISCOVERED: Lazy<StrategyChain> = Lazy::new(|| {
    let mut chain = StrategyChain::builtin();
    for entry in STRATEGIES {
        let strategy = (entry.factory)();
        tracing::debug!(
            entry = entry.name,
            strategy = strategy.name(),
            priority = strategy.priority(),
            "discovered matching strategy"
        );
        chain.push(strategy);
    }
    chain
});

/// Strategies ordered by descending priority, ties in insertion order.
#[derive(Clone, Default)]
pub struct StrategyChain {
    strategies: Vec<Arc<dyn MatchStrategy>>,
}

impl StrategyChain {
    pub fn empty() -> Self {
        Self::default()
    }

    /// type-of, list, callable and object strategies.
    pub fn builtin() -> Self {
        Self::empty()
            .with(TypeOfStrategy)
            .with(ListStrategy)
            .with(CallableStrategy)
            .with(ObjectStrategy)
    }

    /// Built-ins plus every strategy in [`STRATEGIES`]. Computed once per
    /// process.
    pub fn discovered() -> Self {
        DISCOVERED.clone()
    }

    pub fn with(mut self, strategy: impl MatchStrategy + 'static) -> Self {
        self.push(Arc::new(strategy));
        self
    }

    /// Inserts after every strategy of greater or equal priority.
    pub fn push(&mut self, strategy: Arc<dyn MatchStrategy>) {
        let priority = strategy.priority();
        let at = self
            .strategies
            .iter()
            .position(|existing| existing.priority() < priority)
            .unwrap_or(self.strategies.len());
        self.strategies.insert(at, strategy);
    }

    /// The strategy owning `requested`, if any.
    pub fn select(&self, requested: &TypeDesc) -> Option<&Arc<dyn MatchStrategy>> {
        self.strategies.iter().find(|strategy| strategy.can_match(requested))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn MatchStrategy>> {
        self.strategies.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl fmt::Debug for StrategyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
