//! Resolution observers for diagnostics.
//!
//! Observers are registered per [`Registry`](crate::Registry) and notified
//! around every top-level and nested resolution. With no observer registered
//! notification costs one lock read.

use std::sync::Arc;
use std::time::Duration;

use crate::descriptors::TypeDesc;
use crate::error::DiError;

/// Hooks called during resolution.
///
/// Calls are made synchronously on the resolving thread. Keep
/// implementations fast.
///
/// # Examples
///
/// ```rust
/// use autowire::{DiError, Registry, ResolutionObserver, TypeDesc};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Failures(AtomicUsize);
///
/// impl ResolutionObserver for Failures {
///     fn resolving(&self, _requested: &TypeDesc) {}
///     fn resolved(&self, _requested: &TypeDesc, _duration: Duration, _candidates: usize) {}
///     fn failed(&self, _requested: &TypeDesc, _error: &DiError) {
///         self.0.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let failures = Arc::new(Failures::default());
/// let registry = Registry::new();
/// registry.add_observer(failures.clone());
///
/// assert!(registry.resolve(&TypeDesc::plain::<String>()).is_err());
/// assert_eq!(failures.0.load(Ordering::SeqCst), 1);
/// ```
pub trait ResolutionObserver: Send + Sync {
    /// Resolution of `requested` is starting.
    fn resolving(&self, requested: &TypeDesc);

    /// Resolution succeeded after `duration`, choosing among `candidates`.
    fn resolved(&self, requested: &TypeDesc, duration: Duration, candidates: usize);

    /// Resolution failed.
    fn failed(&self, requested: &TypeDesc, error: &DiError);
}

#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ResolutionObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn resolving(&self, requested: &TypeDesc) {
        for observer in &self.observers {
            observer.resolving(requested);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, requested: &TypeDesc, duration: Duration, candidates: usize) {
        for observer in &self.observers {
            observer.resolved(requested, duration, candidates);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, requested: &TypeDesc, error: &DiError) {
        for observer in &self.observers {
            observer.failed(requested, error);
        }
    }
}

/// Observer that emits `tracing` events under the `autowire::resolve` target.
///
/// Installed automatically when
/// [`EngineSettings::trace_resolutions`](crate::EngineSettings) is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl ResolutionObserver for TracingObserver {
    fn resolving(&self, requested: &TypeDesc) {
        tracing::trace!(target: "autowire::resolve", %requested, "resolving");
    }

    fn resolved(&self, requested: &TypeDesc, duration: Duration, candidates: usize) {
        tracing::debug!(
            target: "autowire::resolve",
            %requested,
            candidates,
            elapsed_us = duration.as_micros() as u64,
            "resolved"
        );
    }

    fn failed(&self, requested: &TypeDesc, error: &DiError) {
        tracing::debug!(target: "autowire::resolve", %requested, %error, "resolution failed");
    }
}

/// Built-in observer that prints events to stdout.
///
/// Useful while developing; production code should prefer
/// [`TracingObserver`].
///
/// # Examples
///
/// ```
/// use autowire::{LoggingObserver, Registry};
/// use std::sync::Arc;
///
/// let registry = Registry::new();
/// registry.add_observer(Arc::new(LoggingObserver::with_prefix("[app]")));
/// ```
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "[autowire]".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionObserver for LoggingObserver {
    fn resolving(&self, requested: &TypeDesc) {
        println!("{} Resolving: {}", self.prefix, requested);
    }

    fn resolved(&self, requested: &TypeDesc, duration: Duration, candidates: usize) {
        println!(
            "{} Resolved: {} in {:?} ({} candidates)",
            self.prefix, requested, duration, candidates
        );
    }

    fn failed(&self, requested: &TypeDesc, error: &DiError) {
        eprintln!("{} FAILED {}: {}", self.prefix, requested, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl ResolutionObserver for Recorder {
        fn resolving(&self, requested: &TypeDesc) {
            self.0.lock().push(format!("resolving {}", requested));
        }
        fn resolved(&self, requested: &TypeDesc, _duration: Duration, candidates: usize) {
            self.0.lock().push(format!("resolved {} {}", requested, candidates));
        }
        fn failed(&self, requested: &TypeDesc, _error: &DiError) {
            self.0.lock().push(format!("failed {}", requested));
        }
    }

    #[test]
    fn notifies_every_observer_in_order() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let mut observers = Observers::default();
        assert!(!observers.has_observers());
        observers.add(first.clone());
        observers.add(second.clone());

        let desc = TypeDesc::plain::<u8>();
        observers.resolving(&desc);
        observers.resolved(&desc, Duration::from_millis(1), 2);
        observers.failed(&desc, &DiError::Resolution(desc.clone()));

        let expected = vec!["resolving u8", "resolved u8 2", "failed u8"];
        assert_eq!(*first.0.lock(), expected);
        assert_eq!(*second.0.lock(), expected);
        assert_eq!(observers.len(), 2);
    }

    #[test]
    fn logging_observer_prefix() {
        assert_eq!(LoggingObserver::new().prefix(), "[autowire]");
        assert_eq!(LoggingObserver::with_prefix("[x]").prefix(), "[x]");
    }
}
