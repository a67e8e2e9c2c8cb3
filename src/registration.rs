//! Producer descriptors and the registration builder.

use std::fmt;
use std::sync::Arc;

use crate::lifetime::Lifetime;
use crate::registry::Registry;
use crate::subject::Subject;

/// Open metadata bag attached to every producer.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// A registered subject together with its registration metadata.
///
/// Immutable once registered; registries share it by `Arc`.
pub struct Producer {
    subject: Subject,
    name: String,
    priority: i32,
    lifetime: Lifetime,
    meta: Meta,
}

impl Producer {
    /// A transient producer named after its subject, priority 0.
    pub fn new(subject: impl Into<Subject>) -> Self {
        Injectable::new(subject).into_producer()
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn is_singleton(&self) -> bool {
        self.lifetime == Lifetime::Singleton
    }

    /// User metadata; always carries the resolved `name`.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("lifetime", &self.lifetime)
            .field("subject", &self.subject)
            .finish()
    }
}

/// Builder registering a subject as a producer.
///
/// # Examples
///
/// ```rust
/// use autowire::{Injectable, Registry, Ty};
///
/// #[derive(Default)]
/// struct Mailer;
///
/// let registry = Registry::new();
/// let class = Injectable::new(Ty::class::<Mailer>().default_constructor())
///     .name("smtp")
///     .priority(5)
///     .singleton(true)
///     .meta("transport", "smtp")
///     .register_in(&registry);
///
/// assert!(registry.contains("smtp"));
/// let producer = &registry.producers()[0];
/// assert_eq!(producer.meta()["name"], "smtp");
/// assert_eq!(producer.meta()["transport"], "smtp");
/// # let _ = class;
/// ```
#[must_use = "call register() or register_in() to register the subject"]
pub struct Injectable {
    subject: Subject,
    name: Option<String>,
    priority: i32,
    lifetime: Lifetime,
    meta: Meta,
}

impl Injectable {
    pub fn new(subject: impl Into<Subject>) -> Self {
        Self {
            subject: subject.into(),
            name: None,
            priority: 0,
            lifetime: Lifetime::Transient,
            meta: Meta::new(),
        }
    }

    /// Registration name; defaults to the subject's declared name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn singleton(mut self, singleton: bool) -> Self {
        self.lifetime = if singleton { Lifetime::Singleton } else { Lifetime::Transient };
        self
    }

    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Replaces the whole metadata bag.
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn into_producer(self) -> Producer {
        let name = self.name.unwrap_or_else(|| self.subject.name().to_owned());
        let mut meta = self.meta;
        meta.insert("name".to_owned(), serde_json::Value::String(name.clone()));
        Producer {
            subject: self.subject,
            name,
            priority: self.priority,
            lifetime: self.lifetime,
            meta,
        }
    }

    /// Registers into the process-wide default registry and hands the
    /// subject back.
    pub fn register(self) -> Subject {
        self.register_in(Registry::global())
    }

    /// Registers into `registry` and hands the subject back, so the same
    /// subject can be registered elsewhere under another name.
    pub fn register_in(self, registry: &Registry) -> Subject {
        let subject = self.subject.clone();
        register_producer(self.into_producer(), registry);
        subject
    }
}

/// Adds `producer` to `registry`. Returns `false` when a producer with the
/// same name is already registered there.
pub fn register_producer(producer: Producer, registry: &Registry) -> bool {
    registry.register(Arc::new(producer))
}
