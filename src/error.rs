//! Error types for the resolution engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::descriptors::TypeDesc;

/// Boxed error returned by user supplied constructors and function bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Resolution engine errors
///
/// Every failure the engine reports is a `DiError`. The variants fall into
/// four groups:
///
/// - **usage**: [`DiError::InvalidUsage`], detected eagerly when a subject is
///   wrapped for injection or a call is malformed;
/// - **resolution**: [`DiError::Resolution`] and [`DiError::Injection`], no
///   compatible producer and no default value;
/// - **construction**: [`DiError::Construction`] and [`DiError::Invocation`],
///   a producer itself failed; the original error is kept as the source;
/// - **environment**: discovery and configuration problems.
///
/// # Examples
///
/// ```rust
/// use autowire::{DiError, Registry, TypeDesc};
///
/// struct Unregistered;
///
/// let registry = Registry::new();
/// let requested = TypeDesc::plain::<Unregistered>();
/// match registry.resolve(&requested) {
///     Err(DiError::Resolution(desc)) => assert_eq!(desc, requested),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Error)]
pub enum DiError {
    /// The API was used in a way it does not support
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),
    /// No producer satisfies a direct request
    #[error("No compatible producer for {0}")]
    Resolution(TypeDesc),
    /// No producer satisfies a parameter of a wrapped function
    #[error("No compatible producer for parameter `{parameter}` of type {requested}")]
    Injection {
        parameter: String,
        requested: TypeDesc,
    },
    /// A class constructor returned an error
    #[error("Failed to construct {class}")]
    Construction {
        class: String,
        #[source]
        source: BoxError,
    },
    /// A function body returned an error
    #[error("Call to `{function}` failed")]
    Invocation {
        function: String,
        #[source]
        source: BoxError,
    },
    /// A constructor re-entered a producer that is still being constructed
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// The construction stack grew past the configured limit
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// A produced value was not of the type the caller asked for
    #[error("Type mismatch for: {0}")]
    TypeMismatch(String),
    /// A discovered unit could not be loaded
    #[error("Discovery failed for {}: {message}", .path.display())]
    Discovery { path: PathBuf, message: String },
    /// Settings could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiError {
    /// Returns `true` for errors meaning "nothing could satisfy the request".
    pub fn is_unsatisfied(&self) -> bool {
        matches!(self, DiError::Resolution(_) | DiError::Injection { .. })
    }

    /// Name of the parameter that could not be injected, if any.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            DiError::Injection { parameter, .. } => Some(parameter),
            _ => None,
        }
    }

    /// The descriptor that could not be satisfied, if any.
    pub fn requested(&self) -> Option<&TypeDesc> {
        match self {
            DiError::Resolution(requested) | DiError::Injection { requested, .. } => Some(requested),
            _ => None,
        }
    }

    /// Unwraps engine errors that travelled through a user callback as a
    /// [`BoxError`]; anything else is wrapped by `wrap`.
    pub(crate) fn from_boxed(source: BoxError, wrap: impl FnOnce(BoxError) -> DiError) -> DiError {
        match source.downcast::<DiError>() {
            Ok(err) => *err,
            Err(source) => wrap(source),
        }
    }
}

/// Result type for resolution operations
pub type DiResult<T> = Result<T, DiError>;
