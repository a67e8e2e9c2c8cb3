//! Engine configuration.
//!
//! Settings are read from layered [`ConfigSource`]s: environment variables
//! prefixed with `AUTOWIRE_`, JSON files, or in-memory maps.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};

/// Prefix of the environment variables read by [`EngineSettings::from_env`].
pub const ENV_PREFIX: &str = "AUTOWIRE";

/// A configuration value that can be various types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<ConfigValue>),
    Object(HashMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn as_string(&self) -> DiResult<&str> {
        match self {
            ConfigValue::String(s) => Ok(s),
            _ => Err(DiError::TypeMismatch("config value is not a string".into())),
        }
    }

    pub fn as_i64(&self) -> DiResult<i64> {
        match self {
            ConfigValue::Integer(i) => Ok(*i),
            _ => Err(DiError::TypeMismatch("config value is not an integer".into())),
        }
    }

    pub fn as_bool(&self) -> DiResult<bool> {
        match self {
            ConfigValue::Boolean(b) => Ok(*b),
            _ => Err(DiError::TypeMismatch("config value is not a boolean".into())),
        }
    }

    /// Parses environment-style text: integers, floats, booleans, then strings.
    pub fn parse(raw: &str) -> Self {
        if let Ok(int_val) = raw.parse::<i64>() {
            ConfigValue::Integer(int_val)
        } else if let Ok(float_val) = raw.parse::<f64>() {
            ConfigValue::Float(float_val)
        } else if let Ok(bool_val) = raw.parse::<bool>() {
            ConfigValue::Boolean(bool_val)
        } else {
            ConfigValue::String(raw.to_string())
        }
    }

    fn lookup(&self, path: &[&str]) -> Option<&ConfigValue> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => match self {
                ConfigValue::Object(map) => map.get(*head)?.lookup(rest),
                _ => None,
            },
        }
    }
}

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync + fmt::Debug {
    /// Get a configuration value by key
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// List all available keys
    fn keys(&self) -> Vec<String>;
}

/// Environment variable configuration source.
///
/// Key `max_depth` with prefix `AUTOWIRE` reads `AUTOWIRE_MAX_DEPTH`.
#[derive(Debug, Default)]
pub struct EnvironmentConfigSource {
    prefix: Option<String>,
}

impl EnvironmentConfigSource {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn env_key(&self, key: &str) -> String {
        let key = key.replace('.', "_").to_uppercase();
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix.to_uppercase(), key),
            None => key,
        }
    }
}

impl ConfigSource for EnvironmentConfigSource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        env::var(self.env_key(key)).ok().map(|value| ConfigValue::parse(&value))
    }

    fn keys(&self) -> Vec<String> {
        env::vars()
            .filter_map(|(key, _)| match &self.prefix {
                Some(prefix) => {
                    let prefix = format!("{}_", prefix.to_uppercase());
                    key.strip_prefix(&prefix).map(str::to_lowercase)
                }
                None => Some(key.to_lowercase()),
            })
            .collect()
    }
}

/// JSON file configuration source.
///
/// Dotted keys walk nested objects: `engine.max_depth` reads
/// `{"engine": {"max_depth": 8}}`.
#[derive(Debug)]
pub struct JsonConfigSource {
    path: PathBuf,
    config: RwLock<Option<ConfigValue>>,
}

impl JsonConfigSource {
    /// A source reading `path` lazily on first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: RwLock::new(None),
        }
    }

    /// A source reading `path` now, failing if it is missing or malformed.
    pub fn load(path: impl Into<PathBuf>) -> DiResult<Self> {
        let source = Self::new(path);
        source.reload()?;
        Ok(source)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the file.
    pub fn reload(&self) -> DiResult<()> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| DiError::Config(format!("cannot read {}: {}", self.path.display(), e)))?;
        let parsed: ConfigValue = serde_json::from_str(&content)
            .map_err(|e| DiError::Config(format!("invalid JSON in {}: {}", self.path.display(), e)))?;
        if !matches!(parsed, ConfigValue::Object(_)) {
            return Err(DiError::Config(format!(
                "{} must contain a JSON object",
                self.path.display()
            )));
        }
        *self.config.write() = Some(parsed);
        Ok(())
    }
}

impl ConfigSource for JsonConfigSource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        if self.config.read().is_none() {
            if let Err(error) = self.reload() {
                tracing::warn!(%error, "configuration file unavailable");
                return None;
            }
        }
        let path: Vec<&str> = key.split('.').collect();
        self.config.read().as_ref()?.lookup(&path).cloned()
    }

    fn keys(&self) -> Vec<String> {
        match self.config.read().as_ref() {
            Some(ConfigValue::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

/// In-memory configuration source, mostly for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemoryConfigSource {
    values: HashMap<String, ConfigValue>,
}

impl MemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }
}

impl ConfigSource for MemoryConfigSource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// Layered configuration: sources are consulted in the order they were
/// added and the first hit wins.
pub struct ConfigProvider {
    sources: Vec<Box<dyn ConfigSource>>,
    cache: RwLock<HashMap<String, ConfigValue>>,
}

impl fmt::Debug for ConfigProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigProvider")
            .field("sources", &self.sources)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a source below every source added before it.
    pub fn add_source(&mut self, source: Box<dyn ConfigSource>) {
        self.sources.push(source);
    }

    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.add_source(Box::new(source));
        self
    }

    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        if let Some(value) = self.cache.read().get(key) {
            return Some(value.clone());
        }
        let value = self.sources.iter().find_map(|source| source.get(key))?;
        self.cache.write().insert(key.to_string(), value.clone());
        Some(value)
    }

    pub fn get_i64(&self, key: &str) -> DiResult<Option<i64>> {
        self.get(key).map(|value| value.as_i64()).transpose()
    }

    pub fn get_bool(&self, key: &str) -> DiResult<Option<bool>> {
        self.get(key).map(|value| value.as_bool()).transpose()
    }

    pub fn get_string(&self, key: &str) -> DiResult<Option<String>> {
        self.get(key)
            .map(|value| value.as_string().map(str::to_string))
            .transpose()
    }

    /// Clear the configuration cache (forces reload from sources)
    pub fn invalidate_cache(&self) {
        self.cache.write().clear();
    }

    /// All keys from all sources, sorted and deduplicated.
    pub fn all_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.sources.iter().flat_map(|source| source.keys()).collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

impl Default for ConfigProvider {
    fn default() -> Self {
        Self::new().with_source(EnvironmentConfigSource::with_prefix(ENV_PREFIX))
    }
}

/// Tunables of the resolution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Deepest nesting of constructors resolving their own dependencies.
    pub max_depth: usize,
    /// Install a [`TracingObserver`](crate::TracingObserver) on new registries.
    pub trace_resolutions: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_depth: 64,
            trace_resolutions: false,
        }
    }
}

impl EngineSettings {
    /// Reads `max_depth` and `trace_resolutions`, keeping defaults for
    /// missing keys. Present but ill-typed values are errors.
    pub fn from_provider(config: &ConfigProvider) -> DiResult<Self> {
        let mut settings = Self::default();
        if let Some(depth) = config.get_i64("max_depth").map_err(config_error("max_depth"))? {
            settings.max_depth = usize::try_from(depth)
                .ok()
                .filter(|depth| *depth > 0)
                .ok_or_else(|| DiError::Config(format!("max_depth must be positive, got {}", depth)))?;
        }
        if let Some(trace) = config
            .get_bool("trace_resolutions")
            .map_err(config_error("trace_resolutions"))?
        {
            settings.trace_resolutions = trace;
        }
        Ok(settings)
    }

    /// Settings from `AUTOWIRE_*` environment variables.
    pub fn from_env() -> DiResult<Self> {
        Self::from_provider(&ConfigProvider::default())
    }

    /// Settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> DiResult<Self> {
        let source = JsonConfigSource::load(path.as_ref())?;
        Self::from_provider(&ConfigProvider::new().with_source(source))
    }
}

fn config_error(key: &'static str) -> impl Fn(DiError) -> DiError {
    move |error| DiError::Config(format!("{}: {}", key, error))
}
