//! Startup discovery of producer declarations on disk.
//!
//! [`discover`] walks a directory tree and hands every file a [`UnitLoader`]
//! accepts to that loader. A unit that fails to load is logged and skipped;
//! the scan always completes.
//!
//! The bundled [`ManifestLoader`] reads `*.inject.json` manifests. A manifest
//! lists producers by the key of a subject in a [`Catalog`] compiled into the
//! program:
//!
//! ```json
//! {
//!   "producers": [
//!     { "subject": "colors.blue", "priority": 10, "singleton": true },
//!     { "subject": "colors.red", "name": "crimson", "meta": { "hex": "#f00" } }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{DiError, DiResult};
use crate::registration::{Injectable, Meta};
use crate::registry::Registry;
use crate::subject::Subject;

/// File name suffix of producer manifests.
pub const MANIFEST_SUFFIX: &str = ".inject.json";

/// Loads one discovered file.
pub trait UnitLoader {
    type Unit;

    /// Whether `path` is a unit this loader handles.
    fn accepts(&self, path: &Path) -> bool;

    fn load(&self, path: &Path) -> DiResult<Self::Unit>;
}

/// Walks `root` recursively, loading every accepted file in path order.
///
/// Units that fail to load and unreadable directory entries are logged with
/// `tracing::warn!` and skipped.
pub fn discover<L: UnitLoader>(root: impl AsRef<Path>, loader: &L) -> Vec<L::Unit> {
    let root = root.as_ref();
    let mut units = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(root = %root.display(), %error, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !loader.accepts(entry.path()) {
            continue;
        }
        match loader.load(entry.path()) {
            Ok(unit) => {
                tracing::debug!(path = %entry.path().display(), "loaded unit");
                units.push(unit);
            }
            Err(error) => {
                tracing::warn!(path = %entry.path().display(), %error, "skipping unit");
            }
        }
    }
    tracing::debug!(root = %root.display(), units = units.len(), "discovery finished");
    units
}

/// Subjects available to manifests, by key.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    subjects: HashMap<String, Subject>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, subject: impl Into<Subject>) -> Self {
        self.insert(key, subject);
        self
    }

    /// Adds `subject` under `key`, replacing any previous subject.
    pub fn insert(&mut self, key: impl Into<String>, subject: impl Into<Subject>) {
        self.subjects.insert(key.into(), subject.into());
    }

    pub fn get(&self, key: &str) -> Option<&Subject> {
        self.subjects.get(key)
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// Contents of a manifest file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub producers: Vec<ManifestEntry>,
}

/// One producer declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// Catalog key of the subject.
    pub subject: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub singleton: bool,
    #[serde(default)]
    pub meta: Meta,
}

/// What loading one manifest did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedManifest {
    pub path: PathBuf,
    /// Names registered by this manifest.
    pub registered: Vec<String>,
    /// Names already present in the registry.
    pub duplicates: Vec<String>,
}

/// Registers the producers declared in `*.inject.json` manifests.
///
/// A manifest is applied all or nothing: if it is malformed or names a
/// subject missing from the catalog, none of its entries are registered.
pub struct ManifestLoader {
    catalog: Arc<Catalog>,
    registry: Registry,
}

impl ManifestLoader {
    pub fn new(catalog: Catalog, registry: &Registry) -> Self {
        Self {
            catalog: Arc::new(catalog),
            registry: registry.clone(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn read(&self, path: &Path) -> DiResult<Manifest> {
        let content = std::fs::read_to_string(path).map_err(|e| discovery_error(path, e))?;
        serde_json::from_str(&content).map_err(|e| discovery_error(path, e))
    }
}

impl UnitLoader for ManifestLoader {
    type Unit = LoadedManifest;

    fn accepts(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.ends_with(MANIFEST_SUFFIX))
    }

    fn load(&self, path: &Path) -> DiResult<LoadedManifest> {
        let manifest = self.read(path)?;

        let mut pending = Vec::with_capacity(manifest.producers.len());
        for entry in manifest.producers {
            let subject = self.catalog.get(&entry.subject).cloned().ok_or_else(|| {
                discovery_error(path, format!("unknown subject `{}`", entry.subject))
            })?;
            let mut injectable = Injectable::new(subject)
                .priority(entry.priority)
                .singleton(entry.singleton)
                .with_meta(entry.meta);
            if let Some(name) = entry.name {
                injectable = injectable.name(name);
            }
            pending.push(injectable.into_producer());
        }

        let mut loaded = LoadedManifest {
            path: path.to_path_buf(),
            registered: Vec::new(),
            duplicates: Vec::new(),
        };
        for producer in pending {
            let name = producer.name().to_owned();
            if self.registry.register(Arc::new(producer)) {
                loaded.registered.push(name);
            } else {
                loaded.duplicates.push(name);
            }
        }
        Ok(loaded)
    }
}

/// Registers every manifest under `root` into `registry`.
pub fn discover_manifests(root: impl AsRef<Path>, catalog: Catalog, registry: &Registry) -> Vec<LoadedManifest> {
    discover(root, &ManifestLoader::new(catalog, registry))
}

fn discovery_error(path: &Path, message: impl ToString) -> DiError {
    DiError::Discovery {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_defaults() {
        let manifest: Manifest = serde_json::from_str(r#"{"producers": [{"subject": "a"}]}"#).unwrap();
        let entry = &manifest.producers[0];
        assert_eq!(entry.subject, "a");
        assert_eq!(entry.name, None);
        assert_eq!(entry.priority, 0);
        assert!(!entry.singleton);
        assert!(entry.meta.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<Manifest>(r#"{"producers": [{"subject": "a", "prio": 1}]}"#).is_err());
    }

    #[test]
    fn accepts_only_manifests() {
        let loader = ManifestLoader::new(Catalog::new(), &Registry::new());
        assert!(loader.accepts(Path::new("dir/colors.inject.json")));
        assert!(!loader.accepts(Path::new("dir/colors.json")));
        assert!(!loader.accepts(Path::new("dir/inject.json.bak")));
    }
}
