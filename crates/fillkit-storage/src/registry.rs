//! Name-addressed registry of storage backends.

use std::collections::HashMap;
use std::sync::Arc;

use fillkit_core::{Error, Result, StorageBackend};

/// Registry mapping backend names to their implementations.
///
/// Remote backends (WebDAV sync, cloud drives) register here alongside the
/// built-in local backend; filing selects destinations by name.
#[derive(Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn StorageBackend>>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Register a backend under its own name. Replaces any existing
    /// backend with the same name.
    pub fn register(&mut self, backend: Arc<dyn StorageBackend>) {
        self.backends.insert(backend.name().to_string(), backend);
    }

    /// Look up a backend by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn StorageBackend>> {
        self.backends.get(name).cloned().ok_or_else(|| {
            let mut valid: Vec<&str> = self.backends.keys().map(String::as_str).collect();
            valid.sort_unstable();
            Error::Config(format!(
                "unknown storage backend '{name}'; valid: {}",
                valid.join(", ")
            ))
        })
    }

    /// Resolve a list of backend names, preserving order.
    pub fn select(&self, names: &[&str]) -> Result<Vec<Arc<dyn StorageBackend>>> {
        names.iter().map(|name| self.get(name)).collect()
    }

    /// Names of all registered backends, sorted.
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}
