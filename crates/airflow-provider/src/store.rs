//! Local variable store.
//!
//! A stand-in for Airflow variables kept in a single JSON object on disk.
//! The store itself only knows how to load and save the whole mapping;
//! [`LocalVariables`] serializes every read-modify-write cycle behind one
//! lock so concurrent writers never lose updates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{ProviderError, Result};

/// Key/value mapping persisted by a [`VariableStore`].
pub type Variables = BTreeMap<String, String>;

/// Persistence contract for the variable mapping.
pub trait VariableStore: Send + Sync {
    /// Load the full mapping. A store that was never written is empty.
    fn load(&self) -> Result<Variables>;

    /// Replace the full mapping.
    fn save(&self, vars: &Variables) -> Result<()>;
}

impl<S: VariableStore + ?Sized> VariableStore for Box<S> {
    fn load(&self) -> Result<Variables> {
        (**self).load()
    }

    fn save(&self, vars: &Variables) -> Result<()> {
        (**self).save(vars)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File store
// ─────────────────────────────────────────────────────────────────────────────

/// Stores variables as one JSON object in a file.
#[derive(Debug, Clone)]
pub struct FileVariableStore {
    path: PathBuf,
}

impl FileVariableStore {
    /// Store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<cwd>/<file_name>`.
    pub fn in_current_dir(file_name: impl AsRef<Path>) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| ProviderError::Store {
            path: file_name.as_ref().display().to_string(),
            message: format!("failed to get current working directory: {}", e),
        })?;
        Ok(Self::new(cwd.join(file_name)))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, message: impl Into<String>) -> ProviderError {
        ProviderError::Store {
            path: self.path.display().to_string(),
            message: message.into(),
        }
    }
}

impl VariableStore for FileVariableStore {
    fn load(&self) -> Result<Variables> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Variables::new()),
            Err(e) => return Err(self.error(format!("failed to read: {}", e))),
        };
        serde_json::from_str(&contents).map_err(|e| self.error(format!("failed to parse: {}", e)))
    }

    fn save(&self, vars: &Variables) -> Result<()> {
        let json = serde_json::to_string(vars)
            .map_err(|e| self.error(format!("failed to serialize: {}", e)))?;
        std::fs::write(&self.path, json).map_err(|e| self.error(format!("failed to write: {}", e)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────────────────────────

/// Keeps variables in memory. Useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryVariableStore {
    vars: Mutex<Variables>,
}

impl VariableStore for MemoryVariableStore {
    fn load(&self) -> Result<Variables> {
        Ok(self.vars.lock().clone())
    }

    fn save(&self, vars: &Variables) -> Result<()> {
        *self.vars.lock() = vars.clone();
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Locked access
// ─────────────────────────────────────────────────────────────────────────────

/// Serialized access to a [`VariableStore`].
///
/// The lock is held across load, mutation and save, not just the in-memory
/// mutation.
#[derive(Debug)]
pub struct LocalVariables<S> {
    store: S,
    lock: Mutex<()>,
}

impl<S: VariableStore> LocalVariables<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one load → mutate → save cycle under the lock.
    ///
    /// The mapping is saved only if `mutate` returns `Ok`.
    pub fn transact<R, F>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut Variables) -> Result<R>,
    {
        let _guard = self.lock.lock();
        let mut vars = self.store.load()?;
        let out = mutate(&mut vars)?;
        self.store.save(&vars)?;
        Ok(out)
    }

    /// Read one variable.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.store.load()?.remove(key))
    }

    /// Insert or replace a variable, returning the previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<Option<String>> {
        debug!(key, "setting local variable");
        self.transact(|vars| Ok(vars.insert(key.to_string(), value.to_string())))
    }

    /// Remove a variable, returning its value if it existed.
    pub fn remove(&self, key: &str) -> Result<Option<String>> {
        debug!(key, "removing local variable");
        self.transact(|vars| Ok(vars.remove(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileVariableStore::new(dir.path().join("airflow_variables.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_round_trip_rewrites_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("airflow_variables.json");
        let vars = LocalVariables::new(FileVariableStore::new(&path));

        assert_eq!(vars.set("region", "eu").unwrap(), None);
        assert_eq!(vars.set("env", "prod").unwrap(), None);
        assert_eq!(vars.set("region", "us").unwrap(), Some("eu".to_string()));
        assert_eq!(vars.get("region").unwrap().as_deref(), Some("us"));

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, serde_json::json!({"env": "prod", "region": "us"}));

        assert_eq!(vars.remove("env").unwrap(), Some("prod".to_string()));
        assert_eq!(vars.remove("env").unwrap(), None);
        assert_eq!(vars.get("env").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("airflow_variables.json");
        std::fs::write(&path, "not json").unwrap();
        let err = FileVariableStore::new(&path).load().unwrap_err();
        assert!(matches!(err, ProviderError::Store { .. }));
    }

    #[test]
    fn test_failed_mutation_does_not_save() {
        let vars = LocalVariables::new(MemoryVariableStore::default());
        vars.set("keep", "1").unwrap();

        let result: Result<()> = vars.transact(|vars| {
            vars.clear();
            Err(ProviderError::InvalidArgument("abort".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(vars.get("keep").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_concurrent_writers_do_not_lose_updates() {
        let dir = TempDir::new().unwrap();
        let vars = Arc::new(LocalVariables::new(FileVariableStore::new(
            dir.path().join("airflow_variables.json"),
        )));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let vars = vars.clone();
                std::thread::spawn(move || {
                    for j in 0..10 {
                        vars.set(&format!("k{}_{}", i, j), "v").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(vars.store().load().unwrap().len(), 80);
    }
}
