//! Key-value persistence backend owned by the host service.

use anyhow::{anyhow, Context};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Key of the full settings document.
pub const SETTINGS_KEY: &str = "settings";
/// Legacy key from builds that stored to-dos globally.
pub const TODOS_KEY: &str = "todos";

pub trait KeyValueStore: Send {
    /// Value stored under `key`, or `default` when nothing is stored.
    fn get(&self, key: &str, default: Value) -> anyhow::Result<Value>;
    fn set(&mut self, key: &str, value: Value) -> anyhow::Result<()>;
}

/// All keys kept in one JSON object on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_all(&self) -> anyhow::Result<Map<String, Value>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(anyhow!("{} does not hold a JSON object", self.path.display())),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str, default: Value) -> anyhow::Result<Value> {
        let mut all = self.read_all()?;
        Ok(all.remove(key).unwrap_or(default))
    }

    fn set(&mut self, key: &str, value: Value) -> anyhow::Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(&Value::Object(all))?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory store used by tests and as a last resort when no data directory
/// is available.
#[derive(Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    /// Make every `set` fail, to exercise save-failure handling.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str, default: Value) -> anyhow::Result<Value> {
        Ok(self.values.get(key).cloned().unwrap_or(default))
    }

    fn set(&mut self, key: &str, value: Value) -> anyhow::Result<()> {
        if self.fail_writes {
            return Err(anyhow!("store is read-only"));
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_returns_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("config.json"));
        let value = store.get(SETTINGS_KEY, json!({})).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn set_keeps_other_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::new(dir.path().join("nested").join("config.json"));
        store.set(TODOS_KEY, json!(["a"])).unwrap();
        store.set(SETTINGS_KEY, json!({ "welcomeMessage": "x" })).unwrap();
        assert_eq!(store.get(TODOS_KEY, json!([])).unwrap(), json!(["a"]));
        assert_eq!(
            store.get(SETTINGS_KEY, json!({})).unwrap()["welcomeMessage"],
            json!("x")
        );
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(store.get(SETTINGS_KEY, json!({})).is_err());
    }
}
