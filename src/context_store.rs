use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{ChatWidgetError, Result};
use crate::interfaces::storage::ContextStore;

/// Local storage persisted as one JSON object of string values.
#[derive(Clone, Debug)]
pub struct FileContextStore {
    path: PathBuf,
}

impl FileContextStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            other => Err(ChatWidgetError::Storage(format!(
                "{} must hold a JSON object, found {}",
                self.path.display(),
                json_kind(&other)
            ))),
        }
    }
}

impl ContextStore for FileContextStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.read_all()?;
        Ok(items.get(key).and_then(|v| v.as_str()).map(str::to_string))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), Value::String(value.to_string()));
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let pretty = serde_json::to_string_pretty(&Value::Object(items))?;
        fs::write(&self.path, pretty)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryContextStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContextStore for MemoryContextStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|e| ChatWidgetError::Storage(e.to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| ChatWidgetError::Storage(e.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads the stored result blob under `key` as a context object.
///
/// Never fails: an absent blob gives an empty context, and an unreadable or
/// malformed one is logged and also gives an empty context.
pub fn load_context(store: &dyn ContextStore, key: &str) -> Map<String, Value> {
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "no stored context");
            return Map::new();
        }
        Err(err) => {
            warn!(key, error = %err, "failed to read stored context");
            return Map::new();
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(key, kind = json_kind(&other), "stored context is not an object");
            Map::new()
        }
        Err(err) => {
            warn!(key, error = %err, "error parsing stored result");
            Map::new()
        }
    }
}
