//! Dot-notation configuration repository shared by every provider.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Runtime configuration values, addressed with dot-separated keys.
///
/// Providers read and write it during `register` / `boot`; the host seeds it
/// from the loaded configuration file.
///
/// ```rust
/// use folio_core::Repository;
///
/// let config = Repository::new();
/// config.set("acme.widgets.loaded", true);
/// assert!(config.get_bool("acme.widgets.loaded", false));
/// assert!(config.get("acme.widgets").unwrap().is_object());
/// ```
#[derive(Debug)]
pub struct Repository {
    items: RwLock<Value>,
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Value::Object(Map::new())),
        }
    }

    /// Creates a repository holding `items`.
    ///
    /// Non-object values are replaced by an empty object.
    pub fn from_value(items: Value) -> Self {
        let items = if items.is_object() {
            items
        } else {
            Value::Object(Map::new())
        };
        Self {
            items: RwLock::new(items),
        }
    }

    /// Returns a clone of the value at `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        let items = self.items.read();
        key.split('.')
            .try_fold(&*items, |node, segment| node.get(segment))
            .cloned()
    }

    /// Deserializes the value at `key` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| serde_json::from_value(v).ok())
    }

    /// Returns the boolean at `key`, or `default` when missing or not a bool.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    /// Returns the string at `key`.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(str::to_owned))
    }

    /// Returns `true` if a value exists at `key`.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets the value at `key`, creating intermediate objects as needed.
    ///
    /// Intermediate non-object values are overwritten.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let mut items = self.items.write();
        let mut segments = key.split('.').peekable();
        let mut node: &mut Value = &mut *items;

        while let Some(segment) = segments.next() {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(map) = node else {
                return;
            };

            if segments.peek().is_none() {
                map.insert(segment.to_string(), value);
                return;
            }
            node = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }

    /// Returns a clone of every value.
    pub fn all(&self) -> Value {
        self.items.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_creates_nested_objects() {
        let config = Repository::new();
        config.set("a.b.c", 1);

        assert_eq!(config.all(), json!({ "a": { "b": { "c": 1 } } }));
        assert_eq!(config.get("a.b.c"), Some(json!(1)));
        assert!(config.has("a.b"));
        assert!(!config.has("a.x"));
    }

    #[test]
    fn test_set_overwrites_scalar_parents() {
        let config = Repository::from_value(json!({ "a": "scalar" }));
        config.set("a.b", "value");

        assert_eq!(config.get_str("a.b").as_deref(), Some("value"));
    }

    #[test]
    fn test_typed_accessors() {
        let config =
            Repository::from_value(json!({ "paths": { "roots": ["x", "y"] }, "flag": "yes" }));

        let roots: Vec<String> = config.get_as("paths.roots").unwrap();
        assert_eq!(roots, vec!["x", "y"]);
        assert!(!config.get_bool("flag", false));
        assert!(config.get_bool("missing", true));
    }
}
