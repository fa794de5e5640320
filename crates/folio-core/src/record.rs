//! Enabled-plugin records as read from the enablement cache.

use serde::Serialize;
use serde_json::{Map, Value};

/// Cache key holding the activation class name.
pub const ACTIVATION_CLASS_KEY: &str = "provider";

/// Cache key holding the plugin's source path.
pub const SOURCE_PATH_KEY: &str = "path";

const ACTIVATION_CLASS_ALIAS: &str = "activationClass";
const SOURCE_PATH_ALIAS: &str = "sourcePath";

/// One enabled plugin from a cache snapshot.
///
/// Only the activation class and source path are interpreted; every other
/// field (`version`, `manifest`, …) is carried along untouched in
/// [`extra`](Self::extra).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PluginRecord {
    /// Plugin identifier, `vendor/name` by convention.
    #[serde(skip)]
    pub id: String,

    /// Fully-qualified name of the class that activates the plugin.
    #[serde(rename = "provider", skip_serializing_if = "Option::is_none")]
    pub activation_class: Option<String>,

    /// Path of the plugin relative to the host base directory.
    #[serde(rename = "path", skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,

    /// Opaque remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PluginRecord {
    /// Creates a record with an activation class and source path.
    pub fn new(
        id: impl Into<String>,
        activation_class: impl Into<String>,
        source_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            activation_class: Some(activation_class.into()),
            source_path: Some(source_path.into()),
            extra: Map::new(),
        }
    }

    /// Builds a record from one cache entry.
    ///
    /// Lenient: non-string `provider` / `path`
    /// values are treated as absent, and a non-object entry yields an inert
    /// record.
    pub fn from_value(id: impl Into<String>, value: &Value) -> Self {
        let mut extra = value.as_object().cloned().unwrap_or_default();

        let activation_class =
            take_string(&mut extra, ACTIVATION_CLASS_KEY, ACTIVATION_CLASS_ALIAS);
        let source_path = take_string(&mut extra, SOURCE_PATH_KEY, SOURCE_PATH_ALIAS);

        Self {
            id: id.into(),
            activation_class,
            source_path,
            extra,
        }
    }

    /// Returns the activation class, or `None` if absent or empty.
    pub fn activation_class(&self) -> Option<&str> {
        self.activation_class.as_deref().filter(|c| !c.is_empty())
    }

    /// Returns the source path, or `""` if absent.
    pub fn source_path(&self) -> &str {
        self.source_path.as_deref().unwrap_or_default()
    }

    /// Returns the recorded plugin version, if any.
    pub fn version(&self) -> Option<&str> {
        self.extra.get("version").and_then(Value::as_str)
    }

    /// Returns `true` if the record names no activation class.
    pub fn is_inert(&self) -> bool {
        self.activation_class().is_none()
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str, alias: &str) -> Option<String> {
    let primary = fields.remove(key);
    let alias = fields.remove(alias);
    match primary.or(alias) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// An ordered, read-only view of the enabled plugins.
///
/// Records keep the order in which the cache listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginSnapshot {
    records: Vec<PluginRecord>,
}

impl PluginSnapshot {
    /// Creates an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a snapshot from the `plugins` object of a cache payload.
    ///
    /// Anything other than an object yields an empty snapshot.
    pub fn from_plugins_value(plugins: &Value) -> Self {
        plugins
            .as_object()
            .map(|map| {
                map.iter()
                    .map(|(id, entry)| PluginRecord::from_value(id.clone(), entry))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Serializes the snapshot back into a `plugins` object.
    pub fn to_plugins_value(&self) -> Value {
        let map: Map<String, Value> = self
            .records
            .iter()
            .map(|record| {
                let value = serde_json::to_value(record).unwrap_or(Value::Null);
                (record.id.clone(), value)
            })
            .collect();
        Value::Object(map)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in cache order.
    pub fn iter(&self) -> std::slice::Iter<'_, PluginRecord> {
        self.records.iter()
    }

    /// Looks up a record by plugin id.
    pub fn get(&self, id: &str) -> Option<&PluginRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

impl FromIterator<PluginRecord> for PluginSnapshot {
    fn from_iter<I: IntoIterator<Item = PluginRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PluginSnapshot {
    type Item = &'a PluginRecord;
    type IntoIter = std::slice::Iter<'a, PluginRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_keeps_cache_order() {
        let plugins = json!({
            "zeta/last": { "provider": "Zeta\\Provider", "path": "plugins/zeta" },
            "alpha/first": { "provider": "Alpha\\Provider", "path": "plugins/alpha" },
        });

        let snapshot = PluginSnapshot::from_plugins_value(&plugins);
        let ids: Vec<_> = snapshot.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta/last", "alpha/first"]);
    }

    #[test]
    fn test_non_string_fields_are_absent() {
        let record = PluginRecord::from_value(
            "odd/plugin",
            &json!({ "provider": 42, "path": ["x"], "version": "1.2.0" }),
        );

        assert!(record.is_inert());
        assert_eq!(record.source_path(), "");
        assert_eq!(record.version(), Some("1.2.0"));
    }

    #[test]
    fn test_camel_case_aliases() {
        let record = PluginRecord::from_value(
            "acme/widgets",
            &json!({
                "activationClass": "Acme\\Widgets\\Provider",
                "sourcePath": "plugins/acme/widgets"
            }),
        );

        assert_eq!(record.activation_class(), Some("Acme\\Widgets\\Provider"));
        assert_eq!(record.source_path(), "plugins/acme/widgets");
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_empty_activation_class_is_inert() {
        let record = PluginRecord::from_value("a/b", &json!({ "provider": "" }));
        assert!(record.is_inert());

        let record = PluginRecord::from_value("a/b", &json!("not an object"));
        assert!(record.is_inert());
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_opaque_fields_survive_serialization() {
        let plugins = json!({
            "acme/widgets": {
                "provider": "Acme\\Widgets\\Provider",
                "path": "plugins/acme/widgets",
                "version": "0.0.1",
                "manifest": { "name": "acme/widgets" },
            }
        });

        let snapshot = PluginSnapshot::from_plugins_value(&plugins);
        assert_eq!(snapshot.to_plugins_value(), plugins);
    }

    #[test]
    fn test_non_object_plugins_value_is_empty() {
        assert!(PluginSnapshot::from_plugins_value(&json!([])).is_empty());
        assert!(PluginSnapshot::from_plugins_value(&Value::Null).is_empty());
    }
}
