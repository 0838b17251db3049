use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// String-keyed configuration values for one scope (server, site, or a
/// single plugin's block).
///
/// The resolution core never interprets these values; it hands the merged
/// object to the host unchanged alongside each accepted plugin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigData {
    values: HashMap<String, Value>,
}

impl ConfigData {
    /// Create an empty configuration data object
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from an existing hashmap
    pub fn from_hashmap(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    /// Builds config data from a JSON value; anything but an object yields
    /// an empty scope.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                values: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            },
            _ => Self::default(),
        }
    }

    /// Get a configuration value, deserialized into the requested type
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get a configuration value or a default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), serde_json::Error> {
        let json_value = serde_json::to_value(value)?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Remove a configuration value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Check if a key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get all keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge another config into this one; keys in `other` win.
    pub fn merge(&mut self, other: &ConfigData) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }
}

/// Resolves the configuration object for one plugin by layering
/// server-wide defaults, site overrides, and the plugin's own block.
/// Later layers win per key.
pub fn merged_plugin_config(
    server: &ConfigData,
    site: &ConfigData,
    plugin: &ConfigData,
) -> ConfigData {
    let mut merged = server.clone();
    merged.merge(site);
    merged.merge(plugin);
    merged
}
