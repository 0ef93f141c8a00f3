//! The prefixed key/value store.
//!
//! All keys live in one flat map shared with the host application; the
//! extension's keys are namespaced under [`PREFIX`]. Lookups by logical name
//! are case-insensitive. Nothing is cached: every read goes to the map, so a
//! value changed at runtime is seen by the very next request.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Namespace prefix for every extension key.
pub const PREFIX: &str = "TALARIA_";

/// Logical key names understood by the extension.
pub mod keys {
    /// The media type served when the client accepts anything.
    pub const DEFAULT_MIMETYPE: &str = "default_mimetype";

    /// The template rendered by the debug (`text/html`) serializer.
    pub const APIDUMP_TEMPLATE: &str = "apidump_template";

    /// The query parameter carrying the JSONP callback name.
    pub const JSONP_CALLBACK: &str = "jsonp_callback";
}

/// Default values for every extension key.
pub const DEFAULTS: [(&str, &str); 3] = [
    (keys::DEFAULT_MIMETYPE, "application/json"),
    (keys::APIDUMP_TEMPLATE, "apidump.html"),
    (keys::JSONP_CALLBACK, "callback"),
];

/// Builds the namespaced key for a logical name.
///
/// ```
/// use talaria_config::config_key;
///
/// assert_eq!(config_key("default_mimetype"), "TALARIA_DEFAULT_MIMETYPE");
/// ```
#[must_use]
pub fn config_key(name: &str) -> String {
    format!("{PREFIX}{}", name.to_uppercase())
}

/// Returns the entries whose key starts with `prefix`, with the prefix removed.
///
/// ```
/// use std::collections::HashMap;
/// use serde_json::json;
/// use talaria_config::strip_prefix;
///
/// let mut map = HashMap::new();
/// map.insert("apify_a".to_string(), json!(1));
/// map.insert("other".to_string(), json!(2));
///
/// let stripped = strip_prefix(&map, "apify_");
/// assert_eq!(stripped.len(), 1);
/// assert_eq!(stripped["a"], json!(1));
/// ```
#[must_use]
pub fn strip_prefix(map: &HashMap<String, Value>, prefix: &str) -> HashMap<String, Value> {
    map.iter()
        .filter_map(|(k, v)| k.strip_prefix(prefix).map(|k| (k.to_string(), v.clone())))
        .collect()
}

/// Thread-safe configuration store.
///
/// # Example
///
/// ```
/// use talaria_config::{keys, Config};
///
/// let config = Config::with_defaults();
/// assert_eq!(config.default_mimetype().as_deref(), Some("application/json"));
///
/// config.set(keys::DEFAULT_MIMETYPE, "text/html");
/// assert_eq!(config.get_str("DEFAULT_MIMETYPE").as_deref(), Some("text/html"));
/// ```
#[derive(Debug, Default)]
pub struct Config {
    values: RwLock<HashMap<String, Value>>,
}

impl Config {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the extension defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        let config = Self::new();
        config.apply_defaults();
        config
    }

    /// Inserts every default that is not already set.
    pub fn apply_defaults(&self) {
        for (name, value) in DEFAULTS {
            self.set_default(name, value);
        }
    }

    /// Sets an extension key by logical name.
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.values.write().insert(config_key(name), value.into());
    }

    /// Sets an extension key only if it has no value yet.
    pub fn set_default(&self, name: &str, value: impl Into<Value>) {
        self.values
            .write()
            .entry(config_key(name))
            .or_insert_with(|| value.into());
    }

    /// Sets a raw (already namespaced, or foreign) key.
    pub fn set_raw(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.write().insert(key.into(), value.into());
    }

    /// Removes an extension key, returning its previous value.
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.values.write().remove(&config_key(name))
    }

    /// Reads an extension key by logical name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.read().get(&config_key(name)).cloned()
    }

    /// Reads an extension key as a string.
    ///
    /// Non-string values yield `None`.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.values
            .read()
            .get(&config_key(name))
            .and_then(Value::as_str)
            .map(ToString::to_string)
    }

    /// Returns the extension's own keys, without the prefix.
    #[must_use]
    pub fn scoped(&self) -> HashMap<String, Value> {
        strip_prefix(&self.values.read(), PREFIX)
    }

    /// Returns a copy of every key in the store.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.values.read().clone()
    }

    /// The configured default media type.
    #[must_use]
    pub fn default_mimetype(&self) -> Option<String> {
        self.get_str(keys::DEFAULT_MIMETYPE)
    }

    /// The configured debug template name.
    #[must_use]
    pub fn apidump_template(&self) -> Option<String> {
        self.get_str(keys::APIDUMP_TEMPLATE)
    }

    /// The configured JSONP callback parameter name.
    #[must_use]
    pub fn jsonp_callback(&self) -> Option<String> {
        self.get_str(keys::JSONP_CALLBACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_key() {
        assert_eq!(config_key("blueprint_name"), "TALARIA_BLUEPRINT_NAME");
    }

    #[test]
    fn test_strip_prefix_keeps_only_prefixed_keys() {
        let config: HashMap<String, Value> = [("a", 1), ("b", 2), ("c", 3)]
            .into_iter()
            .map(|(k, v)| (format!("talaria_{k}"), json!(v)))
            .chain([("unrelated".to_string(), json!(0))])
            .collect();

        let expected: HashMap<String, Value> = [("a", 1), ("b", 2), ("c", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();

        assert_eq!(strip_prefix(&config, "talaria_"), expected);
    }

    #[test]
    fn test_scoped_defaults() {
        let config = Config::with_defaults();
        let scoped = config.scoped();

        assert_eq!(scoped.len(), 3);
        assert_eq!(scoped["APIDUMP_TEMPLATE"], json!("apidump.html"));
        assert_eq!(scoped["DEFAULT_MIMETYPE"], json!("application/json"));
        assert_eq!(scoped["JSONP_CALLBACK"], json!("callback"));
    }

    #[test]
    fn test_scoped_ignores_foreign_keys() {
        let config = Config::with_defaults();
        config.set_raw("SECRET_KEY", "hunter2");
        assert!(!config.scoped().contains_key("SECRET_KEY"));
        assert!(config.snapshot().contains_key("SECRET_KEY"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let config = Config::with_defaults();
        assert_eq!(config.get_str("apidump_template").as_deref(), Some("apidump.html"));
        assert_eq!(config.get_str("APIDUMP_TEMPLATE").as_deref(), Some("apidump.html"));
        assert_eq!(config.get_str("ApiDump_Template").as_deref(), Some("apidump.html"));
    }

    #[test]
    fn test_set_default_does_not_overwrite() {
        let config = Config::new();
        config.set(keys::DEFAULT_MIMETYPE, "text/html");
        config.apply_defaults();

        assert_eq!(config.default_mimetype().as_deref(), Some("text/html"));
        assert_eq!(config.apidump_template().as_deref(), Some("apidump.html"));
    }

    #[test]
    fn test_changes_are_visible_immediately() {
        let config = Config::with_defaults();
        assert_eq!(config.default_mimetype().as_deref(), Some("application/json"));

        config.set(keys::DEFAULT_MIMETYPE, "nosuch/mimetype");
        assert_eq!(config.default_mimetype().as_deref(), Some("nosuch/mimetype"));

        config.remove(keys::DEFAULT_MIMETYPE);
        assert_eq!(config.default_mimetype(), None);
    }

    #[test]
    fn test_non_string_value_is_not_a_str() {
        let config = Config::new();
        config.set(keys::JSONP_CALLBACK, 42);
        assert_eq!(config.jsonp_callback(), None);
        assert_eq!(config.get(keys::JSONP_CALLBACK), Some(json!(42)));
    }
}
