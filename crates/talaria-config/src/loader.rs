//! Configuration loader with layered approach.
//!
//! Later layers override earlier ones:
//! 1. Default values
//! 2. Configuration file (TOML or JSON)
//! 3. Environment variables (`TALARIA_*`)

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::{Config, PREFIX};
use crate::ConfigError;

/// Configuration loader.
///
/// # Example
///
/// ```no_run
/// use talaria_config::ConfigLoader;
///
/// # fn main() -> Result<(), talaria_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("talaria.toml")?
///     .with_env()
///     .load();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    values: HashMap<String, Value>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader seeded with the extension defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Config::with_defaults().snapshot(),
        }
    }

    /// Merges a configuration file.
    ///
    /// The format is chosen by extension (`.toml` or `.json`). The file must
    /// hold a flat table; keys may be logical (`default_mimetype`) or already
    /// namespaced (`TALARIA_DEFAULT_MIMETYPE`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file does not exist, cannot be read, does
    /// not parse, or its root is not a table.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        self.with_string(&content, &format)
    }

    /// Merges a file if it exists, otherwise continues silently.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Merges configuration from a string in the given format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use talaria_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(r#"default_mimetype = "text/html""#, "toml")
    ///     .unwrap()
    ///     .load();
    ///
    /// assert_eq!(config.default_mimetype().as_deref(), Some("text/html"));
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let table: Value = match format.to_lowercase().as_str() {
            "toml" => {
                let parsed: toml::Table = toml::from_str(content)?;
                serde_json::to_value(parsed)?
            }
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::unsupported_format(other)),
        };

        let Value::Object(entries) = table else {
            return Err(ConfigError::invalid_value(
                "<root>",
                "configuration must be a table of keys",
            ));
        };

        for (key, value) in entries {
            self.values.insert(namespaced(&key), value);
        }

        Ok(self)
    }

    /// Merges every `TALARIA_*` variable from the process environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_vars(env::vars())
    }

    /// Merges `TALARIA_*` variables from an explicit list.
    ///
    /// Variables without the prefix are ignored.
    #[must_use]
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let key = key.as_ref().to_uppercase();
            if key.starts_with(PREFIX) {
                self.values.insert(key, Value::String(value.into()));
            }
        }
        self
    }

    /// Finalizes the configuration.
    #[must_use]
    pub fn load(self) -> Config {
        let config = Config::new();
        for (key, value) in self.values {
            config.set_raw(key, value);
        }
        config
    }
}

// Logical keys are namespaced; already-prefixed keys are only upper-cased.
fn namespaced(key: &str) -> String {
    let upper = key.to_uppercase();
    if upper.starts_with(PREFIX) {
        upper
    } else {
        format!("{PREFIX}{upper}")
    }
}
