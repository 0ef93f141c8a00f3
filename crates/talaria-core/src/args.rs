//! Route arguments.
//!
//! Values matched from the path (or supplied as route defaults) and passed to
//! the handler. Integer segments are stored as JSON numbers, everything else
//! as JSON strings.

use serde_json::Value;
use smallvec::SmallVec;

/// Maximum number of arguments stored inline (stack allocated).
const INLINE_ARGS: usize = 4;

/// Arguments a route hands to its handler.
///
/// # Example
///
/// ```
/// use talaria_core::RouteArgs;
///
/// let mut args = RouteArgs::new();
/// args.insert("value", 404);
/// args.insert("name", "ping");
///
/// assert_eq!(args.get_i64("value"), Some(404));
/// assert_eq!(args.get_str("name"), Some("ping"));
/// assert_eq!(args.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteArgs {
    inner: SmallVec<[(String, Value); INLINE_ARGS]>,
}

impl RouteArgs {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an argument, replacing any previous value under that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.inner.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.inner.push((name, value));
        }
    }

    /// Inserts an argument only if no value exists under that name.
    pub fn insert_default(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        if !self.contains(&name) {
            self.inner.push((name, value.into()));
        }
    }

    /// Returns the value for an argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.inner.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns an argument as an integer.
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Returns an argument as a string slice.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Returns true if an argument with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.iter().any(|(n, _)| n == name)
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RouteArgs {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut args = Self::new();
        for (name, value) in iter {
            args.insert(name, value);
        }
        args
    }
}
