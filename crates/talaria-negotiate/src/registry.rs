//! Media type to serializer mapping.
//!
//! The registry is filled at setup time and read concurrently afterwards.
//! Keys keep their registration order, which decides the winner when two
//! registered types match a client equally well.

use crate::accept::AcceptHeader;
use crate::context::SerializeContext;
use crate::matcher::MimetypeMatcher;
use crate::serializers::{to_html, to_javascript, to_json};
use bytes::Bytes;
use http::HeaderValue;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use talaria_config::Config;
use talaria_core::{ApiError, ApiResult};
use thiserror::Error;
use tracing::debug;

/// A serializer: turns a payload into the body for one media type.
pub type Serializer = Arc<dyn Fn(&Value, &SerializeContext<'_>) -> ApiResult<Bytes> + Send + Sync>;

/// The configured default media type has no serializer.
///
/// This is a deployment misconfiguration, never a client error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("serializer is not registered for default mimetype \"{}\"", .mimetype.as_deref().unwrap_or("<unset>"))]
pub struct MissingDefaultSerializer {
    /// The configured default, if any.
    pub mimetype: Option<String>,
}

/// Why negotiation produced no format for the client.
#[derive(Error, Debug)]
pub enum NegotiationError {
    /// No registered type is acceptable; the default format is bound instead.
    #[error("no acceptable mimetype, falling back to {}", .fallback.mimetype())]
    NotAcceptable {
        /// The default format the error response is serialized with.
        fallback: NegotiatedFormat,
    },

    /// No type is acceptable and the default has no serializer either.
    #[error(transparent)]
    MissingDefault(#[from] MissingDefaultSerializer),
}

/// A media type bound to its serializer for one request.
#[derive(Clone)]
pub struct NegotiatedFormat {
    mimetype: String,
    serializer: Serializer,
}

impl NegotiatedFormat {
    /// Binds a media type to a serializer.
    #[must_use]
    pub fn new(mimetype: impl Into<String>, serializer: Serializer) -> Self {
        Self {
            mimetype: mimetype.into(),
            serializer,
        }
    }

    /// The bound media type.
    #[must_use]
    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    /// The bound serializer.
    #[must_use]
    pub fn serializer(&self) -> &Serializer {
        &self.serializer
    }

    /// Serializes a payload.
    pub fn serialize(&self, payload: &Value, ctx: &SerializeContext<'_>) -> ApiResult<Bytes> {
        (self.serializer)(payload, ctx)
    }

    /// The `Content-Type` header value for the bound media type.
    ///
    /// `text/*` types get an explicit UTF-8 charset.
    pub fn content_type(&self) -> ApiResult<HeaderValue> {
        let value = match self.mimetype.parse::<mime::Mime>() {
            Ok(mime) if mime.type_() == mime::TEXT && mime.get_param(mime::CHARSET).is_none() => {
                format!("{}; charset=utf-8", self.mimetype)
            }
            _ => self.mimetype.clone(),
        };
        HeaderValue::from_str(&value).map_err(ApiError::internal)
    }
}

impl fmt::Debug for NegotiatedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NegotiatedFormat")
            .field("mimetype", &self.mimetype)
            .finish_non_exhaustive()
    }
}

/// Maps media types to serializers.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use talaria_negotiate::SerializerRegistry;
///
/// let mut registry = SerializerRegistry::new();
/// registry.register("application/xml", |payload, _ctx| {
///     Ok(Bytes::from(format!("<value>{payload}</value>")))
/// });
///
/// assert!(registry.contains("application/xml"));
/// assert!(registry.serializer("nosuch/mimetype").is_err());
/// ```
#[derive(Clone)]
pub struct SerializerRegistry {
    serializers: IndexMap<String, Serializer>,
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializerRegistry {
    /// Creates a registry holding the built-in serializers.
    ///
    /// | Media type | Serializer |
    /// |---|---|
    /// | `text/html` | debug page |
    /// | `application/json` | JSON |
    /// | `application/javascript` | JSONP |
    /// | `application/json-p` | JSONP |
    /// | `text/json-p` | JSONP |
    #[must_use]
    pub fn new() -> Self {
        let jsonp: Serializer = Arc::new(to_javascript);

        let mut registry = Self::empty();
        registry.register("text/html", to_html);
        registry.register("application/json", to_json);
        registry.register_shared("application/javascript", jsonp.clone());
        registry.register_shared("application/json-p", jsonp.clone());
        registry.register_shared("text/json-p", jsonp);
        registry
    }

    /// Creates a registry with no serializers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            serializers: IndexMap::new(),
        }
    }

    /// Registers a serializer, replacing any previous one for the type.
    pub fn register<F>(&mut self, mimetype: impl Into<String>, serializer: F)
    where
        F: Fn(&Value, &SerializeContext<'_>) -> ApiResult<Bytes> + Send + Sync + 'static,
    {
        self.register_shared(mimetype, Arc::new(serializer));
    }

    /// Registers an already shared serializer.
    pub fn register_shared(&mut self, mimetype: impl Into<String>, serializer: Serializer) {
        self.serializers.insert(mimetype.into(), serializer);
    }

    /// Returns the serializer for a type, if registered.
    #[must_use]
    pub fn get(&self, mimetype: &str) -> Option<&Serializer> {
        self.serializers.get(mimetype)
    }

    /// Returns true if a serializer is registered for the type.
    #[must_use]
    pub fn contains(&self, mimetype: &str) -> bool {
        self.serializers.contains_key(mimetype)
    }

    /// The registered types, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.serializers.keys().map(String::as_str)
    }

    /// The number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.serializers.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.serializers.is_empty()
    }

    /// Looks up the serializer for a type.
    ///
    /// # Errors
    ///
    /// Returns a `406 Not Acceptable` error if the type is not registered.
    pub fn serializer(&self, mimetype: &str) -> ApiResult<NegotiatedFormat> {
        self.get(mimetype)
            .map(|s| NegotiatedFormat::new(mimetype, s.clone()))
            .ok_or_else(ApiError::not_acceptable)
    }

    /// Looks up the serializer for the configured default type.
    ///
    /// # Errors
    ///
    /// Returns [`MissingDefaultSerializer`] if no default is configured or
    /// nothing is registered for it.
    pub fn default_serializer(
        &self,
        config: &Config,
    ) -> Result<NegotiatedFormat, MissingDefaultSerializer> {
        let mimetype = config.default_mimetype();
        mimetype
            .as_deref()
            .and_then(|m| self.get(m).map(|s| NegotiatedFormat::new(m, s.clone())))
            .ok_or(MissingDefaultSerializer { mimetype })
    }

    /// Resolves the format for a client.
    ///
    /// When nothing the client accepts is registered, the default format is
    /// returned inside [`NegotiationError::NotAcceptable`] so the error
    /// response can still be serialized.
    pub fn negotiate(
        &self,
        accept: &AcceptHeader,
        config: &Config,
    ) -> Result<NegotiatedFormat, NegotiationError> {
        let default = config.default_mimetype();
        let matcher = MimetypeMatcher::new(default.as_deref());

        if let Some(mimetype) = matcher.guess_best_mimetype(accept, self.keys()) {
            if let Ok(format) = self.serializer(&mimetype) {
                return Ok(format);
            }
        }

        let fallback = self.default_serializer(config)?;
        debug!(
            fallback = fallback.mimetype(),
            "no acceptable mimetype for client"
        );
        Err(NegotiationError::NotAcceptable { fallback })
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerRegistry")
            .field("mimetypes", &self.serializers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::BuiltinTemplates;
    use serde_json::json;
    use talaria_config::keys;

    #[test]
    fn test_builtin_registrations() {
        let registry = SerializerRegistry::new();
        let keys: Vec<_> = registry.keys().collect();
        assert_eq!(
            keys,
            [
                "text/html",
                "application/json",
                "application/javascript",
                "application/json-p",
                "text/json-p",
            ]
        );

        let js = registry.get("application/javascript").unwrap();
        assert!(Arc::ptr_eq(js, registry.get("application/json-p").unwrap()));
        assert!(Arc::ptr_eq(js, registry.get("text/json-p").unwrap()));
    }

    #[test]
    fn test_register_new_type() {
        let mut registry = SerializerRegistry::new();
        registry.register("application/xml", |_: &Value, _: &SerializeContext<'_>| {
            Ok(Bytes::from_static(b"<xml/>"))
        });

        let format = registry.serializer("application/xml").unwrap();
        assert_eq!(format.mimetype(), "application/xml");

        let config = Config::with_defaults();
        let templates = BuiltinTemplates::new();
        let ctx = SerializeContext::new(&registry, &config, &templates);
        assert_eq!(format.serialize(&json!(null), &ctx).unwrap(), "<xml/>");
    }

    #[test]
    fn test_register_overwrites_in_place() {
        let mut registry = SerializerRegistry::new();
        registry.register("text/html", to_json);
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.keys().next(), Some("text/html"));
    }

    #[test]
    fn test_every_builtin_type_resolves() {
        let registry = SerializerRegistry::new();
        for mimetype in registry.keys() {
            assert_eq!(registry.serializer(mimetype).unwrap().mimetype(), mimetype);
        }
    }

    #[test]
    fn test_unknown_type_is_not_acceptable() {
        let err = SerializerRegistry::new().serializer("nosuch/mimetype").unwrap_err();
        assert_eq!(err.kind(), talaria_core::ErrorKind::NotAcceptable);
    }

    #[test]
    fn test_default_serializer_is_json() {
        let format = SerializerRegistry::new()
            .default_serializer(&Config::with_defaults())
            .unwrap();
        assert_eq!(format.mimetype(), "application/json");
    }

    #[test]
    fn test_default_serializer_missing() {
        let config = Config::with_defaults();
        config.set(keys::DEFAULT_MIMETYPE, "nosuch/mimetype");

        let err = SerializerRegistry::new().default_serializer(&config).unwrap_err();
        assert_eq!(err.mimetype.as_deref(), Some("nosuch/mimetype"));
        assert!(err.to_string().contains("nosuch/mimetype"));
    }

    #[test]
    fn test_negotiate_binds_fallback_on_failure() {
        let registry = SerializerRegistry::new();
        let config = Config::with_defaults();

        let ok = registry.negotiate(&AcceptHeader::parse("text/html"), &config).unwrap();
        assert_eq!(ok.mimetype(), "text/html");

        let err = registry.negotiate(&AcceptHeader::parse("text/xml"), &config).unwrap_err();
        match err {
            NegotiationError::NotAcceptable { fallback } => {
                assert_eq!(fallback.mimetype(), "application/json");
            }
            NegotiationError::MissingDefault(e) => panic!("unexpected {e}"),
        }
    }

    #[test]
    fn test_negotiate_unregistered_default_is_not_acceptable() {
        let registry = SerializerRegistry::new();
        let config = Config::with_defaults();
        config.set(keys::DEFAULT_MIMETYPE, "nosuch/mimetype");

        let err = registry.negotiate(&AcceptHeader::parse("*/*"), &config).unwrap_err();
        assert!(matches!(err, NegotiationError::MissingDefault(_)));
    }

    #[test]
    fn test_content_type() {
        let registry = SerializerRegistry::new();
        let ct = |m: &str| registry.serializer(m).unwrap().content_type().unwrap();

        assert_eq!(ct("application/json"), "application/json");
        assert_eq!(ct("text/html"), "text/html; charset=utf-8");
        assert_eq!(ct("text/json-p"), "text/json-p; charset=utf-8");
    }
}
