//! What a serializer can see of the current request.

use crate::registry::SerializerRegistry;
use crate::template::TemplateRenderer;
use talaria_config::Config;

/// Request-scoped data passed to every serializer call.
///
/// Serializers are plain functions; anything they need beyond the payload
/// (the JSONP callback parameter, the debug template) comes from here.
#[derive(Clone, Copy)]
pub struct SerializeContext<'a> {
    query: Option<&'a str>,
    config: &'a Config,
    templates: &'a dyn TemplateRenderer,
    registry: &'a SerializerRegistry,
}

impl<'a> SerializeContext<'a> {
    /// Creates a context with no query string.
    #[must_use]
    pub fn new(
        registry: &'a SerializerRegistry,
        config: &'a Config,
        templates: &'a dyn TemplateRenderer,
    ) -> Self {
        Self {
            query: None,
            config,
            templates,
            registry,
        }
    }

    /// Sets the raw query string of the request.
    #[must_use]
    pub fn with_query(mut self, query: Option<&'a str>) -> Self {
        self.query = query;
        self
    }

    /// The raw query string, if any.
    #[must_use]
    pub fn query_string(&self) -> Option<&'a str> {
        self.query
    }

    /// The first value of a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        talaria_core::query_param(self.query, name)
    }

    /// The extension configuration.
    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// The template renderer.
    #[must_use]
    pub fn templates(&self) -> &'a dyn TemplateRenderer {
        self.templates
    }

    /// The serializer registry.
    #[must_use]
    pub fn registry(&self) -> &'a SerializerRegistry {
        self.registry
    }
}

impl std::fmt::Debug for SerializeContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializeContext")
            .field("query", &self.query)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
