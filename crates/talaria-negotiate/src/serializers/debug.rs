//! The debug serializer: dumps the payload into an HTML page.

use crate::context::SerializeContext;
use crate::template::APIDUMP_TEMPLATE;
use bytes::Bytes;
use serde_json::{Map, Value};
use talaria_core::{ApiError, ApiResult};

/// Renders the configured `apidump_template` with the pretty-printed payload
/// as `dump`.
pub fn to_html(payload: &Value, ctx: &SerializeContext<'_>) -> ApiResult<Bytes> {
    let dump = serde_json::to_string_pretty(payload).map_err(ApiError::internal)?;
    let template = ctx
        .config()
        .apidump_template()
        .unwrap_or_else(|| APIDUMP_TEMPLATE.to_string());

    let mut vars = Map::new();
    vars.insert("dump".to_string(), Value::String(dump));

    ctx.templates()
        .render(&template, &vars)
        .map(Bytes::from)
        .map_err(ApiError::internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuiltinTemplates, SerializerRegistry};
    use serde_json::json;
    use talaria_config::{keys, Config};
    use talaria_core::ErrorKind;

    #[test]
    fn test_dump_is_indented_and_escaped() {
        let registry = SerializerRegistry::new();
        let config = Config::with_defaults();
        let templates = BuiltinTemplates::new();
        let ctx = SerializeContext::new(&registry, &config, &templates);

        let body = to_html(&json!({"value": 200}), &ctx).unwrap();
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains("<pre>{\n  &quot;value&quot;: 200\n}</pre>"));
    }

    #[test]
    fn test_uses_configured_template() {
        let registry = SerializerRegistry::new();
        let config = Config::with_defaults();
        config.set(keys::APIDUMP_TEMPLATE, "plain.txt");
        let templates = BuiltinTemplates::new().with_template("plain.txt", "dump: {{ dump }}");
        let ctx = SerializeContext::new(&registry, &config, &templates);

        assert_eq!(to_html(&json!(42), &ctx).unwrap(), "dump: 42");
    }

    #[test]
    fn test_unknown_template_is_internal_error() {
        let registry = SerializerRegistry::new();
        let config = Config::with_defaults();
        config.set(keys::APIDUMP_TEMPLATE, "missing.html");
        let templates = BuiltinTemplates::new();
        let ctx = SerializeContext::new(&registry, &config, &templates);

        let err = to_html(&json!(null), &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.status().is_none());
    }
}
