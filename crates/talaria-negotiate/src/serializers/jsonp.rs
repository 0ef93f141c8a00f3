//! The JSONP serializer.
//!
//! The payload is dumped with the registered `application/json` serializer
//! when there is one, and with plain `serde_json` otherwise. The result is
//! wrapped in a call to the function named by the callback query parameter;
//! without that parameter the JSON is returned unwrapped.

use crate::context::SerializeContext;
use bytes::Bytes;
use serde_json::Value;
use talaria_core::{ApiError, ApiResult};

/// The query parameter read when `jsonp_callback` is not configured.
pub const DEFAULT_CALLBACK: &str = "callback";

/// Wraps a JSON string in an optional padding function call.
///
/// ```
/// use talaria_negotiate::serializers::jsonp;
///
/// assert_eq!(jsonp(r#"{"ping": "pong"}"#, Some("console.log")), r#"console.log({"ping": "pong"});"#);
/// assert_eq!(jsonp("42", None), "42");
/// assert_eq!(jsonp("42", Some("")), "42");
/// ```
#[must_use]
pub fn jsonp(json: &str, padding: Option<&str>) -> String {
    match padding.filter(|p| !p.is_empty()) {
        Some(padding) => format!("{padding}({json});"),
        None => json.to_string(),
    }
}

/// Dumps the payload as JSON, padded with the request's callback.
pub fn to_javascript(payload: &Value, ctx: &SerializeContext<'_>) -> ApiResult<Bytes> {
    let json = match ctx.registry().get("application/json") {
        Some(to_json) => to_json(payload, ctx)?,
        None => serde_json::to_vec(payload)
            .map(Bytes::from)
            .map_err(ApiError::internal)?,
    };

    let name = ctx
        .config()
        .jsonp_callback()
        .unwrap_or_else(|| DEFAULT_CALLBACK.to_string());
    let callback = ctx.query_param(&name);

    if callback.as_deref().map_or(true, str::is_empty) {
        return Ok(json);
    }

    let json = std::str::from_utf8(&json).map_err(ApiError::internal)?;
    Ok(Bytes::from(jsonp(json, callback.as_deref())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuiltinTemplates, SerializerRegistry};
    use serde_json::json;
    use talaria_config::{keys, Config};

    fn render(registry: &SerializerRegistry, config: &Config, query: Option<&str>) -> Bytes {
        let templates = BuiltinTemplates::new();
        let ctx = SerializeContext::new(registry, config, &templates).with_query(query);
        to_javascript(&json!({"ping": "pong"}), &ctx).unwrap()
    }

    #[test]
    fn test_jsonp_padding() {
        assert_eq!(jsonp(r#"{"ping":"pong"}"#, Some("cb")), r#"cb({"ping":"pong"});"#);
        assert_eq!(jsonp("42", None), "42");
    }

    #[test]
    fn test_wraps_with_callback_param() {
        let body = render(&SerializerRegistry::new(), &Config::with_defaults(), Some("callback=cb"));
        assert_eq!(body, r#"cb({"ping":"pong"});"#);
    }

    #[test]
    fn test_without_callback_param_passes_json_through() {
        let body = render(&SerializerRegistry::new(), &Config::with_defaults(), Some("other=x"));
        assert_eq!(body, r#"{"ping":"pong"}"#);

        let body = render(&SerializerRegistry::new(), &Config::with_defaults(), None);
        assert_eq!(body, r#"{"ping":"pong"}"#);
    }

    #[test]
    fn test_callback_param_name_is_configurable() {
        let config = Config::with_defaults();
        config.set(keys::JSONP_CALLBACK, "jsonp");

        let body = render(&SerializerRegistry::new(), &config, Some("jsonp=handle&callback=cb"));
        assert_eq!(body, r#"handle({"ping":"pong"});"#);
    }

    #[test]
    fn test_reuses_registered_json_serializer() {
        let mut registry = SerializerRegistry::new();
        registry.register("application/json", |_: &Value, _: &SerializeContext<'_>| {
            Ok(Bytes::from_static(b"\"custom\""))
        });

        let body = render(&registry, &Config::with_defaults(), Some("callback=cb"));
        assert_eq!(body, r#"cb("custom");"#);
    }

    #[test]
    fn test_falls_back_to_serde_json() {
        let registry = SerializerRegistry::empty();
        let body = render(&registry, &Config::with_defaults(), Some("callback=cb"));
        assert_eq!(body, r#"cb({"ping":"pong"});"#);
    }
}
