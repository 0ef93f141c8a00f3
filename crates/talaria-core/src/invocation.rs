//! Handler invocation context.
//!
//! The [`Invocation`] is what a handler receives: the HTTP request details
//! together with the arguments the routing layer matched for it.

use crate::args::RouteArgs;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri};

/// Everything a handler needs to know about the request it serves.
///
/// # Example
///
/// ```
/// use talaria_core::{Invocation, RouteArgs};
/// use http::Method;
///
/// let mut args = RouteArgs::new();
/// args.insert("value", 404);
///
/// let invocation = Invocation::builder()
///     .method(Method::GET)
///     .uri("/ping/404?callback=cb".parse().unwrap())
///     .args(args)
///     .build();
///
/// assert_eq!(invocation.path(), "/ping/404");
/// assert_eq!(invocation.query_param("callback").as_deref(), Some("cb"));
/// assert_eq!(invocation.args().get_i64("value"), Some(404));
/// ```
#[derive(Debug, Clone)]
pub struct Invocation {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    args: RouteArgs,
}

impl Invocation {
    /// Creates a new invocation.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes, args: RouteArgs) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            args,
        }
    }

    /// Creates a builder, mostly useful in tests.
    #[must_use]
    pub fn builder() -> InvocationBuilder {
        InvocationBuilder::default()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the raw query string.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the first value of a query parameter.
    ///
    /// A malformed query string yields `None` rather than an error.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        query_param(self.uri.query(), name)
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a specific header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the route arguments.
    #[must_use]
    pub fn args(&self) -> &RouteArgs {
        &self.args
    }
}

/// Looks up the first value of `name` in a URL-encoded query string.
#[must_use]
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query?).ok()?;
    pairs.into_iter().find(|(k, _)| k == name).map(|(_, v)| v)
}

/// Builder for [`Invocation`].
#[derive(Debug, Default)]
pub struct InvocationBuilder {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    args: RouteArgs,
}

impl InvocationBuilder {
    /// Sets the HTTP method (defaults to `GET`).
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the URI (defaults to `/`).
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    /// Sets the headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Appends one header. Names or values that are not valid HTTP are skipped.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the route arguments.
    #[must_use]
    pub fn args(mut self, args: RouteArgs) -> Self {
        self.args = args;
        self
    }

    /// Builds the invocation.
    #[must_use]
    pub fn build(self) -> Invocation {
        Invocation::new(self.method, self.uri, self.headers, self.body, self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_lookup() {
        assert_eq!(
            query_param(Some("callback=cb&x=1"), "callback").as_deref(),
            Some("cb")
        );
        assert_eq!(query_param(Some("x=1"), "callback"), None);
        assert_eq!(query_param(None, "callback"), None);
    }

    #[test]
    fn test_query_param_decodes_values() {
        assert_eq!(
            query_param(Some("callback=console.log&y=a%20b"), "y").as_deref(),
            Some("a b")
        );
    }

    #[test]
    fn test_query_param_first_value_wins() {
        assert_eq!(
            query_param(Some("callback=first&callback=second"), "callback").as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_builder_defaults() {
        let invocation = Invocation::builder().build();
        assert_eq!(invocation.method(), &Method::GET);
        assert_eq!(invocation.path(), "/");
        assert!(invocation.args().is_empty());
        assert!(invocation.body().is_empty());
    }
}
