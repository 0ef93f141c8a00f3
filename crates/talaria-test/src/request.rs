//! Test request building.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use serde::Serialize;
use talaria::core::full_body;
use talaria::middleware::Request;

/// A test request that can be sent to a [`TestClient`](crate::TestClient).
#[derive(Debug, Clone)]
pub struct TestRequest {
    /// HTTP method
    pub method: Method,
    /// Request URI
    pub uri: Uri,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Bytes,
}

impl TestRequest {
    /// Creates a new GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Creates a new POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Creates a new PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Creates a new DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }

    /// Converts this request to an HTTP request.
    #[must_use]
    pub fn into_http_request(self) -> Request {
        let mut request = Request::new(full_body(self.body));
        *request.method_mut() = self.method;
        *request.uri_mut() = self.uri;
        *request.headers_mut() = self.headers;
        request
    }
}

/// Builder for constructing test requests.
///
/// Invalid input is remembered and reported by [`build`](Self::build).
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: None,
            error: None,
        }
    }

    /// Appends a header. Repeated names keep every value.
    ///
    /// ```ignore
    /// let request = TestRequest::get("/ping")
    ///     .header("Accept", "text/html")
    ///     .header("Accept", "application/json;q=0.5")
    ///     .build()?;
    /// ```
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let (name, value) = (name.as_ref(), value.as_ref());
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => self.fail(TestError::InvalidHeader(format!("{name}: {value}"))),
        }
        self
    }

    /// Sets the Accept header.
    pub fn accept(mut self, accept: impl AsRef<str>) -> Self {
        self.headers.remove(header::ACCEPT);
        self.header(header::ACCEPT.as_str(), accept)
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.headers.remove(header::CONTENT_TYPE);
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Appends query parameters to the URI.
    pub fn query<T: Serialize>(mut self, params: &T) -> Self {
        match serde_urlencoded::to_string(params) {
            Ok(encoded) if encoded.is_empty() => {}
            Ok(encoded) => {
                let sep = if self.uri.contains('?') { '&' } else { '?' };
                self.uri.push(sep);
                self.uri.push_str(&encoded);
            }
            Err(e) => self.fail(TestError::RequestBuild(format!("Invalid query: {e}"))),
        }
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the request body as JSON and the matching Content-Type.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Some(Bytes::from(bytes)),
            Err(e) => self.fail(e.into()),
        }
        self.content_type("application/json")
    }

    /// Builds the test request.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let uri: Uri = self
            .uri
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("Invalid URI: {e}")))?;

        Ok(TestRequest {
            method: self.method,
            uri,
            headers: self.headers,
            body: self.body.unwrap_or_default(),
        })
    }

    fn fail(&mut self, error: TestError) {
        self.error.get_or_insert(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_request() {
        let request = TestRequest::get("/ping").build().unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.uri.path(), "/ping");
        assert!(request.body.is_empty());
    }

    #[test]
    fn test_repeated_headers_are_kept() {
        let request = TestRequest::get("/ping")
            .header("Accept", "text/html")
            .header("Accept", "application/json")
            .build()
            .unwrap();
        assert_eq!(request.headers.get_all(header::ACCEPT).iter().count(), 2);
    }

    #[test]
    fn test_accept_replaces() {
        let request = TestRequest::get("/ping")
            .accept("text/html")
            .accept("application/json")
            .build()
            .unwrap();
        assert_eq!(request.headers[header::ACCEPT], "application/json");
    }

    #[test]
    fn test_query_is_encoded() {
        let request = TestRequest::get("/ping?x=1")
            .query(&[("callback", "console.log")])
            .build()
            .unwrap();
        assert_eq!(request.uri.query(), Some("x=1&callback=console.log"));
    }

    #[test]
    fn test_json_body() {
        let request = TestRequest::post("/todos")
            .json(&json!({"title": "write tests"}))
            .build()
            .unwrap();
        assert_eq!(request.headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(&request.body[..], br#"{"title":"write tests"}"#);
    }

    #[test]
    fn test_invalid_header_is_reported() {
        let err = TestRequest::get("/ping")
            .header("bad header", "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, TestError::InvalidHeader(_)));
    }

    #[test]
    fn test_invalid_uri_is_reported() {
        let err = TestRequest::get("not a uri").build().unwrap_err();
        assert!(matches!(err, TestError::RequestBuild(_)));
    }

    #[test]
    fn test_into_http_request() {
        let request = TestRequest::put("/todos/1")
            .accept("application/json")
            .body("x")
            .build()
            .unwrap()
            .into_http_request();
        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.uri().path(), "/todos/1");
        assert_eq!(request.headers()[header::ACCEPT], "application/json");
    }
}
