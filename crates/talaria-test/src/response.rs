//! Test response wrapper.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// A fully read response with helper methods for assertions.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Reads an HTTP response into memory.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: BodyExt,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Creates a test response from raw parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns a reference to the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the full Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Returns the Content-Type without parameters, e.g. `text/html`.
    #[must_use]
    pub fn mimetype(&self) -> Option<&str> {
        self.content_type()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Deserializes the body as a JSON value.
    pub fn json_value(&self) -> Result<Value, TestError> {
        self.json()
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}: {}",
            expected,
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts the mimetype, ignoring parameters such as `charset`.
    ///
    /// # Panics
    ///
    /// Panics if Content-Type is missing or doesn't match.
    pub fn assert_mimetype(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let actual = self
            .mimetype()
            .unwrap_or_else(|| panic!("Content-Type header not found"));
        assert_eq!(actual, expected, "Content-Type mismatch");
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));
        assert_eq!(actual, expected.as_ref(), "Header '{}' mismatch", name);
        self
    }

    /// Asserts that the body contains the expected substring.
    ///
    /// # Panics
    ///
    /// Panics if the body doesn't contain the substring.
    pub fn assert_body_contains(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let body = String::from_utf8_lossy(&self.body);
        assert!(
            body.contains(expected),
            "Body should contain '{}', got: {}",
            expected,
            body
        );
        self
    }

    /// Asserts that the JSON body equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or doesn't match.
    pub fn assert_json_eq(&self, expected: &Value) -> &Self {
        let actual = self
            .json_value()
            .unwrap_or_else(|e| panic!("Body should be valid JSON: {e}"));
        assert_eq!(&actual, expected, "JSON body mismatch");
        self
    }

    /// Asserts the `{error, message}` body of an error response.
    ///
    /// # Panics
    ///
    /// Panics if the body is not an error payload or doesn't match.
    pub fn assert_error(&self, name: &str, message: &str) -> &Self {
        let body = self
            .json_value()
            .unwrap_or_else(|e| panic!("Body should be valid JSON: {e}"));
        assert_eq!(body["error"], name, "error name mismatch");
        assert_eq!(body["message"], message, "error message mismatch");
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(content_type: &'static str, body: &'static str) -> TestResponse {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        TestResponse::new(StatusCode::OK, headers, Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn test_mimetype_drops_parameters() {
        let res = response("text/html; charset=utf-8", "<pre></pre>");
        assert_eq!(res.content_type(), Some("text/html; charset=utf-8"));
        assert_eq!(res.mimetype(), Some("text/html"));
        res.assert_mimetype("text/html");
    }

    #[test]
    fn test_json_helpers() {
        let res = response("application/json", r#"{"value":200}"#);
        assert_eq!(res.json_value().unwrap(), json!({"value": 200}));
        res.assert_status(StatusCode::OK)
            .assert_json_eq(&json!({"value": 200}))
            .assert_body_contains("200");
    }

    #[test]
    fn test_assert_error() {
        let res = response(
            "application/json",
            r#"{"error":"Forbidden","message":"nope"}"#,
        );
        res.assert_error("Forbidden", "nope");
    }

    #[test]
    fn test_invalid_json() {
        let res = response("text/plain", "not json");
        assert!(matches!(res.json_value(), Err(TestError::Json(_))));
    }

    #[tokio::test]
    async fn test_from_http() {
        let http = http::Response::builder()
            .status(StatusCode::CREATED)
            .body(http_body_util::Full::new(Bytes::from("created")))
            .unwrap();

        let res = TestResponse::from_http(http).await.unwrap();
        assert_eq!(res.status_code(), 201);
        assert_eq!(res.text().unwrap(), "created");
    }
}
