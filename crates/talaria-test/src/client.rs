//! Test client for in-memory requests.

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use http::Method;
use serde::Serialize;
use talaria::{Api, ApiService};

/// A test client that serves requests through an [`Api`] without a network.
///
/// Requests go through routing, negotiation, every hook and the error
/// boundary exactly as they would in production.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use talaria::{Api, ApiResult};
/// use talaria_test::TestClient;
///
/// # tokio_test::block_on(async {
/// let mut api = Api::new();
/// api.get("/ping", |_| async { ApiResult::Ok(json!({"value": 200})) }).unwrap();
///
/// let client = TestClient::new(api);
/// let response = client.get("/ping").accept("application/json").send().await;
///
/// assert_eq!(response.status_code(), 200);
/// assert_eq!(response.text().unwrap(), r#"{"value":200}"#);
/// # });
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    service: ApiService,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Freezes `api` and creates a client for it.
    pub fn new(api: Api) -> Self {
        Self::from_service(api.into_service())
    }

    /// Creates a client for an already frozen api.
    pub fn from_service(service: ApiService) -> Self {
        Self {
            service,
            default_headers: Vec::new(),
        }
    }

    /// The service requests are sent to.
    #[must_use]
    pub fn service(&self) -> &ApiService {
        &self.service
    }

    /// Adds a header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    async fn send_internal(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let response = self.service.handle(request.into_http_request()).await;
        TestResponse::from_http(response).await
    }
}

/// A request builder bound to a test client.
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let builder = client
            .default_headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));
        Self { client, builder }
    }

    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Accept header.
    pub fn accept(mut self, accept: impl AsRef<str>) -> Self {
        self.builder = self.builder.accept(accept);
        self
    }

    /// Appends query parameters.
    pub fn query<T: Serialize>(mut self, params: &T) -> Self {
        self.builder = self.builder.query(params);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<bytes::Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(self) -> TestResponse {
        self.try_send()
            .await
            .unwrap_or_else(|e| panic!("test request failed: {e}"))
    }

    /// Sends the request and returns a Result.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.send_internal(request).await
    }
}
