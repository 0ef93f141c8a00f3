//! Common types used throughout the dispatcher.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use talaria_core::{full_body, ApiResult, Invocation, Reply};

pub use talaria_core::{Request, Response};

/// A boxed future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased endpoint handler.
///
/// Preprocessors receive and return values of this type, so a handler can
/// be wrapped or replaced before it runs.
pub type BoxedHandler = Arc<dyn Fn(Invocation) -> BoxFuture<'static, ApiResult<Reply>> + Send + Sync>;

/// Wraps an async function as a [`BoxedHandler`].
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use talaria_core::ApiResult;
/// use talaria_middleware::handler_fn;
///
/// let ping = handler_fn(|inv| async move {
///     ApiResult::Ok(json!({"value": inv.args().get_i64("value").unwrap_or(200)}))
/// });
/// ```
pub fn handler_fn<F, Fut, R>(f: F) -> BoxedHandler
where
    F: Fn(Invocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<R>> + Send + 'static,
    R: Into<Reply>,
{
    Arc::new(move |invocation: Invocation| -> BoxFuture<'static, ApiResult<Reply>> {
        let fut = f(invocation);
        Box::pin(async move { fut.await.map(Into::into) })
    })
}

/// Extension trait for building bare responses.
pub trait ResponseExt {
    /// Creates a JSON response from a value, bypassing negotiation.
    fn json(status: StatusCode, body: &Value) -> Response;
}

impl ResponseExt for Response {
    fn json(status: StatusCode, body: &Value) -> Response {
        let mut response = Response::new(full_body(Bytes::from(body.to_string())));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}
