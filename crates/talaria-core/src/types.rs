//! Transport types exchanged with the host HTTP stack.

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type seen by the dispatcher.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by the dispatcher.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Wraps bytes into a response or request body.
pub fn full_body(bytes: impl Into<Bytes>) -> Full<Bytes> {
    Full::new(bytes.into())
}

/// Returns an empty body.
#[must_use]
pub fn empty_body() -> Full<Bytes> {
    Full::new(Bytes::new())
}
