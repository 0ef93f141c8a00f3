//! Handler return values.
//!
//! A handler may return a bare payload, a payload with a status, a payload
//! with a status and extra headers, or a finished [`Response`]. A finished
//! response bypasses serialization entirely; every other shape is reduced to
//! a canonical `(payload, status, headers)` triple by [`unpack_response`].

use crate::types::Response;
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// What a handler (or postprocessor) hands back to the dispatcher.
#[derive(Debug)]
pub enum Reply {
    /// A finished response, used verbatim.
    Response(Response),
    /// A bare payload; status defaults to 200, headers to none.
    Payload(Value),
    /// A payload with a status code.
    WithStatus(Value, StatusCode),
    /// A payload with a status code and extra headers.
    WithHeaders(Value, StatusCode, HeaderMap),
}

impl Reply {
    /// Serializes any value into a bare payload reply.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Payload)
    }

    /// Packs a canonical triple into the most specific reply shape.
    #[must_use]
    pub fn pack(payload: Value, status: StatusCode, headers: HeaderMap) -> Self {
        Self::WithHeaders(payload, status, headers)
    }

    /// Returns true if this reply is a finished response.
    #[must_use]
    pub const fn is_response(&self) -> bool {
        matches!(self, Self::Response(_))
    }

    /// Returns the payload, if this reply carries one.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Response(_) => None,
            Self::Payload(payload)
            | Self::WithStatus(payload, _)
            | Self::WithHeaders(payload, _, _) => Some(payload),
        }
    }

    /// Returns the payload mutably, if this reply carries one.
    pub fn payload_mut(&mut self) -> Option<&mut Value> {
        match self {
            Self::Response(_) => None,
            Self::Payload(payload)
            | Self::WithStatus(payload, _)
            | Self::WithHeaders(payload, _, _) => Some(payload),
        }
    }
}

/// Reduces a reply to `(payload, status, headers)`, filling in defaults.
///
/// Never fails: a shape that carries no payload (a finished response)
/// degrades to a null payload with the default status and no headers.
/// Callers are expected to take finished responses out first.
///
/// ```
/// use http::{HeaderMap, StatusCode};
/// use serde_json::json;
/// use talaria_core::{unpack_response, Reply};
///
/// let (payload, status, headers) = unpack_response(Reply::Payload(json!(42)));
/// assert_eq!(payload, json!(42));
/// assert_eq!(status, StatusCode::OK);
/// assert!(headers.is_empty());
///
/// let (_, status, _) = unpack_response((json!(null), StatusCode::CREATED).into());
/// assert_eq!(status, StatusCode::CREATED);
/// ```
#[must_use]
pub fn unpack_response(reply: Reply) -> (Value, StatusCode, HeaderMap) {
    match reply {
        Reply::Payload(payload) => (payload, StatusCode::OK, HeaderMap::new()),
        Reply::WithStatus(payload, status) => (payload, status, HeaderMap::new()),
        Reply::WithHeaders(payload, status, headers) => (payload, status, headers),
        Reply::Response(_) => (Value::Null, StatusCode::OK, HeaderMap::new()),
    }
}

impl From<Value> for Reply {
    fn from(payload: Value) -> Self {
        Self::Payload(payload)
    }
}

impl From<(Value, StatusCode)> for Reply {
    fn from((payload, status): (Value, StatusCode)) -> Self {
        Self::WithStatus(payload, status)
    }
}

impl From<(Value, StatusCode, HeaderMap)> for Reply {
    fn from((payload, status, headers): (Value, StatusCode, HeaderMap)) -> Self {
        Self::WithHeaders(payload, status, headers)
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}
