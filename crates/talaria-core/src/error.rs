//! Error taxonomy for API endpoints.
//!
//! Handlers and hooks signal failure by returning an [`ApiError`]. Every error
//! carries an optional HTTP status and a human-readable description; the
//! dispatcher is the single place where errors are caught and turned into
//! responses.
//!
//! | Kind | Status | Meaning |
//! |---|---|---|
//! | `NotFound` | 404 | requested resource does not exist |
//! | `Unauthorized` | 401 | caller is not authenticated |
//! | `Forbidden` | 403 | caller lacks permission |
//! | `NotAcceptable` | 406 | content negotiation failed |
//! | `UnprocessableEntity` | 422 | missing or invalid input fields |
//! | `NotImplemented` | 501 | action not supported |
//! | `Http` | explicit | an HTTP exception raised with a status (`abort`) |
//! | `Api` | unset | generic API error, forced to 500 unless given a status |
//! | `Internal` | unset | unexpected fault, always surfaced as 500 |
//!
//! An error without a status is normalised to `500 Internal Server Error` at
//! the error boundary, see [`ApiError::normalized`].

use crate::status;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// The members of the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// The caller is not authenticated but the endpoint requires it.
    Unauthorized,
    /// The caller is authenticated but lacks permission.
    Forbidden,
    /// No representation acceptable to the client can be produced.
    NotAcceptable,
    /// The client sent missing or invalid fields.
    UnprocessableEntity,
    /// The API does not support the requested action.
    NotImplemented,
    /// An HTTP exception raised with an explicit status code.
    Http,
    /// A generic API error.
    Api,
    /// An unexpected fault (error or panic) outside the taxonomy.
    Internal,
}

impl ErrorKind {
    /// Returns the status code fixed by this kind, if any.
    #[must_use]
    pub const fn default_status(self) -> Option<StatusCode> {
        match self {
            Self::NotFound => Some(StatusCode::NOT_FOUND),
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden => Some(StatusCode::FORBIDDEN),
            Self::NotAcceptable => Some(StatusCode::NOT_ACCEPTABLE),
            Self::UnprocessableEntity => Some(StatusCode::UNPROCESSABLE_ENTITY),
            Self::NotImplemented => Some(StatusCode::NOT_IMPLEMENTED),
            Self::Http | Self::Api | Self::Internal => None,
        }
    }

    /// Returns the description fixed by this kind, if any.
    #[must_use]
    pub const fn default_description(self) -> Option<&'static str> {
        match self {
            Self::NotFound => Some(
                "The requested resource was not found on the server. If you entered \
                 the URL manually please check your spelling and try again.",
            ),
            Self::Unauthorized => Some(
                "The server could not verify that you are authorized to access the \
                 requested URL.",
            ),
            Self::Forbidden => {
                Some("You don't have the permission to access the requested resource.")
            }
            Self::NotAcceptable => Some(
                "The application API cannot generate response in format accepted by \
                 client according to the accept headers send in the request.",
            ),
            Self::UnprocessableEntity => {
                Some("The client missed required field or send invalid fields in request.")
            }
            Self::NotImplemented => Some(
                "The API does not support the action requested by the client. To list \
                 of the supported API methods consult with the documentation.",
            ),
            Self::Http | Self::Api | Self::Internal => None,
        }
    }

    /// Returns the machine-readable name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotAcceptable => "not_acceptable",
            Self::UnprocessableEntity => "unprocessable_entity",
            Self::NotImplemented => "not_implemented",
            Self::Http => "http",
            Self::Api => "api",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised by a handler or hook.
///
/// Each kind fixes a default status and description; both can be overridden
/// per instance.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use talaria_core::{ApiError, ErrorKind};
///
/// let err = ApiError::new()
///     .with_status(StatusCode::IM_A_TEAPOT)
///     .with_description("teapot");
///
/// assert_eq!(err.kind(), ErrorKind::Api);
/// assert_eq!(err.status(), Some(StatusCode::IM_A_TEAPOT));
/// assert_eq!(err.name(), "I'm a teapot");
/// assert_eq!(err.description(), "teapot");
/// ```
#[derive(Error, Debug)]
#[error("{kind} error ({}): {}", .status.map_or(0, |s| s.as_u16()), .description.as_deref().unwrap_or("no description"))]
pub struct ApiError {
    kind: ErrorKind,
    status: Option<StatusCode>,
    description: Option<String>,
    #[source]
    source: Option<anyhow::Error>,
}

impl ApiError {
    fn of_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            status: kind.default_status(),
            description: kind.default_description().map(ToString::to_string),
            source: None,
        }
    }

    /// Creates a generic API error with no status code.
    ///
    /// Unless a status is set with [`with_status`](Self::with_status), the
    /// error is surfaced as `500 Internal Server Error`.
    #[must_use]
    pub fn new() -> Self {
        Self::of_kind(ErrorKind::Api)
    }

    /// Creates a `404 Not Found` error.
    #[must_use]
    pub fn not_found() -> Self {
        Self::of_kind(ErrorKind::NotFound)
    }

    /// Creates a `401 Unauthorized` error.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::of_kind(ErrorKind::Unauthorized)
    }

    /// Creates a `403 Forbidden` error.
    #[must_use]
    pub fn forbidden() -> Self {
        Self::of_kind(ErrorKind::Forbidden)
    }

    /// Creates a `406 Not Acceptable` error.
    #[must_use]
    pub fn not_acceptable() -> Self {
        Self::of_kind(ErrorKind::NotAcceptable)
    }

    /// Creates a `422 Unprocessable Entity` error.
    #[must_use]
    pub fn unprocessable_entity() -> Self {
        Self::of_kind(ErrorKind::UnprocessableEntity)
    }

    /// Creates a `501 Not Implemented` error.
    #[must_use]
    pub fn not_implemented() -> Self {
        Self::of_kind(ErrorKind::NotImplemented)
    }

    /// Creates an HTTP exception with an explicit status code.
    ///
    /// This is the equivalent of aborting the request with a bare status.
    #[must_use]
    pub fn http(status: StatusCode) -> Self {
        Self::of_kind(ErrorKind::Http).with_status(status)
    }

    /// Creates an internal error wrapping an unexpected fault.
    ///
    /// The source is kept for logging only and never reaches the client.
    pub fn internal(source: impl Into<anyhow::Error>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::of_kind(ErrorKind::Internal)
        }
    }

    /// Overrides the status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Overrides the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches an underlying error for logging.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the taxonomy member.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the status code, if one is set.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns the display name derived from the status code.
    ///
    /// Errors without a status are named `Unknown Error` until normalised.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.status.map_or(status::UNKNOWN_REASON, status::reason)
    }

    /// Returns the human-readable description.
    ///
    /// Falls back to the display name when no description was given.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| self.name())
    }

    /// Returns the underlying fault, if any.
    #[must_use]
    pub fn source_error(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }

    /// Forces a status onto errors that have none.
    ///
    /// An error raised without a status becomes `500 Internal Server Error`;
    /// an error with a status is returned untouched.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.status.is_none() {
            self.status = Some(StatusCode::INTERNAL_SERVER_ERROR);
        }
        self
    }

    /// Returns the status to respond with, normalising a missing one to 500.
    #[must_use]
    pub fn status_or_default(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Builds the `{error, message}` payload for this error.
    #[must_use]
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.name().to_string(),
            message: self.description().to_string(),
        }
    }
}

impl Default for ApiError {
    fn default() -> Self {
        Self::new()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err)
    }
}

/// The body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// The error name (reason phrase of the status code).
    pub error: String,
    /// The error description.
    pub message: String,
}
