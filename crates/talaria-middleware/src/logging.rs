//! Exception logging for the error boundary.
//!
//! Every error that reaches the dispatcher is logged once as
//! `Exception on <METHOD> <PATH>`. Server errors (5xx) are logged at `ERROR`,
//! everything else at `INFO`. Records carry these fields:
//!
//! | Field | Value |
//! |---|---|
//! | `http.method` | request method |
//! | `http.path` | request path |
//! | `http.status_code` | response status |
//! | `error.kind` | taxonomy member, e.g. `not_acceptable` |
//! | `error.message` | description sent to the client |
//! | `error.source` | underlying fault, if any |

use http::Method;
use talaria_core::{status, ApiError};

/// Target used for every record emitted by the dispatcher.
pub const DISPATCH_TARGET: &str = "talaria::dispatch";

/// Logs errors caught by the dispatcher with a status-derived severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExceptionLogger;

impl ExceptionLogger {
    /// Creates a logger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Logs an error raised while serving `method path`.
    ///
    /// An error without a status is logged as a server error.
    pub fn log(&self, method: &Method, path: &str, error: &ApiError) {
        let code = error.status_or_default().as_u16();
        let kind = error.kind();
        let message = error.description();
        let source = error.source_error().map(ToString::to_string);

        if status::is_server_error(code) {
            tracing::event!(
                target: DISPATCH_TARGET,
                tracing::Level::ERROR,
                http.method = %method,
                http.path = %path,
                http.status_code = code,
                error.kind = %kind,
                error.message = %message,
                error.source = ?source,
                "Exception on {method} {path}"
            );
        } else {
            tracing::event!(
                target: DISPATCH_TARGET,
                tracing::Level::INFO,
                http.method = %method,
                http.path = %path,
                http.status_code = code,
                error.kind = %kind,
                error.message = %message,
                error.source = ?source,
                "Exception on {method} {path}"
            );
        }
    }
}
