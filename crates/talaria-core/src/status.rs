//! Helpers for working with HTTP status codes.

use http::StatusCode;

/// Reason phrase used when a status code has no canonical one.
pub const UNKNOWN_REASON: &str = "Unknown Error";

/// Returns `true` for status codes in the 5xx range.
///
/// Only 500 through 599 count, so out-of-range custom codes are never
/// treated as server errors.
///
/// ```
/// use talaria_core::status::is_server_error;
///
/// assert!(!is_server_error(499));
/// assert!(is_server_error(500));
/// assert!(is_server_error(599));
/// assert!(!is_server_error(600));
/// ```
#[must_use]
pub const fn is_server_error(code: u16) -> bool {
    matches!(code, 500..=599)
}

/// Returns the canonical reason phrase for a status, or [`UNKNOWN_REASON`].
#[must_use]
pub fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or(UNKNOWN_REASON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_server_error_bounds() {
        assert!(!is_server_error(200));
        assert!(!is_server_error(499));
        assert!(is_server_error(500));
        assert!(is_server_error(503));
        assert!(is_server_error(599));
        assert!(!is_server_error(600));
    }

    #[test]
    fn test_reason_phrases() {
        assert_eq!(reason(StatusCode::NOT_ACCEPTABLE), "Not Acceptable");
        assert_eq!(reason(StatusCode::IM_A_TEAPOT), "I'm a teapot");
        assert_eq!(reason(StatusCode::INTERNAL_SERVER_ERROR), "Internal Server Error");
    }

    #[test]
    fn test_reason_for_unregistered_code() {
        let status = StatusCode::from_u16(599).unwrap();
        assert_eq!(reason(status), UNKNOWN_REASON);
    }
}
