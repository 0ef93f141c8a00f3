//! Route registration errors.

use thiserror::Error;

/// A route pattern was rejected at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// A segment has unbalanced braces or an empty parameter name.
    #[error("invalid segment \"{segment}\" in route \"{pattern}\"")]
    InvalidSegment {
        /// The full pattern.
        pattern: String,
        /// The offending segment.
        segment: String,
    },

    /// A parameter uses a converter other than `str` or `int`.
    #[error("unknown converter \"{converter}\" in route \"{pattern}\"")]
    UnknownConverter {
        /// The full pattern.
        pattern: String,
        /// The converter name.
        converter: String,
    },

    /// The same parameter name appears twice.
    #[error("parameter \"{name}\" appears more than once in route \"{pattern}\"")]
    DuplicateParam {
        /// The full pattern.
        pattern: String,
        /// The repeated name.
        name: String,
    },

    /// The route accepts no methods.
    #[error("route \"{0}\" has no methods")]
    NoMethods(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RouteError::UnknownConverter {
            pattern: "/ping/{value:float}".to_string(),
            converter: "float".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown converter \"float\" in route \"/ping/{value:float}\""
        );
    }
}
