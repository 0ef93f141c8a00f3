//! Picks the media type to serve for a request.

use crate::accept::AcceptHeader;
use tracing::debug;

/// Resolves the single best media type for a client.
///
/// A client that accepts anything (`*/*` or a bare `*`), or any subtype of
/// the default's type (`application/*` when the default is
/// `application/json`), is served the configured default before the
/// registered types are considered. Otherwise the quality-aware best match
/// over the registered types is returned.
///
/// Wildcards refused with `q=0` never select the default, so
/// `*/*;q=0` falls through to the best match over the registered types.
///
/// # Example
///
/// ```
/// use talaria_negotiate::{AcceptHeader, MimetypeMatcher};
///
/// let matcher = MimetypeMatcher::new(Some("application/json"));
/// let registered = ["text/html", "application/json"];
///
/// let any = AcceptHeader::parse("*/*");
/// assert_eq!(matcher.guess_best_mimetype(&any, registered).as_deref(), Some("application/json"));
///
/// let xml = AcceptHeader::parse("text/xml");
/// assert_eq!(matcher.guess_best_mimetype(&xml, registered), None);
/// ```
#[derive(Debug, Clone)]
pub struct MimetypeMatcher<'a> {
    default: Option<&'a str>,
}

impl<'a> MimetypeMatcher<'a> {
    /// Creates a matcher for the configured default media type.
    #[must_use]
    pub const fn new(default: Option<&'a str>) -> Self {
        Self { default }
    }

    /// Returns the media type to serve, or `None` if nothing is acceptable.
    pub fn guess_best_mimetype<'r, I>(
        &self,
        accept: &AcceptHeader,
        registered: I,
    ) -> Option<String>
    where
        I: IntoIterator<Item = &'r str>,
    {
        if let Some(default) = self.default {
            if Self::accepts_default(accept, default) {
                debug!(mimetype = default, "client accepts the default mimetype");
                return Some(default.to_string());
            }
        }

        let found = accept.best_match(registered).map(ToString::to_string);
        debug!(mimetype = ?found, "best match over registered mimetypes");
        found
    }

    fn accepts_default(accept: &AcceptHeader, default: &str) -> bool {
        let default = default.to_ascii_lowercase();
        let default_type = default.split_once('/').map_or(default.as_str(), |(ty, _)| ty);

        accept
            .entries()
            .iter()
            .filter(|entry| entry.quality() > 0.0)
            .filter_map(|entry| entry.type_and_subtype())
            .any(|(ty, subtype)| subtype == "*" && (ty == "*" || ty == default_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTERED: [&str; 5] = [
        "text/html",
        "application/json",
        "application/javascript",
        "application/json-p",
        "text/json-p",
    ];

    fn guess(default: &str, header: &str) -> Option<String> {
        MimetypeMatcher::new(Some(default))
            .guess_best_mimetype(&AcceptHeader::parse(header), REGISTERED)
    }

    #[test]
    fn test_any_resolves_to_default() {
        assert_eq!(guess("application/json", "*/*").as_deref(), Some("application/json"));
        assert_eq!(guess("application/json", "*").as_deref(), Some("application/json"));
        assert_eq!(guess("text/html", "*/*").as_deref(), Some("text/html"));
    }

    #[test]
    fn test_default_type_wildcard_resolves_to_default() {
        assert_eq!(
            guess("application/javascript", "application/*").as_deref(),
            Some("application/javascript")
        );
    }

    #[test]
    fn test_shortcut_wins_over_listed_types() {
        assert_eq!(
            guess("application/json", "text/html, */*;q=0.1").as_deref(),
            Some("application/json")
        );
    }

    #[test]
    fn test_default_need_not_be_registered() {
        assert_eq!(guess("nosuch/mimetype", "*/*").as_deref(), Some("nosuch/mimetype"));
    }

    #[test]
    fn test_other_type_wildcard_uses_best_match() {
        assert_eq!(guess("application/json", "text/*").as_deref(), Some("text/html"));
    }

    #[test]
    fn test_exact_type() {
        for mimetype in REGISTERED {
            assert_eq!(guess("application/json", mimetype).as_deref(), Some(mimetype));
        }
    }

    #[test]
    fn test_quality_tie_break() {
        assert_eq!(
            guess("text/html", "application/javascript;q=0.9, application/json;q=1").as_deref(),
            Some("application/json")
        );
    }

    #[test]
    fn test_no_acceptable_type() {
        assert_eq!(guess("application/json", "text/xml"), None);
        assert_eq!(guess("application/json", "*/json"), None);
        assert_eq!(guess("application/json", ""), None);
    }

    #[test]
    fn test_zero_quality_wildcard_is_not_a_shortcut() {
        assert_eq!(guess("application/json", "*/*;q=0"), None);
        assert_eq!(
            guess("application/json", "*/*;q=0, text/html").as_deref(),
            Some("text/html")
        );
    }

    #[test]
    fn test_without_default_falls_back_to_best_match() {
        let matcher = MimetypeMatcher::new(None);
        let found = matcher.guess_best_mimetype(&AcceptHeader::parse("*/*"), REGISTERED);
        assert_eq!(found.as_deref(), Some("text/html"));
    }
}
