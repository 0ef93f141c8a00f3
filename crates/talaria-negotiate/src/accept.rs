//! `Accept` header parsing and quality-aware matching.
//!
//! The parser keeps every entry the client sent, including ones that are not
//! of the form `type/subtype`; such entries simply never match a candidate.
//! Matching is strict:
//!
//! - `*/*` matches every candidate
//! - `type/*` matches any subtype of `type`
//! - `*/subtype` is not a valid media range and never matches
//! - an exact match requires equal type, subtype and parameters

use http::header::ACCEPT;
use http::HeaderMap;
use std::cmp::Ordering;

/// How specific a media range is.
///
/// Ordered so that `text/html;level=1` > `text/html` > `text/*` > `*/*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(bool, bool, usize);

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptEntry {
    range: String,
    params: Vec<(String, String)>,
    quality: f32,
}

impl AcceptEntry {
    /// Parses a single comma-separated element of an `Accept` header.
    ///
    /// Returns `None` for an empty element or a malformed `q` parameter.
    /// The quality is clamped to `[0, 1]`.
    #[must_use]
    pub fn parse(element: &str) -> Option<Self> {
        let mut parts = element.split(';');
        let range = parts.next()?.trim().to_ascii_lowercase();
        if range.is_empty() {
            return None;
        }

        let mut quality = 1.0_f32;
        let mut params = Vec::new();

        for param in parts {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().trim_matches('"');

            if key == "q" {
                quality = value
                    .parse::<f32>()
                    .ok()
                    .filter(|q| q.is_finite())?
                    .clamp(0.0, 1.0);
            } else {
                params.push((key, value.to_ascii_lowercase()));
            }
        }

        params.sort();

        Some(Self {
            range,
            params,
            quality,
        })
    }

    /// The media range without parameters, lowercased.
    #[must_use]
    pub fn range(&self) -> &str {
        &self.range
    }

    /// The client-assigned quality.
    #[must_use]
    pub const fn quality(&self) -> f32 {
        self.quality
    }

    /// Parameters other than `q`, sorted by name.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Splits the range into `(type, subtype)`.
    ///
    /// A bare `*` is read as `*/*`; a range without `/` yields `None`.
    #[must_use]
    pub fn type_and_subtype(&self) -> Option<(&str, &str)> {
        if self.range == "*" {
            return Some(("*", "*"));
        }
        self.range.split_once('/')
    }

    /// Returns how specific this range is.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        let (ty, subtype) = self.range.split_once('/').unwrap_or((&self.range, ""));
        Specificity(ty != "*", subtype != "*", self.params.len())
    }

    /// Returns true if this entry accepts the server-side `candidate` type.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let Some((ty, subtype)) = self.range.split_once('/') else {
            return false;
        };
        if ty == "*" && subtype == "*" {
            return true;
        }
        if ty == "*" {
            return false;
        }

        let (candidate, candidate_params) = split_params(candidate);
        let Some((c_ty, c_subtype)) = candidate.split_once('/') else {
            return false;
        };
        if c_ty == "*" {
            return c_subtype == "*";
        }

        if ty != c_ty {
            return false;
        }
        if subtype == "*" || c_subtype == "*" {
            return true;
        }
        subtype == c_subtype && self.params == candidate_params
    }
}

fn split_params(value: &str) -> (String, Vec<(String, String)>) {
    let mut parts = value.split(';');
    let base = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    let mut params: Vec<(String, String)> = parts
        .filter_map(|p| p.split_once('='))
        .map(|(k, v)| {
            (
                k.trim().to_ascii_lowercase(),
                v.trim().trim_matches('"').to_ascii_lowercase(),
            )
        })
        .collect();
    params.sort();
    (base, params)
}

/// A parsed `Accept` header, ordered by descending quality.
///
/// # Example
///
/// ```
/// use talaria_negotiate::AcceptHeader;
///
/// let accept = AcceptHeader::parse("application/javascript;q=0.9, application/json");
/// assert_eq!(accept.entries()[0].range(), "application/json");
///
/// let best = accept.best_match(["application/javascript", "application/json"]);
/// assert_eq!(best, Some("application/json"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptHeader {
    entries: Vec<AcceptEntry>,
}

impl AcceptHeader {
    /// Parses a raw header value.
    ///
    /// Entries with a malformed quality are skipped. Entries with equal
    /// quality keep the order the client declared them in.
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let mut entries: Vec<AcceptEntry> =
            header.split(',').filter_map(AcceptEntry::parse).collect();
        entries.sort_by(|a, b| {
            b.quality
                .partial_cmp(&a.quality)
                .unwrap_or(Ordering::Equal)
        });
        Self { entries }
    }

    /// Reads the `Accept` header from a request's headers.
    ///
    /// Several `Accept` headers are joined; an absent header is an empty list.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let joined = headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");
        Self::parse(&joined)
    }

    /// The entries in preference order.
    #[must_use]
    pub fn entries(&self) -> &[AcceptEntry] {
        &self.entries
    }

    /// Returns true if the client sent no usable entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Picks the candidate the client prefers most.
    ///
    /// Candidates are visited in the order given, so among equally good
    /// matches the earliest candidate wins. A higher quality always wins;
    /// at equal quality a more specific client range wins. Entries with a
    /// quality of zero never match.
    pub fn best_match<'a, I>(&self, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut result = None;
        let mut best_quality = -1.0_f32;
        let mut best_specificity: Option<Specificity> = None;

        for candidate in candidates {
            for entry in &self.entries {
                let quality = entry.quality;
                if quality <= 0.0 || quality < best_quality {
                    continue;
                }

                let specificity = Some(entry.specificity());
                if (quality > best_quality || specificity > best_specificity)
                    && entry.matches(candidate)
                {
                    best_quality = quality;
                    best_specificity = specificity;
                    result = Some(candidate);
                }
            }
        }

        result
    }
}
