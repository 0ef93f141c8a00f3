//! Path routing for an [`Api`](crate::Api).
//!
//! Patterns are `/`-separated segments. A segment is either a literal or a
//! parameter in braces:
//!
//! | Segment | Matches | Argument |
//! |---------|---------|----------|
//! | `ping` | exactly `ping` | none |
//! | `{name}` | any non-empty segment | string |
//! | `{name:str}` | any non-empty segment | string |
//! | `{name:int}` | unsigned decimal digits | integer |
//!
//! Routes are tried in registration order; the first route whose pattern
//! and method both match wins. A path that matches some pattern under a
//! different method resolves to [`Resolution::MethodNotAllowed`].
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use talaria::router::{Resolution, Router};
//!
//! let mut router = Router::new();
//! router.add(&[Method::GET], "/ping/{value:int}", Default::default(), "ping").unwrap();
//!
//! match router.resolve(&Method::GET, "/ping/404") {
//!     Resolution::Matched { target, args } => {
//!         assert_eq!(*target, "ping");
//!         assert_eq!(args.get_i64("value"), Some(404));
//!     }
//!     _ => unreachable!(),
//! }
//!
//! assert!(matches!(router.resolve(&Method::GET, "/ping/abc"), Resolution::NotFound));
//! assert!(matches!(
//!     router.resolve(&Method::POST, "/ping/1"),
//!     Resolution::MethodNotAllowed { .. }
//! ));
//! ```

use crate::error::RouteError;
use http::Method;
use smallvec::SmallVec;
use talaria_core::RouteArgs;

/// A segment of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    /// A literal segment (e.g. `ping`)
    Literal(String),

    /// A string parameter (e.g. `{name}`)
    Param(String),

    /// An integer parameter (e.g. `{value:int}`)
    IntParam(String),
}

impl PathSegment {
    fn parse(pattern: &str, segment: &str) -> Result<Self, RouteError> {
        let Some(inner) = segment.strip_prefix('{') else {
            if segment.contains(['{', '}']) {
                return Err(RouteError::InvalidSegment {
                    pattern: pattern.to_string(),
                    segment: segment.to_string(),
                });
            }
            return Ok(Self::Literal(segment.to_string()));
        };

        let invalid = || RouteError::InvalidSegment {
            pattern: pattern.to_string(),
            segment: segment.to_string(),
        };

        let inner = inner.strip_suffix('}').ok_or_else(invalid)?;
        let (name, converter) = match inner.split_once(':') {
            Some((name, converter)) => (name, Some(converter)),
            None => (inner, None),
        };

        if name.is_empty() || name.contains(['{', '}']) {
            return Err(invalid());
        }

        match converter {
            None | Some("str") => Ok(Self::Param(name.to_string())),
            Some("int") => Ok(Self::IntParam(name.to_string())),
            Some(other) => Err(RouteError::UnknownConverter {
                pattern: pattern.to_string(),
                converter: other.to_string(),
            }),
        }
    }

    fn name(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Param(name) | Self::IntParam(name) => Some(name.as_str()),
        }
    }
}

/// A registered route.
#[derive(Debug, Clone)]
struct Route<T> {
    methods: SmallVec<[Method; 2]>,
    segments: Vec<PathSegment>,
    defaults: RouteArgs,
    pattern: String,
    target: T,
}

impl<T> Route<T> {
    fn match_path(&self, path: &[&str]) -> Option<RouteArgs> {
        if path.len() != self.segments.len() {
            return None;
        }

        let mut args = RouteArgs::new();

        for (pattern, actual) in self.segments.iter().zip(path) {
            match pattern {
                PathSegment::Literal(expected) => {
                    if expected.as_str() != *actual {
                        return None;
                    }
                }
                PathSegment::Param(name) => args.insert(name.as_str(), *actual),
                PathSegment::IntParam(name) => {
                    if !actual.bytes().all(|b| b.is_ascii_digit()) {
                        return None;
                    }
                    let value: i64 = actual.parse().ok()?;
                    args.insert(name.as_str(), value);
                }
            }
        }

        for (name, value) in self.defaults.iter() {
            args.insert_default(name, value.clone());
        }

        Some(args)
    }

    fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }
}

/// The outcome of resolving a request against a [`Router`].
#[derive(Debug)]
pub enum Resolution<'r, T> {
    /// A route matched both path and method.
    Matched {
        /// The registered target.
        target: &'r T,
        /// Arguments captured from the path, plus route defaults.
        args: RouteArgs,
    },

    /// The path matched, but none of its routes accepts the method.
    MethodNotAllowed {
        /// Methods the matching routes accept.
        allowed: Vec<Method>,
    },

    /// No route matched the path.
    NotFound,
}

/// Maps request paths and methods to registered targets.
#[derive(Debug, Clone)]
pub struct Router<T> {
    prefix: String,
    routes: Vec<Route<T>>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty router without a prefix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            routes: Vec::new(),
        }
    }

    /// Creates an empty router mounted under `prefix` (e.g. `/api/v1`).
    #[must_use]
    pub fn with_prefix(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: prefix.as_ref().trim_end_matches('/').to_string(),
            routes: Vec::new(),
        }
    }

    /// The url prefix, without a trailing slash.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Registers `target` for `pattern` under the given methods.
    ///
    /// `defaults` supplies arguments the pattern does not capture; captured
    /// values always win.
    pub fn add(
        &mut self,
        methods: &[Method],
        pattern: &str,
        defaults: RouteArgs,
        target: T,
    ) -> Result<(), RouteError> {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| PathSegment::parse(pattern, s))
            .collect::<Result<Vec<_>, _>>()?;

        check_unique_params(pattern, &segments)?;

        if methods.is_empty() {
            return Err(RouteError::NoMethods(pattern.to_string()));
        }

        tracing::debug!(pattern, methods = ?methods, "route registered");

        self.routes.push(Route {
            methods: methods.iter().cloned().collect(),
            segments,
            defaults,
            pattern: pattern.to_string(),
            target,
        });
        Ok(())
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Returns the registered patterns in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.pattern.as_str())
    }

    /// Resolves a request path and method.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_, T> {
        let Some(path) = self.strip_prefix(path) else {
            return Resolution::NotFound;
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut allowed = Vec::new();

        for route in &self.routes {
            let Some(args) = route.match_path(&segments) else {
                continue;
            };
            if route.allows(method) {
                return Resolution::Matched {
                    target: &route.target,
                    args,
                };
            }
            for m in &route.methods {
                if !allowed.contains(m) {
                    allowed.push(m.clone());
                }
            }
        }

        if allowed.is_empty() {
            Resolution::NotFound
        } else {
            Resolution::MethodNotAllowed { allowed }
        }
    }

    fn strip_prefix<'p>(&self, path: &'p str) -> Option<&'p str> {
        if self.prefix.is_empty() {
            return Some(path);
        }
        let rest = path.strip_prefix(self.prefix.as_str())?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }
}

fn check_unique_params(pattern: &str, segments: &[PathSegment]) -> Result<(), RouteError> {
    let mut seen: SmallVec<[&str; 4]> = SmallVec::new();
    for name in segments.iter().filter_map(PathSegment::name) {
        if seen.contains(&name) {
            return Err(RouteError::DuplicateParam {
                pattern: pattern.to_string(),
                name: name.to_string(),
            });
        }
        seen.push(name);
    }
    Ok(())
}
