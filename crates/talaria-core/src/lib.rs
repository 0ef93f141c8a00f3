//! # Talaria Core
//!
//! Core types shared by every Talaria crate.
//!
//! - [`ApiError`] / [`ErrorKind`] - the error taxonomy raised by handlers and hooks
//! - [`Reply`] - everything a handler may return, and [`unpack_response`]
//! - [`Invocation`] - the request data handed to a handler
//! - [`RouteArgs`] - arguments matched (or defaulted) by the routing layer
//! - [`Request`] / [`Response`] - the transport types
//! - [`status`] - helpers for HTTP status codes

#![doc(html_root_url = "https://docs.rs/talaria-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod args;
mod error;
mod invocation;
mod reply;
pub mod status;
mod types;

pub use args::RouteArgs;
pub use error::{ApiError, ApiResult, ErrorKind, ErrorPayload};
pub use invocation::{query_param, Invocation, InvocationBuilder};
pub use reply::{unpack_response, Reply};
pub use types::{empty_body, full_body, Request, Response};
