//! # Talaria
//!
//! **Content-negotiating REST apis over `http` types**
//!
//! Talaria lets a handler return a plain JSON value and leaves the rest to
//! the framework:
//!
//! - **Content negotiation**: the client's `Accept` header picks the
//!   serializer (JSON, JSONP, a debug HTML page, or your own)
//! - **Hook chains**: preprocessors wrap the handler, postprocessors
//!   transform its return value, finalizers adjust the response
//! - **Uniform errors**: every error, fault and panic becomes an
//!   `{error, message}` body in the negotiated format, logged once
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use talaria::prelude::*;
//!
//! let mut api = Api::new();
//!
//! let mut defaults = RouteArgs::new();
//! defaults.insert("value", 200);
//!
//! let ping = handler_fn(|inv: Invocation| async move {
//!     ApiResult::Ok(json!({"value": inv.args().get_i64("value")}))
//! });
//! api.route_with_defaults("/ping", &[Method::GET], defaults, ping.clone())
//!     .unwrap()
//!     .route("/ping/{value:int}", &[Method::GET], ping)
//!     .unwrap();
//!
//! api.postprocessor(|mut reply| {
//!     if let Some(Value::Object(map)) = reply.payload_mut() {
//!         map.insert("something".into(), json!(42));
//!     }
//!     Ok(reply)
//! });
//!
//! let service = api.into_service();
//! ```
//!
//! ## Request lifecycle
//!
//! ```text
//! Request → Router → Negotiate → Preprocessors → Handler → Postprocessors
//!                                                               ↓
//!                          Response ← Finalizers ← Serialize ←──┘
//! ```

#![doc(html_root_url = "https://docs.rs/talaria/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod error;
pub mod router;

pub use api::{Api, ApiBuilder, ApiService, DEFAULT_BLUEPRINT_NAME};
pub use error::RouteError;

// Re-export member crates
pub use talaria_config as config;
pub use talaria_core as core;
pub use talaria_middleware as middleware;
pub use talaria_negotiate as negotiate;
pub use talaria_telemetry as telemetry;

pub use talaria_core::{ApiError, ApiResult, ErrorKind, Invocation, Reply, RouteArgs};

/// Prelude module for convenient imports.
///
/// ```rust
/// use talaria::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Api, ApiService, RouteError};

    pub use talaria_config::{Config, ConfigLoader};
    pub use talaria_core::{ApiError, ApiResult, ErrorKind, Invocation, Reply, RouteArgs};
    pub use talaria_middleware::{handler_fn, BoxedHandler, Request, Response};
    pub use talaria_negotiate::SerializeContext;

    pub use http::{Method, StatusCode};
    pub use serde_json::Value;
}
