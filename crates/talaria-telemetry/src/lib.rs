//! Logging setup for Talaria services.
//!
//! Talaria itself only emits `tracing` events; this crate installs the
//! subscriber that writes them out.
//!
//! | Config | Output | Default filter |
//! |--------|--------|----------------|
//! | [`LogConfig::production`] | JSON lines | `info` |
//! | [`LogConfig::development`] | pretty, with span events and file/line | `debug` |
//!
//! `RUST_LOG` overrides the configured filter unless `respect_env` is off.
//! Exceptions caught by the dispatcher are logged under the
//! [`fields::DISPATCH_TARGET`] target, so `talaria::dispatch=info` alone is
//! enough to see every failed request.

#![doc(html_root_url = "https://docs.rs/talaria-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
