//! Configuration for Talaria.
//!
//! The extension reads its settings from a flat key/value store shared with
//! the host application. Its own keys are namespaced under `TALARIA_`:
//!
//! | Key | Default | Purpose |
//! |---|---|---|
//! | `TALARIA_DEFAULT_MIMETYPE` | `application/json` | served when the client accepts anything |
//! | `TALARIA_APIDUMP_TEMPLATE` | `apidump.html` | template for the `text/html` debug view |
//! | `TALARIA_JSONP_CALLBACK` | `callback` | query parameter naming the JSONP callback |
//!
//! Values are read on every request, never cached.
//!
//! # Example
//!
//! ```no_run
//! use talaria_config::ConfigLoader;
//!
//! # fn main() -> Result<(), talaria_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("talaria.toml")?
//!     .with_env()
//!     .load();
//!
//! println!("default mimetype: {:?}", config.default_mimetype());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;

pub use config::{config_key, keys, strip_prefix, Config, DEFAULTS, PREFIX};
pub use error::ConfigError;
pub use loader::ConfigLoader;
