//! # Talaria Negotiate
//!
//! Content negotiation: decides which representation a client receives and
//! which serializer produces it.
//!
//! - [`AcceptHeader`] parses the client's ranked preferences
//! - [`MimetypeMatcher`] picks the single best media type
//! - [`SerializerRegistry`] maps media types to [`Serializer`]s and binds the
//!   result of negotiation as a [`NegotiatedFormat`]
//! - [`serializers`] holds the JSON, JSONP and debug-HTML serializers
//! - [`TemplateRenderer`] renders the debug page
//!
//! # Example
//!
//! ```
//! use talaria_config::Config;
//! use talaria_negotiate::{AcceptHeader, NegotiationError, SerializerRegistry};
//!
//! let registry = SerializerRegistry::new();
//! let config = Config::with_defaults();
//!
//! let accept = AcceptHeader::parse("application/javascript;q=0.9, application/json");
//! let format = registry.negotiate(&accept, &config).unwrap();
//! assert_eq!(format.mimetype(), "application/json");
//!
//! let accept = AcceptHeader::parse("text/xml");
//! assert!(matches!(
//!     registry.negotiate(&accept, &config),
//!     Err(NegotiationError::NotAcceptable { .. })
//! ));
//! ```

#![doc(html_root_url = "https://docs.rs/talaria-negotiate/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod accept;
mod context;
mod matcher;
mod registry;
pub mod serializers;
mod template;

pub use accept::{AcceptEntry, AcceptHeader, Specificity};
pub use context::SerializeContext;
pub use matcher::MimetypeMatcher;
pub use registry::{
    MissingDefaultSerializer, NegotiatedFormat, NegotiationError, Serializer, SerializerRegistry,
};
pub use template::{html_escape, BuiltinTemplates, TemplateError, TemplateRenderer, APIDUMP_TEMPLATE};
