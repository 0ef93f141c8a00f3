//! Built-in serializers.
//!
//! Each serializer is a plain function matching the
//! [`Serializer`](crate::Serializer) signature.

mod debug;
mod json;
mod jsonp;

pub use debug::to_html;
pub use json::to_json;
pub use jsonp::{jsonp, to_javascript, DEFAULT_CALLBACK};
