//! # Talaria Middleware
//!
//! Request dispatch for the Talaria framework.
//!
//! The [`Dispatcher`] wraps every endpoint invocation in a fixed sequence of
//! stages. Only the hooks inside the stages are user-supplied; the order of
//! the stages themselves never changes.
//!
//! ## Stages
//!
//! ```text
//! Accept → Negotiate → Preprocessors → Handler → Postprocessors → Serialize → Finalizers → Response
//!              ↓             ↓            ↓             ↓              ↓            ↓
//!              └─────────────┴────────────┴─────── ErrorHandling ──────┴────────────┘
//! ```
//!
//! | Stage | Input | Purpose |
//! |-------|-------|---------|
//! | `negotiating` | `Accept` header | Bind a media type and its serializer |
//! | `preprocessing` | handler | Wrap, replace or reject the handler |
//! | `invoking` | invocation | Run the handler |
//! | `postprocessing` | reply | Transform the return value |
//! | `responding` | reply | Serialize into a response |
//! | `finalizing` | response | Adjust the final response |
//!
//! Errors and panics from any stage are caught by the dispatcher, logged by
//! the [`ExceptionLogger`], and answered with an `{error, message}` body in
//! the negotiated format.
//!
//! ## Example
//!
//! ```
//! use talaria_middleware::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages.len(), 6);
//! assert_eq!(stages[0].name(), "negotiating");
//! assert_eq!(stages[5].name(), "finalizing");
//! ```

#![doc(html_root_url = "https://docs.rs/talaria-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatcher;
mod error;
pub mod hooks;
pub mod logging;
pub mod types;

// Re-export main types at crate root
pub use dispatcher::{Dispatcher, Stage};
pub use error::{DispatchError, DispatchResult};
pub use hooks::{apply_all, Finalizers, Hook, HookChain, Postprocessors, Preprocessors};
pub use logging::{ExceptionLogger, DISPATCH_TARGET};
pub use types::{handler_fn, BoxFuture, BoxedHandler, Request, Response, ResponseExt};
