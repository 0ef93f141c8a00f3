//! Dispatcher errors.

use talaria_core::ApiError;
use talaria_negotiate::MissingDefaultSerializer;
use thiserror::Error;

/// Anything that can end a dispatch early.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A taxonomy error raised by negotiation, a hook or the handler.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The configured default mimetype has no serializer.
    ///
    /// Only reachable through a deployment misconfiguration.
    #[error(transparent)]
    MissingDefaultSerializer(#[from] MissingDefaultSerializer),
}

/// Result type for dispatcher internals.
pub type DispatchResult<T> = Result<T, DispatchError>;
