//! The JSON serializer.

use crate::context::SerializeContext;
use bytes::Bytes;
use serde_json::Value;
use talaria_core::{ApiError, ApiResult};

/// Dumps the payload as compact JSON.
pub fn to_json(payload: &Value, _ctx: &SerializeContext<'_>) -> ApiResult<Bytes> {
    serde_json::to_vec(payload)
        .map(Bytes::from)
        .map_err(ApiError::internal)
}
