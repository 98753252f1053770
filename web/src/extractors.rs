//! Custom Axum extractors.
//!
//! # Examples
//!
//! ```ignore
//! use crossoff_web::CorrelationId;
//!
//! async fn handler(correlation_id: CorrelationId) -> Result<Found, AppError> {
//!     tracing::info!(correlation_id = %correlation_id, "Deleting item");
//!     // ...
//! }
//! ```

use crate::middleware::CORRELATION_ID_HEADER;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::fmt;
use uuid::Uuid;

/// Correlation ID for a request.
///
/// Resolved in order from:
///
/// 1. the value stored by [`correlation_id_layer`](crate::correlation_id_layer)
/// 2. a valid UUID in the `X-Correlation-ID` header
/// 3. a fresh UUID v4
///
/// Clients choose it, so it labels logs and the response header but never
/// identifies a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    /// A fresh random correlation ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .map_or_else(Self::new, Self);

        Ok(correlation_id)
    }
}
