//! Error types for web handlers.
//!
//! [`AppError`] bridges store and domain failures to HTTP. It renders a small
//! HTML error page, since every client of this shell is a browser.

use crate::response::escape;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use crossoff_runtime::StoreError;
use std::fmt;

/// Application error type for web handlers.
///
/// Carries the HTTP status, a user-facing message, a stable error code and
/// an optional internal source that is logged but never rendered.
///
/// # Examples
///
/// ```ignore
/// async fn handler(Path(id): Path<TodoId>) -> Result<Page, AppError> {
///     let item = lookup(id).await.ok_or_else(|| AppError::not_found("Item", id))?;
///     Ok(render(item))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    code: &'static str,
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Attach an internal error (logged, not shown to the client).
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND",
        )
    }

    /// Create a 408 Request Timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::REQUEST_TIMEOUT, message, "TIMEOUT")
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message,
            "SERVICE_UNAVAILABLE",
        )
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    fn render(&self) -> String {
        let reason = self.status.canonical_reason().unwrap_or("Error");
        format!(
            "<!DOCTYPE html>\n<html>\n<head><title>{status} {reason}</title></head>\n\
             <body>\n<h1>{status} {reason}</h1>\n<p class=\"error\">{message}</p>\n\
             <p><a href=\"/\">Back to the list</a></p>\n</body>\n</html>\n",
            status = self.status.as_u16(),
            message = escape(&self.message),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Internal server error"
                ),
            }
        } else {
            tracing::debug!(status = %self.status, code = self.code, "Request rejected");
        }

        (self.status, Html(self.render())).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ShutdownInProgress => Self::unavailable("The server is shutting down"),
            StoreError::Timeout => Self::timeout("The request was not processed in time"),
            StoreError::ShutdownTimeout(_) | StoreError::ChannelClosed => {
                Self::internal("An internal error occurred").with_source(err.into())
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_not_found() {
        let err = AppError::not_found("Item", 7);
        assert_eq!(err.to_string(), "[NOT_FOUND] Item with id 7 not found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_errors_map_to_statuses() {
        assert_eq!(
            AppError::from(StoreError::ShutdownInProgress).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(StoreError::Timeout).status(),
            StatusCode::REQUEST_TIMEOUT
        );

        let err = AppError::from(StoreError::ChannelClosed);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_renders_escaped_html_page() {
        crossoff_testing::init_test_tracing();

        let response = AppError::bad_request("<script>").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<h1>400 Bad Request</h1>"));
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }
}
