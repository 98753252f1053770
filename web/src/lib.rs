//! Axum shell for crossoff stores.
//!
//! Handlers are the imperative shell around a reducer-driven [`Store`]:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← forms, paths, HTML
//! │  - Request parsing                      │  ← correlation ids, tracing
//! │  - Redirects and rendered pages         │
//! ├─────────────────────────────────────────┤
//! │         Functional Core                 │
//! │  - Reducers validate and decide         │
//! │  - State lives behind the Store         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. Extract path params, form fields and the [`CorrelationId`] (for logs only)
//! 2. Build a command under a fresh server-side id
//! 3. `Store::send_and_wait_for` the outcome event with the same id
//! 4. Map the outcome to a [`Found`] redirect, a [`Page`] or an [`AppError`]
//!
//! [`Store`]: crossoff_runtime::Store

#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;

pub use error::AppError;
pub use extractors::CorrelationId;
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};
pub use response::{escape, Found, Page, TemplateName};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
