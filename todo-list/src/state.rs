//! Shared state for the to-do handlers.

use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{TodoAction, TodoState};
use axum::extract::FromRef;
use crossoff_runtime::Store;
use std::sync::Arc;
use std::time::Duration;

/// The store driving the to-do list.
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; the store itself sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The to-do store
    pub store: Arc<TodoStore>,
    /// How long a view waits for the outcome of its command
    pub dispatch_timeout: Duration,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(store: Arc<TodoStore>, dispatch_timeout: Duration) -> Self {
        Self {
            store,
            dispatch_timeout,
        }
    }
}

// Lets the generic readiness handler extract the store from `AppState`
impl FromRef<AppState> for Arc<TodoStore> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.store)
    }
}
