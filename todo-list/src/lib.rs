//! A server-rendered to-do list.
//!
//! Items can be added, edited, crossed off, uncrossed and deleted through
//! plain HTML pages. The list lives in an in-memory [`TodoTable`] owned by a
//! [`Store`](crossoff_runtime::Store); views never touch the table directly
//! but send commands and wait for the outcome event.
//!
//! # Quick Start
//!
//! ```no_run
//! use todo_list::{router, AppState, Config, TodoEnvironment, TodoReducer, TodoState, TodoStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let store = Arc::new(TodoStore::new(
//!     TodoState::new(),
//!     TodoReducer::new(),
//!     TodoEnvironment::new(config.max_text_len),
//! ));
//!
//! let app = router(AppState::new(store, config.dispatch_timeout));
//! let listener = tokio::net::TcpListener::bind(config.bind_addr()?).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod reducer;
pub mod routes;
pub mod state;
pub mod table;
pub mod templates;
pub mod testing;
pub mod types;
pub mod views;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use routes::{router, Route, RouteName};
pub use state::{AppState, TodoStore};
pub use table::{TableError, TodoPatch, TodoTable};
pub use types::{TodoAction, TodoError, TodoId, TodoItem, TodoState};
