//! Test fixture: an isolated store and router per test.
//!
//! ```ignore
//! let app = TestApp::new();
//! let id = app.seed("Test Todo", false).await;
//!
//! let response = app.get(&Route::CrossOff(id).path()).await;
//! assert_eq!(response.status, StatusCode::FOUND);
//! assert!(app.item(id).await.unwrap().completed);
//! ```

#![allow(clippy::expect_used, clippy::missing_panics_doc)] // Test harness

use crate::config::Config;
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::routes::router;
use crate::state::{AppState, TodoStore};
use crate::types::{TodoAction, TodoId, TodoItem, TodoState};
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use crossoff_web::TemplateName;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

/// A fresh application: empty table, its own store, its own router.
pub struct TestApp {
    /// The store behind the router
    pub store: Arc<TodoStore>,
    router: Router,
}

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Template that rendered the body, if any
    pub template: Option<&'static str>,
    /// Body as text
    pub body: String,
}

impl TestResponse {
    /// Target of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Application with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Application with a custom configuration.
    #[must_use]
    pub fn with_config(config: &Config) -> Self {
        let store = Arc::new(TodoStore::new(
            TodoState::new(),
            TodoReducer::new(),
            TodoEnvironment::new(config.max_text_len),
        ));
        let router = router(AppState::new(Arc::clone(&store), config.dispatch_timeout));

        Self { store, router }
    }

    /// Insert an item directly through the store and return its id.
    pub async fn seed(&self, text: &str, completed: bool) -> TodoId {
        let command_id = Uuid::new_v4();

        // Events are applied synchronously by `send`
        self.store
            .send(TodoAction::ItemAdded {
                command_id,
                text: text.to_string(),
            })
            .await
            .expect("store accepts events");

        let id = self
            .store
            .state(|s| s.items.list().last().map(|item| item.id))
            .await
            .expect("seeded item exists");

        if completed {
            self.store
                .send(TodoAction::ItemCrossedOff { command_id, id })
                .await
                .expect("store accepts events");
        }

        id
    }

    /// Current row for `id`, if any.
    pub async fn item(&self, id: TodoId) -> Option<TodoItem> {
        self.store.state(|s| s.items.get(id).ok().cloned()).await
    }

    /// Every current row.
    pub async fn items(&self) -> Vec<TodoItem> {
        self.store
            .state(|s| s.items.list().cloned().collect())
            .await
    }

    /// Issue `GET path`.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("valid request");
        self.request(request).await
    }

    /// Issue `POST path` with an urlencoded form body.
    pub async fn post_form(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.request(request).await
    }

    /// Send an arbitrary request through the router.
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let template = response.extensions().get::<TemplateName>().map(|t| t.0);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");

        TestResponse {
            status,
            headers,
            template,
            body: String::from_utf8(bytes.to_vec()).expect("body is UTF-8"),
        }
    }
}
