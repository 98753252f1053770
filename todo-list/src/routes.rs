//! Route table for the to-do list.
//!
//! [`RouteName`] ties each page to its path pattern and handlers; [`Route`]
//! is a concrete, addressable instance of one and builds its path, so links
//! and redirects never spell out URLs by hand.
//!
//! # Routes
//!
//! - `GET  /` - list page; `POST /` adds an item
//! - `GET  /delete/:id` - delete an item
//! - `GET  /cross_off/:id` - mark an item done
//! - `GET  /uncross/:id` - mark an item pending
//! - `GET  /edit/:id` - edit form; `POST /edit/:id` saves it
//! - `GET  /health`, `GET /health/ready` - liveness and readiness

use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::state::AppState;
use crate::types::{TodoAction, TodoId, TodoState};
use crate::views;
use axum::{
    routing::{get, MethodRouter},
    Router,
};
use crossoff_web::{correlation_id_layer, handlers::health};
use std::fmt;
use tower_http::trace::TraceLayer;

/// Named routes of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    /// Item list (and add form)
    Home,
    /// Delete an item
    Delete,
    /// Mark an item done
    CrossOff,
    /// Mark an item pending
    Uncross,
    /// Edit an item
    Edit,
}

impl RouteName {
    /// Every named route, in registration order.
    pub const ALL: [Self; 5] = [
        Self::Home,
        Self::Delete,
        Self::CrossOff,
        Self::Uncross,
        Self::Edit,
    ];

    /// Route name as used in templates and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Delete => "delete",
            Self::CrossOff => "cross_off",
            Self::Uncross => "uncross",
            Self::Edit => "edit",
        }
    }

    /// Path pattern in axum syntax.
    #[must_use]
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Delete => "/delete/:id",
            Self::CrossOff => "/cross_off/:id",
            Self::Uncross => "/uncross/:id",
            Self::Edit => "/edit/:id",
        }
    }

    fn handlers(self) -> MethodRouter<AppState> {
        match self {
            Self::Home => get(views::home).post(views::add),
            Self::Delete => get(views::delete),
            Self::CrossOff => get(views::cross_off),
            Self::Uncross => get(views::uncross),
            Self::Edit => get(views::edit_form).post(views::edit),
        }
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete route, with its parameters filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Home,
    /// `/delete/:id`
    Delete(TodoId),
    /// `/cross_off/:id`
    CrossOff(TodoId),
    /// `/uncross/:id`
    Uncross(TodoId),
    /// `/edit/:id`
    Edit(TodoId),
}

impl Route {
    /// Which named route this is.
    #[must_use]
    pub const fn name(self) -> RouteName {
        match self {
            Self::Home => RouteName::Home,
            Self::Delete(_) => RouteName::Delete,
            Self::CrossOff(_) => RouteName::CrossOff,
            Self::Uncross(_) => RouteName::Uncross,
            Self::Edit(_) => RouteName::Edit,
        }
    }

    /// Item this route points at, if any.
    #[must_use]
    pub const fn id(self) -> Option<TodoId> {
        match self {
            Self::Home => None,
            Self::Delete(id) | Self::CrossOff(id) | Self::Uncross(id) | Self::Edit(id) => Some(id),
        }
    }

    /// The path for this route.
    #[must_use]
    pub fn path(self) -> String {
        let pattern = self.name().pattern();
        match self.id() {
            Some(id) => pattern.replace(":id", &id.to_string()),
            None => pattern.to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Build the application router.
///
/// Every request gets a correlation id and an HTTP trace span.
pub fn router(state: AppState) -> Router {
    let pages = RouteName::ALL
        .into_iter()
        .fold(Router::new(), |router, name| {
            router.route(name.pattern(), name.handlers())
        });

    pages
        .route("/health", get(health::health_check))
        .route(
            "/health/ready",
            get(health::health_check_with_store::<TodoState, TodoAction, TodoEnvironment, TodoReducer>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_fill_in_the_id() {
        let id = TodoId::new(3);

        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::Delete(id).path(), "/delete/3");
        assert_eq!(Route::CrossOff(id).path(), "/cross_off/3");
        assert_eq!(Route::Uncross(id).path(), "/uncross/3");
        assert_eq!(Route::Edit(id).to_string(), "/edit/3");
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = RouteName::ALL.iter().map(|r| r.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RouteName::ALL.len());
    }

    #[test]
    fn every_route_round_trips_to_its_name() {
        let id = TodoId::new(1);
        for route in [
            Route::Home,
            Route::Delete(id),
            Route::CrossOff(id),
            Route::Uncross(id),
            Route::Edit(id),
        ] {
            assert!(route.path().starts_with(route.name().pattern().trim_end_matches(":id")));
        }
    }
}
