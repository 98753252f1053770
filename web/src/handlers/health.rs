//! Health check endpoints.
//!
//! Used by load balancers and process supervisors to probe the service.

use axum::{extract::State, http::StatusCode, Json};
use crossoff_core::reducer::Reducer;
use crossoff_runtime::{HealthCheck, HealthStatus, Store};
use std::sync::Arc;

/// Liveness probe.
///
/// ```text
/// GET /health  →  200 "ok"
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness probe backed by [`Store::health`].
///
/// - 200 OK: healthy or degraded
/// - 503 Service Unavailable: unhealthy (the store is shutting down)
///
/// ```text
/// GET /health/ready
///
/// {
///   "component": "store",
///   "status": "Healthy",
///   "message": null,
///   "metadata": [["pending_effects", "0"], ["observers", "0"]]
/// }
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check_with_store<S, A, E, R>(
    State(store): State<Arc<Store<S, A, E, R>>>,
) -> (StatusCode, Json<HealthCheck>)
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    S: Send + Sync + 'static,
    A: Send + Sync + Clone + 'static,
    E: Send + Sync + 'static,
{
    let health = store.health();

    let status = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(health))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossoff_core::{effect::Effect, SmallVec};
    use std::time::Duration;

    #[derive(Clone)]
    struct IdleReducer;

    impl Reducer for IdleReducer {
        type State = ();
        type Action = ();
        type Environment = ();

        fn reduce(&self, _state: &mut (), _action: (), _env: &()) -> SmallVec<[Effect<()>; 4]> {
            SmallVec::new()
        }
    }

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_ready_with_healthy_store() {
        let store = Arc::new(Store::new((), IdleReducer, ()));

        let (status, Json(health)) = health_check_with_store(State(store)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(health.status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_not_ready_while_shutting_down() {
        let store = Arc::new(Store::new((), IdleReducer, ()));
        store.shutdown(Duration::from_millis(50)).await.unwrap();

        let (status, Json(health)) = health_check_with_store(State(store)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(health.status.is_unhealthy());
    }
}
