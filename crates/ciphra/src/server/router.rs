//! Axum router construction.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/catalog", get(handlers::catalog))
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/:id", axum::routing::delete(handlers::delete_session))
        .route(
            "/sessions/:id/suite",
            get(handlers::get_suite).delete(handlers::reset_suite),
        )
        .route("/sessions/:id/export", get(handlers::export_suite))
        .route("/sessions/:id/suite/:category", put(handlers::select_component))
        .route(
            "/sessions/:id/key",
            post(handlers::generate_key)
                .get(handlers::export_key)
                .put(handlers::import_key),
        )
        .route("/sessions/:id/encrypt", post(handlers::encrypt))
        .route("/sessions/:id/decrypt", post(handlers::decrypt))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = build(AppState::default());
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn health_route_exists() {
        let app = build(AppState::default());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn unknown_session_returns_404() {
        let app = build(AppState::default());
        let req = Request::builder()
            .uri(format!("/sessions/{}/suite", uuid::Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn create_session_returns_201() {
        let app = build(AppState::default());
        let req = Request::builder()
            .method("POST")
            .uri("/sessions")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 201);
    }
}
