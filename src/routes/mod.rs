//! Route definitions for the apigov API.

pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod traffic;

use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid FRONTEND_URL, allowing any origin");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    let traffic_routes = Router::new()
        .route("/traffic/parse", post(traffic::parse))
        .route("/traffic/analyze", post(traffic::analyze))
        .route("/traffic/sessions", get(traffic::list_sessions))
        .route(
            "/traffic/sessions/{id}",
            get(traffic::get_session).delete(traffic::delete_session),
        )
        .route("/traffic/sessions/{id}/fields", get(traffic::list_fields))
        .route(
            "/traffic/sessions/{id}/fields/{field_id}/annotation",
            put(traffic::annotate),
        )
        .route("/traffic/sessions/{id}/export", get(traffic::export));

    let catalog_routes = Router::new()
        .route("/entities", get(catalog::list_entities))
        .route("/entities/{id}", get(catalog::get_entity))
        .route("/risks", get(catalog::list_risks))
        .route("/risks/{id}", get(catalog::get_risk))
        .route("/risks/{id}/entities", get(catalog::risk_entities))
        .route("/governance-groups", get(catalog::list_governance_groups))
        .route(
            "/governance-groups/{id}",
            get(catalog::get_governance_group),
        );

    let dashboard_routes = Router::new().route("/dashboard/stats", get(dashboard::stats));

    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", traffic_routes)
        .nest("/api/v1", catalog_routes)
        .nest("/api/v1", dashboard_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(cors),
        )
        .with_state(state)
}
