//! Application route configuration.

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    account_routes, auth_routes, matching_routes, messaging_routes, notification_routes,
    report_routes, triage_routes, tutorant_routes,
};
use super::middleware::{auth_middleware, require_verified};
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::{Config, DEFAULT_FRONTEND_URL};

/// Create the application router with all routes configured
pub fn create_router(state: AppState, config: &Config) -> Router {
    Router::new()
        // Health check endpoints
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public authentication routes, plus /me behind the auth check
        .nest(
            "/api/auth",
            auth_routes().merge(account_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            ))),
        )
        // Tutor profile routes (JWT + verified email)
        .nest(
            "/api/tutorant",
            tutorant_routes()
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    require_verified,
                ))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        // Matching, requests and messaging (JWT + verified email)
        .nest(
            "/api",
            matching_routes()
                .merge(messaging_routes())
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    require_verified,
                ))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        // Notification feed (JWT only, verification not required)
        .nest(
            "/api/notifications",
            notification_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Reporting for verified users, triage for moderators
        .nest(
            "/api/mod",
            report_routes()
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    require_verified,
                ))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                ))
                .merge(triage_routes().route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                ))),
        )
        // Global middleware
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS restricted to the frontend origin.
fn cors_layer(config: &Config) -> CorsLayer {
    let origin = config
        .frontend_url
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_FRONTEND_URL));

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Root endpoint
async fn root() -> &'static str {
    "Agora - tutorat entre élèves"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: ServiceStatus,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_status = match state.database.ping().await {
        Ok(_) => ServiceStatus {
            status: "healthy",
            error: None,
        },
        Err(e) => ServiceStatus {
            status: "unhealthy",
            error: Some(e.to_string()),
        },
    };

    let healthy = db_status.status == "healthy";

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        database: db_status,
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
