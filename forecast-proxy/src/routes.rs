use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderValue, Method, StatusCode, Uri, header},
    routing::get,
};
use forecast_core::{ForecastQuery, ForecastService, NormalizedForecast};
use serde_json::{Value, json};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::warn;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<ForecastService>,
}

impl AppState {
    pub fn new(service: ForecastService) -> Self {
        Self { service: Arc::new(service) }
    }
}

/// Build the router. Every response carries the CORS and JSON content-type headers.
pub fn create_router(state: AppState, allowed_origin: HeaderValue) -> Router {
    Router::new()
        .route(
            "/forecast",
            get(forecast).post(forecast).options(preflight).fallback(method_not_allowed),
        )
        .route("/health", get(health).fallback(method_not_allowed))
        .fallback(not_found)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            allowed_origin,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(TraceLayer::new_for_http())
}

async fn forecast(
    State(state): State<AppState>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> Result<Json<NormalizedForecast>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected forecast query string");
        ApiError::from(rejection)
    })?;

    state.service.forecast(&query).await.map(Json).map_err(|e| {
        warn!(error = %e, "forecast request failed");
        ApiError::from(e)
    })
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed(format!("Method {method} is not allowed on {}", uri.path()))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
