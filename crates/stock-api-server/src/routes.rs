//! HTTP surface: routing, CORS, and the thin handlers over `StockService`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::response::{BarResponse, HealthResponse, PriceResponse};
use crate::service::StockService;

/// Origin of the development front end.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// CORS policy letting the listed browser origins read responses with credentials.
///
/// Methods and headers are mirrored from the preflight request, since a
/// wildcard is not allowed together with credentials.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
    let origins = origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Create the HTTP router with all endpoints.
pub fn create_router(service: Arc<StockService>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/stock/{symbol}", get(get_stock_price))
        .route("/api/stock/{symbol}/history", get(get_stock_history))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}

async fn health_check(State(service): State<Arc<StockService>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        provider: service.provider_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn get_stock_price(
    State(service): State<Arc<StockService>>,
    Path(symbol): Path<String>,
) -> Result<Json<PriceResponse>, ApiError> {
    service.get_price(&symbol).await.map(Json)
}

async fn get_stock_history(
    State(service): State<Arc<StockService>>,
    Path(symbol): Path<String>,
) -> Result<Json<Vec<BarResponse>>, ApiError> {
    service.get_history(&symbol).await.map(Json)
}
