use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use stock_api_core::error::MarketDataError;
use stock_api_providers::error::UpstreamError;
use thiserror::Error;

use crate::response::ErrorResponse;

/// Failure while serving a request.
///
/// Every variant is reported to the caller the same way: a 500 carrying the
/// error text verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Core(#[from] MarketDataError),

    #[error("Coercion error: {0}")]
    Coercion(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
