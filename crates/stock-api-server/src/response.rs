//! JSON bodies returned by the HTTP API.

use chrono::SecondsFormat;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use stock_api_core::bar::Bar;
use stock_api_core::quote::Quote;

use crate::error::ApiError;

/// Body of `GET /api/stock/{symbol}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResponse {
    pub symbol: String,
    pub price: f64,
    pub timestamp: String,
}

/// One element of `GET /api/stock/{symbol}/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarResponse {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub provider: String,
    pub version: String,
}

fn to_f64(value: Decimal, field: &str) -> Result<f64, ApiError> {
    value
        .to_f64()
        .ok_or_else(|| ApiError::Coercion(format!("{field} {value} is not representable as f64")))
}

impl TryFrom<Quote> for PriceResponse {
    type Error = ApiError;

    fn try_from(quote: Quote) -> Result<Self, Self::Error> {
        Ok(Self {
            price: to_f64(quote.price, "price")?,
            timestamp: quote.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            symbol: quote.symbol.into(),
        })
    }
}

impl TryFrom<Bar> for BarResponse {
    type Error = ApiError;

    fn try_from(bar: Bar) -> Result<Self, Self::Error> {
        Ok(Self {
            date: bar.date.to_string(),
            open: to_f64(bar.open, "open")?,
            high: to_f64(bar.high, "high")?,
            low: to_f64(bar.low, "low")?,
            close: to_f64(bar.close, "close")?,
            volume: bar.volume,
        })
    }
}
