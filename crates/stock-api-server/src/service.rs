use std::sync::Arc;

use chrono::Duration;
use stock_api_core::symbol::Symbol;
use stock_api_providers::provider::MarketDataGateway;
use tracing::error;

use crate::error::ApiError;
use crate::response::{BarResponse, PriceResponse};

/// Serves price and history lookups on top of a market data gateway.
///
/// Holds no per-request state; one instance is shared by every request.
pub struct StockService {
    gateway: Arc<dyn MarketDataGateway>,
    history_window: Duration,
}

impl StockService {
    pub fn new(gateway: Arc<dyn MarketDataGateway>, history_window: Duration) -> Self {
        Self {
            gateway,
            history_window,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.gateway.name()
    }

    /// Latest trade price for `symbol`.
    pub async fn get_price(&self, symbol: &str) -> Result<PriceResponse, ApiError> {
        self.fetch_price(symbol).await.inspect_err(|e| {
            error!(symbol, provider = self.provider_name(), error = %e, "price lookup failed");
        })
    }

    /// Daily bars for `symbol` over the configured window, oldest first.
    pub async fn get_history(&self, symbol: &str) -> Result<Vec<BarResponse>, ApiError> {
        self.fetch_history(symbol).await.inspect_err(|e| {
            error!(symbol, provider = self.provider_name(), error = %e, "history lookup failed");
        })
    }

    async fn fetch_price(&self, symbol: &str) -> Result<PriceResponse, ApiError> {
        let symbol = Symbol::new(symbol)?;
        let quote = self.gateway.fetch_latest_trade(&symbol).await?;
        PriceResponse::try_from(quote)
    }

    async fn fetch_history(&self, symbol: &str) -> Result<Vec<BarResponse>, ApiError> {
        let symbol = Symbol::new(symbol)?;
        let history = self
            .gateway
            .fetch_daily_bars(&symbol, self.history_window)
            .await?;
        history.into_iter().map(BarResponse::try_from).collect()
    }
}
