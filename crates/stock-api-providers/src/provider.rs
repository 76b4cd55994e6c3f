use async_trait::async_trait;
use chrono::Duration;
use stock_api_core::history::History;
use stock_api_core::quote::Quote;
use stock_api_core::symbol::Symbol;

use crate::error::UpstreamError;

/// Lookback used for daily history when none is configured.
pub const DEFAULT_HISTORY_WINDOW_DAYS: i64 = 30;

/// A market data vendor, reduced to the two reads the API needs.
///
/// Each call is a single outbound attempt with no retry. Implementations hold
/// no per-request state and are shared across concurrent requests.
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Provider name (for logging/display).
    fn name(&self) -> &str;

    /// Fetch the most recent trade for a symbol.
    async fn fetch_latest_trade(&self, symbol: &Symbol) -> Result<Quote, UpstreamError>;

    /// Fetch daily bars covering the trailing `window` up to now.
    /// Returns bars sorted ascending by date.
    /// Returns an empty history if the vendor has no bars in the window.
    async fn fetch_daily_bars(
        &self,
        symbol: &Symbol,
        window: Duration,
    ) -> Result<History, UpstreamError>;
}
