use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Url};
use rust_decimal::Decimal;
use serde::Deserialize;
use stock_api_core::bar::Bar;
use stock_api_core::history::History;
use stock_api_core::quote::Quote;
use stock_api_core::symbol::Symbol;
use tracing::debug;

use crate::coerce::{non_negative_price, volume_to_u64, warn_inconsistent};
use crate::error::UpstreamError;
use crate::http::{endpoint, parse_base_url, send_checked};
use crate::provider::MarketDataGateway;

const ALPACA_DATA_BASE_URL: &str = "https://data.alpaca.markets/v2";

/// Alpaca market data provider.
/// Authenticates via APCA-API-KEY-ID and APCA-API-SECRET-KEY headers.
pub struct AlpacaProvider {
    client: Client,
    api_key_id: String,
    api_secret_key: String,
    base_url: Url,
    timeout: Duration,
}

impl AlpacaProvider {
    /// Create from environment variables `ALPACA_KEY` and `ALPACA_SECRET`.
    /// `ALPACA_DATA_URL` optionally overrides the data API host.
    pub fn from_env(timeout: Duration) -> Result<Self, UpstreamError> {
        let api_key_id = non_empty_env("ALPACA_KEY")?;
        let api_secret_key = non_empty_env("ALPACA_SECRET")?;
        let base_url = std::env::var("ALPACA_DATA_URL")
            .ok()
            .filter(|v| !v.is_empty());

        Self::new(api_key_id, api_secret_key, base_url, timeout)
    }

    /// Create with explicit credentials and optional base URL override.
    pub fn new(
        api_key_id: String,
        api_secret_key: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let base_url = parse_base_url(base_url.as_deref().unwrap_or(ALPACA_DATA_BASE_URL))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key_id,
            api_secret_key,
            base_url,
            timeout,
        })
    }

    fn get(&self, segments: &[&str]) -> RequestBuilder {
        self.client
            .get(endpoint(&self.base_url, segments))
            .header("APCA-API-KEY-ID", &self.api_key_id)
            .header("APCA-API-SECRET-KEY", &self.api_secret_key)
    }
}

fn non_empty_env(key: &str) -> Result<String, UpstreamError> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(UpstreamError::Config(format!("{key} not set"))),
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, UpstreamError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| UpstreamError::Parse(format!("invalid timestamp '{raw}': {e}")))
}

#[derive(Debug, Deserialize)]
struct AlpacaLatestTradeResponse {
    trade: Option<AlpacaTrade>,
}

#[derive(Debug, Deserialize)]
struct AlpacaTrade {
    /// Timestamp in RFC3339 format
    t: String,
    /// Trade price
    p: Decimal,
}

impl AlpacaTrade {
    fn to_quote(&self, symbol: &Symbol) -> Result<Quote, UpstreamError> {
        Ok(Quote {
            symbol: symbol.clone(),
            price: non_negative_price(self.p)?,
            timestamp: parse_timestamp(&self.t)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AlpacaBarsResponse {
    bars: Option<Vec<AlpacaBar>>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlpacaBar {
    /// Timestamp in RFC3339 format
    t: String,
    /// Open price
    o: Decimal,
    /// High price
    h: Decimal,
    /// Low price
    l: Decimal,
    /// Close price
    c: Decimal,
    /// Volume, fractional for some asset classes
    v: f64,
}

impl AlpacaBar {
    fn to_bar(&self) -> Result<Bar, UpstreamError> {
        Ok(Bar {
            date: parse_timestamp(&self.t)?.date_naive(),
            open: self.o,
            high: self.h,
            low: self.l,
            close: self.c,
            volume: volume_to_u64(self.v)?,
        })
    }
}

#[async_trait]
impl MarketDataGateway for AlpacaProvider {
    fn name(&self) -> &str {
        "alpaca"
    }

    async fn fetch_latest_trade(&self, symbol: &Symbol) -> Result<Quote, UpstreamError> {
        debug!(%symbol, "fetching latest trade from Alpaca");

        let request = self
            .get(&["stocks", symbol.as_str(), "trades", "latest"])
            .query(&[("feed", "iex")]);
        let response = send_checked(request, self.timeout).await?;

        let body: AlpacaLatestTradeResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(format!("failed to parse response: {e}")))?;

        body.trade
            .ok_or_else(|| UpstreamError::Parse(format!("no trade in response for {symbol}")))?
            .to_quote(symbol)
    }

    async fn fetch_daily_bars(
        &self,
        symbol: &Symbol,
        window: chrono::Duration,
    ) -> Result<History, UpstreamError> {
        let end_time = Utc::now();
        let start = (end_time - window).to_rfc3339_opts(SecondsFormat::Secs, true);
        let end = end_time.to_rfc3339_opts(SecondsFormat::Secs, true);

        debug!(%symbol, %start, %end, "fetching daily bars from Alpaca");

        let mut all_bars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.get(&["stocks", symbol.as_str(), "bars"]).query(&[
                ("timeframe", "1Day"),
                ("start", &start),
                ("end", &end),
                ("adjustment", "split"),
                ("feed", "iex"),
                ("limit", "10000"),
            ]);

            if let Some(token) = &page_token {
                request = request.query(&[("page_token", token.as_str())]);
            }

            let response = send_checked(request, self.timeout).await?;

            let body: AlpacaBarsResponse = response
                .json()
                .await
                .map_err(|e| UpstreamError::Parse(format!("failed to parse response: {e}")))?;

            if let Some(bars) = body.bars {
                for bar in &bars {
                    all_bars.push(bar.to_bar()?);
                }
            }

            match body.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        warn_inconsistent(self.name(), symbol.as_str(), &all_bars);
        Ok(History::from_bars(all_bars))
    }
}
