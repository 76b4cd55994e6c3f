use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use stock_api_core::bar::Bar;
use stock_api_core::history::History;
use stock_api_core::quote::Quote;
use stock_api_core::symbol::Symbol;
use tracing::debug;

use crate::coerce::{f64_to_decimal, non_negative_price, volume_to_u64, warn_inconsistent};
use crate::error::UpstreamError;
use crate::http::{endpoint, parse_base_url, send_checked};
use crate::provider::MarketDataGateway;

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance market data provider.
/// No authentication required.
pub struct YahooProvider {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl YahooProvider {
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        Self::with_base_url(YAHOO_CHART_URL.to_string(), timeout)
    }

    /// Create with a custom base URL (for testing).
    pub fn with_base_url(base_url: String, timeout: Duration) -> Result<Self, UpstreamError> {
        let base_url = parse_base_url(&base_url)?;
        let client = Client::builder()
            .user_agent("Mozilla/5.0")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    async fn chart(
        &self,
        symbol: &Symbol,
        query: &[(&str, String)],
    ) -> Result<Option<YahooResult>, UpstreamError> {
        let request = self
            .client
            .get(endpoint(&self.base_url, &[symbol.as_str()]))
            .query(query);
        let response = send_checked(request, self.timeout).await?;

        let body: YahooResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(format!("failed to parse response: {e}")))?;

        if let Some(error) = body.chart.error {
            return Err(UpstreamError::Api {
                status: 0,
                message: format!("{}: {}", error.code, error.description),
            });
        }

        Ok(body.chart.result.and_then(|r| r.into_iter().next()))
    }
}

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: Option<YahooMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<YahooIndicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    regular_market_price: Option<f64>,
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, UpstreamError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| UpstreamError::Parse(format!("invalid unix timestamp: {ts}")))
}

fn parse_yahoo_quote(symbol: &Symbol, result: &YahooResult) -> Result<Quote, UpstreamError> {
    let meta = result
        .meta
        .as_ref()
        .ok_or_else(|| UpstreamError::Parse("missing meta".into()))?;
    let price = meta
        .regular_market_price
        .ok_or_else(|| UpstreamError::Parse("missing regularMarketPrice".into()))?;
    let time = meta
        .regular_market_time
        .ok_or_else(|| UpstreamError::Parse("missing regularMarketTime".into()))?;

    Ok(Quote {
        symbol: symbol.clone(),
        price: non_negative_price(f64_to_decimal(price)?)?,
        timestamp: unix_to_utc(time)?,
    })
}

/// Rows with any missing price are skipped; a missing volume counts as zero.
fn parse_yahoo_bars(result: &YahooResult) -> Result<Vec<Bar>, UpstreamError> {
    let (Some(timestamps), Some(indicators)) = (&result.timestamp, &result.indicators) else {
        return Ok(Vec::new());
    };

    let Some(quote) = indicators.quote.first() else {
        return Ok(Vec::new());
    };

    let mut bars = Vec::new();

    for (i, &ts) in timestamps.iter().enumerate() {
        let field = |values: &[Option<f64>]| values.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) else {
            continue;
        };

        bars.push(Bar {
            date: unix_to_utc(ts)?.date_naive(),
            open: f64_to_decimal(open)?,
            high: f64_to_decimal(high)?,
            low: f64_to_decimal(low)?,
            close: f64_to_decimal(close)?,
            volume: volume_to_u64(field(&quote.volume).unwrap_or(0.0))?,
        });
    }

    Ok(bars)
}

#[async_trait]
impl MarketDataGateway for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_latest_trade(&self, symbol: &Symbol) -> Result<Quote, UpstreamError> {
        debug!(%symbol, "fetching latest price from Yahoo");

        let result = self
            .chart(
                symbol,
                &[("range", "1d".to_string()), ("interval", "1d".to_string())],
            )
            .await?
            .ok_or_else(|| UpstreamError::Parse(format!("no results in response for {symbol}")))?;

        parse_yahoo_quote(symbol, &result)
    }

    async fn fetch_daily_bars(
        &self,
        symbol: &Symbol,
        window: chrono::Duration,
    ) -> Result<History, UpstreamError> {
        let end = Utc::now();
        let start = end - window;

        debug!(%symbol, %start, %end, "fetching daily bars from Yahoo");

        let Some(result) = self
            .chart(
                symbol,
                &[
                    ("period1", start.timestamp().to_string()),
                    ("period2", end.timestamp().to_string()),
                    ("interval", "1d".to_string()),
                ],
            )
            .await?
        else {
            return Ok(History::empty());
        };

        let bars = parse_yahoo_bars(&result)?;
        warn_inconsistent(self.name(), symbol.as_str(), &bars);
        Ok(History::from_bars(bars))
    }
}
