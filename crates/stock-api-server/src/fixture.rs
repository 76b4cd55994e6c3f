//! In-memory gateway used by the handler and router tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stock_api_core::bar::Bar;
use stock_api_core::history::History;
use stock_api_core::quote::Quote;
use stock_api_core::symbol::Symbol;
use stock_api_providers::error::UpstreamError;
use stock_api_providers::provider::MarketDataGateway;

/// Serves canned trades and bars. Symbols without a trade are rejected the
/// way a vendor rejects an unknown ticker; symbols without bars get none.
pub(crate) struct FixtureGateway {
    trades: HashMap<String, Quote>,
    bars: HashMap<String, Vec<Bar>>,
    calls: AtomicUsize,
    last_window: Mutex<Option<Duration>>,
}

fn bar(day: u32, open: Decimal, high: Decimal, low: Decimal, close: Decimal, volume: u64) -> Bar {
    Bar {
        date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        open,
        high,
        low,
        close,
        volume,
    }
}

fn quote(symbol: &str, price: Decimal) -> Quote {
    Quote {
        symbol: Symbol::new(symbol).unwrap(),
        price,
        timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap(),
    }
}

impl FixtureGateway {
    pub(crate) fn standard() -> Self {
        let trades = [
            quote("AAPL", dec!(150.25)),
            quote("MSFT", dec!(374.5)),
            quote("PENNY", Decimal::ZERO),
            quote("NEWIPO", dec!(20)),
        ]
        .into_iter()
        .map(|q| (q.symbol.to_string(), q))
        .collect();

        // deliberately out of order; the history type sorts
        let aapl = vec![
            bar(4, dec!(182.25), dec!(183.5), dec!(180.75), dec!(181.75), 71_983_600),
            bar(2, dec!(187.25), dec!(188.5), dec!(183.75), dec!(185.625), 82_488_700),
            bar(3, dec!(184.25), dec!(185.875), dec!(183.375), dec!(184.25), 58_414_500),
        ];

        Self {
            trades,
            bars: HashMap::from([("AAPL".to_string(), aapl)]),
            calls: AtomicUsize::new(0),
            last_window: Mutex::new(None),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_window(&self) -> Option<Duration> {
        *self.last_window.lock().unwrap()
    }

    fn known(&self, symbol: &Symbol) -> Result<(), UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.trades.contains_key(symbol.as_str()) {
            Ok(())
        } else {
            Err(UpstreamError::Api {
                status: 422,
                message: format!(r#"{{"message":"invalid symbol: {symbol}"}}"#),
            })
        }
    }
}

#[async_trait]
impl MarketDataGateway for FixtureGateway {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch_latest_trade(&self, symbol: &Symbol) -> Result<Quote, UpstreamError> {
        self.known(symbol)?;
        Ok(self.trades[symbol.as_str()].clone())
    }

    async fn fetch_daily_bars(
        &self,
        symbol: &Symbol,
        window: Duration,
    ) -> Result<History, UpstreamError> {
        self.known(symbol)?;
        *self.last_window.lock().unwrap() = Some(window);
        let bars = self.bars.get(symbol.as_str()).cloned().unwrap_or_default();
        Ok(History::from_bars(bars))
    }
}
