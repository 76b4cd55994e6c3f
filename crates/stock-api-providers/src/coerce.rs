//! Conversions from loosely typed vendor values into domain types.

use rust_decimal::Decimal;
use stock_api_core::bar::Bar;
use tracing::warn;

use crate::error::UpstreamError;

pub(crate) fn f64_to_decimal(val: f64) -> Result<Decimal, UpstreamError> {
    Decimal::try_from(val).map_err(|e| UpstreamError::Parse(format!("invalid decimal value: {e}")))
}

/// Volumes may arrive as floats; the fractional part is dropped.
pub(crate) fn volume_to_u64(val: f64) -> Result<u64, UpstreamError> {
    if !val.is_finite() || val < 0.0 {
        return Err(UpstreamError::Parse(format!("invalid volume: {val}")));
    }
    Ok(val.trunc() as u64)
}

pub(crate) fn non_negative_price(price: Decimal) -> Result<Decimal, UpstreamError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(UpstreamError::Parse(format!("negative price: {price}")));
    }
    Ok(price)
}

/// Log bars whose open/close fall outside their high/low range.
pub(crate) fn warn_inconsistent(provider: &str, symbol: &str, bars: &[Bar]) {
    for bar in bars.iter().filter(|b| !b.is_consistent()) {
        warn!(
            provider,
            symbol,
            date = %bar.date,
            "bar open/close outside high/low range"
        );
    }
}
