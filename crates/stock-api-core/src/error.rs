use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Invalid symbol: symbol must not be empty")]
    InvalidSymbol,
}
