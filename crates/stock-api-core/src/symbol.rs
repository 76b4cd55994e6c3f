use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MarketDataError;

/// A ticker symbol as supplied by the caller.
///
/// Symbols are opaque and case-sensitive. The only local check is that the
/// token is not blank; whether the vendor recognises it is left to the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: impl Into<String>) -> Result<Self, MarketDataError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(MarketDataError::InvalidSymbol);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = MarketDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}
