use serde::{Deserialize, Serialize};

/// An exchange-listed equity with the opaque token the data source keys on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Trading symbol, e.g. "RELIANCE"
    pub symbol: String,

    /// Instrument token used for quote and candle queries
    pub token: u32,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, token: u32) -> Self {
        Self {
            symbol: symbol.into(),
            token,
        }
    }

    /// Exchange-qualified identifier used by the quote endpoint
    pub fn quote_key(&self) -> String {
        format!("{}:{}", crate::constants::EXCHANGE, self.symbol)
    }
}
