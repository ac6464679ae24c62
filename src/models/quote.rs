use serde::{Deserialize, Serialize};

/// Point-in-time quote for one symbol, refetched every polling cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// Last traded price
    pub last_price: f64,

    /// Previous session's closing price
    pub prev_close: f64,

    /// Cumulative traded volume for the day (0 when the feed omits it)
    #[serde(default)]
    pub volume: u64,
}
