//! Dashboard Constants
//!
//! Fixed parameters for the watchlist polling pipeline: exchange filters,
//! intraday checkpoint times, alert thresholds, and polling cadence.

/// Exchange the watchlist trades on
pub const EXCHANGE: &str = "NSE";

/// Instrument type filter for the instrument directory (equities only)
pub const INSTRUMENT_TYPE_EQUITY: &str = "EQ";

/// Exchange timezone; candle checkpoints are matched in this zone
pub const MARKET_TIMEZONE: &str = "Asia/Kolkata";

/// Rows kept per table after ranking
pub const TOP_N: usize = 20;

/// Delay between consecutive per-symbol data-source calls
pub const INTER_CALL_DELAY_MS: u64 = 150;

/// Calendar days of daily history requested (ends the day before today)
pub const DAILY_LOOKBACK_DAYS: i64 = 15;

/// Daily candles required before the average-volume fields are produced
pub const AVG_VOLUME_SAMPLES: usize = 7;

/// Mid-morning checkpoint (hour, minute), exact match against 5m candles
pub const CHECKPOINT_TEN: (u32, u32) = (10, 0);

/// Noon checkpoint (hour, minute), exact match against 5m candles
pub const CHECKPOINT_NOON: (u32, u32) = (12, 0);

/// Alert threshold for the session-open checkpoint columns (percent)
pub const OPEN_ALERT_THRESHOLD: f64 = 1.5;

/// Alert threshold for the 10:00 checkpoint columns (percent)
pub const TEN_ALERT_THRESHOLD: f64 = 2.0;

/// Alert threshold for the 12:00 checkpoint columns (percent)
pub const NOON_ALERT_THRESHOLD: f64 = 2.5;

/// Volume Display Tiers
///
/// Traded volume is shown in Indian market notation:
///
/// | Volume          | Rendered as       |
/// |-----------------|-------------------|
/// | >= 1,00,00,000  | `{v/1e7:.2}Cr`    |
/// | >= 1,00,000     | `{v/1e5:.2}L`     |
/// | >= 1,000        | `{v/1e3:.1}K`     |
/// | below 1,000     | plain integer     |
pub const VOLUME_CRORE: f64 = 10_000_000.0;
pub const VOLUME_LAKH: f64 = 100_000.0;
pub const VOLUME_THOUSAND: f64 = 1_000.0;

// Poll cadence: tight while the market trades, relaxed when it is closed.
pub const TRADING_POLL_SECS: u64 = 30;
pub const NON_TRADING_POLL_SECS: u64 = 300;

/// Upstream API budget (sliding one-minute window)
pub const RATE_LIMIT_PER_MINUTE: u32 = 180;
