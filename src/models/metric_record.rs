use crate::utils::format_volume;
use serde::{Deserialize, Serialize};

/// Which side of the movers board a symbol sits on.
///
/// Also doubles as the direction argument of the threshold classifier:
/// gainer columns measure moves above previous close, loser columns below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partition {
    Gainers,
    Losers,
}

/// Per-symbol metrics derived for one polling cycle.
///
/// Percent fields are relative to the previous close and rounded to two
/// decimals. Checkpoint fields are `None` when no 5-minute candle exists at
/// that exact time; they render as empty strings, never as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub symbol: String,

    /// Last traded price
    pub ltp: f64,

    /// Percent change of LTP from previous close
    pub pct_change: f64,

    /// High/low percent at the first candle of the session (9:15 on NSE)
    pub open_high_pct: Option<f64>,
    pub open_low_pct: Option<f64>,

    /// High/low percent at the 10:00 candle
    pub ten_high_pct: Option<f64>,
    pub ten_low_pct: Option<f64>,

    /// High/low percent at the 12:00 candle
    pub noon_high_pct: Option<f64>,
    pub noon_low_pct: Option<f64>,

    /// Mean volume of the last 7 daily candles, when enough history exists
    pub avg_volume_7d: Option<f64>,

    /// Today's cumulative volume over the 7-day average
    pub volume_ratio: Option<f64>,

    /// Frozen position within the partition, attached after ranking
    pub rank: Option<u32>,
}

impl MetricRecord {
    /// Render an optional percentage cell; absent checkpoints stay blank
    pub fn pct_display(value: Option<f64>) -> String {
        value.map(|v| format!("{:.2}", v)).unwrap_or_default()
    }

    pub fn avg_volume_display(&self) -> String {
        self.avg_volume_7d.map(format_volume).unwrap_or_default()
    }

    pub fn volume_ratio_display(&self) -> String {
        self.volume_ratio
            .map(|r| format!("{:.2}x", r))
            .unwrap_or_default()
    }
}
