use crate::constants::{AVG_VOLUME_SAMPLES, CHECKPOINT_NOON, CHECKPOINT_TEN, MARKET_TIMEZONE};
use crate::models::{Candle, MetricRecord, QuoteSnapshot};
use chrono::Timelike;
use chrono_tz::Tz;

/// Why a symbol produced no metric record this cycle.
///
/// Skips are per-symbol and never abort the cycle; the orchestrator collects
/// them for logging instead of swallowing the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No 5-minute candles were returned for today
    NoIntradayData,
    /// Previous close is zero or missing, percent change is undefined
    InvalidPrevClose,
    /// The batched quote response had no entry for the symbol
    QuoteUnavailable,
    /// A per-symbol candle fetch failed
    Fetch(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoIntradayData => write!(f, "no intraday candles"),
            SkipReason::InvalidPrevClose => write!(f, "previous close unavailable"),
            SkipReason::QuoteUnavailable => write!(f, "quote unavailable"),
            SkipReason::Fetch(e) => write!(f, "fetch failed: {}", e),
        }
    }
}

/// Round to two decimals, half away from zero (`f64::round` semantics)
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percent distance of `value` from the previous close, rounded to 2dp
fn pct_from_prev_close(value: f64, prev_close: f64) -> f64 {
    round2((value - prev_close) / prev_close * 100.0)
}

/// Find the intraday candle stamped exactly `hour:minute` in exchange-local
/// time. No nearest-match fallback: a missing checkpoint stays missing.
fn candle_at(intraday: &[Candle], hour: u32, minute: u32) -> Option<&Candle> {
    let tz: Tz = MARKET_TIMEZONE.parse().ok()?;
    intraday.iter().find(|c| {
        let local = c.time.with_timezone(&tz);
        local.hour() == hour && local.minute() == minute
    })
}

/// Derive one symbol's metric record for the current cycle.
///
/// `intraday` is today's ordered 5-minute candles; `daily` is the ordered
/// daily history of the lookback window ending yesterday. The first intraday
/// candle is the session-open checkpoint; 10:00 and 12:00 require an exact
/// timestamp match.
pub fn compute_metrics(
    symbol: &str,
    quote: &QuoteSnapshot,
    intraday: &[Candle],
    daily: &[Candle],
) -> Result<MetricRecord, SkipReason> {
    if intraday.is_empty() {
        return Err(SkipReason::NoIntradayData);
    }
    if quote.prev_close <= 0.0 {
        return Err(SkipReason::InvalidPrevClose);
    }

    let prev_close = quote.prev_close;
    let open_candle = &intraday[0];
    let ten_candle = candle_at(intraday, CHECKPOINT_TEN.0, CHECKPOINT_TEN.1);
    let noon_candle = candle_at(intraday, CHECKPOINT_NOON.0, CHECKPOINT_NOON.1);

    let (avg_volume_7d, volume_ratio) = average_volume(quote.volume, daily);

    Ok(MetricRecord {
        symbol: symbol.to_string(),
        ltp: round2(quote.last_price),
        pct_change: pct_from_prev_close(quote.last_price, prev_close),
        open_high_pct: Some(pct_from_prev_close(open_candle.high, prev_close)),
        open_low_pct: Some(pct_from_prev_close(open_candle.low, prev_close)),
        ten_high_pct: ten_candle.map(|c| pct_from_prev_close(c.high, prev_close)),
        ten_low_pct: ten_candle.map(|c| pct_from_prev_close(c.low, prev_close)),
        noon_high_pct: noon_candle.map(|c| pct_from_prev_close(c.high, prev_close)),
        noon_low_pct: noon_candle.map(|c| pct_from_prev_close(c.low, prev_close)),
        avg_volume_7d,
        volume_ratio,
        rank: None,
    })
}

/// Mean volume of the most recent 7 daily candles plus today's ratio to it.
///
/// The lookback window can hold fewer than 7 trading days; in that case both
/// fields stay absent rather than averaging a short sample.
fn average_volume(today_volume: u64, daily: &[Candle]) -> (Option<f64>, Option<f64>) {
    if daily.len() < AVG_VOLUME_SAMPLES {
        return (None, None);
    }

    let recent = &daily[daily.len() - AVG_VOLUME_SAMPLES..];
    let avg = recent.iter().map(|c| c.volume as f64).sum::<f64>() / AVG_VOLUME_SAMPLES as f64;

    if avg <= 0.0 {
        return (None, None);
    }

    (Some(avg), Some(round2(today_volume as f64 / avg)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    // 09:15 IST = 03:45 UTC; timestamps below are the NSE session in UTC
    fn intraday_candle(h: u32, m: u32, high: f64, low: f64) -> Candle {
        Candle::new(
            Utc.with_ymd_and_hms(2026, 8, 5, h, m, 0).unwrap(),
            high - 0.5,
            high,
            low,
            high - 0.2,
            10_000,
        )
    }

    fn daily_candle(day: u32, volume: u64) -> Candle {
        Candle::new(
            Utc.with_ymd_and_hms(2026, 7, day, 0, 0, 0).unwrap(),
            100.0,
            101.0,
            99.0,
            100.5,
            volume,
        )
    }

    fn quote(ltp: f64, prev_close: f64, volume: u64) -> QuoteSnapshot {
        QuoteSnapshot {
            last_price: ltp,
            prev_close,
            volume,
        }
    }

    #[test]
    fn test_open_checkpoint_is_first_candle() {
        // 03:45 UTC == 09:15 IST
        let intraday = vec![intraday_candle(3, 45, 101.0, 99.5)];
        let record = compute_metrics("INFY", &quote(102.0, 100.0, 0), &intraday, &[]).unwrap();

        assert_eq!(record.pct_change, 2.0);
        assert_eq!(record.open_high_pct, Some(1.0));
        assert_eq!(record.open_low_pct, Some(-0.5));
    }

    #[test]
    fn test_missing_checkpoint_is_absent_not_zero() {
        let intraday = vec![intraday_candle(3, 45, 101.0, 99.5)];
        let record = compute_metrics("INFY", &quote(102.0, 100.0, 0), &intraday, &[]).unwrap();

        assert_eq!(record.ten_high_pct, None);
        assert_eq!(record.noon_high_pct, None);
        assert_eq!(MetricRecord::pct_display(record.ten_high_pct), "");
    }

    #[test]
    fn test_exact_checkpoint_match() {
        let intraday = vec![
            intraday_candle(3, 45, 101.0, 99.5),
            // 04:30 UTC == 10:00 IST
            intraday_candle(4, 30, 103.0, 100.5),
            // 04:35 UTC == 10:05 IST, must not satisfy the noon checkpoint
            intraday_candle(4, 35, 104.0, 101.0),
        ];
        let record = compute_metrics("INFY", &quote(102.0, 100.0, 0), &intraday, &[]).unwrap();

        assert_eq!(record.ten_high_pct, Some(3.0));
        assert_eq!(record.ten_low_pct, Some(0.5));
        assert_eq!(record.noon_high_pct, None);
    }

    #[test]
    fn test_skip_on_empty_intraday() {
        let err = compute_metrics("INFY", &quote(102.0, 100.0, 0), &[], &[]).unwrap_err();
        assert_eq!(err, SkipReason::NoIntradayData);
    }

    #[test]
    fn test_skip_on_zero_prev_close() {
        let intraday = vec![intraday_candle(3, 45, 101.0, 99.5)];
        let err = compute_metrics("INFY", &quote(102.0, 0.0, 0), &intraday, &[]).unwrap_err();
        assert_eq!(err, SkipReason::InvalidPrevClose);
    }

    #[test]
    fn test_average_volume_needs_seven_days() {
        let intraday = vec![intraday_candle(3, 45, 101.0, 99.5)];
        let daily: Vec<Candle> = (1..=6).map(|d| daily_candle(d, 1_000)).collect();
        let record =
            compute_metrics("INFY", &quote(102.0, 100.0, 2_000), &intraday, &daily).unwrap();

        assert_eq!(record.avg_volume_7d, None);
        assert_eq!(record.volume_ratio, None);
        assert_eq!(record.avg_volume_display(), "");
        assert_eq!(record.volume_ratio_display(), "");
    }

    #[test]
    fn test_average_volume_uses_most_recent_seven() {
        let intraday = vec![intraday_candle(3, 45, 101.0, 99.5)];
        // 9 days; the oldest two (huge volumes) must be ignored
        let mut daily = vec![daily_candle(1, 9_000_000), daily_candle(2, 9_000_000)];
        daily.extend((3..=9).map(|d| daily_candle(d, 1_000)));

        let record =
            compute_metrics("INFY", &quote(102.0, 100.0, 2_500), &intraday, &daily).unwrap();

        assert_eq!(record.avg_volume_7d, Some(1_000.0));
        assert_eq!(record.volume_ratio, Some(2.5));
        assert_eq!(record.volume_ratio_display(), "2.50x");
    }

    #[test]
    fn test_zero_average_volume_leaves_ratio_empty() {
        let intraday = vec![intraday_candle(3, 45, 101.0, 99.5)];
        let daily: Vec<Candle> = (1..=7).map(|d| daily_candle(d, 0)).collect();
        let record =
            compute_metrics("INFY", &quote(102.0, 100.0, 2_000), &intraday, &daily).unwrap();

        assert_eq!(record.avg_volume_7d, None);
        assert_eq!(record.volume_ratio, None);
    }

    #[test]
    fn test_rounding_two_decimals() {
        let intraday = vec![intraday_candle(3, 45, 100.333, 99.666)];
        let record = compute_metrics("INFY", &quote(100.126, 100.0, 0), &intraday, &[]).unwrap();

        assert_eq!(record.pct_change, 0.13);
        assert_eq!(record.open_high_pct, Some(0.33));
        assert_eq!(record.open_low_pct, Some(-0.33));
    }
}
