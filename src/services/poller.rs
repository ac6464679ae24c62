use crate::constants::{DAILY_LOOKBACK_DAYS, INTER_CALL_DELAY_MS, TOP_N};
use crate::error::Result;
use crate::models::{Candle, Instrument, MetricRecord, Partition, QuoteSnapshot};
use crate::services::metrics::{compute_metrics, SkipReason};
use crate::services::rank_ledger::RankLedger;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration as StdDuration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Seam between the cycle and the brokerage API so cycles can run against a
/// scripted source in tests
#[async_trait]
pub trait QuoteSource {
    /// Batched current quotes, keyed by instrument token
    async fn quotes(&mut self, instruments: &[Instrument]) -> Result<HashMap<u32, QuoteSnapshot>>;

    /// Today's 5-minute candles for one instrument, ascending
    async fn intraday_candles(&mut self, token: u32, day: NaiveDate) -> Result<Vec<Candle>>;

    /// Daily candles over [from, to], ascending
    async fn daily_candles(&mut self, token: u32, from: NaiveDate, to: NaiveDate)
        -> Result<Vec<Candle>>;
}

/// One polling cycle's output: both ranked tables plus the skip log
#[derive(Debug, Default)]
pub struct CycleOutcome {
    pub gainers: Vec<MetricRecord>,
    pub losers: Vec<MetricRecord>,
    pub skipped: Vec<(String, SkipReason)>,
}

impl CycleOutcome {
    /// True when no symbol produced a record; rendered as an explicit
    /// no-data notice rather than two empty tables
    pub fn is_empty(&self) -> bool {
        self.gainers.is_empty() && self.losers.is_empty()
    }
}

/// Run one polling cycle: fetch, derive, partition, rank, select.
///
/// Per-symbol failures downgrade to skips; only a batch-quote failure or a
/// ledger write failure fails the cycle. The ledger save completes before
/// this returns, so a new cycle never observes a half-updated ledger.
pub async fn run_cycle<S: QuoteSource + Send>(
    source: &mut S,
    instruments: &[Instrument],
    ledger: &mut RankLedger,
    today: NaiveDate,
) -> Result<CycleOutcome> {
    let quotes = source.quotes(instruments).await?;

    let lookback_from = today - ChronoDuration::days(DAILY_LOOKBACK_DAYS);
    let yesterday = today - ChronoDuration::days(1);

    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (i, inst) in instruments.iter().enumerate() {
        if i > 0 {
            sleep(StdDuration::from_millis(INTER_CALL_DELAY_MS)).await;
        }

        let Some(quote) = quotes.get(&inst.token) else {
            skipped.push((inst.symbol.clone(), SkipReason::QuoteUnavailable));
            continue;
        };

        let intraday = match source.intraday_candles(inst.token, today).await {
            Ok(candles) => candles,
            Err(e) => {
                warn!(symbol = %inst.symbol, error = %e, "Intraday fetch failed, skipping");
                skipped.push((inst.symbol.clone(), SkipReason::Fetch(e.to_string())));
                continue;
            }
        };

        let daily = match source.daily_candles(inst.token, lookback_from, yesterday).await {
            Ok(candles) => candles,
            Err(e) => {
                warn!(symbol = %inst.symbol, error = %e, "Daily fetch failed, skipping");
                skipped.push((inst.symbol.clone(), SkipReason::Fetch(e.to_string())));
                continue;
            }
        };

        match compute_metrics(&inst.symbol, quote, &intraday, &daily) {
            Ok(record) => records.push(record),
            Err(reason) => {
                debug!(symbol = %inst.symbol, reason = %reason, "Skipping symbol");
                skipped.push((inst.symbol.clone(), reason));
            }
        }

        debug!(symbol = %inst.symbol, progress = i + 1, total = instruments.len(), "Symbol processed");
    }

    // Zero-change symbols belong to neither side. Stable sorts keep input
    // order for equal percent moves.
    let mut gainers: Vec<MetricRecord> =
        records.iter().filter(|r| r.pct_change > 0.0).cloned().collect();
    let mut losers: Vec<MetricRecord> =
        records.iter().filter(|r| r.pct_change < 0.0).cloned().collect();

    gainers.sort_by(|a, b| {
        b.pct_change
            .partial_cmp(&a.pct_change)
            .unwrap_or(Ordering::Equal)
    });
    losers.sort_by(|a, b| {
        a.pct_change
            .partial_cmp(&b.pct_change)
            .unwrap_or(Ordering::Equal)
    });

    ledger.begin_session(today);
    ledger.assign(Partition::Gainers, &ordered_symbols(&gainers));
    ledger.assign(Partition::Losers, &ordered_symbols(&losers));
    ledger.save()?;

    attach_ranks(&mut gainers, ledger, Partition::Gainers);
    attach_ranks(&mut losers, ledger, Partition::Losers);

    Ok(CycleOutcome {
        gainers,
        losers,
        skipped,
    })
}

fn ordered_symbols(records: &[MetricRecord]) -> Vec<String> {
    records.iter().map(|r| r.symbol.clone()).collect()
}

/// Attach frozen ranks, re-sort by rank and keep the top rows
fn attach_ranks(records: &mut Vec<MetricRecord>, ledger: &RankLedger, partition: Partition) {
    for record in records.iter_mut() {
        record.rank = ledger.rank(partition, &record.symbol);
    }
    records.sort_by_key(|r| r.rank.unwrap_or(u32::MAX));
    records.truncate(TOP_N);
}
