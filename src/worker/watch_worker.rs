use crate::constants::{NON_TRADING_POLL_SECS, TRADING_POLL_SECS};
use crate::models::Instrument;
use crate::render;
use crate::services::market_hours;
use crate::services::poller::{run_cycle, QuoteSource};
use crate::services::rank_ledger::RankLedger;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// Poll the watchlist until stopped (or once, for a single snapshot).
///
/// A failed cycle is logged and retried at the next tick; the ledger is only
/// ever touched inside `run_cycle`, so no cycle starts before the previous
/// save finished.
pub async fn run<S: QuoteSource + Send>(
    source: &mut S,
    instruments: Vec<Instrument>,
    mut ledger: RankLedger,
    interval_override: Option<u64>,
    once: bool,
) {
    info!(
        symbols = instruments.len(),
        "Starting watch worker - trading hours: {}s, closed: {}s",
        TRADING_POLL_SECS,
        NON_TRADING_POLL_SECS
    );

    let mut iteration_count = 0u64;

    loop {
        iteration_count += 1;
        let loop_start = std::time::Instant::now();
        let today = market_hours::market_date();
        let is_open = market_hours::is_market_open();

        info!(
            iteration = iteration_count,
            trading_day = %today,
            market_open = is_open,
            "Watch worker: starting cycle"
        );

        match run_cycle(source, &instruments, &mut ledger, today).await {
            Ok(outcome) => {
                for (symbol, reason) in &outcome.skipped {
                    info!(symbol = %symbol, reason = %reason, "Watch worker: symbol skipped");
                }
                render::draw(&outcome);
            }
            Err(e) => {
                error!(iteration = iteration_count, error = %e, "Watch worker: cycle failed");
            }
        }

        let loop_duration = loop_start.elapsed();

        if once {
            info!(
                iteration = iteration_count,
                cycle_duration_secs = loop_duration.as_secs_f64(),
                "Watch worker: single cycle done"
            );
            break;
        }

        let interval = interval_override
            .map(Duration::from_secs)
            .unwrap_or_else(|| {
                market_hours::poll_interval(
                    Duration::from_secs(TRADING_POLL_SECS),
                    Duration::from_secs(NON_TRADING_POLL_SECS),
                )
            });

        info!(
            iteration = iteration_count,
            cycle_duration_secs = loop_duration.as_secs_f64(),
            next_cycle_secs = interval.as_secs(),
            "Watch worker: cycle completed"
        );

        sleep(interval).await;
    }
}
