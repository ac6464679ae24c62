//! Terminal table rendering for the movers board.
//!
//! Each side of the board shows only its own checkpoint columns: gainer rows
//! carry the high-level percentages, loser rows the low-level ones. Cells
//! the classifier flags are drawn in reverse video as the "flash".

use crate::constants::{NOON_ALERT_THRESHOLD, OPEN_ALERT_THRESHOLD, TEN_ALERT_THRESHOLD};
use crate::models::{MetricRecord, Partition};
use crate::services::alerts::classify;
use crate::services::poller::CycleOutcome;

const REVERSE: &str = "\x1b[7m";
const RESET: &str = "\x1b[0m";

const PCT_WIDTH: usize = 10;

pub fn draw(outcome: &CycleOutcome) {
    if outcome.is_empty() {
        println!("No data available");
        return;
    }

    draw_table("🟢 Top 20 Gainers (High Levels)", &outcome.gainers, Partition::Gainers);
    println!();
    draw_table("🔴 Top 20 Losers (Low Levels)", &outcome.losers, Partition::Losers);
}

fn draw_table(title: &str, records: &[MetricRecord], partition: Partition) {
    println!("{}", title);

    let (open_label, ten_label, noon_label) = match partition {
        Partition::Gainers => ("9:15 Hi%", "10:00 Hi%", "12:00 Hi%"),
        Partition::Losers => ("9:15 Lo%", "10:00 Lo%", "12:00 Lo%"),
    };

    println!(
        "{:>4}  {:<12} {:>10} {:>8} {:>pw$} {:>pw$} {:>pw$} {:>10} {:>8}",
        "Rank",
        "Symbol",
        "LTP",
        "% Chg",
        open_label,
        ten_label,
        noon_label,
        "7D AvgVol",
        "Vol/Avg",
        pw = PCT_WIDTH,
    );

    for record in records {
        let (open, ten, noon) = match partition {
            Partition::Gainers => (record.open_high_pct, record.ten_high_pct, record.noon_high_pct),
            Partition::Losers => (record.open_low_pct, record.ten_low_pct, record.noon_low_pct),
        };

        println!(
            "{:>4}  {:<12} {:>10.2} {:>8.2} {} {} {} {:>10} {:>8}",
            record.rank.map(|r| r.to_string()).unwrap_or_default(),
            record.symbol,
            record.ltp,
            record.pct_change,
            cell(open, OPEN_ALERT_THRESHOLD, partition),
            cell(ten, TEN_ALERT_THRESHOLD, partition),
            cell(noon, NOON_ALERT_THRESHOLD, partition),
            record.avg_volume_display(),
            record.volume_ratio_display(),
        );
    }
}

/// Pad first, then wrap in ANSI codes so alignment survives highlighting
fn cell(value: Option<f64>, threshold: f64, partition: Partition) -> String {
    let classified = classify(value, threshold, partition);
    let padded = format!("{:>pw$}", classified.display, pw = PCT_WIDTH);
    if classified.alert {
        format!("{}{}{}", REVERSE, padded, RESET)
    } else {
        padded
    }
}
