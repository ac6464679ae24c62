pub mod alerts;
pub mod kite;
pub mod market_hours;
pub mod metrics;
pub mod poller;
pub mod rank_ledger;
pub mod session;
pub mod watchlist;

pub use alerts::{classify, CellAlert};
pub use kite::{KiteClient, KiteError};
pub use market_hours::{is_market_open, market_date, poll_interval};
pub use metrics::{compute_metrics, SkipReason};
pub use poller::{run_cycle, CycleOutcome, QuoteSource};
pub use rank_ledger::RankLedger;
pub use session::Credentials;
pub use watchlist::{load_watchlist, InstrumentDirectory};
