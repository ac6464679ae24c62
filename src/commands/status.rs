use crate::models::Partition;
use crate::services::watchlist::load_watchlist;
use crate::services::RankLedger;
use crate::utils::{get_data_dir, get_watchlist_path, instruments_cache_path, rank_ledger_path};

pub fn run() {
    println!("📊 moverboard status\n");

    println!("📁 Data directory:       {}", get_data_dir().display());

    let watchlist_path = get_watchlist_path();
    match load_watchlist(&watchlist_path) {
        Ok(symbols) => println!(
            "📋 Watchlist:            {} ({} symbols)",
            watchlist_path.display(),
            symbols.len()
        ),
        Err(e) => println!("📋 Watchlist:            unavailable ({})", e),
    }

    let cache = instruments_cache_path();
    if cache.exists() {
        println!("🗃️  Instrument cache:     {}", cache.display());
    } else {
        println!("🗃️  Instrument cache:     not fetched yet");
    }

    let ledger_path = rank_ledger_path();
    match RankLedger::load(ledger_path.clone()) {
        Ok(ledger) => {
            match ledger.session_date() {
                Some(date) => println!("🗂️  Rank ledger session:  {}", date),
                None => println!("🗂️  Rank ledger session:  none yet"),
            }
            println!(
                "   🟢 Gainer ranks:      {}",
                ledger.count(Partition::Gainers)
            );
            println!(
                "   🔴 Loser ranks:       {}",
                ledger.count(Partition::Losers)
            );
        }
        Err(e) => {
            println!("🗂️  Rank ledger:          {} ({})", ledger_path.display(), e);
        }
    }
}
