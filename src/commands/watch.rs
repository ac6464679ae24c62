use crate::constants::RATE_LIMIT_PER_MINUTE;
use crate::error::Error;
use crate::services::watchlist::{self, InstrumentDirectory};
use crate::services::{Credentials, KiteClient, RankLedger};
use crate::utils::{get_watchlist_path, instruments_cache_path, rank_ledger_path};
use crate::worker;
use std::fs;

pub fn run(once: bool, interval: Option<u64>) {
    if let Err(e) = run_inner(once, interval) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn run_inner(once: bool, interval: Option<u64>) -> Result<(), Error> {
    let credentials = Credentials::load()?;

    let watchlist_path = get_watchlist_path();
    let symbols = watchlist::load_watchlist(&watchlist_path)?;
    println!(
        "📋 Watchlist: {} symbols from {}",
        symbols.len(),
        watchlist_path.display()
    );

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Config(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let mut client = KiteClient::new(credentials, RATE_LIMIT_PER_MINUTE)
            .map_err(Error::from)?;

        let directory = load_instrument_directory(&mut client, false).await?;
        let instruments = directory.resolve(&symbols);
        if instruments.is_empty() {
            return Err(Error::Config(
                "no watchlist symbol resolves to an instrument token".to_string(),
            ));
        }
        println!(
            "🔎 Resolved {}/{} watchlist symbols to instrument tokens",
            instruments.len(),
            symbols.len()
        );

        let ledger = RankLedger::load(rank_ledger_path())?;
        if let Some(date) = ledger.session_date() {
            println!("🗂️  Rank ledger session: {}", date);
        }

        worker::run_watch_worker(&mut client, instruments, ledger, interval, once).await;
        Ok(())
    })
}

/// Load the instrument directory from the local cache, fetching the dump
/// from the API when the cache is missing or a refresh was requested
pub(crate) async fn load_instrument_directory(
    client: &mut KiteClient,
    refresh: bool,
) -> Result<InstrumentDirectory, Error> {
    let cache = instruments_cache_path();

    if !refresh && cache.exists() {
        println!("📁 Instrument directory: {}", cache.display());
        return InstrumentDirectory::from_file(&cache);
    }

    println!("🌐 Fetching instrument directory from the exchange dump...");
    let raw = client.instruments_csv().await.map_err(Error::from)?;

    if let Some(dir) = cache.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&cache, &raw)?;
    println!("💾 Cached instrument directory at {}", cache.display());

    InstrumentDirectory::parse_csv(&raw)
}
