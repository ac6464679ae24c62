use crate::constants::RATE_LIMIT_PER_MINUTE;
use crate::error::Error;
use crate::services::watchlist::InstrumentDirectory;
use crate::services::{Credentials, KiteClient};
use crate::utils::instruments_cache_path;

use super::watch::load_instrument_directory;

pub fn run(refresh: bool) {
    if let Err(e) = run_inner(refresh) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn run_inner(refresh: bool) -> Result<(), Error> {
    let cache = instruments_cache_path();

    // The cached dump is enough unless a refresh was asked for
    if !refresh && cache.exists() {
        let directory = InstrumentDirectory::from_file(&cache)?;
        print_summary(&directory);
        return Ok(());
    }

    let credentials = Credentials::load()?;
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Config(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let mut client = KiteClient::new(credentials, RATE_LIMIT_PER_MINUTE).map_err(Error::from)?;
        let directory = load_instrument_directory(&mut client, refresh).await?;
        print_summary(&directory);
        Ok(())
    })
}

fn print_summary(directory: &InstrumentDirectory) {
    println!(
        "✅ Instrument directory: {} NSE equities",
        directory.len()
    );
}
