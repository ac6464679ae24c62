use crate::constants::{EXCHANGE, INSTRUMENT_TYPE_EQUITY};
use crate::error::{AppError, Result};
use crate::models::Instrument;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load the watchlist: one symbol per line, blanks and `#` comments skipped.
/// Read once per process lifetime.
pub fn load_watchlist(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read watchlist {}: {}", path.display(), e)))?;

    let symbols: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_uppercase())
        .collect();

    if symbols.is_empty() {
        return Err(AppError::Config(format!(
            "watchlist {} contains no symbols",
            path.display()
        )));
    }

    Ok(symbols)
}

/// One row of the exchange instrument dump; unknown columns are ignored
#[derive(Debug, Deserialize)]
struct InstrumentRow {
    instrument_token: u32,
    tradingsymbol: String,
    instrument_type: String,
    exchange: String,
}

/// Symbol-to-token directory filtered to exchange equities.
///
/// Built from the instrument dump CSV once per process; symbols the
/// directory cannot resolve are excluded from the cycle.
#[derive(Debug)]
pub struct InstrumentDirectory {
    by_symbol: HashMap<String, Instrument>,
}

impl InstrumentDirectory {
    /// Parse the raw instrument dump, keeping NSE equity rows only
    pub fn parse_csv(raw: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(raw.as_bytes());
        let mut by_symbol = HashMap::new();

        for row in reader.deserialize() {
            let row: InstrumentRow = row?;
            if row.exchange == EXCHANGE && row.instrument_type == INSTRUMENT_TYPE_EQUITY {
                by_symbol.insert(
                    row.tradingsymbol.clone(),
                    Instrument::new(row.tradingsymbol, row.instrument_token),
                );
            }
        }

        if by_symbol.is_empty() {
            return Err(AppError::Parse(
                "instrument dump contained no NSE equity rows".to_string(),
            ));
        }

        Ok(Self { by_symbol })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::parse_csv(&raw)
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        self.by_symbol.get(symbol)
    }

    /// Resolve watchlist symbols to instruments, preserving watchlist order.
    /// Symbols with no token are dropped from the cycle.
    pub fn resolve(&self, symbols: &[String]) -> Vec<Instrument> {
        symbols
            .iter()
            .filter_map(|symbol| {
                let found = self.get(symbol).cloned();
                if found.is_none() {
                    debug!(symbol = %symbol, "No instrument token, excluding from cycle");
                }
                found
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DUMP: &str = "\
instrument_token,exchange_token,tradingsymbol,name,last_price,expiry,strike,tick_size,lot_size,instrument_type,segment,exchange
408065,1594,INFY,INFOSYS,0,,0,0.05,1,EQ,NSE,NSE
738561,2885,RELIANCE,RELIANCE INDUSTRIES,0,,0,0.05,1,EQ,NSE,NSE
341249,1333,HDFCBANK,HDFC BANK,0,,0,0.05,1,EQ,BSE,BSE
12345,48,NIFTY26AUGFUT,,0,2026-08-27,0,0.05,50,FUT,NFO-FUT,NFO
";

    #[test]
    fn test_parse_filters_exchange_and_type() {
        let dir = InstrumentDirectory::parse_csv(DUMP).unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.get("INFY").unwrap().token, 408065);
        assert!(dir.get("HDFCBANK").is_none());
        assert!(dir.get("NIFTY26AUGFUT").is_none());
    }

    #[test]
    fn test_resolve_keeps_watchlist_order_and_drops_unknowns() {
        let dir = InstrumentDirectory::parse_csv(DUMP).unwrap();
        let symbols = vec![
            "RELIANCE".to_string(),
            "NOSUCH".to_string(),
            "INFY".to_string(),
        ];
        let resolved = dir.resolve(&symbols);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].symbol, "RELIANCE");
        assert_eq!(resolved[1].symbol, "INFY");
    }

    #[test]
    fn test_load_watchlist_skips_blanks_and_comments() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# banks").unwrap();
        writeln!(file, "hdfcbank").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "INFY  ").unwrap();

        let symbols = load_watchlist(file.path()).unwrap();
        assert_eq!(symbols, vec!["HDFCBANK".to_string(), "INFY".to_string()]);
    }

    #[test]
    fn test_empty_watchlist_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# nothing here").unwrap();
        assert!(load_watchlist(file.path()).is_err());
    }
}
