use crate::error::{AppError, Result};
use crate::models::Partition;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Persisted document: one rank map per partition plus the session date
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct LedgerState {
    /// Trading day the ledger was last written for; a differing current
    /// date marks a new session
    updated_on: Option<NaiveDate>,
    gainers: HashMap<String, u32>,
    losers: HashMap<String, u32>,
}

/// First-seen-wins rank assignment, frozen for the trading session.
///
/// A symbol's rank within a partition never changes once assigned, even when
/// its sorted position shifts between cycles. The two partitions keep
/// disjoint rank spaces; a symbol that flips sides gets a fresh rank on the
/// new side. State survives process restarts through a JSON document that is
/// replaced atomically on every save.
#[derive(Debug)]
pub struct RankLedger {
    path: PathBuf,
    state: LedgerState,
}

impl RankLedger {
    /// Load persisted state, or start empty when none exists yet.
    ///
    /// An unreadable or unparsable ledger is an error: proceeding with an
    /// empty map mid-session would silently re-rank the whole board.
    pub fn load(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path,
                state: LedgerState::default(),
            });
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| AppError::Ledger(format!("read {}: {}", path.display(), e)))?;
        let state: LedgerState = serde_json::from_str(&content)
            .map_err(|e| AppError::Ledger(format!("corrupt ledger {}: {}", path.display(), e)))?;

        Ok(Self { path, state })
    }

    /// Trading day of the persisted state, if any
    pub fn session_date(&self) -> Option<NaiveDate> {
        self.state.updated_on
    }

    /// True when the persisted session date differs from `today`
    pub fn is_new_session(&self, today: NaiveDate) -> bool {
        self.state.updated_on != Some(today)
    }

    /// Clear both partitions at the first cycle of a new trading day
    pub fn begin_session(&mut self, today: NaiveDate) {
        if self.is_new_session(today) {
            if let Some(previous) = self.state.updated_on {
                info!(
                    previous = %previous,
                    current = %today,
                    "New trading session, resetting rank ledger"
                );
            }
            self.state.gainers.clear();
            self.state.losers.clear();
            self.state.updated_on = Some(today);
        }
    }

    /// Assign ranks to symbols not yet present in the partition, in input
    /// order. Must be called with the full currently-qualifying ordered set
    /// so first appearances land at the right position.
    pub fn assign(&mut self, partition: Partition, ordered_symbols: &[String]) {
        let map = self.partition_mut(partition);
        for symbol in ordered_symbols {
            if !map.contains_key(symbol) {
                let rank = map.len() as u32 + 1;
                map.insert(symbol.clone(), rank);
            }
        }
    }

    pub fn rank(&self, partition: Partition, symbol: &str) -> Option<u32> {
        self.partition_ref(partition).get(symbol).copied()
    }

    pub fn count(&self, partition: Partition) -> usize {
        self.partition_ref(partition).len()
    }

    /// Persist both maps, replacing the previous document atomically so a
    /// crash mid-write can never leave a half-updated ledger behind.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.state)
            .map_err(|e| AppError::Ledger(format!("serialize ledger: {}", e)))?;
        atomic_write(&self.path, json.as_bytes())
    }

    fn partition_ref(&self, partition: Partition) -> &HashMap<String, u32> {
        match partition {
            Partition::Gainers => &self.state.gainers,
            Partition::Losers => &self.state.losers,
        }
    }

    fn partition_mut(&mut self, partition: Partition) -> &mut HashMap<String, u32> {
        match partition {
            Partition::Gainers => &mut self.state.gainers,
            Partition::Losers => &mut self.state.losers,
        }
    }
}

/// Write to a sibling temp file, fsync, then rename over the target
fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| AppError::Ledger(format!("no parent dir for {}", path.display())))?;
    fs::create_dir_all(dir).map_err(|e| AppError::Ledger(format!("create {}: {}", dir.display(), e)))?;

    let tmp = dir.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    {
        let mut f = fs::File::create(&tmp)
            .map_err(|e| AppError::Ledger(format!("create {}: {}", tmp.display(), e)))?;
        f.write_all(bytes)
            .map_err(|e| AppError::Ledger(format!("write {}: {}", tmp.display(), e)))?;
        let _ = f.sync_all();
    }

    fs::rename(&tmp, path)
        .map_err(|e| AppError::Ledger(format!("rename {} -> {}: {}", tmp.display(), path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_seen_rank_is_frozen() {
        let dir = TempDir::new().unwrap();
        let mut ledger = RankLedger::load(dir.path().join("ledger.json")).unwrap();
        ledger.begin_session(today());

        ledger.assign(Partition::Gainers, &symbols(&["AAA", "BBB", "CCC"]));
        assert_eq!(ledger.rank(Partition::Gainers, "AAA"), Some(1));
        assert_eq!(ledger.rank(Partition::Gainers, "CCC"), Some(3));

        // Next cycle the sort order flips, ranks must not move
        ledger.assign(Partition::Gainers, &symbols(&["CCC", "AAA", "BBB"]));
        assert_eq!(ledger.rank(Partition::Gainers, "AAA"), Some(1));
        assert_eq!(ledger.rank(Partition::Gainers, "BBB"), Some(2));
        assert_eq!(ledger.rank(Partition::Gainers, "CCC"), Some(3));
    }

    #[test]
    fn test_new_arrival_gets_next_rank() {
        let dir = TempDir::new().unwrap();
        let mut ledger = RankLedger::load(dir.path().join("ledger.json")).unwrap();
        ledger.begin_session(today());

        ledger.assign(Partition::Gainers, &symbols(&["AAA", "BBB"]));
        ledger.assign(Partition::Gainers, &symbols(&["DDD", "AAA", "BBB"]));

        // DDD tops the sort but arrives third
        assert_eq!(ledger.rank(Partition::Gainers, "DDD"), Some(3));
    }

    #[test]
    fn test_partition_flip_assigns_independent_rank() {
        let dir = TempDir::new().unwrap();
        let mut ledger = RankLedger::load(dir.path().join("ledger.json")).unwrap();
        ledger.begin_session(today());

        ledger.assign(Partition::Gainers, &symbols(&["AAA", "BBB"]));
        ledger.assign(Partition::Losers, &symbols(&["XXX"]));

        // AAA flips to the losers side: next unused integer there, not 1
        // carried over from gainers
        ledger.assign(Partition::Losers, &symbols(&["XXX", "AAA"]));
        assert_eq!(ledger.rank(Partition::Losers, "AAA"), Some(2));
        assert_eq!(ledger.rank(Partition::Gainers, "AAA"), Some(1));
    }

    #[test]
    fn test_session_rollover_clears_both_partitions() {
        let dir = TempDir::new().unwrap();
        let mut ledger = RankLedger::load(dir.path().join("ledger.json")).unwrap();
        ledger.begin_session(today());
        ledger.assign(Partition::Gainers, &symbols(&["AAA"]));
        ledger.assign(Partition::Losers, &symbols(&["ZZZ"]));

        let next_day = today().succ_opt().unwrap();
        assert!(ledger.is_new_session(next_day));
        ledger.begin_session(next_day);

        assert_eq!(ledger.count(Partition::Gainers), 0);
        assert_eq!(ledger.count(Partition::Losers), 0);
        assert!(!ledger.is_new_session(next_day));
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");

        let mut ledger = RankLedger::load(path.clone()).unwrap();
        ledger.begin_session(today());
        ledger.assign(Partition::Gainers, &symbols(&["AAA", "BBB"]));
        ledger.assign(Partition::Losers, &symbols(&["ZZZ"]));
        ledger.save().unwrap();

        // Restart mid-session: ranks survive
        let reloaded = RankLedger::load(path).unwrap();
        assert!(!reloaded.is_new_session(today()));
        assert_eq!(reloaded.rank(Partition::Gainers, "BBB"), Some(2));
        assert_eq!(reloaded.rank(Partition::Losers, "ZZZ"), Some(1));
        assert_eq!(reloaded.session_date(), Some(today()));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = RankLedger::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(ledger.count(Partition::Gainers), 0);
        assert_eq!(ledger.session_date(), None);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "{not json").unwrap();

        let err = RankLedger::load(path).unwrap_err();
        assert!(matches!(err, AppError::Ledger(_)));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");

        let mut ledger = RankLedger::load(path.clone()).unwrap();
        ledger.begin_session(today());
        ledger.assign(Partition::Gainers, &symbols(&["AAA"]));
        ledger.save().unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["ledger.json".to_string()]);
    }
}
