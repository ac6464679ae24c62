use crate::constants::{VOLUME_CRORE, VOLUME_LAKH, VOLUME_THOUSAND};
use std::path::PathBuf;

/// Get data directory from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("MOVERBOARD_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Get watchlist file path from environment variable or use default
pub fn get_watchlist_path() -> PathBuf {
    std::env::var("MOVERBOARD_WATCHLIST")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("watchlist.txt"))
}

/// Path of the cached instrument directory CSV
pub fn instruments_cache_path() -> PathBuf {
    get_data_dir().join("instruments.csv")
}

/// Path of the persisted rank ledger
pub fn rank_ledger_path() -> PathBuf {
    get_data_dir().join("rank_ledger.json")
}

/// Format a traded-volume figure in Indian market notation (K/L/Cr)
pub fn format_volume(volume: f64) -> String {
    if volume >= VOLUME_CRORE {
        format!("{:.2}Cr", volume / VOLUME_CRORE)
    } else if volume >= VOLUME_LAKH {
        format!("{:.2}L", volume / VOLUME_LAKH)
    } else if volume >= VOLUME_THOUSAND {
        format!("{:.1}K", volume / VOLUME_THOUSAND)
    } else {
        format!("{}", volume as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_volume_tiers() {
        assert_eq!(format_volume(0.0), "0");
        assert_eq!(format_volume(999.0), "999");
        assert_eq!(format_volume(1_000.0), "1.0K");
        assert_eq!(format_volume(45_500.0), "45.5K");
        assert_eq!(format_volume(100_000.0), "1.00L");
        assert_eq!(format_volume(2_350_000.0), "23.50L");
        assert_eq!(format_volume(10_000_000.0), "1.00Cr");
        assert_eq!(format_volume(123_456_789.0), "12.35Cr");
    }

    #[test]
    fn test_format_volume_boundaries_exact() {
        // Tier switches exactly at 1e3, 1e5 and 1e7, not one below
        assert_eq!(format_volume(999.9), "999");
        assert_eq!(format_volume(99_999.0), "100.0K");
        assert_eq!(format_volume(9_999_999.0), "100.00L");
    }
}
