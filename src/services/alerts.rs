use crate::models::{MetricRecord, Partition};

/// One rendered table cell with its flash flag
#[derive(Debug, Clone, PartialEq)]
pub struct CellAlert {
    pub alert: bool,
    pub display: String,
}

/// Classify a checkpoint value against its threshold band.
///
/// Gainer columns flash while the value is still BELOW the threshold, loser
/// columns while it is still above the negated threshold: the board
/// highlights moves that have not yet reached the level, not breakouts.
/// An absent value renders blank with no alert.
pub fn classify(value: Option<f64>, threshold: f64, direction: Partition) -> CellAlert {
    let Some(v) = value else {
        return CellAlert {
            alert: false,
            display: String::new(),
        };
    };

    let alert = match direction {
        Partition::Gainers => v < threshold,
        Partition::Losers => v > -threshold,
    };

    CellAlert {
        alert,
        display: MetricRecord::pct_display(Some(v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gainer_alert_below_threshold() {
        assert!(classify(Some(1.2), 1.5, Partition::Gainers).alert);
        assert!(!classify(Some(1.8), 1.5, Partition::Gainers).alert);
        assert!(!classify(Some(1.5), 1.5, Partition::Gainers).alert);
    }

    #[test]
    fn test_loser_alert_above_negated_threshold() {
        assert!(classify(Some(-1.2), 1.5, Partition::Losers).alert);
        assert!(!classify(Some(-1.8), 1.5, Partition::Losers).alert);
        assert!(!classify(Some(-1.5), 1.5, Partition::Losers).alert);
    }

    #[test]
    fn test_missing_value_is_blank_without_alert() {
        let cell = classify(None, 1.5, Partition::Gainers);
        assert!(!cell.alert);
        assert_eq!(cell.display, "");
    }

    #[test]
    fn test_display_keeps_two_decimals() {
        assert_eq!(classify(Some(1.2), 1.5, Partition::Gainers).display, "1.20");
    }
}
