use crate::constants::MARKET_TIMEZONE;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use std::time::Duration;

/// Trading hours configuration for the NSE cash session
pub struct MarketHours {
    pub open: (u32, u32),  // (9, 15)
    pub close: (u32, u32), // (15, 30)
    pub timezone: &'static str,
    pub weekdays_only: bool,
}

impl Default for MarketHours {
    fn default() -> Self {
        Self {
            open: (9, 15),
            close: (15, 30),
            timezone: MARKET_TIMEZONE,
            weekdays_only: true,
        }
    }
}

fn market_tz(config: &MarketHours) -> Option<Tz> {
    match config.timezone.parse() {
        Ok(tz) => Some(tz),
        Err(e) => {
            tracing::warn!("Failed to parse timezone '{}': {}", config.timezone, e);
            None
        }
    }
}

/// Check whether `now` falls inside the trading session
pub fn is_market_open_at(now: DateTime<Utc>) -> bool {
    let config = MarketHours::default();
    let Some(tz) = market_tz(&config) else {
        return false;
    };

    let local = now.with_timezone(&tz);

    if config.weekdays_only {
        match local.weekday() {
            Weekday::Sat | Weekday::Sun => return false,
            _ => {}
        }
    }

    let minute_of_day = local.hour() * 60 + local.minute();
    let open = config.open.0 * 60 + config.open.1;
    let close = config.close.0 * 60 + config.close.1;
    minute_of_day >= open && minute_of_day < close
}

pub fn is_market_open() -> bool {
    is_market_open_at(Utc::now())
}

/// Today's calendar date in the exchange timezone; session boundaries roll
/// on this date, not on UTC midnight
pub fn market_date() -> NaiveDate {
    let config = MarketHours::default();
    match market_tz(&config) {
        Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
        None => Utc::now().date_naive(),
    }
}

/// Poll cadence: tight while the market trades, relaxed when it is closed
pub fn poll_interval(trading: Duration, non_trading: Duration) -> Duration {
    if is_market_open() {
        trading
    } else {
        non_trading
    }
}
