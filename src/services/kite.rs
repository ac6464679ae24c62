use crate::error::AppError;
use crate::models::{Candle, Instrument, QuoteSnapshot};
use crate::services::poller::QuoteSource;
use crate::services::session::Credentials;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use isahc::{config::Configurable, prelude::*, HttpClient};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration as StdDuration, SystemTime};
use tokio::time::sleep;

#[derive(Debug)]
pub enum KiteError {
    Http(isahc::Error),
    Serialization(serde_json::Error),
    InvalidResponse(String),
    Api { status: u16, message: String },
    NoData,
}

impl From<isahc::Error> for KiteError {
    fn from(error: isahc::Error) -> Self {
        KiteError::Http(error)
    }
}

impl From<serde_json::Error> for KiteError {
    fn from(error: serde_json::Error) -> Self {
        KiteError::Serialization(error)
    }
}

impl std::fmt::Display for KiteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KiteError::Http(e) => write!(f, "HTTP error: {}", e),
            KiteError::Serialization(e) => write!(f, "Serialization error: {}", e),
            KiteError::InvalidResponse(s) => write!(f, "Invalid response: {}", s),
            KiteError::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            KiteError::NoData => write!(f, "No data available"),
        }
    }
}

impl std::error::Error for KiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KiteError::Http(e) => Some(e),
            KiteError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KiteError> for AppError {
    fn from(error: KiteError) -> Self {
        match error {
            KiteError::Http(e) => AppError::Network(e.to_string()),
            KiteError::Serialization(e) => AppError::Parse(e.to_string()),
            KiteError::InvalidResponse(s) => AppError::Parse(s),
            KiteError::Api { status, message } => {
                AppError::Network(format!("API error ({}): {}", status, message))
            }
            KiteError::NoData => AppError::NotFound("no data available".to_string()),
        }
    }
}

/// Kite Connect HTTP client for quotes, candles and the instrument dump
pub struct KiteClient {
    client: HttpClient,
    credentials: Credentials,
    base_url: String,
    rate_limit_per_minute: u32,
    request_timestamps: Vec<SystemTime>,
}

impl KiteClient {
    pub fn new(credentials: Credentials, rate_limit_per_minute: u32) -> Result<Self, KiteError> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;

        Ok(KiteClient {
            client,
            credentials,
            base_url: "https://api.kite.trade".to_string(),
            rate_limit_per_minute,
            request_timestamps: Vec::new(),
        })
    }

    /// Sliding one-minute window; waits when the call budget is spent
    async fn enforce_rate_limit(&mut self) {
        let current_time = SystemTime::now();

        self.request_timestamps.retain(|&timestamp| {
            current_time
                .duration_since(timestamp)
                .unwrap_or(StdDuration::from_secs(0))
                < StdDuration::from_secs(60)
        });

        if self.request_timestamps.len() >= self.rate_limit_per_minute as usize {
            if let Some(&oldest_request) = self.request_timestamps.first() {
                let wait_time = StdDuration::from_secs(60)
                    - current_time
                        .duration_since(oldest_request)
                        .unwrap_or(StdDuration::from_secs(0));
                if !wait_time.is_zero() {
                    sleep(wait_time + StdDuration::from_millis(100)).await;
                }
            }
        }

        self.request_timestamps.push(current_time);
    }

    async fn get_text(&mut self, url: &str) -> Result<String, KiteError> {
        const MAX_RETRIES: u32 = 3;

        let mut last_error: Option<String> = None;

        for attempt in 0..MAX_RETRIES {
            self.enforce_rate_limit().await;

            if attempt > 0 {
                let delay =
                    StdDuration::from_secs_f64(2.0_f64.powi(attempt as i32 - 1) + rand::random::<f64>());
                let reason = last_error.as_deref().unwrap_or("unknown error");
                tracing::info!(
                    "Kite API retry: attempt {}/{} - reason: {}, waiting {:.1}s",
                    attempt + 1,
                    MAX_RETRIES,
                    reason,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }

            tracing::debug!(url, attempt = attempt + 1, "Kite API request");

            let request = isahc::Request::builder()
                .uri(url)
                .method("GET")
                .header("X-Kite-Version", "3")
                .header("Authorization", self.credentials.authorization())
                .body(())
                .map_err(|e| KiteError::InvalidResponse(format!("request build error: {}", e)))?;

            match self.client.send_async(request).await {
                Ok(mut resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        match resp.text().await {
                            Ok(text) => return Ok(text),
                            Err(e) => {
                                last_error = Some(format!("response body error: {}", e));
                                continue;
                            }
                        }
                    } else if status.as_u16() == 429 || status.is_server_error() {
                        last_error = Some(format!(
                            "{} - {}",
                            status.as_u16(),
                            status.canonical_reason().unwrap_or("Unknown")
                        ));
                        continue;
                    } else {
                        // 4xx other than 429: a request problem, not retryable
                        let message = resp.text().await.unwrap_or_default();
                        return Err(KiteError::Api {
                            status: status.as_u16(),
                            message,
                        });
                    }
                }
                Err(e) => {
                    last_error = Some(format!("network error: {}", e));
                    continue;
                }
            }
        }

        Err(KiteError::InvalidResponse(format!(
            "max retries exceeded: {}",
            last_error.unwrap_or_else(|| "unknown error".to_string())
        )))
    }

    async fn get_json(&mut self, url: &str) -> Result<Value, KiteError> {
        let text = self.get_text(url).await?;
        let data: Value = serde_json::from_str(&text)?;

        if data.get("status").and_then(|s| s.as_str()) == Some("error") {
            let message = data
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown API error")
                .to_string();
            return Err(KiteError::Api { status: 200, message });
        }

        Ok(data)
    }

    /// Fetch the full NSE instrument dump (CSV) for the directory cache
    pub async fn instruments_csv(&mut self) -> Result<String, KiteError> {
        let url = format!("{}/instruments/{}", self.base_url, crate::constants::EXCHANGE);
        let text = self.get_text(&url).await?;
        if text.trim().is_empty() {
            return Err(KiteError::NoData);
        }
        Ok(text)
    }

    async fn historical(
        &mut self,
        token: u32,
        interval: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Candle>, KiteError> {
        let url = format!(
            "{}/instruments/historical/{}/{}?from={}+00:00:00&to={}+23:59:59",
            self.base_url, token, interval, from, to
        );

        let response = self.get_json(&url).await?;
        let candles = response
            .get("data")
            .and_then(|d| d.get("candles"))
            .and_then(|c| c.as_array())
            .ok_or_else(|| KiteError::InvalidResponse("missing data.candles".to_string()))?;

        let mut result = Vec::with_capacity(candles.len());
        for (i, row) in candles.iter().enumerate() {
            let fields = row
                .as_array()
                .ok_or_else(|| KiteError::InvalidResponse(format!("candle {} not an array", i)))?;
            if fields.len() < 6 {
                return Err(KiteError::InvalidResponse(format!(
                    "candle {} has {} fields",
                    i,
                    fields.len()
                )));
            }

            let ts = fields[0]
                .as_str()
                .ok_or_else(|| KiteError::InvalidResponse(format!("candle {} timestamp", i)))?;
            let time = parse_candle_timestamp(ts)
                .ok_or_else(|| KiteError::InvalidResponse(format!("bad timestamp '{}'", ts)))?;

            result.push(Candle::new(
                time,
                fields[1].as_f64().unwrap_or(0.0),
                fields[2].as_f64().unwrap_or(0.0),
                fields[3].as_f64().unwrap_or(0.0),
                fields[4].as_f64().unwrap_or(0.0),
                fields[5].as_u64().unwrap_or(0),
            ));
        }

        result.sort_by(|a, b| a.time.cmp(&b.time));
        Ok(result)
    }
}

/// Candle timestamps come as "2026-08-05T09:15:00+0530"
fn parse_candle_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(ts))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl QuoteSource for KiteClient {
    async fn quotes(
        &mut self,
        instruments: &[Instrument],
    ) -> crate::error::Result<HashMap<u32, QuoteSnapshot>> {
        if instruments.is_empty() {
            return Ok(HashMap::new());
        }

        let query: Vec<String> = instruments
            .iter()
            .map(|inst| format!("i={}", inst.quote_key()))
            .collect();
        let url = format!("{}/quote?{}", self.base_url, query.join("&"));

        let response = self.get_json(&url).await.map_err(AppError::from)?;
        let data = response
            .get("data")
            .and_then(|d| d.as_object())
            .ok_or_else(|| AppError::Parse("quote response missing data".to_string()))?;

        let mut quotes = HashMap::new();
        for inst in instruments {
            let Some(entry) = data.get(&inst.quote_key()) else {
                continue;
            };

            // last_price and ohlc.close are required; volume defaults to 0
            let Some(last_price) = entry.get("last_price").and_then(|v| v.as_f64()) else {
                continue;
            };
            let Some(prev_close) = entry
                .get("ohlc")
                .and_then(|o| o.get("close"))
                .and_then(|v| v.as_f64())
            else {
                continue;
            };
            let volume = entry
                .get("volume")
                .or_else(|| entry.get("volume_traded"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0);

            quotes.insert(
                inst.token,
                QuoteSnapshot {
                    last_price,
                    prev_close,
                    volume,
                },
            );
        }

        Ok(quotes)
    }

    async fn intraday_candles(
        &mut self,
        token: u32,
        day: NaiveDate,
    ) -> crate::error::Result<Vec<Candle>> {
        self.historical(token, "5minute", day, day)
            .await
            .map_err(AppError::from)
    }

    async fn daily_candles(
        &mut self,
        token: u32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> crate::error::Result<Vec<Candle>> {
        self.historical(token, "day", from, to)
            .await
            .map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candle_timestamp_offsets() {
        // Kite's compact offset and strict RFC 3339 both parse
        let t1 = parse_candle_timestamp("2026-08-05T09:15:00+0530").unwrap();
        let t2 = parse_candle_timestamp("2026-08-05T09:15:00+05:30").unwrap();
        assert_eq!(t1, t2);
        assert_eq!(t1.to_rfc3339(), "2026-08-05T03:45:00+00:00");

        assert!(parse_candle_timestamp("yesterday").is_none());
    }
}
