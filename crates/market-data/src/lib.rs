use crate::responses::ChartEnvelope;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use configuration::ProviderConfig;
use core_types::PriceBar;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::collections::HashMap;
use std::time::Duration;

pub mod error;
pub mod responses;

// --- Public API ---
pub use error::MarketDataError;

/// The generic, abstract interface to a daily price-history provider.
/// This trait is the contract the analysis pipeline uses, allowing the
/// underlying implementation (live or canned) to be swapped out.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Fetches daily bars for a ticker over an end-inclusive date window.
    ///
    /// The result is sorted ascending by date with at most one bar per
    /// trading day. Days the provider has no usable quote for are absent,
    /// and an empty result means the ticker had no data in the window.
    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketDataError>;
}

/// A concrete implementation of the `SeriesProvider` against the public
/// chart endpoint, which serves quotes and corporate actions in one call.
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn new(config: &ProviderConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).expect("Invalid provider user agent"),
        );

        Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("Failed to build reqwest client"),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SeriesProvider for YahooChartClient {
    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        // The endpoint treats period2 as exclusive. Asking for midnight of
        // the day after `end` keeps the end date itself inside the window.
        let period1 = day_start_utc(start);
        let period2 = day_start_utc(end.succ_opt().unwrap_or(end));

        tracing::debug!(
            "Requesting daily chart data for {} from {} to {}",
            ticker,
            start,
            end
        );

        let envelope = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div|split".to_string()),
                ("includeAdjustedClose", "false".to_string()),
            ])
            .send()
            .await?
            .json::<ChartEnvelope>()
            .await?;

        bars_from_chart(ticker, envelope)
    }
}

/// Flattens a chart envelope into the bar series the rest of the system
/// works with.
///
/// Rows with a null quote are dropped, corporate actions are re-keyed from
/// timestamps onto trading days, and the output is sorted and de-duplicated
/// by date. An empty series is a valid outcome here; deciding whether that
/// is an error belongs to the caller.
fn bars_from_chart(ticker: &str, envelope: ChartEnvelope) -> Result<Vec<PriceBar>, MarketDataError> {
    if let Some(error) = envelope.chart.error {
        return Err(MarketDataError::Api {
            code: error.code,
            description: error.description,
        });
    }

    let result = envelope
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| {
            MarketDataError::InvalidData("the response carried no chart result".to_string())
        })?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut dividends: HashMap<NaiveDate, f64> = HashMap::new();
    let mut splits: HashMap<NaiveDate, f64> = HashMap::new();
    if let Some(events) = result.events {
        for event in events.dividends.into_values() {
            match trading_day(event.date, offset) {
                Some(day) => *dividends.entry(day).or_insert(0.0) += event.amount,
                None => tracing::warn!(
                    "Skipping dividend event for {} with invalid timestamp {}",
                    ticker,
                    event.date
                ),
            }
        }
        for event in events.splits.into_values() {
            match trading_day(event.date, offset) {
                Some(day) => {
                    splits.insert(day, guarded_ratio(event.numerator, event.denominator));
                }
                None => tracing::warn!(
                    "Skipping split event for {} with invalid timestamp {}",
                    ticker,
                    event.date
                ),
            }
        }
    }

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (index, timestamp) in result.timestamp.iter().copied().enumerate() {
        let day = trading_day(timestamp, offset).ok_or_else(|| {
            MarketDataError::InvalidData(format!("invalid bar timestamp: {timestamp}"))
        })?;

        // Halted or not-yet-final days arrive as null quote slots.
        let (Some(open), Some(high), Some(low), Some(close)) = (
            value_at(&quote.open, index),
            value_at(&quote.high, index),
            value_at(&quote.low, index),
            value_at(&quote.close, index),
        ) else {
            tracing::debug!("Skipping {} on {}: no complete quote", ticker, day);
            continue;
        };

        bars.push(PriceBar {
            date: day,
            open,
            high,
            low,
            close,
            volume: value_at(&quote.volume, index).unwrap_or(0),
            dividend: dividends.get(&day).copied().unwrap_or(0.0),
            split_ratio: splits.get(&day).copied().unwrap_or(0.0),
        });
    }

    bars.sort_by_key(|bar| bar.date);
    bars.dedup_by_key(|bar| bar.date);
    Ok(bars)
}

/// Converts an epoch timestamp into the exchange-local trading day.
///
/// Bar timestamps arrive in UTC. Applying the `gmtoffset` from the response
/// metadata keeps a session stamped late in the UTC evening on its actual
/// local calendar day.
fn trading_day(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    Utc.timestamp_opt(timestamp + gmtoffset, 0)
        .single()
        .map(|moment| moment.date_naive())
}

fn day_start_utc(day: NaiveDate) -> i64 {
    day.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().timestamp())
        .unwrap_or(0)
}

fn value_at<T: Copy>(values: &[Option<T>], index: usize) -> Option<T> {
    values.get(index).copied().flatten()
}

fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(payload: &str) -> ChartEnvelope {
        serde_json::from_str(payload).expect("test payload should deserialize")
    }

    // Timestamps are 09:30 US/Eastern sessions in early January 2024.
    const JAN_2: i64 = 1704205800;
    const JAN_3: i64 = 1704292200;
    const JAN_4: i64 = 1704378600;

    #[test]
    fn converts_a_full_chart_response_into_bars() {
        let envelope = parse(&format!(
            r#"{{"chart":{{"result":[{{
                "meta":{{"symbol":"TEST","currency":"USD","gmtoffset":-18000}},
                "timestamp":[{JAN_2},{JAN_3},{JAN_4}],
                "events":{{
                    "dividends":{{"{JAN_3}":{{"amount":0.25,"date":{JAN_3}}}}},
                    "splits":{{"{JAN_4}":{{"date":{JAN_4},"numerator":4.0,"denominator":1.0}}}}
                }},
                "indicators":{{"quote":[{{
                    "open":[100.0,101.5,102.0],
                    "high":[101.0,103.0,104.0],
                    "low":[99.5,100.5,101.5],
                    "close":[100.5,102.0,103.5],
                    "volume":[1200000,1350000,900000]
                }}]}}
            }}],"error":null}}}}"#
        ));

        let bars = bars_from_chart("TEST", envelope).unwrap();
        assert_eq!(bars.len(), 3);

        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 100.5);
        assert_eq!(bars[0].volume, 1_200_000);
        assert_eq!(bars[0].dividend, 0.0);

        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(bars[1].dividend, 0.25);
        assert_eq!(bars[1].split_ratio, 0.0);

        assert_eq!(bars[2].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(bars[2].split_ratio, 4.0);
    }

    #[test]
    fn skips_rows_without_a_complete_quote() {
        let envelope = parse(&format!(
            r#"{{"chart":{{"result":[{{
                "meta":{{"symbol":"TEST","gmtoffset":0}},
                "timestamp":[{JAN_2},{JAN_3}],
                "indicators":{{"quote":[{{
                    "open":[100.0,null],
                    "high":[101.0,null],
                    "low":[99.5,null],
                    "close":[100.5,null],
                    "volume":[1200000,null]
                }}]}}
            }}],"error":null}}}}"#
        ));

        let bars = bars_from_chart("TEST", envelope).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 100.5);
    }

    #[test]
    fn gmtoffset_shifts_utc_stamps_onto_the_local_day() {
        // 00:30 UTC on Jan 3rd is still the evening of Jan 2nd in New York.
        let after_utc_midnight = 1704241800;
        let envelope = parse(&format!(
            r#"{{"chart":{{"result":[{{
                "meta":{{"symbol":"TEST","gmtoffset":-18000}},
                "timestamp":[{after_utc_midnight}],
                "indicators":{{"quote":[{{
                    "open":[100.0],"high":[101.0],"low":[99.5],"close":[100.5],"volume":[1000]
                }}]}}
            }}],"error":null}}}}"#
        ));

        let bars = bars_from_chart("TEST", envelope).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn sorts_and_deduplicates_by_trading_day() {
        let envelope = parse(&format!(
            r#"{{"chart":{{"result":[{{
                "meta":{{"symbol":"TEST","gmtoffset":0}},
                "timestamp":[{JAN_4},{JAN_2},{JAN_2}],
                "indicators":{{"quote":[{{
                    "open":[102.0,100.0,100.1],
                    "high":[104.0,101.0,101.1],
                    "low":[101.5,99.5,99.6],
                    "close":[103.5,100.5,100.6],
                    "volume":[900000,1200000,1200001]
                }}]}}
            }}],"error":null}}}}"#
        ));

        let bars = bars_from_chart("TEST", envelope).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn surfaces_the_provider_error_body() {
        let envelope = parse(
            r#"{"chart":{"result":null,"error":{
                "code":"Not Found",
                "description":"No data found, symbol may be delisted"
            }}}"#,
        );

        let err = bars_from_chart("NOPE", envelope).unwrap_err();
        match err {
            MarketDataError::Api { code, description } => {
                assert_eq!(code, "Not Found");
                assert!(description.contains("No data found"));
            }
            other => panic!("expected an Api error, got {other:?}"),
        }
    }

    #[test]
    fn a_response_with_neither_result_nor_error_is_invalid() {
        let envelope = parse(r#"{"chart":{"result":null,"error":null}}"#);
        assert!(matches!(
            bars_from_chart("TEST", envelope),
            Err(MarketDataError::InvalidData(_))
        ));
    }

    #[test]
    fn an_empty_timestamp_array_yields_an_empty_series() {
        let envelope = parse(
            r#"{"chart":{"result":[{
                "meta":{"symbol":"TEST","gmtoffset":0},
                "timestamp":[],
                "indicators":{"quote":[{}]}
            }],"error":null}}"#,
        );

        let bars = bars_from_chart("TEST", envelope).unwrap();
        assert!(bars.is_empty());
    }
}
