//! # Meridian Analysis Pipeline
//!
//! This crate ties the system together: it validates a request, fetches the
//! daily history through the provider abstraction, derives returns with the
//! calculation engine, and assembles the report the presentation layer
//! serves. It is the only crate that knows the whole pipeline.
//!
//! ## Public API
//!
//! - `AnalysisService`: The orchestrator; one instance serves all requests.
//! - `AnalysisRequest`: The caller's inputs, with optional dates and rate.
//! - `AnalysisReport`: The complete result payload.
//! - `AnalysisError`: Everything that can stop a request, each variant with
//!   one human-readable message.

use chrono::{Duration, Local, NaiveDate};
use configuration::AnalysisDefaults;
use core_types::{AggregationPeriod, DailyReturn, PriceBar};
use market_data::SeriesProvider;
use returns::{ReturnEngine, build_summary};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

pub mod charts;
pub mod error;
pub mod export;
pub mod report;
pub mod validate;

// Re-export the key components to create a clean, public-facing API.
pub use charts::ChartData;
pub use error::AnalysisError;
pub use report::{AnalysisReport, BarWithReturns};
pub use validate::validate_range;

/// One analysis invocation as the caller describes it.
///
/// Dates stay raw strings here; the validator owns parsing them. Omitted
/// dates fall back to the configured lookback window ending today, and an
/// omitted rate falls back to the configured default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub ticker: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Granularity for the return-distribution grouping.
    #[serde(default)]
    pub period: AggregationPeriod,
    /// Annual risk-free rate for the Sharpe ratio, as a fraction.
    #[serde(default)]
    pub risk_free_rate: Option<f64>,
}

/// The orchestrator for the whole pipeline. Holds the provider, the
/// calculation engine and the configured per-request defaults; one instance
/// serves every request.
pub struct AnalysisService {
    provider: Arc<dyn SeriesProvider>,
    engine: ReturnEngine,
    defaults: AnalysisDefaults,
}

impl AnalysisService {
    pub fn new(provider: Arc<dyn SeriesProvider>, defaults: AnalysisDefaults) -> Self {
        Self {
            provider,
            engine: ReturnEngine::new(),
            defaults,
        }
    }

    /// Runs the full pipeline for one request.
    ///
    /// # Arguments
    ///
    /// * `request` - The caller's inputs; see `AnalysisRequest` for the
    ///   defaulting rules.
    ///
    /// # Returns
    ///
    /// The complete `AnalysisReport`, or the single `AnalysisError` that
    /// stopped the request.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        // 1. Validate
        let ticker = request.ticker.trim();
        if ticker.is_empty() {
            return Err(AnalysisError::MissingTicker);
        }
        let (start, end) = self.resolve_window(request)?;

        tracing::info!("Running analysis for {} from {} to {}", ticker, start, end);

        // 2. Fetch
        let bars = self.provider.fetch_daily_bars(ticker, start, end).await?;
        if bars.is_empty() {
            return Err(AnalysisError::NoDataFound(ticker.to_string()));
        }

        // 3. Derive
        let series = self.engine.derive_total_return(&bars);
        let daily_totals: Vec<f64> = series.iter().map(|day| day.total_return).collect();

        // 4. Measure
        let risk_free_rate = request
            .risk_free_rate
            .unwrap_or(self.defaults.risk_free_rate);
        let metrics = self.engine.performance_metrics(&daily_totals, risk_free_rate);

        // 5. Present
        let dividend_payments = bars.iter().filter(|bar| bar.pays_dividend()).count();
        let total_dividends: f64 = bars.iter().map(|bar| bar.dividend).sum();
        let summary = build_summary(&metrics, dividend_payments, total_dividends);
        let charts = ChartData::build(&self.engine, &bars, &series, request.period);
        let table = join_table(&bars, &series);

        tracing::info!(
            "Analysis for {} finished: {} bars, {} dividend payments",
            ticker,
            table.len(),
            dividend_payments
        );

        Ok(AnalysisReport {
            ticker: ticker.to_string(),
            start_date: start,
            end_date: end,
            metrics,
            summary,
            charts,
            table,
        })
    }

    /// Writes the report's data table as a CSV download snapshot and returns
    /// the path it landed at.
    pub fn export_snapshot(&self, report: &AnalysisReport) -> Result<PathBuf, AnalysisError> {
        export::write_csv_snapshot(
            &report.table,
            &report.ticker,
            report.start_date,
            report.end_date,
            &self.export_dir(),
        )
    }

    /// The directory CSV snapshots are written to and served from.
    pub fn export_dir(&self) -> PathBuf {
        self.defaults
            .export_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Turns the request's raw date strings into a validated window,
    /// falling back to the configured lookback window ending today.
    fn resolve_window(
        &self,
        request: &AnalysisRequest,
    ) -> Result<(NaiveDate, NaiveDate), AnalysisError> {
        let today = Local::now().date_naive();

        let end = match request.end_date.as_deref() {
            Some(raw) => validate::parse_date(raw)?,
            None => today,
        };
        let start = match request.start_date.as_deref() {
            Some(raw) => validate::parse_date(raw)?,
            None => end - Duration::days(self.defaults.lookback_days),
        };

        validate::check_window(start, end, today)?;
        Ok((start, end))
    }
}

/// Joins the fetched bars with their derived returns, one row per bar. The
/// first bar keeps empty return cells.
fn join_table(bars: &[PriceBar], series: &[DailyReturn]) -> Vec<BarWithReturns> {
    bars.iter()
        .enumerate()
        .map(|(index, bar)| {
            let derived = index.checked_sub(1).and_then(|prior| series.get(prior));
            BarWithReturns {
                bar: bar.clone(),
                price_return: derived.map(|day| day.price_return),
                dividend_yield: derived.map(|day| day.dividend_yield),
                total_return: derived.map(|day| day.total_return),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use market_data::MarketDataError;

    /// A canned provider so the pipeline can run without a network.
    struct StubProvider {
        bars: Vec<PriceBar>,
        fail: bool,
    }

    #[async_trait]
    impl SeriesProvider for StubProvider {
        async fn fetch_daily_bars(
            &self,
            _ticker: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<PriceBar>, MarketDataError> {
            if self.fail {
                return Err(MarketDataError::InvalidData("stubbed outage".to_string()));
            }
            Ok(self.bars.clone())
        }
    }

    fn bar(year: i32, month: u32, day: u32, close: f64, dividend: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 2_000,
            dividend,
            split_ratio: 0.0,
        }
    }

    fn service_with(bars: Vec<PriceBar>) -> AnalysisService {
        AnalysisService::new(
            Arc::new(StubProvider { bars, fail: false }),
            AnalysisDefaults::default(),
        )
    }

    fn request(ticker: &str) -> AnalysisRequest {
        AnalysisRequest {
            ticker: ticker.to_string(),
            start_date: Some("2024-01-02".to_string()),
            end_date: Some("2024-02-01".to_string()),
            period: AggregationPeriod::Monthly,
            risk_free_rate: None,
        }
    }

    #[tokio::test]
    async fn runs_the_whole_pipeline() {
        let service = service_with(vec![
            bar(2024, 1, 2, 100.0, 0.0),
            bar(2024, 1, 3, 102.0, 1.0),
            bar(2024, 2, 1, 99.96, 0.0),
        ]);

        let report = service.run(&request("AAPL")).await.unwrap();

        assert_eq!(report.ticker, "AAPL");
        assert_eq!(report.table.len(), 3);
        assert!(report.table[0].total_return.is_none());
        assert_relative_eq!(
            report.table[1].total_return.unwrap(),
            0.03,
            max_relative = 1e-9
        );
        assert_eq!(report.summary.len(), 7);
        assert_eq!(report.summary[5].value, "1");
        assert_eq!(report.charts.cumulative.len(), 2);
        assert!(report.metrics.max_drawdown <= 0.0);
    }

    #[tokio::test]
    async fn a_blank_ticker_is_rejected_before_fetching() {
        let service = service_with(vec![bar(2024, 1, 2, 100.0, 0.0)]);
        let err = service.run(&request("   ")).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MissingTicker));
    }

    #[tokio::test]
    async fn an_empty_fetch_is_reported_as_no_data() {
        let service = service_with(vec![]);
        let err = service.run(&request("GONE")).await.unwrap_err();
        match err {
            AnalysisError::NoDataFound(ticker) => assert_eq!(ticker, "GONE"),
            other => panic!("expected NoDataFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn provider_failures_surface_as_provider_errors() {
        let service = AnalysisService::new(
            Arc::new(StubProvider {
                bars: vec![],
                fail: true,
            }),
            AnalysisDefaults::default(),
        );
        let err = service.run(&request("AAPL")).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Provider(_)));
    }

    #[tokio::test]
    async fn a_single_bar_still_produces_a_zeroed_report() {
        let service = service_with(vec![bar(2024, 1, 2, 100.0, 0.0)]);
        let report = service.run(&request("AAPL")).await.unwrap();

        assert_eq!(report.table.len(), 1);
        assert!(report.charts.cumulative.is_empty());
        assert_eq!(report.metrics.total_return, 0.0);
        assert_eq!(report.metrics.sharpe_ratio, 0.0);
        assert_eq!(report.summary[0].value, "0.00");
    }

    #[tokio::test]
    async fn omitted_dates_use_the_lookback_window_ending_today() {
        let service = service_with(vec![
            bar(2024, 1, 2, 100.0, 0.0),
            bar(2024, 1, 3, 101.0, 0.0),
        ]);
        let request = AnalysisRequest {
            ticker: "AAPL".to_string(),
            start_date: None,
            end_date: None,
            period: AggregationPeriod::Monthly,
            risk_free_rate: None,
        };

        let report = service.run(&request).await.unwrap();
        let today = Local::now().date_naive();
        assert_eq!(report.end_date, today);
        assert_eq!(report.start_date, today - Duration::days(365));
    }

    #[tokio::test]
    async fn future_dates_are_rejected() {
        let service = service_with(vec![bar(2024, 1, 2, 100.0, 0.0)]);
        let tomorrow = (Local::now().date_naive() + Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();
        let request = AnalysisRequest {
            ticker: "AAPL".to_string(),
            start_date: Some("2024-01-02".to_string()),
            end_date: Some(tomorrow),
            period: AggregationPeriod::Monthly,
            risk_free_rate: None,
        };

        let err = service.run(&request).await.unwrap_err();
        assert!(matches!(err, AnalysisError::FutureDate));
    }

    #[tokio::test]
    async fn export_writes_into_the_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = AnalysisDefaults {
            export_dir: Some(dir.path().to_path_buf()),
            ..AnalysisDefaults::default()
        };
        let service = AnalysisService::new(
            Arc::new(StubProvider {
                bars: vec![bar(2024, 1, 2, 100.0, 0.0), bar(2024, 1, 3, 101.0, 0.0)],
                fail: false,
            }),
            defaults,
        );

        let report = service.run(&request("AAPL")).await.unwrap();
        let path = service.export_snapshot(&report).unwrap();

        assert!(path.starts_with(dir.path()));
        assert!(path.exists());
    }
}
