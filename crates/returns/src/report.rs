use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The standardized scalar summary of a daily total-return series.
///
/// This struct is the final output of the `ReturnEngine` and serves as the
/// data transfer object for performance results throughout the entire system.
/// All values are fractions (0.05 means 5%), not percentages; formatting for
/// display happens elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Compounded return over the whole series.
    pub total_return: f64,
    /// Compound annual growth rate under the 252-trading-day convention.
    pub cagr: f64,
    /// Sample standard deviation of daily returns, annualized.
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough decline of the cumulative curve. Never positive.
    pub max_drawdown: f64,
    pub arithmetic_mean_return: f64,
    pub geometric_mean_return: f64,
}

impl PerformanceMetrics {
    /// Creates a new, zeroed-out report.
    ///
    /// A series with fewer than two observations cannot be measured, so the
    /// engine hands back this instead of an error.
    pub fn zeroed() -> Self {
        Self {
            total_return: 0.0,
            cagr: 0.0,
            annualized_volatility: 0.0,
            sharpe_ratio: 0.0,
            max_drawdown: 0.0,
            arithmetic_mean_return: 0.0,
            geometric_mean_return: 0.0,
        }
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// The compounded total return over one calendar bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicReturn {
    /// Human-readable bucket label: `2024-03`, `2024-Q1` or `2024`.
    pub label: String,
    /// Calendar end of the bucket, regardless of which days actually traded.
    pub period_end: NaiveDate,
    /// Compounded total return over the bucket, as a fraction.
    pub value: f64,
}
