use crate::report::PerformanceMetrics;
use serde::{Deserialize, Serialize};

/// One labelled row of the key-metrics summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub metric: String,
    pub value: String,
}

impl SummaryRow {
    fn new(metric: &str, value: String) -> Self {
        Self {
            metric: metric.to_string(),
            value,
        }
    }
}

/// Builds the ordered key-metrics table shown beside the charts.
///
/// Ratios are scaled to percentages and everything is rendered to two decimal
/// places. `dividend_payments` and `total_dividends` come straight from the
/// bar series (days with a dividend and their sum); this function only
/// formats, it never computes.
pub fn build_summary(
    metrics: &PerformanceMetrics,
    dividend_payments: usize,
    total_dividends: f64,
) -> Vec<SummaryRow> {
    vec![
        SummaryRow::new(
            "Total Return (%)",
            format!("{:.2}", metrics.total_return * 100.0),
        ),
        SummaryRow::new(
            "Annualized Return (CAGR) (%)",
            format!("{:.2}", metrics.cagr * 100.0),
        ),
        SummaryRow::new(
            "Annualized Volatility (%)",
            format!("{:.2}", metrics.annualized_volatility * 100.0),
        ),
        SummaryRow::new("Sharpe Ratio", format!("{:.2}", metrics.sharpe_ratio)),
        SummaryRow::new(
            "Maximum Drawdown (%)",
            format!("{:.2}", metrics.max_drawdown * 100.0),
        ),
        SummaryRow::new(
            "Number of Dividend Payments",
            dividend_payments.to_string(),
        ),
        SummaryRow::new(
            "Total Dividends per Share",
            format!("{total_dividends:.2}"),
        ),
    ]
}
