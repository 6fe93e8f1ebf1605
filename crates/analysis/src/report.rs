use crate::charts::ChartData;
use chrono::NaiveDate;
use core_types::PriceBar;
use returns::{PerformanceMetrics, SummaryRow};
use serde::{Deserialize, Serialize};

/// One row of the full data table: a fetched bar joined with the returns
/// derived for that day.
///
/// The first bar of a range has no prior close, so its return cells are
/// `None` and render as blanks in the table and the CSV snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarWithReturns {
    #[serde(flatten)]
    pub bar: PriceBar,
    pub price_return: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub total_return: Option<f64>,
}

/// The complete result of one analysis request: scalar metrics, the
/// formatted summary, the chart payloads and the full data table.
///
/// This is the single payload the web handler serializes and the CLI prints
/// from; nothing downstream recomputes anything.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub metrics: PerformanceMetrics,
    pub summary: Vec<SummaryRow>,
    pub charts: ChartData,
    pub table: Vec<BarWithReturns>,
}
