use serde::Deserialize;
use std::collections::HashMap;

// The chart endpoint wraps everything in a `chart` node that carries either
// a one-element `result` array or an `error` object, never both.

/// The top-level envelope of a chart response.
#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartNode,
}

#[derive(Debug, Deserialize)]
pub struct ChartNode {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartApiError>,
}

/// The error body the endpoint returns instead of a result.
#[derive(Debug, Deserialize)]
pub struct ChartApiError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(default)]
    pub events: Option<ChartEvents>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,
    #[serde(default)]
    pub currency: Option<String>,
    /// Seconds to add to the UTC bar timestamps to land in the exchange's
    /// local session.
    #[serde(default)]
    pub gmtoffset: i64,
}

/// Corporate actions, keyed by the epoch timestamp they apply to.
#[derive(Debug, Default, Deserialize)]
pub struct ChartEvents {
    #[serde(default)]
    pub dividends: HashMap<String, DividendEvent>,
    #[serde(default)]
    pub splits: HashMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
pub struct DividendEvent {
    pub amount: f64,
    pub date: i64,
}

#[derive(Debug, Deserialize)]
pub struct SplitEvent {
    pub date: i64,
    pub numerator: f64,
    pub denominator: f64,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    pub quote: Vec<ChartQuote>,
}

/// Parallel per-bar arrays. A null slot means the exchange published no
/// usable quote for that timestamp.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}
