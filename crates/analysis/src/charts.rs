use chrono::NaiveDate;
use core_types::{AggregationPeriod, DailyReturn, PriceBar};
use returns::{PeriodicReturn, ReturnEngine};
use serde::{Deserialize, Serialize};

/// A dated point on the cumulative-return line chart, in percent: the
/// compounded return since the start of the range, once on price alone and
/// once with dividends folded back in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub price_return_pct: f64,
    pub total_return_pct: f64,
}

/// One bar of a periodic-return chart, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicBar {
    pub label: String,
    pub period_end: NaiveDate,
    pub value_pct: f64,
}

/// A close/volume pair for the dual-axis price chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceVolumePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
}

/// The daily total returns (in percent) that fall inside one calendar
/// bucket, for the return-distribution box plot. Computing quartiles and
/// whiskers is the renderer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionGroup {
    pub label: String,
    pub values_pct: Vec<f64>,
}

/// A single cash dividend for the dividend-timeline chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendPayment {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Everything the presentation layer needs to draw the five standard charts
/// without doing any computation of its own.
///
/// `dividends` may be empty; the front end shows a "no dividends" note in
/// that case instead of an empty chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub cumulative: Vec<CumulativePoint>,
    pub monthly_returns: Vec<PeriodicBar>,
    pub quarterly_returns: Vec<PeriodicBar>,
    pub yearly_returns: Vec<PeriodicBar>,
    pub price_volume: Vec<PriceVolumePoint>,
    /// The granularity the request asked for; only the distribution groups
    /// follow it, the three periodic charts always cover all granularities.
    pub distribution_period: AggregationPeriod,
    pub distribution: Vec<DistributionGroup>,
    pub dividends: Vec<DividendPayment>,
}

impl ChartData {
    /// Assembles the chart payloads from the fetched bars and the derived
    /// return series.
    pub fn build(
        engine: &ReturnEngine,
        bars: &[PriceBar],
        series: &[DailyReturn],
        distribution_period: AggregationPeriod,
    ) -> Self {
        Self {
            cumulative: cumulative_returns(series),
            monthly_returns: periodic_bars(engine.aggregate(series, AggregationPeriod::Monthly)),
            quarterly_returns: periodic_bars(
                engine.aggregate(series, AggregationPeriod::Quarterly),
            ),
            yearly_returns: periodic_bars(engine.aggregate(series, AggregationPeriod::Yearly)),
            price_volume: bars
                .iter()
                .map(|bar| PriceVolumePoint {
                    date: bar.date,
                    close: bar.close,
                    volume: bar.volume,
                })
                .collect(),
            distribution_period,
            distribution: engine
                .group_by_period(series, distribution_period)
                .into_iter()
                .map(|(label, values)| DistributionGroup {
                    label,
                    values_pct: values.into_iter().map(|value| value * 100.0).collect(),
                })
                .collect(),
            dividends: bars
                .iter()
                .filter(|bar| bar.pays_dividend())
                .map(|bar| DividendPayment {
                    date: bar.date,
                    amount: bar.dividend,
                })
                .collect(),
        }
    }
}

/// Compounds the daily series into running cumulative returns, in percent.
/// One point per return day, so a series of `n` bars yields `n - 1` points.
fn cumulative_returns(series: &[DailyReturn]) -> Vec<CumulativePoint> {
    let mut price_growth = 1.0;
    let mut total_growth = 1.0;
    series
        .iter()
        .map(|day| {
            price_growth *= 1.0 + day.price_return;
            total_growth *= 1.0 + day.total_return;
            CumulativePoint {
                date: day.date,
                price_return_pct: (price_growth - 1.0) * 100.0,
                total_return_pct: (total_growth - 1.0) * 100.0,
            }
        })
        .collect()
}

fn periodic_bars(buckets: Vec<PeriodicReturn>) -> Vec<PeriodicBar> {
    buckets
        .into_iter()
        .map(|bucket| PeriodicBar {
            label: bucket.label,
            period_end: bucket.period_end,
            value_pct: bucket.value * 100.0,
        })
        .collect()
}
