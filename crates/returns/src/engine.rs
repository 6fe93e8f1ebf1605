use crate::report::{PerformanceMetrics, PeriodicReturn};
use chrono::{Datelike, NaiveDate};
use core_types::{AggregationPeriod, DailyReturn, PriceBar};
use std::collections::BTreeMap;

/// Trading days per year, used for all annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// A stateless calculator that turns a daily bar series into returns,
/// calendar aggregates and performance metrics.
///
/// Every method is total: degenerate inputs (empty series, zero prior close,
/// constant returns) resolve to zeros instead of errors, so the pipeline
/// always produces a result once data has been fetched.
#[derive(Debug, Default)]
pub struct ReturnEngine {}

impl ReturnEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the per-day price and dividend-adjusted total returns.
    ///
    /// # Arguments
    ///
    /// * `bars` - Daily bars sorted ascending by date.
    ///
    /// # Returns
    ///
    /// One `DailyReturn` per bar after the first. The first bar has no prior
    /// close to compare against, so an input of `n` bars yields `n - 1`
    /// entries, and inputs of length 0 or 1 yield none.
    pub fn derive_total_return(&self, bars: &[PriceBar]) -> Vec<DailyReturn> {
        bars.windows(2)
            .map(|pair| {
                let (prev, bar) = (&pair[0], &pair[1]);
                let price_return = guarded_div(bar.close - prev.close, prev.close);
                let dividend_yield = if bar.pays_dividend() {
                    guarded_div(bar.dividend, prev.close)
                } else {
                    0.0
                };
                DailyReturn {
                    date: bar.date,
                    price_return,
                    dividend_yield,
                    total_return: price_return + dividend_yield,
                }
            })
            .collect()
    }

    /// Compounds daily total returns into calendar buckets.
    ///
    /// A bucket's value is `(1 + r1)(1 + r2)... - 1` over the daily returns
    /// falling inside it. Buckets with no observations do not appear, and the
    /// output is in chronological order.
    pub fn aggregate(
        &self,
        returns: &[DailyReturn],
        period: AggregationPeriod,
    ) -> Vec<PeriodicReturn> {
        let mut growth_by_bucket: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for entry in returns {
            let growth = growth_by_bucket
                .entry(bucket_key(entry.date, period))
                .or_insert(1.0);
            *growth *= 1.0 + entry.total_return;
        }

        growth_by_bucket
            .into_iter()
            .map(|((year, index), growth)| PeriodicReturn {
                label: bucket_label(year, index, period),
                period_end: bucket_end(year, index, period),
                value: growth - 1.0,
            })
            .collect()
    }

    /// Groups raw daily total returns by calendar bucket, for distribution
    /// views that need the individual observations rather than a compounded
    /// value per bucket.
    pub fn group_by_period(
        &self,
        returns: &[DailyReturn],
        period: AggregationPeriod,
    ) -> Vec<(String, Vec<f64>)> {
        let mut values_by_bucket: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
        for entry in returns {
            values_by_bucket
                .entry(bucket_key(entry.date, period))
                .or_default()
                .push(entry.total_return);
        }

        values_by_bucket
            .into_iter()
            .map(|((year, index), values)| (bucket_label(year, index, period), values))
            .collect()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `daily_returns` - The daily total returns, as fractions.
    /// * `annual_risk_free_rate` - The annual risk-free rate; it is spread
    ///   over 252 trading days before entering the Sharpe ratio.
    ///
    /// # Returns
    ///
    /// The full `PerformanceMetrics` report. Fewer than two observations is
    /// a degenerate case, not an error: the report comes back zeroed out.
    pub fn performance_metrics(
        &self,
        daily_returns: &[f64],
        annual_risk_free_rate: f64,
    ) -> PerformanceMetrics {
        if daily_returns.len() < 2 {
            return PerformanceMetrics::zeroed();
        }

        let observations = daily_returns.len() as f64;
        let total_return = compound(daily_returns);

        // --- CAGR ---
        let num_years = observations / TRADING_DAYS_PER_YEAR;
        let cagr = if num_years > 0.0 {
            (1.0 + total_return).powf(1.0 / num_years) - 1.0
        } else {
            0.0
        };

        // --- Volatility ---
        let annualized_volatility = sample_std_dev(daily_returns) * TRADING_DAYS_PER_YEAR.sqrt();

        // --- Sharpe Ratio ---
        let daily_risk_free = annual_risk_free_rate / TRADING_DAYS_PER_YEAR;
        let excess: Vec<f64> = daily_returns.iter().map(|r| r - daily_risk_free).collect();
        let excess_std_dev = sample_std_dev(&excess);
        let sharpe_ratio = if excess_std_dev == 0.0 {
            // A constant series has no measurable risk premium.
            0.0
        } else {
            mean(&excess) / excess_std_dev * TRADING_DAYS_PER_YEAR.sqrt()
        };

        PerformanceMetrics {
            total_return,
            cagr,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown: max_drawdown(daily_returns),
            arithmetic_mean_return: mean(daily_returns),
            geometric_mean_return: (1.0 + total_return).powf(1.0 / observations) - 1.0,
        }
    }
}

// --- Calculation Helpers ---

/// Division that resolves to 0 when the denominator is 0.
fn guarded_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Compounded return of a series: `(1 + r1)(1 + r2)... - 1`.
fn compound(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). 0 for fewer than two values.
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let center = mean(values);
    let variance = values
        .iter()
        .map(|v| (v - center).powi(2))
        .sum::<f64>()
        / (values.len() as f64 - 1.0);
    variance.sqrt()
}

/// Largest decline of the compounded cumulative curve from its running peak,
/// as a non-positive fraction. 0 when the curve never dips below a peak.
fn max_drawdown(daily_returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut peak = 0.0_f64;
    let mut worst = 0.0_f64;

    for r in daily_returns {
        cumulative *= 1.0 + r;
        if cumulative > peak {
            peak = cumulative;
        }
        if peak > 0.0 {
            let drawdown = (cumulative - peak) / peak;
            if drawdown < worst {
                worst = drawdown;
            }
        }
    }

    worst
}

fn bucket_key(date: NaiveDate, period: AggregationPeriod) -> (i32, u32) {
    match period {
        AggregationPeriod::Monthly => (date.year(), date.month()),
        AggregationPeriod::Quarterly => (date.year(), (date.month() - 1) / 3 + 1),
        AggregationPeriod::Yearly => (date.year(), 1),
    }
}

fn bucket_label(year: i32, index: u32, period: AggregationPeriod) -> String {
    match period {
        AggregationPeriod::Monthly => format!("{year:04}-{index:02}"),
        AggregationPeriod::Quarterly => format!("{year:04}-Q{index}"),
        AggregationPeriod::Yearly => format!("{year:04}"),
    }
}

fn bucket_end(year: i32, index: u32, period: AggregationPeriod) -> NaiveDate {
    match period {
        AggregationPeriod::Monthly => last_day_of_month(year, index),
        AggregationPeriod::Quarterly => last_day_of_month(year, index * 3),
        AggregationPeriod::Yearly => last_day_of_month(year, 12),
    }
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    // The first day of the following month, stepped back by one. Only fails
    // at the edge of chrono's representable range, where MAX saturates.
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
