use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of history for a single ticker: the OHLCV quote plus the
/// corporate actions reported for that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// The trading day. Bars in a series are strictly increasing by date.
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    /// Cash dividend per share that went ex on this day. 0.0 on every other day.
    pub dividend: f64,
    /// Split ratio applied on this day (4.0 for a 4-for-1 split). 0.0 on
    /// non-split days, matching the provider's "no event" encoding.
    pub split_ratio: f64,
}

impl PriceBar {
    /// True on ex-dividend days.
    pub fn pays_dividend(&self) -> bool {
        self.dividend > 0.0
    }
}

/// One day of derived returns, expressed as fractions (0.05 = 5%).
///
/// The first bar of a series has no prior close, so a series of `n` bars
/// produces `n - 1` of these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReturn {
    pub date: NaiveDate,
    /// Close-to-close price appreciation.
    pub price_return: f64,
    /// Dividend paid on this day relative to the prior close.
    pub dividend_yield: f64,
    /// `price_return + dividend_yield`.
    pub total_return: f64,
}
