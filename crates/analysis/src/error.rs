use chrono::NaiveDate;
use market_data::MarketDataError;
use thiserror::Error;

/// Everything that can stop an analysis request.
///
/// Each variant renders as one human-readable message; the request boundary
/// decides the status code or exit path. Degenerate numeric cases are not
/// errors: a too-short series yields zeroed metrics instead.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("A ticker symbol is required.")]
    MissingTicker,

    #[error("Invalid date format '{0}'. Please use YYYY-MM-DD.")]
    InvalidDateFormat(String),

    #[error("Begin date {start} cannot be after end date {end}.")]
    DateRangeInverted { start: NaiveDate, end: NaiveDate },

    #[error("Dates cannot be in the future.")]
    FutureDate,

    #[error("No data found for ticker '{0}' in the given date range.")]
    NoDataFound(String),

    #[error("The data provider request failed: {0}")]
    Provider(#[from] MarketDataError),

    #[error("Failed to write the export snapshot: {0}")]
    Export(#[from] csv::Error),
}
