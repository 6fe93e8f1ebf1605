use crate::error::AnalysisError;
use chrono::NaiveDate;

/// The only date format requests accept.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a user-supplied `YYYY-MM-DD` date string.
pub fn parse_date(value: &str) -> Result<NaiveDate, AnalysisError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| AnalysisError::InvalidDateFormat(value.to_string()))
}

/// Checks that an already-parsed window is usable: the start does not come
/// after the end, and neither date lies in the future.
///
/// `today` is passed in rather than read from a clock, which keeps the check
/// reproducible.
pub fn check_window(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<(), AnalysisError> {
    if start > end {
        return Err(AnalysisError::DateRangeInverted { start, end });
    }
    if start > today || end > today {
        return Err(AnalysisError::FutureDate);
    }
    Ok(())
}

/// Validates a raw date-range request in one step: both strings must parse,
/// and the window they form must pass `check_window`.
pub fn validate_range(
    start: &str,
    end: &str,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AnalysisError> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    check_window(start, end, today)?;
    Ok((start, end))
}
