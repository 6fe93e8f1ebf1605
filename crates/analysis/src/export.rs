use crate::error::AnalysisError;
use crate::report::BarWithReturns;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Writes the full bar-and-return table to a one-shot CSV snapshot named
/// `{ticker}_analysis_{start}_to_{end}.csv` inside `dir`, and returns the
/// path of the file it wrote.
///
/// The snapshot is a plain download artifact: it is recreated from scratch
/// on every call, overwrites any previous snapshot of the same range, and
/// is never cleaned up here.
pub fn write_csv_snapshot(
    table: &[BarWithReturns],
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    dir: &Path,
) -> Result<PathBuf, AnalysisError> {
    std::fs::create_dir_all(dir).map_err(csv::Error::from)?;

    let file_name = format!(
        "{}_analysis_{}_to_{}.csv",
        sanitize_ticker(ticker),
        start,
        end
    );
    let path = dir.join(file_name);

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record([
        "Date",
        "Open",
        "High",
        "Low",
        "Close",
        "Volume",
        "Dividends",
        "Stock Splits",
        "Price_Return",
        "Dividend_Yield",
        "Total_Return",
    ])?;

    for row in table {
        writer.write_record([
            row.bar.date.to_string(),
            row.bar.open.to_string(),
            row.bar.high.to_string(),
            row.bar.low.to_string(),
            row.bar.close.to_string(),
            row.bar.volume.to_string(),
            row.bar.dividend.to_string(),
            row.bar.split_ratio.to_string(),
            optional_cell(row.price_return),
            optional_cell(row.dividend_yield),
            optional_cell(row.total_return),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;

    tracing::info!("Wrote CSV snapshot to {}", path.display());
    Ok(path)
}

/// The first bar of a range has no derived returns; its cells stay empty.
fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Keeps ticker-derived file names filesystem-safe (`BRK.B`, `^GSPC`, ...).
fn sanitize_ticker(ticker: &str) -> String {
    ticker
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::PriceBar;

    fn row(
        date: NaiveDate,
        close: f64,
        dividend: f64,
        total_return: Option<f64>,
    ) -> BarWithReturns {
        BarWithReturns {
            bar: PriceBar {
                date,
                open: close,
                high: close,
                low: close,
                close,
                volume: 500,
                dividend,
                split_ratio: 0.0,
            },
            price_return: total_return,
            dividend_yield: total_return.map(|_| 0.0),
            total_return,
        }
    }

    fn day(year: i32, month: u32, dayn: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, dayn).unwrap()
    }

    #[test]
    fn writes_the_named_snapshot_with_header_and_blank_first_returns() {
        let dir = tempfile::tempdir().unwrap();
        let table = vec![
            row(day(2024, 1, 2), 100.0, 0.0, None),
            row(day(2024, 1, 3), 102.0, 0.25, Some(0.02)),
        ];

        let path = write_csv_snapshot(
            &table,
            "AAPL",
            day(2024, 1, 2),
            day(2024, 1, 3),
            dir.path(),
        )
        .unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "AAPL_analysis_2024-01-02_to_2024-01-03.csv"
        );

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Date,Open,High,Low,Close,Volume"));
        // The first data row ends with three empty return cells.
        assert!(lines[1].ends_with(",,,"));
        assert!(lines[2].contains("0.02"));
    }

    #[test]
    fn rewriting_the_same_range_overwrites_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let first = vec![row(day(2024, 1, 2), 100.0, 0.0, None)];
        let second = vec![
            row(day(2024, 1, 2), 100.0, 0.0, None),
            row(day(2024, 1, 3), 101.0, 0.0, Some(0.01)),
        ];

        let path_a =
            write_csv_snapshot(&first, "MSFT", day(2024, 1, 2), day(2024, 1, 3), dir.path())
                .unwrap();
        let path_b =
            write_csv_snapshot(&second, "MSFT", day(2024, 1, 2), day(2024, 1, 3), dir.path())
                .unwrap();

        assert_eq!(path_a, path_b);
        let contents = std::fs::read_to_string(&path_b).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn index_tickers_get_filesystem_safe_names() {
        let dir = tempfile::tempdir().unwrap();
        let table = vec![row(day(2024, 1, 2), 4700.0, 0.0, None)];

        let path = write_csv_snapshot(
            &table,
            "^GSPC",
            day(2024, 1, 2),
            day(2024, 1, 2),
            dir.path(),
        )
        .unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "_GSPC_analysis_2024-01-02_to_2024-01-02.csv"
        );
        // Dots and dashes survive; they are common in real tickers.
        assert_eq!(sanitize_ticker("BRK.B"), "BRK.B");
        assert_eq!(sanitize_ticker("../etc/passwd"), ".._etc_passwd");
    }
}
