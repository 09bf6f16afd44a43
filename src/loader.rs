use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use thiserror::Error;

use crate::data::Bar;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("input file contains no usable rows")]
    Empty,
}

/// Load daily bars from a CSV file with `date,open,high,low,close,volume`
/// columns, with or without a header row.
///
/// Rows that fail to parse — missing fields, non-numeric prices, bad
/// dates — are dropped rather than reported; the estimator degrades on
/// partial data instead of aborting. The result is sorted by date.
pub fn load_bars_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).with_context(|| format!("failed to open {:?}", path_ref))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let mut bars = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(bar) = parse_record(&record) {
            bars.push(bar);
        }
    }

    if bars.is_empty() {
        return Err(LoaderError::Empty.into());
    }

    bars.sort_by_key(|bar| bar.date);
    Ok(bars)
}

fn parse_record(record: &StringRecord) -> Option<Bar> {
    let fields: Vec<&str> = record
        .iter()
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect();
    if fields.len() < 6 {
        return None;
    }

    // Header rows fail the date parse and drop out here.
    let date = parse_date(fields[0])?;
    let open = parse_number(fields[1])?;
    let high = parse_number(fields[2])?;
    let low = parse_number(fields[3])?;
    let close = parse_number(fields[4])?;
    let volume = parse_number(fields[5])?;

    Some(Bar {
        date,
        open,
        high,
        low,
        close,
        volume,
    })
}

fn parse_number(value: &str) -> Option<f64> {
    let parsed = value.replace(',', "").parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let patterns = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    patterns
        .iter()
        .find_map(|pattern| NaiveDate::parse_from_str(value, pattern).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_from_str(content: &str) -> Result<Vec<Bar>> {
        let mut file = tempfile_path();
        write!(file.1, "{content}").unwrap();
        file.1.flush().unwrap();
        load_bars_from_csv(&file.0)
    }

    fn tempfile_path() -> (std::path::PathBuf, File) {
        let dir = std::env::temp_dir();
        let path = dir.join(format!(
            "structure-recon-test-{}-{:?}.csv",
            std::process::id(),
            std::thread::current().id()
        ));
        let file = File::create(&path).unwrap();
        (path, file)
    }

    #[test]
    fn header_and_malformed_rows_are_dropped() {
        let bars = load_from_str(
            "date,open,high,low,close,volume\n\
             2025-01-02,10,11,9,10.5,1000\n\
             2025-01-03,abc,11,9,10.5,1000\n\
             2025-01-06,10.5,12,10,11.5,1200\n",
        )
        .unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert!((bars[1].close - 11.5).abs() < 1e-12);
    }

    #[test]
    fn rows_are_sorted_by_date() {
        let bars = load_from_str(
            "2025-01-06,10.5,12,10,11.5,1200\n\
             2025-01-02,10,11,9,10.5,1000\n",
        )
        .unwrap();
        assert!(bars[0].date < bars[1].date);
    }

    #[test]
    fn all_rows_invalid_is_an_error() {
        let err = load_from_str("date,open,high,low,close,volume\nnope\n").unwrap_err();
        assert!(err.to_string().contains("no usable rows"));
    }

    #[test]
    fn slash_dates_parse() {
        let bars = load_from_str("2025/01/02,10,11,9,10.5,1000\n").unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    }
}
