//! CSV Series Store
//!
//! Lists, loads and persists per-instrument price files. Source files need
//! `Date, Open, High, Low, Close, Volume` columns in any order. Corrected
//! files are written with a leading row-index column and the same six columns.

use crate::constants::{csv_column, SERIES_EXTENSION};
use crate::error::Error;
use crate::models::{PathConfig, PriceRow, Series};
use crate::utils::format_price;
use fs2::FileExt;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Positions of the required columns in a source file
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl ColumnIndex {
    fn from_headers(series_id: &str, headers: &csv::StringRecord) -> Result<Self, Error> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let find = |name: &str| names.iter().position(|h| *h == name);

        let lookup = [
            find(csv_column::DATE),
            find(csv_column::OPEN),
            find(csv_column::HIGH),
            find(csv_column::LOW),
            find(csv_column::CLOSE),
            find(csv_column::VOLUME),
        ];

        match lookup {
            [Some(date), Some(open), Some(high), Some(low), Some(close), Some(volume)] => Ok(Self {
                date,
                open,
                high,
                low,
                close,
                volume,
            }),
            _ => {
                let missing: Vec<&str> = csv_column::OUTPUT_HEADER
                    .iter()
                    .zip(lookup.iter())
                    .filter(|(_, found)| found.is_none())
                    .map(|(name, _)| *name)
                    .collect();
                Err(Error::Load {
                    series: series_id.to_string(),
                    reason: format!("missing required columns: {}", missing.join(", ")),
                })
            }
        }
    }
}

/// Fetch a raw (untrimmed) field, failing with the row and column name when the row is short
fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    series_id: &str,
    row: usize,
    column: &str,
) -> Result<&'r str, Error> {
    record.get(idx).ok_or_else(|| Error::DataFormat {
        series: series_id.to_string(),
        row,
        column: column.to_string(),
        reason: format!("row has only {} fields", record.len()),
    })
}

/// Parse a price cell. Empty cells are missing prices and load as 0.0.
///
/// Prices must be finite and non-negative.
fn parse_price(raw: &str, series_id: &str, row: usize, column: &str) -> Result<f64, Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }

    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        Ok(_) => Err(Error::DataFormat {
            series: series_id.to_string(),
            row,
            column: column.to_string(),
            reason: format!("'{}' is not a finite non-negative price", raw),
        }),
        Err(_) => Err(Error::DataFormat {
            series: series_id.to_string(),
            row,
            column: column.to_string(),
            reason: format!("'{}' is not a number", raw),
        }),
    }
}

/// Parse a volume cell. Integral floats such as "1200.0" are accepted.
fn parse_volume(raw: &str, series_id: &str, row: usize) -> Result<u64, Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    if let Ok(volume) = raw.parse::<u64>() {
        return Ok(volume);
    }

    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
        _ => Err(Error::DataFormat {
            series: series_id.to_string(),
            row,
            column: csv_column::VOLUME.to_string(),
            reason: format!("'{}' is not a non-negative integer", raw),
        }),
    }
}

/// Read a series from any CSV source
pub fn read_series<R: Read>(series_id: &str, source: R) -> Result<Series, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true) // Short rows are reported per row below
        .from_reader(source);

    let headers = reader.headers().map_err(|e| Error::Load {
        series: series_id.to_string(),
        reason: format!("failed to read headers: {}", e),
    })?;
    let columns = ColumnIndex::from_headers(series_id, headers)?;

    let mut series = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| Error::Load {
            series: series_id.to_string(),
            reason: format!("CSV parse error at row {}: {}", row, e),
        })?;

        let date = field(&record, columns.date, series_id, row, csv_column::DATE)?;
        let open = field(&record, columns.open, series_id, row, csv_column::OPEN)?;
        let high = field(&record, columns.high, series_id, row, csv_column::HIGH)?;
        let low = field(&record, columns.low, series_id, row, csv_column::LOW)?;
        let close = field(&record, columns.close, series_id, row, csv_column::CLOSE)?;
        let volume = field(&record, columns.volume, series_id, row, csv_column::VOLUME)?;

        series.push(PriceRow {
            date: date.to_string(),
            open: parse_price(open, series_id, row, csv_column::OPEN)?,
            high: parse_price(high, series_id, row, csv_column::HIGH)?,
            low: parse_price(low, series_id, row, csv_column::LOW)?,
            close: parse_price(close, series_id, row, csv_column::CLOSE)?,
            volume: parse_volume(volume, series_id, row)?,
        });
    }

    Ok(series)
}

/// Write a series as CSV: unnamed row-index column, then Date..Volume
pub fn write_series<W: Write>(series: &[PriceRow], sink: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(sink);

    let mut header = vec![""];
    header.extend_from_slice(&csv_column::OUTPUT_HEADER);
    wtr.write_record(&header)?;

    for (idx, row) in series.iter().enumerate() {
        wtr.write_record(&[
            idx.to_string(),
            row.date.clone(),
            format_price(row.open),
            format_price(row.high),
            format_price(row.low),
            format_price(row.close),
            row.volume.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Directory-backed source and sink for price series
#[derive(Debug, Clone)]
pub struct CsvStore {
    paths: PathConfig,
}

impl CsvStore {
    pub fn new(paths: PathConfig) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &PathConfig {
        &self.paths
    }

    /// Series identifiers (file names) in the source directory, sorted.
    ///
    /// When output goes to the source directory, previously corrected files
    /// (carrying the output prefix) are left out.
    pub fn list_series(&self) -> Result<Vec<String>, Error> {
        let source_dir = &self.paths.source_directory;
        let entries = fs::read_dir(source_dir).map_err(|e| {
            Error::Io(format!(
                "Failed to read source directory {}: {}",
                source_dir.display(),
                e
            ))
        })?;

        let mut series_ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::Io(format!("Failed to read directory entry: {}", e)))?;
            let path = entry.path();

            if !path.is_file() || !has_series_extension(&path) {
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                debug!(path = %path.display(), "Skipping file with non UTF-8 name");
                continue;
            };

            if self.paths.writes_in_place() && name.starts_with(&self.paths.output_prefix) {
                debug!(file = name, "Skipping previously corrected file");
                continue;
            }

            series_ids.push(name.to_string());
        }

        series_ids.sort();
        Ok(series_ids)
    }

    /// Load one series from the source directory
    pub fn load_series(&self, series_id: &str) -> Result<Series, Error> {
        let path = self.paths.source_directory.join(series_id);
        let file = fs::File::open(&path).map_err(|e| Error::Load {
            series: series_id.to_string(),
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;

        let series = read_series(series_id, file)?;
        debug!(series = series_id, rows = series.len(), "Loaded series");
        Ok(series)
    }

    /// Create the output directory if it does not exist yet
    pub fn ensure_output_dir(&self) -> Result<(), Error> {
        let output_dir = &self.paths.output_directory;
        fs::create_dir_all(output_dir).map_err(|e| {
            Error::Io(format!(
                "Failed to create output directory {}: {}",
                output_dir.display(),
                e
            ))
        })
    }

    /// Write a corrected series under its prefixed name, returning the path written
    pub fn persist_series(&self, series_id: &str, series: &[PriceRow]) -> Result<PathBuf, Error> {
        let path = self.paths.output_path(series_id);
        let write_error = |reason: String| Error::Write {
            series: series_id.to_string(),
            path: path.display().to_string(),
            reason,
        };

        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| write_error(format!("failed to open for writing: {}", e)))?;

        file.lock_exclusive()
            .map_err(|e| write_error(format!("failed to acquire lock: {}", e)))?;

        write_series(series, &file).map_err(|e| write_error(e.to_string()))?;

        // Lock is released when file goes out of scope
        debug!(series = series_id, path = %path.display(), rows = series.len(), "Wrote corrected series");
        Ok(path)
    }
}

fn has_series_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(SERIES_EXTENSION))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(source: &Path, output: &Path) -> CsvStore {
        CsvStore::new(PathConfig {
            source_directory: source.to_path_buf(),
            output_directory: output.to_path_buf(),
            output_prefix: "fixed-".to_string(),
        })
    }

    #[test]
    fn test_read_series_any_column_order() {
        let csv = "Volume,Close,Date,Low,High,Open\n1200,1.5,2020-01-02,1.4,1.6,1.45\n800,150.0,2020-01-03,148,151,149\n";
        let series = read_series("AAPL.csv", csv.as_bytes()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0], PriceRow::new("2020-01-02", 1.45, 1.6, 1.4, 1.5, 1200));
        assert_eq!(series[1].close, 150.0);
        assert_eq!(series[1].volume, 800);
    }

    #[test]
    fn test_read_series_ignores_index_and_extra_columns() {
        let csv = ",Date,Open,High,Low,Close,Adj Close,Volume\n0,2020-01-02,1,2,0.5,1.5,1.4,10\n";
        let series = read_series("X.csv", csv.as_bytes()).unwrap();
        assert_eq!(series, vec![PriceRow::new("2020-01-02", 1.0, 2.0, 0.5, 1.5, 10)]);
    }

    #[test]
    fn test_read_series_empty_prices_are_missing() {
        let csv = "Date,Open,High,Low,Close,Volume\n2020-01-02,,,,,\n";
        let series = read_series("X.csv", csv.as_bytes()).unwrap();
        assert!(series[0].has_missing_close());
        assert_eq!(series[0].volume, 0);
    }

    #[test]
    fn test_read_series_float_volume() {
        let csv = "Date,Open,High,Low,Close,Volume\n2020-01-02,1,1,1,1,1200.0\n";
        let series = read_series("X.csv", csv.as_bytes()).unwrap();
        assert_eq!(series[0].volume, 1200);
    }

    #[test]
    fn test_read_series_missing_column() {
        let csv = "Date,Open,High,Close\n2020-01-02,1,1,1\n";
        match read_series("X.csv", csv.as_bytes()) {
            Err(Error::Load { series, reason }) => {
                assert_eq!(series, "X.csv");
                assert!(reason.contains("Low"));
                assert!(reason.contains("Volume"));
                assert!(!reason.contains("Close"));
            }
            other => panic!("expected Load error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_series_non_numeric_close() {
        let csv = "Date,Open,High,Low,Close,Volume\n2020-01-02,1,1,1,1,5\n2020-01-03,1,1,1,n/a,5\n";
        match read_series("X.csv", csv.as_bytes()) {
            Err(Error::DataFormat { series, row, column, .. }) => {
                assert_eq!(series, "X.csv");
                assert_eq!(row, 1);
                assert_eq!(column, "Close");
            }
            other => panic!("expected DataFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_series_short_row() {
        let csv = "Date,Open,High,Low,Close,Volume\n2020-01-02,1,1\n";
        assert!(matches!(
            read_series("X.csv", csv.as_bytes()),
            Err(Error::DataFormat { row: 0, .. })
        ));
    }

    #[test]
    fn test_read_series_keeps_date_verbatim() {
        let csv = "Date,Open,High,Low,Close,Volume\n 2020-01-01 , 1.5 ,2,1, 1.75 , 42 \n";
        let series = read_series("X.csv", csv.as_bytes()).unwrap();
        assert_eq!(series[0].date, " 2020-01-01 ");
        assert_eq!(series[0].open, 1.5);
        assert_eq!(series[0].close, 1.75);
        assert_eq!(series[0].volume, 42);
    }

    #[test]
    fn test_read_series_rejects_bad_prices() {
        let cases = [
            ("-1.0,2,1,1.5", "Open"),
            ("1,inf,1,1.5", "High"),
            ("1,2,nan,1.5", "Low"),
            ("1,2,1,NaN", "Close"),
            ("1,2,1,-0.5", "Close"),
        ];

        for (prices, expected_column) in cases {
            let csv = format!("Date,Open,High,Low,Close,Volume\n2020-01-02,{},5\n", prices);
            match read_series("X.csv", csv.as_bytes()) {
                Err(Error::DataFormat { row, column, .. }) => {
                    assert_eq!(row, 0);
                    assert_eq!(column, expected_column, "prices {}", prices);
                }
                other => panic!("expected DataFormat error for {}, got {:?}", prices, other),
            }
        }
    }

    #[test]
    fn test_read_series_negative_volume() {
        let csv = "Date,Open,High,Low,Close,Volume\n2020-01-02,1,1,1,1,-5\n";
        assert!(matches!(
            read_series("X.csv", csv.as_bytes()),
            Err(Error::DataFormat { .. })
        ));
    }

    #[test]
    fn test_write_series_format() {
        let series = vec![
            PriceRow::new("02/01/2020", 98.0, 102.0, 97.0, 100.0, 500),
            PriceRow::new("03/01/2020", 99.25, 101.0, 98.5, 100.5, 600),
        ];
        let mut out = Vec::new();
        write_series(&series, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], ",Date,Open,High,Low,Close,Volume");
        assert_eq!(lines[1], "0,02/01/2020,98.0,102.0,97.0,100.0,500");
        assert_eq!(lines[2], "1,03/01/2020,99.25,101.0,98.5,100.5,600");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_written_file_loads_back() {
        let series = vec![PriceRow::new("2020-01-02", 1.5, 2.0, 1.0, 1.75, 42)];
        let mut out = Vec::new();
        write_series(&series, &mut out).unwrap();
        assert_eq!(read_series("X.csv", out.as_slice()).unwrap(), series);
    }

    #[test]
    fn test_list_series_filters_and_sorts() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(source.path().join("MSFT.csv"), "").unwrap();
        fs::write(source.path().join("AAPL.CSV"), "").unwrap();
        fs::write(source.path().join("notes.txt"), "").unwrap();
        fs::create_dir(source.path().join("nested.csv")).unwrap();

        let store = store_in(source.path(), output.path());
        assert_eq!(store.list_series().unwrap(), vec!["AAPL.CSV", "MSFT.csv"]);
    }

    #[test]
    fn test_list_series_skips_prefixed_when_in_place() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("AAPL.csv"), "").unwrap();
        fs::write(dir.path().join("fixed-AAPL.csv"), "").unwrap();

        let store = store_in(dir.path(), dir.path());
        assert_eq!(store.list_series().unwrap(), vec!["AAPL.csv"]);

        let other = TempDir::new().unwrap();
        let store = store_in(dir.path(), other.path());
        assert_eq!(store.list_series().unwrap().len(), 2);
    }

    #[test]
    fn test_list_series_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir.path().join("absent"), dir.path());
        assert!(matches!(store.list_series(), Err(Error::Io(_))));
    }

    #[test]
    fn test_load_missing_file_is_load_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(dir.path(), dir.path());
        assert!(matches!(
            store.load_series("GONE.csv"),
            Err(Error::Load { .. })
        ));
    }

    #[test]
    fn test_persist_series_uses_prefix() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let store = store_in(source.path(), output.path());

        let series = vec![PriceRow::new("2020-01-02", 1.0, 1.0, 1.0, 1.0, 1)];
        let path = store.persist_series("AAPL.csv", &series).unwrap();

        assert_eq!(path, output.path().join("fixed-AAPL.csv"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(",Date,Open,High,Low,Close,Volume"));
    }

    #[test]
    fn test_persist_into_missing_directory_is_write_error() {
        let source = TempDir::new().unwrap();
        let store = store_in(source.path(), &source.path().join("absent"));
        let series = vec![PriceRow::new("2020-01-02", 1.0, 1.0, 1.0, 1.0, 1)];

        assert!(matches!(
            store.persist_series("AAPL.csv", &series),
            Err(Error::Write { .. })
        ));
        store.ensure_output_dir().unwrap();
        assert!(store.persist_series("AAPL.csv", &series).is_ok());
    }
}
