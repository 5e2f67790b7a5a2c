use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;

use crate::error::{ReportError, Result};

const LOG_TARGET: &str = "subtyping-report::models";

/// Columns every result table must carry, in any order.
pub const REQUIRED_COLUMNS: [&str; 4] = ["algorithm", "k", "time", "success"];

const NANOS_PER_SECOND: f64 = 1e9;

/// Whether a benchmark run completed within its limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Timeout,
}

impl Outcome {
    fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            1 => Some(Outcome::Success),
            0 => Some(Outcome::Timeout),
            _ => None,
        }
    }

    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

/// A single benchmark observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub algorithm: String,
    pub k: u64,
    /// Elapsed time in nanoseconds.
    pub time: f64,
    pub success: Outcome,
}

impl ResultRow {
    pub fn new(algorithm: impl Into<String>, k: u64, time: f64, success: Outcome) -> Self {
        Self {
            algorithm: algorithm.into(),
            k,
            time,
            success,
        }
    }

    /// Elapsed time in seconds, averaged over `iterations` repeated trials.
    pub fn time_seconds(&self, iterations: u32) -> f64 {
        self.time / NANOS_PER_SECOND / f64::from(iterations)
    }
}

// Raw shape of a CSV record before validation.
#[derive(Debug, Deserialize)]
struct CsvRow {
    algorithm: String,
    k: u64,
    time: f64,
    success: u8,
}

/// Benchmark results loaded from one file, in file order.
#[derive(Debug, Clone)]
pub struct ResultTable {
    source: PathBuf,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(source: impl Into<PathBuf>, rows: Vec<ResultRow>) -> Self {
        Self {
            source: source.into(),
            rows,
        }
    }

    /// Load a result table from a delimited file with a header row.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ReportError::MissingFile {
                path: path.to_path_buf(),
            },
            _ => ReportError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        Self::from_reader(path, file)
    }

    /// Parse a result table from any reader. `source` is only used in diagnostics.
    pub fn from_reader<R: Read>(source: impl Into<PathBuf>, reader: R) -> Result<Self> {
        let source = source.into();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|err| csv_error(&source, err))?
            .clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|header| header == column) {
                return Err(ReportError::schema(
                    &source,
                    Some(1),
                    format!("missing required column `{column}`"),
                ));
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| csv_error(&source, err))?;
            rows.push(parse_row(&source, &headers, &record)?);
        }

        tracing::debug!(
            target: LOG_TARGET,
            path = %source.display(),
            rows = rows.len(),
            "Loaded result table",
        );

        Ok(Self { source, rows })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct algorithm names in order of first appearance.
    pub fn algorithms(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.algorithm.as_str()) {
                seen.push(&row.algorithm);
            }
        }
        seen
    }
}

fn parse_row(source: &Path, headers: &StringRecord, record: &StringRecord) -> Result<ResultRow> {
    let line = record.position().map(|pos| pos.line());
    let raw: CsvRow = record
        .deserialize(Some(headers))
        .map_err(|err| ReportError::schema(source, line, err.to_string()))?;

    if raw.algorithm.is_empty() {
        return Err(ReportError::schema(source, line, "empty algorithm name"));
    }
    if !raw.time.is_finite() || raw.time < 0.0 {
        return Err(ReportError::schema(
            source,
            line,
            format!("time must be a non-negative number, got {}", raw.time),
        ));
    }
    let success = Outcome::from_flag(raw.success).ok_or_else(|| {
        ReportError::schema(
            source,
            line,
            format!("success must be 0 or 1, got {}", raw.success),
        )
    })?;

    Ok(ResultRow {
        algorithm: raw.algorithm,
        k: raw.k,
        time: raw.time,
        success,
    })
}

fn csv_error(source: &Path, err: csv::Error) -> ReportError {
    let line = err.position().map(|pos| pos.line());
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source_err) => ReportError::Io {
            path: source.to_path_buf(),
            source: source_err,
        },
        _ => ReportError::schema(source, line, reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<ResultTable> {
        ResultTable::from_reader("test.txt", input.as_bytes())
    }

    #[test]
    fn loads_rows_in_file_order() {
        let table = parse("algorithm,k,time,success\nA,1,1000000000,1\nA,2,2000000000,0\n").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], ResultRow::new("A", 1, 1e9, Outcome::Success));
        assert_eq!(table.rows()[1], ResultRow::new("A", 2, 2e9, Outcome::Timeout));
        assert_eq!(table.source(), Path::new("test.txt"));
    }

    #[test]
    fn column_order_is_not_significant() {
        // Benchmark driver emits `algorithm,k,success,time`.
        let table = parse("algorithm,k,success,time,extra\ninductive, 3 ,0,12.5,x\n").unwrap();

        assert_eq!(
            table.rows(),
            &[ResultRow::new("inductive", 3, 12.5, Outcome::Timeout)]
        );
    }

    #[test]
    fn time_seconds_is_normalized() {
        let row = ResultRow::new("A", 1, 5e9, Outcome::Success);
        assert_eq!(row.time_seconds(1), 5.0);
        assert_eq!(row.time_seconds(10_000), 5e-4);
        assert!(ResultRow::new("A", 1, 0.0, Outcome::Timeout).time_seconds(3) >= 0.0);
    }

    #[test]
    fn algorithms_in_first_appearance_order() {
        let table = parse(
            "algorithm,k,time,success\ncoinductive,1,1,1\ninductive,1,1,1\ncoinductive,2,1,1\n",
        )
        .unwrap();
        assert_eq!(table.algorithms(), vec!["coinductive", "inductive"]);
    }

    #[test]
    fn empty_table_is_valid() {
        let table = parse("algorithm,k,time,success\n").unwrap();
        assert!(table.is_empty());
        assert!(table.algorithms().is_empty());
    }

    #[test]
    fn missing_column_is_schema_error() {
        let err = parse("algorithm,k,success\nA,1,1\n").unwrap_err();
        match err {
            ReportError::Schema { reason, line, .. } => {
                assert_eq!(line, Some(1));
                assert!(reason.contains("`time`"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_success_flag_is_rejected() {
        let err = parse("algorithm,k,time,success\nA,1,10,1\nA,2,10,2\n").unwrap_err();
        match err {
            ReportError::Schema { reason, line, .. } => {
                assert_eq!(line, Some(3));
                assert!(reason.contains("success"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn negative_time_is_rejected() {
        let err = parse("algorithm,k,time,success\nA,1,-5,1\n").unwrap_err();
        assert!(matches!(err, ReportError::Schema { .. }));
    }

    #[test]
    fn unparsable_and_null_values_are_rejected() {
        assert!(matches!(
            parse("algorithm,k,time,success\nA,one,10,1\n").unwrap_err(),
            ReportError::Schema { .. }
        ));
        assert!(matches!(
            parse("algorithm,k,time,success\nA,1,,1\n").unwrap_err(),
            ReportError::Schema { .. }
        ));
        assert!(matches!(
            parse("algorithm,k,time,success\n,1,10,1\n").unwrap_err(),
            ReportError::Schema { .. }
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse("algorithm,k,time,success\nA,1,10\n").unwrap_err();
        assert!(matches!(err, ReportError::Schema { .. }));
    }

    #[test]
    fn missing_file() {
        let err = ResultTable::from_path("definitely/not/here/results.txt").unwrap_err();
        assert!(matches!(err, ReportError::MissingFile { .. }));
    }
}
