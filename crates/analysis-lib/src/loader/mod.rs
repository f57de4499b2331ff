//! Telemetry table loading
//!
//! Reads a delimited file with a header row into an [`ObservationTable`].
//! The timestamp column (`Time`, falling back to `dteday`) is parsed into
//! date-times; the four known metric columns are parsed as numbers and every
//! other column is ignored.

mod timestamp;


pub use timestamp::parse_timestamp;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::models::{Metric, Observation, ObservationTable, TimestampColumn};

/// Cell contents treated as missing values
const NULL_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Load a CSV file from disk
pub fn load_csv(path: impl AsRef<Path>) -> Result<ObservationTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AnalysisError::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let table = read_csv(BufReader::new(file))?;

    info!(
        event = "table_loaded",
        path = %path.display(),
        rows = table.len(),
        metrics = table.metrics().len(),
        timestamp_column = ?table.timestamp_column().map(|c| c.column()),
        "Loaded telemetry table"
    );

    Ok(table)
}

/// Parse CSV content from any reader
pub fn read_csv<R: Read>(input: R) -> Result<ObservationTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();

    let timestamp = TimestampColumn::ALL.into_iter().find_map(|column| {
        headers
            .iter()
            .position(|h| h == column.column())
            .map(|idx| (column, idx))
    });

    let metric_columns: Vec<(Metric, usize)> = Metric::ALL
        .into_iter()
        .filter_map(|metric| {
            headers
                .iter()
                .position(|h| h == metric.column())
                .map(|idx| (metric, idx))
        })
        .collect();

    debug!(
        headers = headers.len(),
        metrics = ?metric_columns.iter().map(|(m, _)| m.column()).collect::<Vec<_>>(),
        "Resolved table columns"
    );

    let mut table = ObservationTable::new(
        timestamp.map(|(column, _)| column),
        metric_columns.iter().map(|(metric, _)| *metric),
    );

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        let row_number = row_idx + 1;

        let ts = match timestamp {
            Some((column, idx)) => parse_timestamp_cell(column, row_number, record.get(idx))?,
            None => None,
        };

        let mut row = Observation::new(ts);
        for &(metric, idx) in &metric_columns {
            row.set(metric, parse_metric_cell(metric, row_number, record.get(idx))?);
        }
        table.push(row);
    }

    Ok(table)
}

fn is_null(cell: &str) -> bool {
    NULL_TOKENS.contains(&cell)
}

fn parse_timestamp_cell(
    column: TimestampColumn,
    row: usize,
    cell: Option<&str>,
) -> Result<Option<chrono::NaiveDateTime>> {
    let Some(cell) = cell.filter(|c| !is_null(c)) else {
        return Ok(None);
    };

    parse_timestamp(cell)
        .map(Some)
        .ok_or_else(|| AnalysisError::InvalidTimestamp {
            column: column.column().to_string(),
            row,
            value: cell.to_string(),
        })
}

fn parse_metric_cell(metric: Metric, row: usize, cell: Option<&str>) -> Result<Option<f64>> {
    let Some(cell) = cell.filter(|c| !is_null(c)) else {
        return Ok(None);
    };

    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| AnalysisError::InvalidNumber {
            column: metric.column().to_string(),
            row,
            value: cell.to_string(),
        })
}
