//! CSV parsing for daily observation files.
//!
//! Expected format (with headers, any column order): `year,month,day,TX,TN`
//! plus any number of extra numeric columns.
//!
//! # Example CSV
//! ```text
//! year,month,day,TX,TN,TG
//! 2020,1,1,8.2,1.4,4.8
//! 2020,1,2,NA,0.9,
//! ```
//!
//! Cells are coerced with `clim_utils::numeric`. A row whose year or month
//! does not parse is dropped and counted in `Dataset::dropped`.

use crate::record::{DailyRecord, Dataset};
use clim_utils::numeric::{parse_integer, parse_number};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Errors raised before any record reaches the aggregation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A required header (`year` or `month`) is absent.
    MissingColumn(&'static str),
    /// The tokenizer rejected the input, e.g. a row with the wrong field count.
    Csv { line: Option<u64>, message: String },
    Io(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingColumn(name) => write!(f, "missing required column {:?}", name),
            ParseError::Csv {
                line: Some(line),
                message,
            } => write!(f, "error parsing the file at line {}: {}", line, message),
            ParseError::Csv {
                line: None,
                message,
            } => write!(f, "error parsing the file: {}", message),
            ParseError::Io(message) => write!(f, "error reading the file: {}", message),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Csv {
            line: err.position().map(|p| p.line()),
            message: err.to_string(),
        }
    }
}

/// Column indexes resolved from the header row.
#[derive(Debug)]
struct ColumnLayout {
    year: usize,
    month: usize,
    day: Option<usize>,
    tx: Option<usize>,
    tn: Option<usize>,
    extra: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<ColumnLayout, ParseError> {
        let mut year = None;
        let mut month = None;
        let mut day = None;
        let mut tx = None;
        let mut tn = None;
        let mut extra = Vec::new();
        for (idx, raw) in headers.iter().enumerate() {
            let name = raw.trim().trim_start_matches('\u{feff}');
            match name.to_ascii_lowercase().as_str() {
                "year" => year = Some(idx),
                "month" => month = Some(idx),
                "day" => day = Some(idx),
                "tx" => tx = Some(idx),
                "tn" => tn = Some(idx),
                "" => {}
                _ => extra.push((idx, name.to_string())),
            }
        }
        Ok(ColumnLayout {
            year: year.ok_or(ParseError::MissingColumn("year"))?,
            month: month.ok_or(ParseError::MissingColumn("month"))?,
            day,
            tx,
            tn,
            extra,
        })
    }

    fn number_at(row: &StringRecord, idx: Option<usize>) -> Option<f64> {
        idx.and_then(|i| row.get(i)).and_then(parse_number)
    }

    /// Build a record, or `None` when year or month is unusable.
    fn to_record(&self, row: &StringRecord) -> Option<DailyRecord> {
        let year = row
            .get(self.year)
            .and_then(parse_integer)
            .and_then(|y| i32::try_from(y).ok())?;
        let month = row
            .get(self.month)
            .and_then(parse_integer)
            .filter(|m| (1..=12).contains(m))? as u32;
        let day = self
            .day
            .and_then(|i| row.get(i))
            .and_then(parse_integer)
            .and_then(|d| u32::try_from(d).ok())
            .unwrap_or(0);
        let mut extra = BTreeMap::new();
        for (idx, name) in &self.extra {
            if let Some(value) = Self::number_at(row, Some(*idx)) {
                extra.insert(name.clone(), value);
            }
        }
        Some(DailyRecord {
            year,
            month,
            day,
            tx: Self::number_at(row, self.tx),
            tn: Self::number_at(row, self.tn),
            extra,
        })
    }
}

/// Parse a headered CSV string of daily observations into a `Dataset`.
pub fn parse_daily_csv(csv_data: &str) -> Result<Dataset, ParseError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(csv_data.as_bytes());
    let headers = rdr.headers()?.clone();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in rdr.records() {
        let row = row?;
        match layout.to_record(&row) {
            Some(record) => records.push(record),
            None => {
                log::debug!(
                    "parse: dropping row {:?} without a usable year/month",
                    row.position().map(|p| p.line())
                );
                dropped += 1;
            }
        }
    }
    log::info!(
        "parse: loaded {} records, dropped {} rows",
        records.len(),
        dropped
    );
    Ok(Dataset {
        columns: layout.extra.into_iter().map(|(_, name)| name).collect(),
        records,
        dropped,
    })
}

/// Read and parse a daily observation CSV file.
pub fn parse_daily_csv_path(path: impl AsRef<Path>) -> Result<Dataset, ParseError> {
    let csv_data =
        std::fs::read_to_string(path.as_ref()).map_err(|e| ParseError::Io(e.to_string()))?;
    parse_daily_csv(&csv_data)
}
