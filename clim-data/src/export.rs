//! CSV export of an aggregated series.
//!
//! Format (with headers): `year,value`. Counts are written as integers and
//! averages with two decimals.
//!
//! # Example CSV
//! ```text
//! year,value
//! 2019,14.87
//! 2020,15.02
//! ```

use crate::config::CalculationType;
use crate::pipeline::ResultPoint;
use clim_utils::format::format_value;
use std::io::Write;

pub const EXPORT_HEADERS: [&str; 2] = ["year", "value"];

/// Write `points` as CSV to `writer`.
pub fn write_csv<W: Write>(
    points: &[ResultPoint],
    calculation: CalculationType,
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)?;
    for point in points {
        wtr.write_record([
            point.year.to_string(),
            format_value(point.value, calculation.is_count()),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render `points` as a CSV string.
pub fn to_csv_string(
    points: &[ResultPoint],
    calculation: CalculationType,
) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_csv(points, calculation, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
