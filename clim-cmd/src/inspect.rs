//! Report what an observations file contains before choosing a year range.

use anyhow::Context;
use clim_data::validity::{Completeness, PairedYear, MONTHS_PER_YEAR};
use clim_obs::{parse_daily_csv_path, Dataset};
use log::info;
use std::collections::BTreeMap;
use std::path::Path;

/// One line of the coverage report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearCoverage {
    pub year: i32,
    pub records: usize,
    pub completeness: Completeness,
}

/// Per-year record counts and strict annual completeness.
pub fn year_coverage(dataset: &Dataset) -> Vec<YearCoverage> {
    let mut years: BTreeMap<i32, (usize, PairedYear)> = BTreeMap::new();
    for record in &dataset.records {
        let entry = years.entry(record.year).or_default();
        entry.0 += 1;
        entry.1.insert(record);
    }
    years
        .into_iter()
        .map(|(year, (records, paired))| YearCoverage {
            year,
            records,
            completeness: Completeness::assess(&paired.month_values()),
        })
        .collect()
}

pub fn run_inspect(input: &Path) -> anyhow::Result<()> {
    let dataset = parse_daily_csv_path(input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    info!("Inspecting {}", input.display());

    println!("records: {} (dropped {})", dataset.records.len(), dataset.dropped);
    match dataset.year_span() {
        Some((start, end)) => println!("years: {}-{}", start, end),
        None => println!("years: none"),
    }
    if dataset.columns.is_empty() {
        println!("extra columns: none");
    } else {
        println!("extra columns: {}", dataset.columns.join(", "));
    }
    println!("year,records,months,worst_month_missing_days,complete");
    for line in year_coverage(&dataset) {
        println!(
            "{},{},{}/{},{},{}",
            line.year,
            line.records,
            line.completeness.months_present,
            MONTHS_PER_YEAR,
            line.completeness.worst_missing_days,
            line.completeness.is_complete()
        );
    }
    Ok(())
}
