//! Aggregate daily observations and export the series as CSV.

use crate::args::AnalysisArgs;
use anyhow::Context;
use clim_data::export::write_csv;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Run the pipeline for `analysis` and write `year,value` rows to `output`,
/// or to stdout when no path is given.
pub fn run_aggregate(analysis: &AnalysisArgs, output: Option<&Path>) -> anyhow::Result<()> {
    let state = analysis.load_state()?;
    let points = state.results()?;
    if points.is_empty() {
        info!("No data for the selected range");
    }
    let calculation = state.config.calculation_type;
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_csv(&points, calculation, BufWriter::new(file))?;
            info!("Wrote {} rows to {}", points.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            write_csv(&points, calculation, stdout.lock())?;
        }
    }
    Ok(())
}
