//! Aggregate daily observations and draw the series as a line chart page.

use crate::args::AnalysisArgs;
use anyhow::Context;
use clim_chart::{render_html, ChartSeries};
use log::info;
use std::path::Path;

pub fn run_chart(analysis: &AnalysisArgs, output: &Path, json: Option<&Path>) -> anyhow::Result<()> {
    let state = analysis.load_state()?;
    let points = state.results()?;
    let series = ChartSeries::new(points, &state.config);

    let html = render_html(&series)?;
    std::fs::write(output, html)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        "Chart \"{}\" with {} points written to {}",
        series.config.title,
        series.data.len(),
        output.display()
    );

    if let Some(path) = json {
        std::fs::write(path, series.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Chart payload written to {}", path.display());
    }
    Ok(())
}
