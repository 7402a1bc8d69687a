//! Command implementations for CLIM CLI.
//!
//! Provides subcommands for aggregating daily temperature observations,
//! exporting the result as CSV, drawing it as a chart, and inspecting an
//! input file's coverage.

use clap::Subcommand;
use std::path::PathBuf;

pub mod aggregate;
pub mod args;
pub mod chart;
pub mod inspect;

pub use args::{AnalysisArgs, CalculationArg, PeriodArg};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Aggregate daily observations and export the yearly series as CSV
    Aggregate {
        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output path for the `year,value` CSV (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Aggregate daily observations and write a standalone HTML line chart
    Chart {
        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output path for the HTML page
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Also write the chart payload as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Report year span, columns and month coverage of an observations CSV
    Inspect {
        /// Daily observations CSV
        #[arg(short = 'i', long)]
        input: PathBuf,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Aggregate { analysis, output } => {
            aggregate::run_aggregate(&analysis, output.as_deref())
        }
        Command::Chart {
            analysis,
            output,
            json,
        } => chart::run_chart(&analysis, &output, json.as_deref()),
        Command::Inspect { input } => inspect::run_inspect(&input),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    /// Write `contents` to a uniquely named file in the system temp dir.
    pub fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("clim-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// A complete year of TX=20, TN=10 observations as CSV.
    pub fn full_year_csv(year: i32) -> String {
        let mut csv = String::from("year,month,day,TX,TN\n");
        for month in 1..=12 {
            for day in 1..=30 {
                csv.push_str(&format!("{},{},{},20.0,10.0\n", year, month, day));
            }
        }
        csv
    }
}
