//! Analysis flags shared by the aggregate and chart commands.

use anyhow::Context;
use clap::{Args, ValueEnum};
use clim_data::{
    AnalysisConfig, AnalysisDocument, AppState, CalculationType, ConfigurationError, PeriodType,
    SubPeriodSelector, YearRange,
};
use clim_obs::{parse_daily_csv_path, AnalysisField, Dataset};
use log::{info, warn};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodArg {
    Year,
    Season,
    Month,
}

impl From<PeriodArg> for PeriodType {
    fn from(value: PeriodArg) -> Self {
        match value {
            PeriodArg::Year => PeriodType::Year,
            PeriodArg::Season => PeriodType::Season,
            PeriodArg::Month => PeriodType::Month,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationArg {
    Average,
    AboveThreshold,
    BelowThreshold,
}

impl From<CalculationArg> for CalculationType {
    fn from(value: CalculationArg) -> Self {
        match value {
            CalculationArg::Average => CalculationType::Average,
            CalculationArg::AboveThreshold => CalculationType::AboveThreshold,
            CalculationArg::BelowThreshold => CalculationType::BelowThreshold,
        }
    }
}

/// Flags override the `--config` file, which overrides the defaults
/// (annual paired TX/TN average over the dataset's full year span).
#[derive(Args, Debug, Clone, Default)]
pub struct AnalysisArgs {
    /// Daily observations CSV with `year,month,day,TX,TN` headers
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// JSON file holding a base analysis configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Aggregation period
    #[arg(long, value_enum)]
    pub period: Option<PeriodArg>,

    /// Calculation applied to each period
    #[arg(long, value_enum)]
    pub calculation: Option<CalculationArg>,

    /// Field to analyze: TXTN (paired), TX, TN or another numeric column
    #[arg(long)]
    pub field: Option<String>,

    /// Threshold for the above/below calculations
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<f64>,

    /// First year to include
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last year to include
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Season name (winter, spring, summer, autumn) or month (1-12 or name)
    #[arg(long)]
    pub sub_period: Option<String>,
}

impl AnalysisArgs {
    /// Load the input file and build the configuration for it.
    pub fn load_state(&self) -> anyhow::Result<AppState> {
        let dataset = parse_daily_csv_path(&self.input)
            .with_context(|| format!("failed to load {}", self.input.display()))?;
        let config = self.build_config(&dataset)?;
        Ok(AppState::new(dataset, config))
    }

    /// Merge defaults, the config file and flags, then validate against `dataset`.
    pub fn build_config(&self, dataset: &Dataset) -> anyhow::Result<AnalysisConfig> {
        let span = self.dataset_range(dataset);
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                AnalysisDocument::from_json(&text)
                    .with_context(|| format!("invalid configuration in {}", path.display()))?
                    .into_config(span)
            }
            None => AnalysisConfig::new(span),
        };
        self.apply_overrides(&mut config);
        config.analysis_field = dataset
            .resolve(&config.analysis_field)
            .map_err(ConfigurationError::from)?;
        config.validate()?;
        info!(
            "analysis: field={} period={} calculation={} threshold={} years={}-{}",
            config.analysis_field,
            config.period_type,
            config.calculation_type,
            config.threshold,
            config.year_range.start,
            config.year_range.end
        );
        Ok(config)
    }

    /// Flag bounds first, then the dataset's span.
    fn dataset_range(&self, dataset: &Dataset) -> YearRange {
        let (start, end) = dataset.year_span().unwrap_or_else(|| {
            warn!("{} holds no usable records", self.input.display());
            (0, 0)
        });
        YearRange::new(self.start_year.unwrap_or(start), self.end_year.unwrap_or(end))
    }

    fn apply_overrides(&self, config: &mut AnalysisConfig) {
        if let Some(period) = self.period {
            config.period_type = period.into();
        }
        if let Some(calculation) = self.calculation {
            config.calculation_type = calculation.into();
        }
        if let Some(field) = &self.field {
            config.analysis_field = AnalysisField::from(field.as_str());
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(start) = self.start_year {
            config.year_range.start = start;
        }
        if let Some(end) = self.end_year {
            config.year_range.end = end;
        }
        if let Some(sub_period) = &self.sub_period {
            config.sub_period = Some(SubPeriodSelector::parse(sub_period));
        }
    }
}
