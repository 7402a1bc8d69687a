//! Temporal aggregation of daily temperature observations.
//!
//! Records are filtered to a year range, bucketed by period, checked for
//! completeness where the mode requires it, and reduced to one value per
//! year. The result feeds the chart and CSV export collaborators.

pub mod config;
pub mod error;
pub mod export;
pub mod period;
pub mod pipeline;
pub mod reducer;
pub mod validity;

pub use config::{
    AnalysisConfig, AnalysisDocument, CalculationType, PartialYearRange, PeriodType,
    SubPeriodSelector, YearRange,
};
pub use error::ConfigurationError;
pub use pipeline::{aggregate, aggregate_dataset, AggregationMode, AppState, ResultPoint};
