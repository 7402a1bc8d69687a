use crate::config::PeriodType;
use clim_obs::FieldError;
use std::fmt;

/// Raised when an aggregation run is configured inconsistently.
///
/// Nothing is substituted: a run with a bad selector or range produces no
/// partial result.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    InvertedYearRange { start: i32, end: i32 },
    NonFiniteThreshold(f64),
    MissingSubPeriod(PeriodType),
    UnknownSeason(String),
    InvalidMonth(String),
    /// Paired TX/TN analysis only exists for annual periods.
    PairedFieldNotAnnual(PeriodType),
    UnknownField(FieldError),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::InvertedYearRange { start, end } => {
                write!(f, "start year {} is after end year {}", start, end)
            }
            ConfigurationError::NonFiniteThreshold(value) => {
                write!(f, "threshold must be a finite number, got {}", value)
            }
            ConfigurationError::MissingSubPeriod(period) => {
                write!(f, "a {} must be selected for {} periods", period.selector_name(), period)
            }
            ConfigurationError::UnknownSeason(name) => write!(
                f,
                "unknown season {:?}; expected winter, spring, summer or autumn",
                name
            ),
            ConfigurationError::InvalidMonth(value) => {
                write!(f, "invalid month {:?}; expected 1-12 or a month name", value)
            }
            ConfigurationError::PairedFieldNotAnnual(period) => write!(
                f,
                "paired TX/TN analysis is only available for annual periods, not {}",
                period
            ),
            ConfigurationError::UnknownField(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ConfigurationError {}

impl From<FieldError> for ConfigurationError {
    fn from(err: FieldError) -> Self {
        ConfigurationError::UnknownField(err)
    }
}
