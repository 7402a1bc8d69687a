//! Parameters for one aggregation run.
//!
//! An `AnalysisConfig` is supplied fresh on every invocation, either built
//! from CLI flags or deserialized from JSON:
//!
//! ```text
//! {
//!   "periodType": "season",
//!   "calculationType": "aboveThreshold",
//!   "analysisField": "TX",
//!   "threshold": 25,
//!   "yearRange": { "start": "1990", "end": 2020 },
//!   "subPeriod": "summer"
//! }
//! ```
//!
//! Year bounds given as strings are normalized to integers on load, so the
//! year-range filter always compares numbers. A document may leave out
//! `yearRange` or either of its bounds; `AnalysisDocument::into_config`
//! fills the gaps from a fallback range.

use crate::error::ConfigurationError;
use crate::period::{Season, SubPeriod};
use crate::pipeline::AggregationMode;
use clim_obs::AnalysisField;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Aggregation window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    #[default]
    Year,
    Season,
    Month,
}

impl PeriodType {
    /// What a sub-period selector names for this period type.
    pub fn selector_name(&self) -> &'static str {
        match self {
            PeriodType::Year => "year",
            PeriodType::Season => "season",
            PeriodType::Month => "month",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector_name())
    }
}

/// How a bucket of values collapses to one number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalculationType {
    #[default]
    Average,
    AboveThreshold,
    BelowThreshold,
}

impl CalculationType {
    /// Counts export as integers, averages with fixed decimals.
    pub fn is_count(&self) -> bool {
        !matches!(self, CalculationType::Average)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CalculationType::Average => "average",
            CalculationType::AboveThreshold => "aboveThreshold",
            CalculationType::BelowThreshold => "belowThreshold",
        }
    }
}

impl fmt::Display for CalculationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A season name or month as supplied by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubPeriodSelector {
    Number(i64),
    Name(String),
}

impl SubPeriodSelector {
    /// Parse a raw selector, e.g. from a CLI flag.
    pub fn parse(raw: &str) -> SubPeriodSelector {
        match raw.trim().parse::<i64>() {
            Ok(number) => SubPeriodSelector::Number(number),
            Err(_) => SubPeriodSelector::Name(raw.trim().to_string()),
        }
    }

    fn to_season(&self) -> Result<Season, ConfigurationError> {
        match self {
            SubPeriodSelector::Name(name) => name
                .parse::<Season>()
                .map_err(|_| ConfigurationError::UnknownSeason(name.clone())),
            SubPeriodSelector::Number(number) => {
                Err(ConfigurationError::UnknownSeason(number.to_string()))
            }
        }
    }

    fn to_month(&self) -> Result<u32, ConfigurationError> {
        let month = match self {
            SubPeriodSelector::Number(number) => Some(*number),
            SubPeriodSelector::Name(name) => name.trim().parse::<i64>().ok().or_else(|| {
                name.trim()
                    .parse::<chrono::Month>()
                    .ok()
                    .map(|m| i64::from(m.number_from_month()))
            }),
        };
        match month {
            Some(m) if (1..=12).contains(&m) => Ok(m as u32),
            _ => Err(ConfigurationError::InvalidMonth(self.to_string())),
        }
    }
}

impl fmt::Display for SubPeriodSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubPeriodSelector::Number(number) => write!(f, "{}", number),
            SubPeriodSelector::Name(name) => f.write_str(name),
        }
    }
}

/// Inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    #[serde(deserialize_with = "deserialize_year")]
    pub start: i32,
    #[serde(deserialize_with = "deserialize_year")]
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        YearRange { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YearBound {
    Number(i64),
    Text(String),
}

fn deserialize_optional_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<YearBound>::deserialize(deserializer)? {
        None => Ok(None),
        Some(YearBound::Number(n)) => i32::try_from(n).map(Some).map_err(serde::de::Error::custom),
        Some(YearBound::Text(s)) => clim_utils::numeric::parse_year(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    match YearBound::deserialize(deserializer)? {
        YearBound::Number(n) => i32::try_from(n).map_err(serde::de::Error::custom),
        YearBound::Text(s) => {
            clim_utils::numeric::parse_year(&s).map_err(serde::de::Error::custom)
        }
    }
}

/// Year bounds as written in a config document. Either may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PartialYearRange {
    #[serde(default, deserialize_with = "deserialize_optional_year")]
    pub start: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_year")]
    pub end: Option<i32>,
}

impl PartialYearRange {
    pub fn or(self, fallback: YearRange) -> YearRange {
        YearRange {
            start: self.start.unwrap_or(fallback.start),
            end: self.end.unwrap_or(fallback.end),
        }
    }
}

/// A configuration as loaded from JSON, before missing year bounds are filled.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDocument {
    #[serde(default)]
    pub period_type: PeriodType,
    #[serde(default)]
    pub calculation_type: CalculationType,
    #[serde(default)]
    pub analysis_field: AnalysisField,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub year_range: PartialYearRange,
    #[serde(default)]
    pub sub_period: Option<SubPeriodSelector>,
}

impl AnalysisDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Complete the document, taking any missing year bound from `fallback`.
    pub fn into_config(self, fallback: YearRange) -> AnalysisConfig {
        AnalysisConfig {
            period_type: self.period_type,
            calculation_type: self.calculation_type,
            analysis_field: self.analysis_field,
            threshold: self.threshold,
            year_range: self.year_range.or(fallback),
            sub_period: self.sub_period,
        }
    }
}

impl TryFrom<AnalysisDocument> for AnalysisConfig {
    type Error = String;

    fn try_from(document: AnalysisDocument) -> Result<Self, Self::Error> {
        match document.year_range {
            PartialYearRange {
                start: Some(start),
                end: Some(end),
            } => Ok(document.into_config(YearRange::new(start, end))),
            _ => Err("`yearRange` needs both `start` and `end`".to_string()),
        }
    }
}

/// The full configuration of one aggregation run.
///
/// Deserializing requires both year bounds; use `AnalysisDocument` to load a
/// document that leaves them to a fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AnalysisDocument")]
pub struct AnalysisConfig {
    pub period_type: PeriodType,
    pub calculation_type: CalculationType,
    pub analysis_field: AnalysisField,
    pub threshold: f64,
    pub year_range: YearRange,
    pub sub_period: Option<SubPeriodSelector>,
}

impl AnalysisConfig {
    /// Annual paired TX/TN average over the given years.
    pub fn new(year_range: YearRange) -> Self {
        AnalysisConfig {
            period_type: PeriodType::Year,
            calculation_type: CalculationType::Average,
            analysis_field: AnalysisField::Paired,
            threshold: 0.0,
            year_range,
            sub_period: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate the configuration and pick the aggregation strategy it selects.
    pub fn validate(&self) -> Result<AggregationMode, ConfigurationError> {
        let YearRange { start, end } = self.year_range;
        if start > end {
            return Err(ConfigurationError::InvertedYearRange { start, end });
        }
        if !self.threshold.is_finite() {
            return Err(ConfigurationError::NonFiniteThreshold(self.threshold));
        }
        if self.analysis_field.is_paired() && self.period_type != PeriodType::Year {
            return Err(ConfigurationError::PairedFieldNotAnnual(self.period_type));
        }
        let field = self.analysis_field.clone();
        let mode = match self.period_type {
            PeriodType::Year if field.is_paired() => AggregationMode::AnnualStrict,
            PeriodType::Year => AggregationMode::Annual { field },
            PeriodType::Season => AggregationMode::Seasonal {
                field,
                season: self.required_selector()?.to_season()?,
            },
            PeriodType::Month => AggregationMode::Monthly {
                field,
                month: self.required_selector()?.to_month()?,
            },
        };
        Ok(mode)
    }

    fn required_selector(&self) -> Result<&SubPeriodSelector, ConfigurationError> {
        self.sub_period
            .as_ref()
            .ok_or(ConfigurationError::MissingSubPeriod(self.period_type))
    }

    /// The validated sub-period, if this run charts one.
    pub fn resolved_sub_period(&self) -> Result<Option<SubPeriod>, ConfigurationError> {
        Ok(self.validate()?.sub_period())
    }
}
