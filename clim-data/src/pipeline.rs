//! Aggregation pipeline: filter, bucket, validate, reduce.

use crate::config::{AnalysisConfig, PeriodType};
use crate::error::ConfigurationError;
use crate::period::{PeriodKey, Season, SubPeriod};
use crate::reducer::Reducer;
use crate::validity::{Completeness, PairedYear, MONTHS_PER_YEAR};
use clim_obs::{AnalysisField, DailyRecord, Dataset, FieldError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One row of the output series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultPoint {
    pub year: i32,
    pub value: f64,
}

/// The aggregation strategies a configuration can select.
///
/// - `AnnualStrict`: paired TX/TN per year; incomplete years are omitted.
/// - `Annual`: one field per year; every year with records is reported.
/// - `Seasonal` / `Monthly`: one season or month per year; years with no
///   records in that sub-period are reported as 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationMode {
    AnnualStrict,
    Annual { field: AnalysisField },
    Seasonal { field: AnalysisField, season: Season },
    Monthly { field: AnalysisField, month: u32 },
}

impl AggregationMode {
    pub fn sub_period(&self) -> Option<SubPeriod> {
        match self {
            AggregationMode::AnnualStrict | AggregationMode::Annual { .. } => None,
            AggregationMode::Seasonal { season, .. } => Some(SubPeriod::Season(*season)),
            AggregationMode::Monthly { month, .. } => Some(SubPeriod::Month(*month)),
        }
    }

    fn period_type(&self) -> PeriodType {
        match self {
            AggregationMode::AnnualStrict | AggregationMode::Annual { .. } => PeriodType::Year,
            AggregationMode::Seasonal { .. } => PeriodType::Season,
            AggregationMode::Monthly { .. } => PeriodType::Month,
        }
    }

    /// Run this strategy over `records`, using the year range, calculation and
    /// threshold from `config`. Output is ascending by year.
    pub fn aggregate(&self, records: &[DailyRecord], config: &AnalysisConfig) -> Vec<ResultPoint> {
        let reducer = Reducer::new(config.calculation_type, config.threshold);
        let in_range = records
            .iter()
            .filter(|record| config.year_range.contains(record.year));
        match self {
            AggregationMode::AnnualStrict => annual_strict(in_range, &reducer),
            AggregationMode::Annual { field }
            | AggregationMode::Seasonal { field, .. }
            | AggregationMode::Monthly { field, .. } => bucketed_series(
                in_range,
                field,
                self.period_type(),
                self.sub_period(),
                &reducer,
            ),
        }
    }
}

fn annual_strict<'a>(
    records: impl Iterator<Item = &'a DailyRecord>,
    reducer: &Reducer,
) -> Vec<ResultPoint> {
    let mut years: BTreeMap<i32, PairedYear> = BTreeMap::new();
    for record in records {
        years.entry(record.year).or_default().insert(record);
    }
    years
        .into_iter()
        .filter_map(|(year, paired)| {
            let months = paired.month_values();
            let completeness = Completeness::assess(&months);
            if !completeness.is_complete() {
                debug!(
                    "pipeline: omitting {} ({} months, worst month missing {} days)",
                    year, completeness.months_present, completeness.worst_missing_days
                );
                return None;
            }
            let (tx, tn): (Vec<f64>, Vec<f64>) =
                months
                    .into_iter()
                    .filter(|(month, _)| (1..=MONTHS_PER_YEAR as u32).contains(month))
                    .fold((Vec::new(), Vec::new()), |mut acc, (_, m)| {
                        acc.0.extend(m.tx);
                        acc.1.extend(m.tn);
                        acc
                    });
            Some(ResultPoint {
                year,
                value: reducer.reduce_paired(&tx, &tn),
            })
        })
        .collect()
}

fn bucketed_series<'a>(
    records: impl Iterator<Item = &'a DailyRecord>,
    field: &AnalysisField,
    period: PeriodType,
    sub_period: Option<SubPeriod>,
    reducer: &Reducer,
) -> Vec<ResultPoint> {
    let mut years: BTreeSet<i32> = BTreeSet::new();
    let mut buckets: BTreeMap<PeriodKey, Vec<f64>> = BTreeMap::new();
    for record in records {
        years.insert(record.year);
        let Some(key) = PeriodKey::for_record(record, period) else {
            continue;
        };
        let bucket = buckets.entry(key).or_default();
        if let Some(value) = record.value(field) {
            bucket.push(value);
        }
    }
    years
        .into_iter()
        .map(|year| {
            let key = PeriodKey::selected(year, sub_period);
            let values = buckets.get(&key).map(Vec::as_slice).unwrap_or(&[]);
            ResultPoint {
                year,
                value: reducer.reduce(values),
            }
        })
        .collect()
}

/// Validate `config` and aggregate `records` into an ascending year series.
///
/// A `Column` field must appear in at least one record. An empty result is not
/// an error; the caller decides how to show "no data".
pub fn aggregate(
    records: &[DailyRecord],
    config: &AnalysisConfig,
) -> Result<Vec<ResultPoint>, ConfigurationError> {
    check_column(records, &config.analysis_field)?;
    aggregate_resolved(records, config)
}

fn check_column(records: &[DailyRecord], field: &AnalysisField) -> Result<(), ConfigurationError> {
    let AnalysisField::Column(name) = field else {
        return Ok(());
    };
    if records.is_empty() || records.iter().any(|r| r.extra.contains_key(name)) {
        return Ok(());
    }
    let available: BTreeSet<&String> = records.iter().flat_map(|r| r.extra.keys()).collect();
    Err(ConfigurationError::UnknownField(FieldError {
        name: name.clone(),
        available: available.into_iter().cloned().collect(),
    }))
}

fn aggregate_resolved(
    records: &[DailyRecord],
    config: &AnalysisConfig,
) -> Result<Vec<ResultPoint>, ConfigurationError> {
    let mode = config.validate()?;
    let points = mode.aggregate(records, config);
    info!(
        "pipeline: {:?} over {}-{} produced {} points",
        mode,
        config.year_range.start,
        config.year_range.end,
        points.len()
    );
    Ok(points)
}

/// Like `aggregate`, checking the analysis field against the dataset's
/// header instead. A declared column with no parsed values aggregates to zeros.
pub fn aggregate_dataset(
    dataset: &Dataset,
    config: &AnalysisConfig,
) -> Result<Vec<ResultPoint>, ConfigurationError> {
    let field = dataset.resolve(&config.analysis_field)?;
    if field == config.analysis_field {
        aggregate_resolved(&dataset.records, config)
    } else {
        let resolved = AnalysisConfig {
            analysis_field: field,
            ..config.clone()
        };
        aggregate_resolved(&dataset.records, &resolved)
    }
}

/// Caller-owned state: the loaded dataset and the current configuration.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dataset: Dataset,
    pub config: AnalysisConfig,
}

impl AppState {
    pub fn new(dataset: Dataset, config: AnalysisConfig) -> Self {
        AppState { dataset, config }
    }

    /// Re-run the whole pipeline for the current state.
    pub fn results(&self) -> Result<Vec<ResultPoint>, ConfigurationError> {
        aggregate_dataset(&self.dataset, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CalculationType, SubPeriodSelector, YearRange};

    /// Every day 1..=days of every month with TX=20, TN=10.
    fn full_year(year: i32, days: u32) -> Vec<DailyRecord> {
        let mut records = Vec::new();
        for month in 1..=12 {
            for day in 1..=days {
                records.push(DailyRecord::new(year, month, day, Some(20.0), Some(10.0)));
            }
        }
        records
    }

    fn strict(calculation: CalculationType, threshold: f64) -> AnalysisConfig {
        AnalysisConfig {
            calculation_type: calculation,
            threshold,
            ..AnalysisConfig::new(YearRange::new(1900, 2100))
        }
    }

    fn sub_period_config(
        period_type: PeriodType,
        field: AnalysisField,
        selector: SubPeriodSelector,
    ) -> AnalysisConfig {
        AnalysisConfig {
            period_type,
            analysis_field: field,
            sub_period: Some(selector),
            ..AnalysisConfig::new(YearRange::new(1900, 2100))
        }
    }

    #[test]
    fn test_annual_strict_average() {
        let records = full_year(2020, 30);
        let points = aggregate(&records, &strict(CalculationType::Average, 0.0)).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].year, 2020);
        assert!((points[0].value - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_annual_strict_above_threshold() {
        let records = full_year(2020, 30);
        let points =
            aggregate(&records, &strict(CalculationType::AboveThreshold, 15.0)).unwrap();
        assert_eq!(points, vec![ResultPoint { year: 2020, value: 360.0 }]);
    }

    #[test]
    fn test_annual_strict_threshold_equality_not_counted() {
        let records = full_year(2020, 30);
        let above = aggregate(&records, &strict(CalculationType::AboveThreshold, 20.0)).unwrap();
        let below = aggregate(&records, &strict(CalculationType::BelowThreshold, 10.0)).unwrap();
        assert_eq!(above[0].value, 0.0);
        assert_eq!(below[0].value, 0.0);
    }

    #[test]
    fn test_annual_strict_omits_incomplete_years() {
        let mut records = full_year(2018, 25);
        // 2019: only eleven months
        records.extend(full_year(2019, 30).into_iter().filter(|r| r.month != 12));
        // 2020: March has 20 days present, 11 missing
        records.extend(
            full_year(2020, 30)
                .into_iter()
                .filter(|r| r.month != 3 || r.day <= 20),
        );
        let points = aggregate(&records, &strict(CalculationType::Average, 0.0)).unwrap();
        let years: Vec<i32> = points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2018]);
    }

    #[test]
    fn test_annual_strict_ignores_out_of_range_month() {
        let mut records: Vec<DailyRecord> = full_year(2020, 30)
            .into_iter()
            .filter(|r| r.month != 12)
            .collect();
        records.extend(
            (1..=30).map(|day| DailyRecord::new(2020, 13, day, Some(20.0), Some(10.0))),
        );
        let points = aggregate(&records, &strict(CalculationType::Average, 0.0)).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_year_range_and_ordering() {
        let mut records = full_year(2012, 28);
        records.extend(full_year(2009, 28));
        records.extend(full_year(2010, 28));
        records.extend(full_year(2016, 28));
        let config = AnalysisConfig {
            year_range: YearRange::new(2010, 2015),
            ..strict(CalculationType::Average, 0.0)
        };
        let points = aggregate(&records, &config).unwrap();
        let years: Vec<i32> = points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2010, 2012]);
        assert!(points.iter().all(|p| config.year_range.contains(p.year)));
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let records = full_year(2001, 27);
        let config = strict(CalculationType::BelowThreshold, 12.0);
        assert_eq!(
            aggregate(&records, &config).unwrap(),
            aggregate(&records, &config).unwrap()
        );
    }

    #[test]
    fn test_seasonal_empty_bucket_is_zero() {
        let records: Vec<DailyRecord> = (1..=31)
            .map(|day| DailyRecord::new(2020, 1, day, Some(5.0), Some(-1.0)))
            .collect();
        let config = sub_period_config(
            PeriodType::Season,
            AnalysisField::Tx,
            SubPeriodSelector::Name("summer".into()),
        );
        let points = aggregate(&records, &config).unwrap();
        assert_eq!(points, vec![ResultPoint { year: 2020, value: 0.0 }]);
    }

    #[test]
    fn test_seasonal_winter_uses_same_year_december() {
        let records = vec![
            DailyRecord::new(2020, 1, 10, Some(2.0), None),
            DailyRecord::new(2020, 12, 10, Some(6.0), None),
            DailyRecord::new(2021, 1, 10, Some(10.0), None),
        ];
        let config = sub_period_config(
            PeriodType::Season,
            AnalysisField::Tx,
            SubPeriodSelector::Name("winter".into()),
        );
        let points = aggregate(&records, &config).unwrap();
        assert_eq!(
            points,
            vec![
                ResultPoint { year: 2020, value: 4.0 },
                ResultPoint { year: 2021, value: 10.0 },
            ]
        );
    }

    #[test]
    fn test_monthly_counts_selected_month_only() {
        let records = vec![
            DailyRecord::new(2005, 7, 1, None, Some(21.0)),
            DailyRecord::new(2005, 7, 2, None, Some(19.0)),
            DailyRecord::new(2005, 7, 3, None, None),
            DailyRecord::new(2005, 8, 1, None, Some(25.0)),
            DailyRecord::new(2006, 1, 1, None, Some(-4.0)),
        ];
        let config = AnalysisConfig {
            calculation_type: CalculationType::AboveThreshold,
            threshold: 20.0,
            ..sub_period_config(
                PeriodType::Month,
                AnalysisField::Tn,
                SubPeriodSelector::Number(7),
            )
        };
        let points = aggregate(&records, &config).unwrap();
        assert_eq!(
            points,
            vec![
                ResultPoint { year: 2005, value: 1.0 },
                ResultPoint { year: 2006, value: 0.0 },
            ]
        );
    }

    #[test]
    fn test_annual_single_field_has_no_completeness_filter() {
        let records = vec![
            DailyRecord::new(2000, 6, 1, Some(30.0), None),
            DailyRecord::new(2000, 6, 2, Some(20.0), None),
            DailyRecord::new(2001, 1, 1, None, Some(1.0)),
        ];
        let config = AnalysisConfig {
            analysis_field: AnalysisField::Tx,
            ..AnalysisConfig::new(YearRange::new(2000, 2001))
        };
        let points = aggregate(&records, &config).unwrap();
        assert_eq!(
            points,
            vec![
                ResultPoint { year: 2000, value: 25.0 },
                ResultPoint { year: 2001, value: 0.0 },
            ]
        );
    }

    #[test]
    fn test_configuration_errors_produce_no_result() {
        let records = full_year(2020, 30);
        let inverted = AnalysisConfig::new(YearRange::new(2015, 2010));
        assert_eq!(
            aggregate(&records, &inverted).unwrap_err(),
            ConfigurationError::InvertedYearRange {
                start: 2015,
                end: 2010
            }
        );
        let missing = AnalysisConfig {
            period_type: PeriodType::Month,
            analysis_field: AnalysisField::Tx,
            ..AnalysisConfig::new(YearRange::new(2000, 2030))
        };
        assert_eq!(
            aggregate(&records, &missing).unwrap_err(),
            ConfigurationError::MissingSubPeriod(PeriodType::Month)
        );
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let records = vec![
            DailyRecord::new(2010, 4, 1, Some(12.0), None),
            DailyRecord::new(2010, 4, 2, Some(13.0), None).with_value("TG", 8.0),
        ];
        let config = AnalysisConfig {
            analysis_field: AnalysisField::Column("RR".into()),
            ..AnalysisConfig::new(YearRange::new(2010, 2010))
        };
        match aggregate(&records, &config) {
            Err(ConfigurationError::UnknownField(err)) => {
                assert_eq!(err.name, "RR");
                assert_eq!(err.available, vec!["TG".to_string()]);
            }
            other => panic!("expected UnknownField, got {:?}", other),
        }

        let known = AnalysisConfig {
            analysis_field: AnalysisField::Column("TG".into()),
            ..config
        };
        assert_eq!(
            aggregate(&records, &known).unwrap(),
            vec![ResultPoint { year: 2010, value: 8.0 }]
        );
    }

    #[test]
    fn test_empty_input_is_empty_result() {
        let points = aggregate(&[], &strict(CalculationType::Average, 0.0)).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_aggregate_dataset_resolves_columns() {
        let dataset = Dataset {
            columns: vec!["TG".to_string()],
            records: vec![
                DailyRecord::new(2010, 4, 1, None, None).with_value("TG", 8.0),
                DailyRecord::new(2010, 4, 2, None, None).with_value("TG", 10.0),
            ],
            dropped: 0,
        };
        let mut config = AnalysisConfig {
            analysis_field: AnalysisField::Column("tg".into()),
            ..AnalysisConfig::new(YearRange::new(2010, 2010))
        };
        let state = AppState::new(dataset.clone(), config.clone());
        assert_eq!(
            state.results().unwrap(),
            vec![ResultPoint { year: 2010, value: 9.0 }]
        );

        config.analysis_field = AnalysisField::Column("RR".into());
        assert!(matches!(
            aggregate_dataset(&dataset, &config),
            Err(ConfigurationError::UnknownField(_))
        ));
    }
}
