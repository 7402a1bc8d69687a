use crate::field::{AnalysisField, FieldError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One parsed daily observation.
///
/// `year` and `month` are always present; a row without them never becomes a
/// record. Missing temperatures are `None`, never NaN or zero. `day` is 0 when
/// the source row had no usable day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub tx: Option<f64>,
    pub tn: Option<f64>,
    /// Other numeric columns, keyed by header name. Only parsed values are stored.
    #[serde(default)]
    pub extra: BTreeMap<String, f64>,
}

impl DailyRecord {
    pub fn new(year: i32, month: u32, day: u32, tx: Option<f64>, tn: Option<f64>) -> Self {
        DailyRecord {
            year,
            month,
            day,
            tx,
            tn,
            extra: BTreeMap::new(),
        }
    }

    /// Attach an extra named value.
    pub fn with_value(mut self, name: &str, value: f64) -> Self {
        self.extra.insert(name.to_string(), value);
        self
    }

    /// Read the value for a single-valued field. `Paired` has no single value.
    pub fn value(&self, field: &AnalysisField) -> Option<f64> {
        match field {
            AnalysisField::Paired => None,
            AnalysisField::Tx => self.tx,
            AnalysisField::Tn => self.tn,
            AnalysisField::Column(name) => self.extra.get(name).copied(),
        }
    }
}

/// The parsed contents of one input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Extra numeric column names in header order.
    pub columns: Vec<String>,
    pub records: Vec<DailyRecord>,
    /// Number of rows discarded because year or month did not parse.
    pub dropped: usize,
}

impl Dataset {
    /// Smallest and largest year present.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Months present per year, for coverage reporting.
    pub fn month_coverage(&self) -> BTreeMap<i32, BTreeSet<u32>> {
        let mut coverage: BTreeMap<i32, BTreeSet<u32>> = BTreeMap::new();
        for record in &self.records {
            coverage.entry(record.year).or_default().insert(record.month);
        }
        coverage
    }

    /// Resolve a configured field name against TX/TN and this dataset's columns.
    pub fn resolve_field(&self, name: &str) -> Result<AnalysisField, FieldError> {
        if let Some(field) = AnalysisField::from_known_name(name) {
            return Ok(field);
        }
        let wanted = name.trim();
        self.columns
            .iter()
            .find(|column| column.eq_ignore_ascii_case(wanted))
            .map(|column| AnalysisField::Column(column.clone()))
            .ok_or_else(|| FieldError {
                name: wanted.to_string(),
                available: self.columns.clone(),
            })
    }

    /// Check a configured field against this dataset, canonicalizing column case.
    pub fn resolve(&self, field: &AnalysisField) -> Result<AnalysisField, FieldError> {
        match field {
            AnalysisField::Column(name) => self.resolve_field(name),
            known => Ok(known.clone()),
        }
    }
}
