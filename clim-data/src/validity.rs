//! Completeness policy for strict annual aggregation.
//!
//! A year is reported only when all twelve months are present and no month is
//! missing more than `MAX_MISSING_DAYS` of a nominal 31-day month. A month's
//! count of present days is the larger of its TX and TN counts.

use clim_obs::DailyRecord;
use std::collections::BTreeMap;

pub const MONTHS_PER_YEAR: usize = 12;
pub const NOMINAL_DAYS_PER_MONTH: usize = 31;
pub const MAX_MISSING_DAYS: usize = 6;

/// Non-missing TX and TN values observed in one month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthValues {
    pub tx: Vec<f64>,
    pub tn: Vec<f64>,
}

impl MonthValues {
    pub fn present_days(&self) -> usize {
        self.tx.len().max(self.tn.len())
    }

    pub fn missing_days(&self) -> usize {
        NOMINAL_DAYS_PER_MONTH.saturating_sub(self.present_days())
    }

    pub fn is_complete(&self) -> bool {
        self.missing_days() <= MAX_MISSING_DAYS
    }
}

type DayPair = (Option<f64>, Option<f64>);

/// One year of paired TX/TN observations, keyed by month and day.
///
/// A second record for the same month and day replaces the first. Records
/// without a day (day 0) are kept in arrival order.
#[derive(Debug, Clone, Default)]
pub struct PairedYear {
    dated: BTreeMap<u32, BTreeMap<u32, DayPair>>,
    undated: BTreeMap<u32, Vec<DayPair>>,
}

impl PairedYear {
    pub fn insert(&mut self, record: &DailyRecord) {
        let pair = (record.tx, record.tn);
        if record.day == 0 {
            self.undated.entry(record.month).or_default().push(pair);
        } else {
            self.dated
                .entry(record.month)
                .or_default()
                .insert(record.day, pair);
        }
    }

    /// Group the year's values by month, dropping missing entries.
    pub fn month_values(&self) -> BTreeMap<u32, MonthValues> {
        let mut months: BTreeMap<u32, MonthValues> = BTreeMap::new();
        let dated = self
            .dated
            .iter()
            .flat_map(|(month, days)| days.values().map(move |pair| (*month, pair)));
        let undated = self
            .undated
            .iter()
            .flat_map(|(month, pairs)| pairs.iter().map(move |pair| (*month, pair)));
        for (month, (tx, tn)) in dated.chain(undated) {
            let values = months.entry(month).or_default();
            if let Some(tx) = tx {
                values.tx.push(*tx);
            }
            if let Some(tn) = tn {
                values.tn.push(*tn);
            }
        }
        months
    }
}

/// Summary of how complete one year is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completeness {
    pub months_present: usize,
    /// Most missing days in any present month.
    pub worst_missing_days: usize,
}

impl Completeness {
    /// Only calendar months 1..=12 are counted.
    pub fn assess(months: &BTreeMap<u32, MonthValues>) -> Completeness {
        let calendar = months.range(1..=MONTHS_PER_YEAR as u32);
        Completeness {
            months_present: calendar.clone().count(),
            worst_missing_days: calendar
                .map(|(_, values)| values.missing_days())
                .max()
                .unwrap_or(NOMINAL_DAYS_PER_MONTH),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.months_present == MONTHS_PER_YEAR && self.worst_missing_days <= MAX_MISSING_DAYS
    }
}

pub fn is_year_complete(months: &BTreeMap<u32, MonthValues>) -> bool {
    Completeness::assess(months).is_complete()
}
