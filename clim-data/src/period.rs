use crate::config::PeriodType;
use clim_obs::DailyRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four fixed three-month seasons.
///
/// December belongs to the winter of its own calendar year: a record from
/// 2020-12-15 is keyed to winter 2020, alongside January and February 2020.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];

    pub fn months(&self) -> [u32; 3] {
        match self {
            Season::Winter => [12, 1, 2],
            Season::Spring => [3, 4, 5],
            Season::Summer => [6, 7, 8],
            Season::Autumn => [9, 10, 11],
        }
    }

    pub fn from_month(month: u32) -> Option<Season> {
        Season::ALL
            .into_iter()
            .find(|season| season.months().contains(&month))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }
}

impl FromStr for Season {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Season::ALL
            .into_iter()
            .find(|season| season.name() == lowered)
            .ok_or(())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The single season or month charted by a sub-annual run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubPeriod {
    Season(Season),
    /// Calendar month, 1-12.
    Month(u32),
}

impl SubPeriod {
    pub fn label(&self) -> String {
        match self {
            SubPeriod::Season(season) => season.name().to_string(),
            SubPeriod::Month(month) => u8::try_from(*month)
                .ok()
                .and_then(|m| chrono::Month::try_from(m).ok())
                .map(|m| m.name().to_string())
                .unwrap_or_else(|| month.to_string()),
        }
    }
}

/// Bucket key a record is grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeriodKey {
    Year(i32),
    Season(i32, Season),
    Month(i32, u32),
}

impl PeriodKey {
    /// Key a record by its calendar year and, below annual granularity, its
    /// season or month.
    pub fn for_record(record: &DailyRecord, period: PeriodType) -> Option<PeriodKey> {
        match period {
            PeriodType::Year => Some(PeriodKey::Year(record.year)),
            PeriodType::Season => {
                Season::from_month(record.month).map(|s| PeriodKey::Season(record.year, s))
            }
            PeriodType::Month => Some(PeriodKey::Month(record.year, record.month)),
        }
    }

    /// The key a year contributes to the charted series.
    pub fn selected(year: i32, sub_period: Option<SubPeriod>) -> PeriodKey {
        match sub_period {
            None => PeriodKey::Year(year),
            Some(SubPeriod::Season(season)) => PeriodKey::Season(year, season),
            Some(SubPeriod::Month(month)) => PeriodKey::Month(year, month),
        }
    }

    pub fn year(&self) -> i32 {
        match self {
            PeriodKey::Year(year) | PeriodKey::Season(year, _) | PeriodKey::Month(year, _) => {
                *year
            }
        }
    }
}
