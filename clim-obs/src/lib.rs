//! Daily temperature observation records.
//!
//! - `record`: the typed `DailyRecord` and the parsed `Dataset`
//! - `field`: closed mapping from analysis field names to record accessors
//! - `parse`: headered CSV reader producing a `Dataset`

pub mod field;
pub mod parse;
pub mod record;

pub use field::{AnalysisField, FieldError};
pub use parse::{parse_daily_csv, parse_daily_csv_path, ParseError};
pub use record::{DailyRecord, Dataset};
