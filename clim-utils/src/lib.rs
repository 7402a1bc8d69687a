//! Shared utility functions for CLIM crates.

/// Coercion of raw CSV cells into numbers.
///
/// Cells are coerced the way a dynamically typed spreadsheet reader would:
/// anything that reads as a finite number is a number, everything else is
/// "no value".
pub mod numeric {
    /// Cell markers that mean "no observation" in common climate exports.
    pub const MISSING_MARKERS: [&str; 5] = ["", "na", "nan", "null", "-"];

    /// Parse a cell as a finite `f64`. Missing markers and text yield `None`.
    pub fn parse_number(cell: &str) -> Option<f64> {
        let trimmed = cell.trim();
        if MISSING_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
        {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Parse a cell as an integer. Accepts `2020` and `2020.0`, rejects `2020.5`.
    pub fn parse_integer(cell: &str) -> Option<i64> {
        let trimmed = cell.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Some(i);
        }
        let value = parse_number(trimmed)?;
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Some(value as i64)
        } else {
            None
        }
    }

    /// Normalize a year bound given as text, e.g. `"2010"` or `" 2010 "`.
    pub fn parse_year(s: &str) -> anyhow::Result<i32> {
        let value = parse_integer(s).ok_or_else(|| anyhow::anyhow!("not a year: {:?}", s))?;
        Ok(i32::try_from(value)?)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_number() {
            assert_eq!(parse_number("12.5"), Some(12.5));
            assert_eq!(parse_number(" -3 "), Some(-3.0));
            assert_eq!(parse_number(""), None);
            assert_eq!(parse_number("NA"), None);
            assert_eq!(parse_number("NaN"), None);
            assert_eq!(parse_number("inf"), None);
            assert_eq!(parse_number("warm"), None);
        }

        #[test]
        fn test_parse_integer() {
            assert_eq!(parse_integer("2020"), Some(2020));
            assert_eq!(parse_integer("2020.0"), Some(2020));
            assert_eq!(parse_integer("7.5"), None);
            assert_eq!(parse_integer("null"), None);
        }

        #[test]
        fn test_parse_year_compares_numerically() {
            let nine = parse_year("9").unwrap();
            let ten = parse_year("10").unwrap();
            assert!(nine < ten);
            assert!(parse_year("twenty").is_err());
        }
    }
}

/// Display formatting for aggregated values.
pub mod format {
    /// Decimal places used for averages in exports and tooltips.
    pub const AVERAGE_DECIMALS: usize = 2;

    /// Format a count as an integer string.
    pub fn format_count(value: f64) -> String {
        format!("{}", value.round() as i64)
    }

    /// Format an average with fixed precision.
    pub fn format_average(value: f64) -> String {
        format!("{:.*}", AVERAGE_DECIMALS, value)
    }

    /// Format a value either as a count or as an average.
    pub fn format_value(value: f64, is_count: bool) -> String {
        if is_count {
            format_count(value)
        } else {
            format_average(value)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_format_value() {
            assert_eq!(format_value(360.0, true), "360");
            assert_eq!(format_value(15.0, false), "15.00");
            assert_eq!(format_value(14.996, false), "15.00");
        }
    }
}
