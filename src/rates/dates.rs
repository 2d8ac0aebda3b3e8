//! Civil-date parsing and year-fraction arithmetic.
//!
//! Valuation dates are ISO-8601 strings ("YYYY-MM-DD") interpreted as local
//! civil dates. Year fractions use a 365.25-day year throughout the crate.

use chrono::{Local, NaiveDate};

use crate::core::PricingError;

const DAYS_PER_YEAR: f64 = 365.25;

/// Parses an ISO-8601 date string ("YYYY-MM-DD").
///
/// # Errors
/// Returns [`PricingError::Config`] when the string does not parse.
///
/// # Examples
/// ```
/// use openvanna::rates::parse_iso_date;
///
/// let date = parse_iso_date("2025-02-19").unwrap();
/// assert_eq!(date.to_string(), "2025-02-19");
/// assert!(parse_iso_date("19/02/2025").is_err());
/// ```
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, PricingError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| PricingError::Config(format!("failed to parse date: {value}")))
}

/// Today's local civil date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Fractional years between two dates on a 365.25-day year.
///
/// Negative when `end` precedes `start`.
pub fn years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_iso_dates_and_rejects_other_formats() {
        assert!(parse_iso_date("2024-12-31").is_ok());
        assert!(parse_iso_date("2024-02-30").is_err());
        assert!(parse_iso_date("Dec 31, 2024").is_err());
        assert!(parse_iso_date("").is_err());
    }

    #[test]
    fn year_fraction_uses_365_25_day_convention() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_relative_eq!(years_between(start, end), 366.0 / 365.25, epsilon = 1e-12);
        assert_relative_eq!(
            years_between(end, start),
            -366.0 / 365.25,
            epsilon = 1e-12
        );
    }
}
