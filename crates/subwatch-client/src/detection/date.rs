use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Yearly,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Yearly => "Yearly",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::Weekly => "#8b5cf6",
            Self::Monthly => "#3b82f6",
            Self::Quarterly => "#10b981",
            Self::Yearly => "#f59e0b",
        }
    }

    /// Inclusive average-gap window, in days, that maps onto this bucket.
    pub const fn gap_window_days(self) -> (f64, f64) {
        match self {
            Self::Weekly => (6.0, 8.0),
            Self::Monthly => (28.0, 35.0),
            Self::Quarterly => (85.0, 95.0),
            Self::Yearly => (360.0, 370.0),
        }
    }

    pub fn from_average_gap(average_gap_days: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|frequency| {
            let (low, high) = frequency.gap_window_days();
            average_gap_days >= low && average_gap_days <= high
        })
    }

    pub const fn charges_per_year(self) -> f64 {
        match self {
            Self::Weekly => 52.0,
            Self::Monthly => 12.0,
            Self::Quarterly => 4.0,
            Self::Yearly => 1.0,
        }
    }

    /// Adds one canonical period. Month-based periods clamp to the last day
    /// of the target month.
    pub fn advance(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Weekly => date + Duration::days(7),
            Self::Monthly => add_months_clamped(date, 1),
            Self::Quarterly => add_months_clamped(date, 3),
            Self::Yearly => add_months_clamped(date, 12),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" | "annual" | "annually" => Some(Self::Yearly),
            _ => None,
        }
    }
}

pub fn format_iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Accepts `YYYY-MM-DD`, or a timestamp whose first ten characters are one
/// (`2026-01-15T08:30:00Z`, `2026-01-15 08:30`).
pub fn parse_transaction_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = match trimmed.len() {
        10 => trimmed,
        len if len > 10 => {
            let separator = trimmed.as_bytes()[10];
            if separator != b'T' && separator != b' ' {
                return None;
            }
            trimmed.get(..10)?
        }
        _ => return None,
    };
    if !looks_like_iso_date(date_part) {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

pub fn parse_iso_date_strict(value: &str, field_name: &str, command: &str) -> ClientResult<NaiveDate> {
    if !looks_like_iso_date(value) {
        return Err(ClientError::invalid_argument_for_command(
            &format!("`{field_name}` must use YYYY-MM-DD format with a real calendar date."),
            Some(command),
        ));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ClientError::invalid_argument_for_command(
            &format!("`{field_name}` must use YYYY-MM-DD format with valid calendar values."),
            Some(command),
        )
    })
}

pub fn add_months_clamped(date: NaiveDate, months: i32) -> NaiveDate {
    let current_month = i32::try_from(date.month()).unwrap_or(1);
    let mut raw_month = current_month + months;
    let mut year = date.year();

    while raw_month > 12 {
        raw_month -= 12;
        year += 1;
    }
    while raw_month < 1 {
        raw_month += 12;
        year -= 1;
    }

    let month_u32 = u32::try_from(raw_month).unwrap_or(1);
    let day = date.day().min(days_in_month(year, month_u32));
    if let Some(result) = NaiveDate::from_ymd_opt(year, month_u32, day) {
        return result;
    }
    date
}

fn looks_like_iso_date(value: &str) -> bool {
    if value.len() != 10 {
        return false;
    }
    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    true
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        Frequency, add_months_clamped, format_iso_date, parse_iso_date_strict,
        parse_transaction_date,
    };

    fn date(value: &str) -> NaiveDate {
        let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d");
        assert!(parsed.is_ok());
        parsed.unwrap_or(NaiveDate::MIN)
    }

    #[test]
    fn month_clamping_handles_end_of_month_transitions() {
        let feb = add_months_clamped(date("2026-01-31"), 1);
        assert_eq!(format_iso_date(&feb), "2026-02-28");
        let mar = add_months_clamped(feb, 1);
        assert_eq!(format_iso_date(&mar), "2026-03-28");
    }

    #[test]
    fn monthly_projection_keeps_day_of_month() {
        let next = Frequency::Monthly.advance(date("2024-01-15"));
        assert_eq!(format_iso_date(&next), "2024-02-15");
    }

    #[test]
    fn monthly_projection_clamps_to_leap_day() {
        let next = Frequency::Monthly.advance(date("2024-01-31"));
        assert_eq!(format_iso_date(&next), "2024-02-29");
    }

    #[test]
    fn quarterly_and_yearly_projection_use_calendar_months() {
        let quarter = Frequency::Quarterly.advance(date("2025-11-30"));
        assert_eq!(format_iso_date(&quarter), "2026-02-28");
        let year = Frequency::Yearly.advance(date("2024-02-29"));
        assert_eq!(format_iso_date(&year), "2025-02-28");
    }

    #[test]
    fn weekly_projection_adds_seven_days() {
        let next = Frequency::Weekly.advance(date("2025-12-29"));
        assert_eq!(format_iso_date(&next), "2026-01-05");
    }

    #[test]
    fn gap_windows_are_inclusive_and_exclusive_between_buckets() {
        assert_eq!(Frequency::from_average_gap(6.0), Some(Frequency::Weekly));
        assert_eq!(Frequency::from_average_gap(8.0), Some(Frequency::Weekly));
        assert_eq!(Frequency::from_average_gap(8.5), None);
        assert_eq!(Frequency::from_average_gap(28.0), Some(Frequency::Monthly));
        assert_eq!(Frequency::from_average_gap(35.0), Some(Frequency::Monthly));
        assert_eq!(Frequency::from_average_gap(14.0), None);
        assert_eq!(Frequency::from_average_gap(90.0), Some(Frequency::Quarterly));
        assert_eq!(Frequency::from_average_gap(365.25), Some(Frequency::Yearly));
        assert_eq!(Frequency::from_average_gap(371.0), None);
    }

    #[test]
    fn transaction_dates_accept_timestamps_with_date_prefix() {
        assert_eq!(
            parse_transaction_date("2026-01-15T08:30:00Z"),
            Some(date("2026-01-15"))
        );
        assert_eq!(
            parse_transaction_date(" 2026-01-15 "),
            Some(date("2026-01-15"))
        );
        assert_eq!(parse_transaction_date("2026-02-30"), None);
        assert_eq!(parse_transaction_date("01/15/2026"), None);
        assert_eq!(parse_transaction_date("2026-01-15X"), None);
    }

    #[test]
    fn strict_parse_rejects_invalid_calendar_values() {
        assert!(parse_iso_date_strict("2026-13-01", "today", "detect").is_err());
        assert!(parse_iso_date_strict("2026-01-01", "today", "detect").is_ok());
    }
}
