use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-user working-day set, stored in the database as a comma-separated
/// list of weekday names ("monday,tuesday,wednesday,thursday,friday").
///
/// An empty set means two different things depending on the consumer:
/// the attendance validator treats it as "unrestricted" (every day allowed),
/// while the counting functions below treat it as "no working days" and
/// count zero. Both behaviors are load-bearing, keep them separate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkingDays(Vec<Weekday>);

impl WorkingDays {
    pub fn new(days: Vec<Weekday>) -> Self {
        let mut days = days;
        days.dedup();
        Self(days)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    /// Monday through Friday.
    pub fn weekdays() -> Self {
        Self(vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ])
    }
}

impl FromStr for WorkingDays {
    type Err = chrono::ParseWeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut days = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let day: Weekday = part.parse()?;
            if !days.contains(&day) {
                days.push(day);
            }
        }
        Ok(Self(days))
    }
}

impl fmt::Display for WorkingDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .0
            .iter()
            .map(|d| match d {
                Weekday::Mon => "monday",
                Weekday::Tue => "tuesday",
                Weekday::Wed => "wednesday",
                Weekday::Thu => "thursday",
                Weekday::Fri => "friday",
                Weekday::Sat => "saturday",
                Weekday::Sun => "sunday",
            })
            .collect();
        write!(f, "{}", names.join(","))
    }
}

/// Weekday membership test against the configured set.
pub fn is_working_day(date: NaiveDate, working_days: &WorkingDays) -> bool {
    working_days.contains(date.weekday())
}

/// Number of days in a calendar month, sized via the first day of the
/// next month minus one (handles leap-year February).
pub fn days_in_month(month: u32, year: i32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(0)
}

/// Count of configured working days falling inside the given month.
/// An empty set counts zero; this is the count-based semantics, distinct
/// from the validator's empty-set pass-through.
pub fn working_days_in_month(working_days: &WorkingDays, month: u32, year: i32) -> u32 {
    let mut count = 0;
    for day in 1..=days_in_month(month, year) {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            if is_working_day(date, working_days) {
                count += 1;
            }
        }
    }
    count
}

pub fn monthly_total_hours(
    working_days: &WorkingDays,
    daily_hours: f64,
    month: u32,
    year: i32,
) -> f64 {
    working_days_in_month(working_days, month, year) as f64 * daily_hours
}

/// Mean of the twelve per-month hour totals for the year. Accounts for
/// variable month lengths rather than approximating with a flat week count.
pub fn average_monthly_hours(working_days: &WorkingDays, daily_hours: f64, year: i32) -> f64 {
    let total: f64 = (1..=12)
        .map(|month| monthly_total_hours(working_days, daily_hours, month, year))
        .sum();
    total / 12.0
}

/// Zero when the denominator is zero; callers rely on this instead of
/// guarding at each site.
pub fn hourly_rate(base_salary: f64, total_monthly_hours: f64) -> f64 {
    if total_monthly_hours == 0.0 {
        0.0
    } else {
        base_salary / total_monthly_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mon_fri() -> WorkingDays {
        WorkingDays::weekdays()
    }

    #[test]
    fn parses_comma_separated_names() {
        let days: WorkingDays = "monday, wednesday,friday".parse().unwrap();
        assert!(days.contains(Weekday::Mon));
        assert!(days.contains(Weekday::Wed));
        assert!(days.contains(Weekday::Fri));
        assert!(!days.contains(Weekday::Tue));
    }

    #[test]
    fn parses_empty_string_as_empty_set() {
        let days: WorkingDays = "".parse().unwrap();
        assert!(days.is_empty());
    }

    #[test]
    fn rejects_garbage_day_names() {
        assert!("monday,funday".parse::<WorkingDays>().is_err());
    }

    #[test]
    fn display_round_trips() {
        let days = mon_fri();
        let parsed: WorkingDays = days.to_string().parse().unwrap();
        assert_eq!(days, parsed);
    }

    #[test]
    fn month_lengths_including_leap_february() {
        assert_eq!(days_in_month(2, 2024), 29);
        assert_eq!(days_in_month(2, 2023), 28);
        assert_eq!(days_in_month(12, 2024), 31);
        assert_eq!(days_in_month(4, 2024), 30);
    }

    #[test]
    fn leap_february_2024_has_21_weekdays() {
        assert_eq!(working_days_in_month(&mon_fri(), 2, 2024), 21);
    }

    #[test]
    fn empty_set_counts_zero_working_days() {
        let empty = WorkingDays::default();
        assert_eq!(working_days_in_month(&empty, 2, 2024), 0);
    }

    #[test]
    fn is_working_day_checks_weekday_membership() {
        // 2024-02-03 is a Saturday
        let saturday = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        assert!(!is_working_day(saturday, &mon_fri()));
        assert!(is_working_day(monday, &mon_fri()));
    }

    #[test]
    fn monthly_totals_scale_by_daily_hours() {
        assert_eq!(monthly_total_hours(&mon_fri(), 8.0, 2, 2024), 168.0);
    }

    #[test]
    fn average_monthly_hours_is_mean_of_actual_months() {
        // 2024 has 262 Mon-Fri days.
        let avg = average_monthly_hours(&mon_fri(), 8.0, 2024);
        assert!((avg - 262.0 * 8.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn hourly_rate_zero_denominator_is_zero() {
        assert_eq!(hourly_rate(50_000.0, 0.0), 0.0);
        assert_eq!(hourly_rate(0.0, 0.0), 0.0);
    }

    #[test]
    fn hourly_rate_divides_base_by_hours() {
        assert!((hourly_rate(33_600.0, 168.0) - 200.0).abs() < 1e-9);
    }
}
