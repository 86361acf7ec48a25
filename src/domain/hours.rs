use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::{Display, EnumString};

/// Minimum worked hours for a day to count as a valid attendance day.
pub const MIN_VALID_HOURS: f64 = 6.0;

/// Worked hours between two timestamps: whole hours plus the minute
/// remainder as an hour fraction, rounded to 2 decimal places.
/// 09:00 -> 17:45 yields 8.75. A span shorter than a minute, or an
/// inverted span, yields 0.0 (inverted spans are rejected upstream by the
/// validator; the clamp here is the documented contract, not a guard).
pub fn total_hours(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> f64 {
    let minutes = (check_out - check_in).num_minutes();
    if minutes <= 0 {
        return 0.0;
    }
    let whole = minutes / 60;
    let remainder = minutes % 60;
    let value = whole as f64 + remainder as f64 / 60.0;
    (value * 100.0).round() / 100.0
}

/// Renders fractional hours as "{H}h {M}m", dropping the minutes segment
/// when it is zero: 8.5 -> "8h 30m", 8.0 -> "8h", 0.0 -> "0h".
pub fn format_hours(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round() as i64;
    let h = total_minutes / 60;
    let m = total_minutes % 60;
    if m == 0 {
        format!("{h}h")
    } else {
        format!("{h}h {m}m")
    }
}

/// Threshold test against the per-day minimum.
pub fn is_valid_attendance(hours: f64, minimum_hours: f64) -> bool {
    hours >= minimum_hours
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Absent,
    Incomplete,
    Present,
}

/// Absent if never checked in (regardless of a stray check-out), then
/// Incomplete if checked in without checking out, else Present. The order
/// of these checks is part of the contract.
pub fn attendance_status(
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
) -> AttendanceStatus {
    if check_in.is_none() {
        AttendanceStatus::Absent
    } else if check_out.is_none() {
        AttendanceStatus::Incomplete
    } else {
        AttendanceStatus::Present
    }
}

/// Rounded percentage of present days over total days; 0 when total is 0.
pub fn attendance_percentage(present: u32, total: u32) -> u32 {
    if total == 0 {
        0
    } else {
        (present as f64 / total as f64 * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 5, h, m, 0).unwrap()
    }

    #[test]
    fn total_hours_nine_to_five_forty_five() {
        assert_eq!(total_hours(at(9, 0), at(17, 45)), 8.75);
    }

    #[test]
    fn total_hours_whole_day() {
        assert_eq!(total_hours(at(9, 0), at(17, 0)), 8.0);
    }

    #[test]
    fn total_hours_rounds_to_two_decimals() {
        // 8h 20m = 8.333... -> 8.33
        assert_eq!(total_hours(at(9, 0), at(17, 20)), 8.33);
    }

    #[test]
    fn total_hours_inverted_span_is_zero() {
        assert_eq!(total_hours(at(17, 0), at(9, 0)), 0.0);
    }

    #[test]
    fn total_hours_zero_span_is_zero() {
        assert_eq!(total_hours(at(9, 0), at(9, 0)), 0.0);
    }

    #[test]
    fn format_hours_rendering() {
        assert_eq!(format_hours(0.0), "0h");
        assert_eq!(format_hours(8.5), "8h 30m");
        assert_eq!(format_hours(8.0), "8h");
        assert_eq!(format_hours(0.25), "0h 15m");
    }

    #[test]
    fn valid_attendance_threshold() {
        assert!(is_valid_attendance(6.0, MIN_VALID_HOURS));
        assert!(is_valid_attendance(8.75, MIN_VALID_HOURS));
        assert!(!is_valid_attendance(5.99, MIN_VALID_HOURS));
    }

    #[test]
    fn status_absent_wins_even_with_stray_check_out() {
        assert_eq!(
            attendance_status(None, Some(at(17, 0))),
            AttendanceStatus::Absent
        );
        assert_eq!(attendance_status(None, None), AttendanceStatus::Absent);
    }

    #[test]
    fn status_incomplete_then_present() {
        assert_eq!(
            attendance_status(Some(at(9, 0)), None),
            AttendanceStatus::Incomplete
        );
        assert_eq!(
            attendance_status(Some(at(9, 0)), Some(at(17, 0))),
            AttendanceStatus::Present
        );
    }

    #[test]
    fn percentage_zero_total_is_zero() {
        assert_eq!(attendance_percentage(0, 0), 0);
        assert_eq!(attendance_percentage(5, 0), 0);
    }

    #[test]
    fn percentage_rounds() {
        assert_eq!(attendance_percentage(5, 20), 25);
        assert_eq!(attendance_percentage(1, 3), 33);
        assert_eq!(attendance_percentage(2, 3), 67);
    }
}
