use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;

use super::workdays::{WorkingDays, is_working_day};

/// Temporal and calendar-day rules violated by an attendance write.
/// Messages are shown verbatim to the user; nothing is written when any
/// rule fails.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceError {
    #[display(fmt = "Selected date is not a working day for this employee")]
    NonWorkingDay,
    #[display(fmt = "Check-out time cannot be in the future")]
    FutureCheckOut,
    #[display(fmt = "Check-out time cannot be earlier than check-in time")]
    CheckOutBeforeCheckIn,
}

impl std::error::Error for AttendanceError {}

/// Runs the three attendance rules in order. Applies identically to
/// creation (HR manual mark) and amendment (check-out, HR edit).
///
/// An empty working-day set permits every date; this is the validator's
/// pass-through policy, not the counting semantics in `workdays`.
pub fn validate_attendance(
    date: NaiveDate,
    working_days: &WorkingDays,
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), AttendanceError> {
    if !working_days.is_empty() && !is_working_day(date, working_days) {
        return Err(AttendanceError::NonWorkingDay);
    }

    if let Some(out) = check_out {
        if out > now {
            return Err(AttendanceError::FutureCheckOut);
        }
        if let Some(r#in) = check_in {
            if out < r#in {
                return Err(AttendanceError::CheckOutBeforeCheckIn);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
    }

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 3).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 5, 18, 0, 0).unwrap()
    }

    #[test]
    fn rejects_non_working_day() {
        let result = validate_attendance(saturday(), &WorkingDays::weekdays(), None, None, now());
        assert_eq!(result, Err(AttendanceError::NonWorkingDay));
    }

    #[test]
    fn empty_set_permits_every_day() {
        let result = validate_attendance(saturday(), &WorkingDays::default(), None, None, now());
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn rejects_check_out_one_minute_in_the_future() {
        let out = now() + Duration::minutes(1);
        let result = validate_attendance(
            monday(),
            &WorkingDays::weekdays(),
            Some(now() - Duration::hours(8)),
            Some(out),
            now(),
        );
        assert_eq!(result, Err(AttendanceError::FutureCheckOut));
    }

    #[test]
    fn rejects_check_out_before_check_in() {
        let check_in = now() - Duration::hours(1);
        let check_out = now() - Duration::hours(2);
        let result = validate_attendance(
            monday(),
            &WorkingDays::weekdays(),
            Some(check_in),
            Some(check_out),
            now(),
        );
        assert_eq!(result, Err(AttendanceError::CheckOutBeforeCheckIn));
    }

    #[test]
    fn accepts_ordered_past_times_on_working_day() {
        let check_in = now() - Duration::hours(9);
        let check_out = now() - Duration::minutes(30);
        let result = validate_attendance(
            monday(),
            &WorkingDays::weekdays(),
            Some(check_in),
            Some(check_out),
            now(),
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn check_in_only_is_fine() {
        let result = validate_attendance(
            monday(),
            &WorkingDays::weekdays(),
            Some(now() - Duration::hours(2)),
            None,
            now(),
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn check_out_equal_to_check_in_is_allowed() {
        let t = now() - Duration::hours(1);
        let result =
            validate_attendance(monday(), &WorkingDays::weekdays(), Some(t), Some(t), now());
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            AttendanceError::FutureCheckOut.to_string(),
            "Check-out time cannot be in the future"
        );
    }
}
