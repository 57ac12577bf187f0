//! # Civil Time Helpers
//!
//! The engine works on minutes since local midnight in the tide location's civil
//! timezone. This module is the only place that touches the wall clock or a
//! timezone: it turns an absolute instant into the location's civil date and
//! minute of day using a named IANA zone from `chrono-tz`, never the host's
//! locale or local offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Minutes in a civil day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Milliseconds in one minute.
pub const MS_PER_MINUTE: u64 = 60_000;

/// Milliseconds in one hour.
pub const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Parse an IANA timezone name such as `America/Recife`.
pub fn parse_zone(name: &str) -> Option<Tz> {
    name.parse().ok()
}

/// Civil wall-clock time at `instant` in `zone`.
pub fn civil_datetime(instant: DateTime<Utc>, zone: Tz) -> NaiveDateTime {
    zone.from_utc_datetime(&instant.naive_utc()).naive_local()
}

/// Civil date at `instant` in `zone`.
pub fn civil_date(instant: DateTime<Utc>, zone: Tz) -> NaiveDate {
    civil_datetime(instant, zone).date()
}

/// Minutes since civil midnight at `instant` in `zone` (seconds truncated).
pub fn civil_minutes(instant: DateTime<Utc>, zone: Tz) -> u16 {
    minutes_of(&civil_datetime(instant, zone))
}

/// Minutes since midnight of a wall-clock value (seconds truncated).
pub fn minutes_of(dt: &NaiveDateTime) -> u16 {
    (dt.hour() * 60 + dt.minute()) as u16
}

/// Format minutes since midnight as `HH:MM`.
///
/// Values past the end of the day are not wrapped; the engine never produces them.
pub fn format_hhmm(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Current civil date and minute of day in `zone`.
pub fn now_in(zone: Tz) -> (NaiveDate, u16) {
    let now = Utc::now();
    (civil_date(now, zone), civil_minutes(now, zone))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recife() -> Tz {
        parse_zone("America/Recife").unwrap()
    }

    #[test]
    fn test_format_hhmm_pads() {
        assert_eq!(format_hhmm(0), "00:00");
        assert_eq!(format_hhmm(65), "01:05");
        assert_eq!(format_hhmm(MINUTES_PER_DAY - 1), "23:59");
    }

    #[test]
    fn test_civil_minutes_uses_named_zone() {
        // Recife is UTC-3 all year
        let instant = Utc.with_ymd_and_hms(2026, 1, 18, 12, 40, 59).unwrap();
        assert_eq!(civil_minutes(instant, recife()), 9 * 60 + 40);
        assert_eq!(
            civil_date(instant, recife()),
            NaiveDate::from_ymd_opt(2026, 1, 18).unwrap()
        );
    }

    #[test]
    fn test_civil_date_rolls_back_across_utc_midnight() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 19, 1, 30, 0).unwrap();
        assert_eq!(
            civil_date(instant, recife()),
            NaiveDate::from_ymd_opt(2026, 1, 18).unwrap()
        );
        assert_eq!(civil_minutes(instant, recife()), 22 * 60 + 30);
    }

    #[test]
    fn test_unknown_zone_is_rejected() {
        assert!(parse_zone("Atlantis/Nowhere").is_none());
    }
}
