//! # Point Estimator
//!
//! Answers the two "right now" questions for a list of ordered extrema:
//! how high is the tide at a given minute, and how long until the next high or
//! low. Both are pure functions of their inputs and cheap enough to call on
//! every refresh tick.

use crate::{
    civil_time::{MS_PER_HOUR, MS_PER_MINUTE},
    sampler::interpolate,
    NextEventInfo, PointEstimate, TideEvent, Trend, HIGH_TIDE_THRESHOLD_M,
};

/// Estimated height and trend at `now_minutes`.
///
/// The first pair of consecutive extrema with `t1 <= now <= t2` is used.
/// Returns `None` before the first or after the last extremum.
pub fn estimate_now(events: &[TideEvent], now_minutes: u16) -> Option<PointEstimate> {
    events.windows(2).find_map(|pair| {
        let (a, b) = (&pair[0], &pair[1]);
        let (t1, t2) = (a.minutes(), b.minutes());
        if !(t1 <= now_minutes && now_minutes <= t2) {
            return None;
        }
        // Zero-length pair: the query sits exactly on both extrema
        let pct = if t2 > t1 {
            f64::from(now_minutes - t1) / f64::from(t2 - t1)
        } else {
            0.0
        };
        Some(PointEstimate {
            height: interpolate(a.height, b.height, pct),
            trend: if b.height > a.height {
                Trend::Rising
            } else {
                Trend::Falling
            },
            query_minutes: now_minutes,
        })
    })
}

/// First extremum strictly after `now_minutes`, classified at 1.5 m.
pub fn next_event(events: &[TideEvent], now_minutes: u16) -> Option<NextEventInfo> {
    next_event_with_threshold(events, now_minutes, HIGH_TIDE_THRESHOLD_M)
}

/// [`next_event`] with a configurable high/low threshold.
pub fn next_event_with_threshold(
    events: &[TideEvent],
    now_minutes: u16,
    threshold_m: f64,
) -> Option<NextEventInfo> {
    events
        .iter()
        .find(|e| e.minutes() > now_minutes)
        .map(|event| NextEventInfo {
            event: *event,
            milliseconds_until: u64::from(event.minutes() - now_minutes) * MS_PER_MINUTE,
            is_high: event.is_high_with(threshold_m),
        })
}

/// Format a countdown as `45min` or `1h 30min`.
pub fn format_duration(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    if hours > 0 {
        format!("{hours}h {minutes}min")
    } else {
        format!("{minutes}min")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(time: &str, height: f64) -> TideEvent {
        TideEvent::parse(&format!("2026-01-18T{time}:00"), height).unwrap()
    }

    #[test]
    fn test_estimate_absent_before_first_event() {
        let events = [ev("06:00", 0.2), ev("12:00", 1.8)];
        assert_eq!(estimate_now(&events, 300), None);
        assert_eq!(estimate_now(&events, 721), None);
    }

    #[test]
    fn test_estimate_inside_rising_bucket() {
        let events = [ev("06:00", 0.2), ev("12:00", 1.8)];
        let estimate = estimate_now(&events, 540).unwrap();
        assert!(estimate.height > 0.2 && estimate.height < 1.8);
        assert!((estimate.height - 1.0).abs() < 1e-9);
        assert_eq!(estimate.trend, Trend::Rising);
        assert_eq!(estimate.query_minutes, 540);
    }

    #[test]
    fn test_estimate_on_extrema_returns_their_heights() {
        let events = [ev("06:00", 0.2), ev("12:00", 1.8), ev("18:00", 0.4)];
        assert!((estimate_now(&events, 360).unwrap().height - 0.2).abs() < 1e-9);
        // 12:00 closes the first pair, which wins over the second
        let at_high = estimate_now(&events, 720).unwrap();
        assert!((at_high.height - 1.8).abs() < 1e-9);
        assert_eq!(at_high.trend, Trend::Rising);
        assert_eq!(estimate_now(&events, 900).unwrap().trend, Trend::Falling);
    }

    #[test]
    fn test_estimate_flat_pair_is_falling() {
        let events = [ev("06:00", 1.0), ev("12:00", 1.0)];
        let estimate = estimate_now(&events, 600).unwrap();
        assert_eq!(estimate.trend, Trend::Falling);
        assert!((estimate.height - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_zero_length_pair_does_not_divide_by_zero() {
        let events = [ev("06:00", 0.5), ev("06:00", 0.7)];
        let estimate = estimate_now(&events, 360).unwrap();
        assert!(estimate.height.is_finite());
        assert!((estimate.height - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_needs_two_events() {
        assert_eq!(estimate_now(&[], 600), None);
        assert_eq!(estimate_now(&[ev("10:00", 1.0)], 600), None);
    }

    #[test]
    fn test_next_event_selection() {
        let events = [ev("06:00", 0.3), ev("12:00", 1.9), ev("18:00", 0.4)];
        let next = next_event(&events, 700).unwrap();
        assert_eq!(next.event, events[1]);
        assert_eq!(next.milliseconds_until, 1_200_000);
        assert!(next.is_high);
    }

    #[test]
    fn test_next_event_is_strictly_after_now() {
        let events = [ev("06:00", 0.3), ev("12:00", 1.9), ev("18:00", 0.4)];
        let next = next_event(&events, 720).unwrap();
        assert_eq!(next.event, events[2]);
        assert!(!next.is_high);
        assert_eq!(next_event(&events, 1080), None);
        assert_eq!(next_event(&[], 0), None);
    }

    #[test]
    fn test_next_event_threshold() {
        let events = [ev("06:00", 1.5), ev("12:00", 1.499999)];
        assert!(next_event(&events, 0).unwrap().is_high);
        assert!(!next_event(&events, 400).unwrap().is_high);
        assert!(next_event_with_threshold(&events, 400, 1.0).unwrap().is_high);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(90 * 60_000), "1h 30min");
        assert_eq!(format_duration(45 * 60_000), "45min");
        assert_eq!(format_duration(60 * 60_000), "1h 0min");
        assert_eq!(format_duration(59_999), "0min");
        assert_eq!(format_duration(0), "0min");
    }
}
