//! # Tide Board Core Library
//!
//! This library provides the data model and the tide curve engine for the tide
//! board application. The board shows one coastal location's tide extrema for a
//! day, the estimated height right now, the time until the next tide, and a
//! smooth curve with a "now" marker.
//!
//! ## Design Philosophy
//!
//! ### Sparse Extrema, Dense Curve
//! Tide tables publish only the extrema: typically two highs and two lows per day.
//! The engine fills the gaps with a half-cosine ease between each pair of extrema,
//! which gives zero slope at every high and low water, the way a real tide turns.
//! This is a local smoothing approximation, not harmonic prediction.
//!
//! ### Civil Minutes
//! All engine arithmetic happens on minutes since midnight (0-1439) in the
//! location's civil timezone. Converting the wall clock into that domain happens
//! once, in [`civil_time`], with a named IANA zone rather than the host locale.
//!
//! ### Data Flow
//! 1. **Load**: `tides.json` records → [`TideEvent`]s (cache-first, see [`tide_data`])
//! 2. **Select**: filter to one civil date, sort ascending ([`session`])
//! 3. **Derive**: [`sampler`] builds the chart sequence, [`estimator`] the point estimates
//! 4. **Render**: terminal board or JSON render contract ([`renderer`])
//!
//! ## Core Types
//! - [`TideEvent`]: one recorded high or low tide
//! - [`Sample`]: one point of the dense chart sequence
//! - [`PointEstimate`] / [`NextEventInfo`]: "right now" derivations

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// Module declarations
pub mod civil_time;
pub mod config;
pub mod estimator;
pub mod renderer;
pub mod sampler;
pub mod session;
pub mod tide_data;

/// Heights at or above this many meters classify an extremum as high tide.
pub const HIGH_TIDE_THRESHOLD_M: f64 = 1.5;

/// Spacing of interpolated chart samples between two extrema.
pub const SAMPLE_STEP_MINUTES: u16 = 15;

/// Timestamp layouts accepted in the tide data file, seconds optional.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// A recorded high or low tide.
///
/// The timestamp is a local wall-clock value in the location's civil timezone;
/// it carries no offset. Events are immutable once loaded.
///
/// # Example
/// ```
/// use tide_board_lib::TideEvent;
///
/// let event = TideEvent::parse("2026-01-18T14:30:00", 2.1).unwrap();
/// assert_eq!(event.minutes(), 14 * 60 + 30);
/// assert_eq!(event.label(), "14:30");
/// assert!(event.is_high());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideEvent {
    /// Local civil date and time of the extremum
    #[serde(
        serialize_with = "serialize_datetime",
        deserialize_with = "deserialize_datetime"
    )]
    pub datetime: NaiveDateTime,
    /// Height in meters
    pub height: f64,
}

impl TideEvent {
    /// Build an event from a `YYYY-MM-DDTHH:MM[:SS]` string.
    pub fn parse(datetime: &str, height: f64) -> Option<Self> {
        parse_datetime(datetime).map(|datetime| Self { datetime, height })
    }

    /// Minutes since local midnight. Seconds are ignored.
    pub fn minutes(&self) -> u16 {
        civil_time::minutes_of(&self.datetime)
    }

    /// Civil date this event belongs to.
    pub fn date(&self) -> NaiveDate {
        self.datetime.date()
    }

    /// `HH:MM` label.
    pub fn label(&self) -> String {
        civil_time::format_hhmm(self.minutes())
    }

    /// True when the height reaches [`HIGH_TIDE_THRESHOLD_M`].
    pub fn is_high(&self) -> bool {
        self.is_high_with(HIGH_TIDE_THRESHOLD_M)
    }

    /// High/low classification against a caller-supplied threshold.
    pub fn is_high_with(&self, threshold_m: f64) -> bool {
        self.height >= threshold_m
    }
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
}

fn serialize_datetime<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&dt.format(DATETIME_FORMATS[0]).to_string())
}

fn deserialize_datetime<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(d)?;
    parse_datetime(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid tide datetime: {raw}")))
}

/// One point of the dense chart sequence.
///
/// Original points are the extrema themselves; everything else is an
/// interpolated sample placed every [`SAMPLE_STEP_MINUTES`] between them.
///
/// # Example
/// ```
/// use tide_board_lib::Sample;
///
/// let high = Sample::original(12 * 60, 1.8);
/// assert_eq!(high.label, "12:00");
/// assert!(high.is_original_point);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// `HH:MM` label
    pub label: String,
    /// Minutes since local midnight
    pub minutes: u16,
    /// Height in meters
    pub height: f64,
    /// True for recorded extrema, false for interpolated samples
    pub is_original_point: bool,
}

impl Sample {
    pub fn original(minutes: u16, height: f64) -> Self {
        Self::new(minutes, height, true)
    }

    pub fn interpolated(minutes: u16, height: f64) -> Self {
        Self::new(minutes, height, false)
    }

    fn new(minutes: u16, height: f64, is_original_point: bool) -> Self {
        Self {
            label: civil_time::format_hhmm(minutes),
            minutes,
            height,
            is_original_point,
        }
    }
}

/// Direction the tide is moving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
}

/// Interpolated tide height at a query instant inside the day's extrema span.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointEstimate {
    /// Estimated height in meters
    pub height: f64,
    /// Rising if the next extremum is higher than the previous one
    pub trend: Trend,
    /// Query instant as minutes since local midnight
    pub query_minutes: u16,
}

/// The next extremum after a query instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NextEventInfo {
    pub event: TideEvent,
    /// Time until the event, in whole milliseconds
    pub milliseconds_until: u64,
    /// High/low classification of `event`
    pub is_high: bool,
}
