//! # Tide Curve Sampler
//!
//! Turns a day's sparse extrema into the dense sequence the chart draws.
//!
//! ## Interpolation
//! Between two extrema the height follows a half-cosine ease:
//! ```text
//! height = h1 + (h2 - h1) * 0.5 * (1 - cos(π * p))     p ∈ [0, 1]
//! ```
//! The slope is zero at both ends, so the curve flattens at every high and low
//! water instead of forming the sharp corners of a straight-line join.
//!
//! ## Sampling Grid
//! Each extremum is emitted as an original point, followed by interpolated
//! samples every [`SAMPLE_STEP_MINUTES`] up to (not including) the next
//! extremum. The last extremum has nothing after it. Every bucket is sampled
//! densely, whether or not the day being drawn is today.
//!
//! ## "Now" Position
//! Two positions are derived for the current day:
//! - [`DaySamples::now_sample_index`]: the sample whose 15-minute window holds
//!   the query minute, searched only in the first bucket `[tᵢ, tᵢ₊₁)` holding it
//! - [`ChartData::now_index`]: the fractional x position of the "now" line,
//!   halfway between the two samples whose labels straddle the query minute

use crate::{Sample, TideEvent, SAMPLE_STEP_MINUTES};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// `now_index` value meaning "draw no now line".
pub const NO_MARKER: f64 = -1.0;

/// Half-cosine ease from `h1` (at `pct = 0`) to `h2` (at `pct = 1`).
pub fn interpolate(h1: f64, h2: f64, pct: f64) -> f64 {
    h1 + (h2 - h1) * 0.5 * (1.0 - (PI * pct).cos())
}

/// Dense chart sequence for one day.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DaySamples {
    pub samples: Vec<Sample>,
    /// Sample whose window holds the query minute, if any
    pub now_sample_index: Option<usize>,
}

/// Build the dense sample sequence for one day's ordered extrema.
///
/// `events` must be sorted ascending and belong to a single civil date; the
/// sampler neither sorts nor filters. Pass `now_minutes` only when the day is
/// today and a current-position marker is wanted.
///
/// Zero-length or inverted buckets get no interpolated samples.
pub fn sample(events: &[TideEvent], now_minutes: Option<u16>) -> DaySamples {
    let mut day = DaySamples {
        samples: Vec::with_capacity(expected_len(events)),
        now_sample_index: None,
    };
    let mut now_bucket_found = false;

    for (i, event) in events.iter().enumerate() {
        let start = event.minutes();
        let bucket_start = day.samples.len();
        day.samples.push(Sample::original(start, event.height));

        let Some(next) = events.get(i + 1) else {
            continue;
        };
        let end = next.minutes();
        if end > start {
            let span = f64::from(end - start);
            let mut m = start + SAMPLE_STEP_MINUTES;
            while m < end {
                let pct = f64::from(m - start) / span;
                day.samples
                    .push(Sample::interpolated(m, interpolate(event.height, next.height, pct)));
                m += SAMPLE_STEP_MINUTES;
            }
        }

        if let Some(now) = now_minutes {
            if !now_bucket_found && start <= now && now < end {
                now_bucket_found = true;
                day.now_sample_index = day.samples[bucket_start..]
                    .iter()
                    .position(|s| s.minutes <= now && now < s.minutes + SAMPLE_STEP_MINUTES)
                    .map(|offset| bucket_start + offset);
            }
        }
    }

    day
}

/// Upper bound on the sample count, so the sequence never reallocates.
fn expected_len(events: &[TideEvent]) -> usize {
    let interpolated: usize = events
        .windows(2)
        .map(|w| {
            let gap = w[1].minutes().saturating_sub(w[0].minutes());
            usize::from(gap / SAMPLE_STEP_MINUTES)
        })
        .sum();
    events.len() + interpolated
}

/// Fractional x position of the "now" line over `samples`.
///
/// Returns `i + 0.5` for the first pair with `samples[i] <= now < samples[i + 1]`,
/// the last index when `now` is at or past the last sample, and `None` when
/// `now` precedes the whole sequence.
pub fn now_line_index(samples: &[Sample], now_minutes: u16) -> Option<f64> {
    let straddle = samples
        .windows(2)
        .position(|w| w[0].minutes <= now_minutes && now_minutes < w[1].minutes);
    if let Some(i) = straddle {
        return Some(i as f64 + 0.5);
    }
    match samples.last() {
        Some(last) if now_minutes >= last.minutes => Some((samples.len() - 1) as f64),
        _ => None,
    }
}

/// How a chart point should be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerFlag {
    Original,
    Interpolated,
}

/// Render contract handed to a chart widget.
///
/// Parallel arrays, one entry per sample. `now_index` may fall between two
/// samples; [`NO_MARKER`] suppresses the line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub marker_flags: Vec<MarkerFlag>,
    pub now_index: f64,
}

impl ChartData {
    /// Flatten a sample sequence into the render contract.
    pub fn from_samples(samples: &[Sample], now_minutes: Option<u16>) -> Self {
        let now_index = now_minutes
            .and_then(|now| now_line_index(samples, now))
            .unwrap_or(NO_MARKER);
        Self {
            labels: samples.iter().map(|s| s.label.clone()).collect(),
            values: samples.iter().map(|s| s.height).collect(),
            marker_flags: samples
                .iter()
                .map(|s| {
                    if s.is_original_point {
                        MarkerFlag::Original
                    } else {
                        MarkerFlag::Interpolated
                    }
                })
                .collect(),
            now_index,
        }
    }

    /// The now line position, if one should be drawn.
    pub fn now_marker(&self) -> Option<f64> {
        (self.now_index >= 0.0).then_some(self.now_index)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Sample a day and flatten it into the render contract in one step.
pub fn chart(events: &[TideEvent], now_minutes: Option<u16>) -> ChartData {
    let day = sample(events, now_minutes);
    ChartData::from_samples(&day.samples, now_minutes)
}
