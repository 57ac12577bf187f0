//! # Tide Board Session
//!
//! A caller-owned session holding the loaded tide table, the location's civil
//! timezone and the currently selected date. It assembles [`DayView`]s from the
//! engine's outputs and owns the view currently on screen.
//!
//! Views are keyed by date. A view computed for a date that is no longer
//! selected (a refresh tick racing a date change) is discarded on
//! [`TideSession::accept`] instead of replacing what is shown.

use crate::{
    civil_time,
    config::Config,
    estimator,
    sampler::{self, ChartData},
    tide_data::{self, TideError},
    NextEventInfo, PointEstimate, TideEvent,
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

/// A moment expressed in the tide location's civil calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CivilNow {
    pub date: NaiveDate,
    /// Minutes since civil midnight
    pub minutes: u16,
}

/// One line of the day's tide list.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TideEntry {
    pub event: TideEvent,
    pub is_high: bool,
}

/// Everything shown for one selected date.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub is_today: bool,
    /// Query minute the view was computed for
    pub now_minutes: u16,
    pub entries: Vec<TideEntry>,
    /// Absent when the date has no data
    pub chart: Option<ChartData>,
    /// Only computed for today
    pub current: Option<PointEstimate>,
    /// Only computed for today
    pub next: Option<NextEventInfo>,
}

impl DayView {
    /// True when the table has nothing for this date.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Chart render contract; a date without data gives empty arrays and no now line.
    pub fn render_contract(&self) -> ChartData {
        self.chart
            .clone()
            .unwrap_or_else(|| ChartData::from_samples(&[], None))
    }
}

pub struct TideSession {
    events: Vec<TideEvent>,
    dates: Vec<NaiveDate>,
    zone: Tz,
    threshold_m: f64,
    selected: Option<NaiveDate>,
    shown: Option<DayView>,
    /// Civil date the default selection was last made for
    followed_day: Option<NaiveDate>,
}

impl TideSession {
    pub fn new(events: Vec<TideEvent>, zone: Tz, threshold_m: f64) -> Self {
        let dates = tide_data::available_dates(&events);
        Self {
            events,
            dates,
            zone,
            threshold_m,
            selected: None,
            shown: None,
            followed_day: None,
        }
    }

    /// Build a session with the configured timezone and high/low threshold.
    pub fn from_config(events: Vec<TideEvent>, config: &Config) -> Result<Self, TideError> {
        Ok(Self::new(
            events,
            config.timezone()?,
            config.display.high_tide_threshold_m,
        ))
    }

    /// Dates covered by the table, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// `instant` in the location's civil calendar.
    pub fn civil_now(&self, instant: DateTime<Utc>) -> CivilNow {
        CivilNow {
            date: civil_time::civil_date(instant, self.zone),
            minutes: civil_time::civil_minutes(instant, self.zone),
        }
    }

    /// The wall clock in the location's civil calendar.
    pub fn now(&self) -> CivilNow {
        let (date, minutes) = civil_time::now_in(self.zone);
        CivilNow { date, minutes }
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    /// Select today if covered, else the first available date.
    pub fn select_initial(&mut self, now: CivilNow) -> Option<NaiveDate> {
        self.followed_day = Some(now.date);
        let date = tide_data::initial_date(&self.dates, now.date)?;
        self.select(date);
        Some(date)
    }

    /// Redo the default selection once civil midnight has passed since the
    /// last one. Returns true when the selection was re-evaluated.
    pub fn follow_today(&mut self, now: CivilNow) -> bool {
        if self.followed_day == Some(now.date) {
            return false;
        }
        debug!(date = %now.date, "civil date rolled over");
        self.select_initial(now);
        true
    }

    /// Change the selected date. The previously shown view is released.
    pub fn select(&mut self, date: NaiveDate) {
        if self.selected != Some(date) {
            debug!(%date, "selected date changed");
            self.selected = Some(date);
            self.shown = None;
        }
    }

    /// Compute the view for `date` as seen at `now`.
    pub fn view(&self, date: NaiveDate, now: CivilNow) -> DayView {
        let day = tide_data::events_for(&self.events, date);
        let is_today = date == now.date;
        let entries = day
            .iter()
            .map(|event| TideEntry {
                event: *event,
                is_high: event.is_high_with(self.threshold_m),
            })
            .collect();

        if day.is_empty() {
            return DayView {
                date,
                is_today,
                now_minutes: now.minutes,
                entries,
                chart: None,
                current: None,
                next: None,
            };
        }

        let marker = is_today.then_some(now.minutes);
        let (current, next) = if is_today {
            (
                estimator::estimate_now(&day, now.minutes),
                estimator::next_event_with_threshold(&day, now.minutes, self.threshold_m),
            )
        } else {
            (None, None)
        };

        DayView {
            date,
            is_today,
            now_minutes: now.minutes,
            entries,
            chart: Some(sampler::chart(&day, marker)),
            current,
            next,
        }
    }

    /// View of the selected date, if one is selected.
    pub fn selected_view(&self, now: CivilNow) -> Option<DayView> {
        self.selected.map(|date| self.view(date, now))
    }

    /// Show `view` if it belongs to the selected date. Stale views are dropped
    /// and `false` is returned.
    pub fn accept(&mut self, view: DayView) -> bool {
        if self.selected != Some(view.date) {
            debug!(date = %view.date, "discarding view for unselected date");
            return false;
        }
        self.shown = Some(view);
        true
    }

    /// The view currently on screen.
    pub fn shown(&self) -> Option<&DayView> {
        self.shown.as_ref()
    }
}
