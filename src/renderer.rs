//! # Tide Board Rendering
//!
//! This module renders a [`DayView`] to the terminal: the day's tide list, the current
//! estimate and next-tide countdown (today only), and an ASCII tide curve with a
//! "now" column. Rendering builds a `String` so it can be tested; [`draw_ascii`]
//! prints it.

use crate::{
    config::Config,
    estimator::format_duration,
    sampler::{ChartData, MarkerFlag},
    session::DayView,
    Trend,
};
use std::fmt::Write;

const HIGH_ICON: &str = "🌊";
const LOW_ICON: &str = "🌙";
const Y_AXIS_WIDTH: usize = 6; // Space for Y-axis labels

/// Format a height in meters with two decimals.
fn format_height(height_m: f64) -> String {
    format!("{height_m:.2} m")
}

/// Render the whole board for one day.
pub fn render_board(view: &DayView, config: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}, {}", config.location.name, view.date);
    out.push('\n');

    if view.is_empty() {
        out.push_str("No data available for this date.\n");
        return out;
    }

    if let Some(current) = &view.current {
        let trend = match current.trend {
            Trend::Rising => "↑ rising",
            Trend::Falling => "↓ falling",
        };
        let _ = writeln!(
            out,
            "Now ({})  {}  {}",
            crate::civil_time::format_hhmm(current.query_minutes),
            format_height(current.height),
            trend
        );
    }
    if let Some(next) = &view.next {
        let _ = writeln!(
            out,
            "Next {} tide in {} ({})",
            if next.is_high { "high" } else { "low" },
            format_duration(next.milliseconds_until),
            next.event.label()
        );
    }
    if view.current.is_some() || view.next.is_some() {
        out.push('\n');
    }

    for entry in &view.entries {
        let icon = if entry.is_high { HIGH_ICON } else { LOW_ICON };
        let _ = writeln!(
            out,
            "{icon} {}  {:>7}",
            entry.event.label(),
            format_height(entry.event.height)
        );
    }

    if let Some(chart) = &view.chart {
        out.push('\n');
        out.push_str(&render_chart(chart, config.display.chart_rows));
    }
    out
}

/// Render the tide curve as an ASCII grid, one column per sample.
///
/// Extrema are drawn as `o`, interpolated samples as `•`, and the sample at or
/// just before the now line as `X` with a `:` column above and below it.
pub fn render_chart(chart: &ChartData, rows: usize) -> String {
    let rows = rows.max(2);
    let columns = chart.values.len();
    if columns == 0 {
        return String::new();
    }

    let (min_h, max_h) = chart
        .values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &h| {
            (min.min(h), max.max(h))
        });
    // Y axis always covers whole half-meters
    let axis_min = (min_h * 2.0).floor() / 2.0;
    let axis_max = ((max_h * 2.0).ceil() / 2.0).max(axis_min + 0.5);

    let height_to_row = |h: f64| {
        let normalized = (h - axis_min) / (axis_max - axis_min);
        ((1.0 - normalized) * (rows as f64 - 1.0)).round() as usize
    };

    let mut grid = vec![vec![' '; columns + Y_AXIS_WIDTH]; rows];

    // Y-axis labels every half meter
    let mut tick = axis_min;
    while tick <= axis_max + 1e-9 {
        let row = height_to_row(tick).min(rows - 1);
        let label = format!("{tick:<width$.1}", width = Y_AXIS_WIDTH - 1);
        for (i, ch) in label.chars().take(Y_AXIS_WIDTH - 1).enumerate() {
            grid[row][i] = ch;
        }
        tick += 0.5;
    }
    for row in grid.iter_mut() {
        row[Y_AXIS_WIDTH - 1] = '│'; // Vertical axis line
    }

    // A now line past the last sample is not drawn
    let now_column = chart
        .now_marker()
        .map(|idx| idx.floor() as usize)
        .filter(|&column| column < columns);
    if let Some(column) = now_column {
        for row in grid.iter_mut() {
            row[column + Y_AXIS_WIDTH] = ':';
        }
    }

    for (column, &height) in chart.values.iter().enumerate() {
        let row = height_to_row(height).min(rows - 1);
        let flag = chart.marker_flags.get(column);
        grid[row][column + Y_AXIS_WIDTH] = if now_column == Some(column) {
            'X'
        } else if flag == Some(&MarkerFlag::Original) {
            'o'
        } else {
            '•'
        };
    }

    let mut out = String::new();
    for row in grid {
        out.extend(row);
        out.push('\n');
    }

    // Ticks under each extremum, then first and last labels
    let padding = " ".repeat(Y_AXIS_WIDTH);
    let ticks: String = chart
        .marker_flags
        .iter()
        .take(columns)
        .map(|flag| if *flag == MarkerFlag::Original { '|' } else { ' ' })
        .collect();
    let _ = writeln!(out, "{padding}{ticks}");

    let first = chart.labels.first().map(String::as_str).unwrap_or_default();
    let last = chart.labels.last().map(String::as_str).unwrap_or_default();
    let gap = columns.saturating_sub(first.len() + last.len()).max(1);
    let _ = writeln!(out, "{padding}{first}{}{last}", " ".repeat(gap));
    out
}

/// Render the board to stdout.
pub fn draw_ascii(view: &DayView, config: &Config) {
    print!("{}", render_board(view, config));
}
