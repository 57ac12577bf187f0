//! # Tide Board Application Entry Point
//!
//! This binary crate wires the library together: load configuration and the tide
//! table, pick a date, and render the board to the terminal, once or on a refresh
//! tick. `--json` prints the chart render contract instead of the board.


use anyhow::Context;
use chrono::NaiveDate;
use std::{env, time::Duration};
use tide_board_lib::{
    config::Config,
    renderer::draw_ascii,
    session::{CivilNow, TideSession},
    tide_data,
};
use tracing::{info, warn, Level};

/// Command line options.
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config: Option<String>,
    date: Option<NaiveDate>,
    watch: bool,
    json: bool,
    verbose: bool,
}

impl CliArgs {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    parsed.config = Some(args.next().context("--config needs a path")?);
                }
                "--date" => {
                    let raw = args.next().context("--date needs YYYY-MM-DD")?;
                    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .with_context(|| format!("invalid --date {raw}"))?;
                    parsed.date = Some(date);
                }
                "--watch" => parsed.watch = true,
                "--json" => parsed.json = true,
                "--verbose" => parsed.verbose = true,
                other => anyhow::bail!("unknown argument: {other}"),
            }
        }
        Ok(parsed)
    }
}

/// Render the selected date once.
fn render(
    session: &mut TideSession,
    config: &Config,
    json: bool,
    now: CivilNow,
) -> anyhow::Result<()> {
    let Some(view) = session.selected_view(now) else {
        println!("No tide data available.");
        return Ok(());
    };
    if !session.accept(view) {
        return Ok(());
    }
    let Some(view) = session.shown() else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string(&view.render_contract())?);
    } else {
        draw_ascii(view, config);
    }
    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse(env::args())?;

    // Logs go to stderr so stdout carries only the board
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    let events = rt
        .block_on(tide_data::fetch(&config.data))
        .with_context(|| format!("loading tide table from {}", config.data.source))?;

    let mut session = TideSession::from_config(events, &config)?;
    let now = session.now();
    match args.date {
        Some(date) => session.select(date),
        None => {
            if session.select_initial(now).is_none() {
                warn!("tide table is empty");
            }
        }
    }
    if let Some(date) = session.selected() {
        info!(%date, location = %config.location.name, "showing tides");
    }

    render(&mut session, &config, args.json, now)?;

    if args.watch {
        let follow_today = args.date.is_none();
        rt.block_on(watch(&mut session, &config, args.json, follow_today))?;
    }
    Ok(())
}

/// Re-render on every refresh tick, recomputing "now" each time. Without a
/// pinned `--date`, the selection moves to the new day after civil midnight.
async fn watch(
    session: &mut TideSession,
    config: &Config,
    json: bool,
    follow_today: bool,
) -> anyhow::Result<()> {
    let period = Duration::from_secs(config.display.refresh_seconds.max(1));
    let mut ticker = tokio::time::interval(period);
    // First tick completes immediately; the board is already drawn
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let now = session.now();
        if follow_today && session.follow_today(now) {
            if let Some(date) = session.selected() {
                info!(%date, "showing tides for the new day");
            }
        }
        render(session, config, json, now)?;
    }
}
