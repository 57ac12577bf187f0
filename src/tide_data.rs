//! # Tide Table Loading and Caching
//!
//! This module turns the published tide table into [`TideEvent`]s and groups them by
//! civil date. It is the only part of the crate that performs I/O.
//!
//! ## Data Source
//!
//! The table is a JSON array of extrema spanning many days, in no particular order:
//! ```json
//! [
//!   { "datetime": "2026-01-18T04:12:00", "height": 0.3 },
//!   { "datetime": "2026-01-18T10:25:00", "height": 2.2 }
//! ]
//! ```
//! Timestamps are local civil time at the tide location and carry no offset.
//! The source may be a local path or an `http(s)` URL.
//!
//! ## Caching Strategy
//!
//! Loading is cache-first so the board keeps working offline:
//! 1. **Fresh cache**: a cached copy younger than the TTL is used as-is
//! 2. **Source**: otherwise the source is read, validated and written to the cache
//! 3. **Stale cache**: if the source fails, an expired cached copy is still preferred
//!    over showing nothing
//!
//! Cache write failures are logged and otherwise ignored.
//!
//! ## Error Handling
//!
//! All failures propagate through [`TideError`]. An empty table is not an error;
//! callers render a "no data" state for it.

use crate::{config::DataConfig, TideEvent};
use chrono::NaiveDate;
use std::{
    fs, io,
    path::Path,
    time::{Duration, SystemTime},
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while loading the tide table.
#[derive(Error, Debug)]
pub enum TideError {
    /// HTTP request failed (network, server, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Source or cache file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Tide table is not a valid JSON array of `{datetime, height}` records
    #[error("invalid tide table: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configured timezone name is not a known IANA zone
    #[error("unknown timezone: {0}")]
    Timezone(String),
}

/// Load the tide table described by `data`, cache-first.
pub async fn fetch(data: &DataConfig) -> Result<Vec<TideEvent>, TideError> {
    let cache = Path::new(&data.cache_path);
    let ttl = Duration::from_secs(data.cache_ttl_minutes * 60);

    if let Some(events) = load_cache(cache, Some(ttl)) {
        debug!(path = %cache.display(), "using fresh cached tide table");
        return Ok(events);
    }

    // A source that reads but does not parse counts as failed too
    let loaded = read_source(&data.source)
        .await
        .and_then(|bytes| parse_events(&bytes).map(|events| (bytes, events)));

    match loaded {
        Ok((bytes, events)) => {
            info!(source = %data.source, events = events.len(), "loaded tide table");
            if let Err(e) = save_cache(cache, &bytes) {
                warn!(path = %cache.display(), "could not write tide cache: {e}");
            }
            Ok(events)
        }
        Err(error) => match load_cache(cache, None) {
            Some(events) => {
                warn!(source = %data.source, "tide table fetch failed ({error}), using stale cache");
                Ok(events)
            }
            None => Err(error),
        },
    }
}

/// Parse a JSON tide table.
pub fn parse_events(bytes: &[u8]) -> Result<Vec<TideEvent>, TideError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Sorted, de-duplicated civil dates present in the table.
pub fn available_dates(events: &[TideEvent]) -> Vec<NaiveDate> {
    let mut dates: Vec<_> = events.iter().map(TideEvent::date).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// One civil date's extrema in ascending time order.
pub fn events_for(events: &[TideEvent], date: NaiveDate) -> Vec<TideEvent> {
    let mut day: Vec<_> = events.iter().filter(|e| e.date() == date).copied().collect();
    day.sort_by_key(|e| e.datetime);
    day
}

/// Date shown first: today if the table covers it, else the earliest date.
pub fn initial_date(dates: &[NaiveDate], today: NaiveDate) -> Option<NaiveDate> {
    if dates.contains(&today) {
        Some(today)
    } else {
        dates.first().copied()
    }
}

// -- Private Implementation --

async fn read_source(source: &str) -> Result<Vec<u8>, TideError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let response = reqwest::get(source).await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    } else {
        Ok(tokio::fs::read(source).await?)
    }
}

/// Read and parse the cached table. With `max_age`, stale copies are ignored.
fn load_cache(path: &Path, max_age: Option<Duration>) -> Option<Vec<TideEvent>> {
    let meta = fs::metadata(path).ok()?;
    if let Some(max_age) = max_age {
        let age = SystemTime::now().duration_since(meta.modified().ok()?).ok()?;
        if age > max_age {
            return None;
        }
    }
    let bytes = fs::read(path).ok()?;
    parse_events(&bytes).ok()
}

fn save_cache(path: &Path, bytes: &[u8]) -> Result<(), io::Error> {
    fs::write(path, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    const TABLE: &str = r#"[
        {"datetime": "2026-01-19T03:40:00", "height": 0.4},
        {"datetime": "2026-01-18T16:40:00", "height": 0.4},
        {"datetime": "2026-01-18T04:12:00", "height": 0.3},
        {"datetime": "2026-01-18T10:25", "height": 2.2}
    ]"#;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn data_config(source: &Path, cache: &Path) -> DataConfig {
        DataConfig {
            source: source.to_string_lossy().into_owned(),
            cache_path: cache.to_string_lossy().into_owned(),
            cache_ttl_minutes: 60,
        }
    }

    #[test]
    fn test_parse_and_group_by_date() {
        let events = parse_events(TABLE.as_bytes()).unwrap();
        assert_eq!(available_dates(&events), vec![date(18), date(19)]);

        let day = events_for(&events, date(18));
        let labels: Vec<_> = day.iter().map(TideEvent::label).collect();
        assert_eq!(labels, ["04:12", "10:25", "16:40"]);
        assert!(events_for(&events, date(20)).is_empty());
    }

    #[test]
    fn test_empty_table_is_not_an_error() {
        let events = parse_events(b"[]").unwrap();
        assert!(events.is_empty());
        assert!(available_dates(&events).is_empty());
        assert_eq!(initial_date(&[], date(18)), None);
    }

    #[test]
    fn test_malformed_table_is_rejected() {
        assert!(matches!(
            parse_events(br#"[{"datetime": "yesterday", "height": 1.0}]"#),
            Err(TideError::Parse(_))
        ));
        assert!(parse_events(b"{not json").is_err());
    }

    #[test]
    fn test_initial_date_prefers_today() {
        let dates = [date(18), date(19)];
        assert_eq!(initial_date(&dates, date(19)), Some(date(19)));
        assert_eq!(initial_date(&dates, date(25)), Some(date(18)));
    }

    #[tokio::test]
    async fn test_fetch_reads_source_and_writes_cache() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("tides.json");
        let cache = dir.path().join("cache.json");
        fs::write(&source, TABLE).unwrap();

        let events = fetch(&data_config(&source, &cache)).await.unwrap();
        assert_eq!(events.len(), 4);
        assert!(cache.exists());
    }

    #[tokio::test]
    async fn test_fetch_prefers_fresh_cache() {
        let dir = tempdir().unwrap();
        let cache = NamedTempFile::new_in(dir.path()).unwrap();
        fs::write(cache.path(), r#"[{"datetime": "2026-01-18T06:00:00", "height": 1.0}]"#)
            .unwrap();
        let source = dir.path().join("tides.json");
        fs::write(&source, TABLE).unwrap();

        let events = fetch(&data_config(&source, cache.path())).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_stale_cache() {
        let dir = tempdir().unwrap();
        let cache = dir.path().join("cache.json");
        fs::write(&cache, TABLE).unwrap();
        let missing = dir.path().join("missing.json");

        let mut config = data_config(&missing, &cache);
        config.cache_ttl_minutes = 0;
        // Even with a zero TTL the stale copy beats having nothing
        let events = fetch(&config).await.unwrap();
        assert_eq!(events.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_unparseable_source_falls_back_to_stale_cache() {
        let dir = tempdir().unwrap();
        let cache = dir.path().join("cache.json");
        fs::write(&cache, r#"[{"datetime": "2026-01-18T06:00:00", "height": 1.0}]"#).unwrap();
        let source = dir.path().join("tides.json");
        fs::write(&source, "<html>503 maintenance</html>").unwrap();

        let mut config = data_config(&source, &cache);
        config.cache_ttl_minutes = 0;
        let events = fetch(&config).await.unwrap();
        assert_eq!(events.len(), 1);
        // The broken source must not overwrite the last good copy
        assert!(parse_events(&fs::read(&cache).unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_unparseable_source_without_cache_fails() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("tides.json");
        fs::write(&source, "<html>503 maintenance</html>").unwrap();
        let config = data_config(&source, &dir.path().join("c.json"));
        assert!(matches!(fetch(&config).await, Err(TideError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_without_source_or_cache_fails() {
        let dir = tempdir().unwrap();
        let config = data_config(&dir.path().join("missing.json"), &dir.path().join("c.json"));
        assert!(matches!(fetch(&config).await, Err(TideError::Io(_))));
    }
}
