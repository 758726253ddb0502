//! Demo dataset seeder
//!
//! Rebuilds a synthetic `events` table covering the trailing 180 days,
//! written as CSV into the data directory so the Polars engine picks
//! it up by file stem.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct SeedStats {
    pub table: String,
    pub rows: usize,
    pub min_ts: String,
    pub max_ts: String,
}

fn pick_event_type(r: f64) -> &'static str {
    match r {
        r if r < 0.50 => "view",
        r if r < 0.80 => "click",
        r if r < 0.95 => "purchase",
        r if r < 0.98 => "signup",
        _ => "refund",
    }
}

fn pick_country(r: f64) -> &'static str {
    match r {
        r if r < 0.25 => "PL",
        r if r < 0.45 => "DE",
        r if r < 0.60 => "FR",
        r if r < 0.75 => "US",
        r if r < 0.90 => "GB",
        _ => "ES",
    }
}

fn pick_device(r: f64) -> &'static str {
    match r {
        r if r < 0.70 => "mobile",
        r if r < 0.90 => "desktop",
        _ => "tablet",
    }
}

fn pick_source(r: f64) -> &'static str {
    match r {
        r if r < 0.30 => "search",
        r if r < 0.55 => "ads",
        r if r < 0.75 => "direct",
        r if r < 0.90 => "social",
        _ => "email",
    }
}

/// Create or replace `events.csv` with `n_rows` synthetic events.
pub fn seed_events(data_dir: &Path, n_rows: usize) -> Result<SeedStats> {
    std::fs::create_dir_all(data_dir)?;
    let mut rng = rand::thread_rng();
    let now: DateTime<Utc> = Utc::now();

    let mut min_ts = now;
    let mut max_ts = now - Duration::days(365);
    let mut out = String::with_capacity(n_rows * 64);
    out.push_str("event_id,user_id,event_type,amount,event_ts,country,device,source\n");

    for event_id in 0..n_rows {
        let user_id: u64 = rng.gen_range(1..=1_000_000);
        let r1: f64 = rng.gen();
        let event_type = pick_event_type(r1);
        let amount = match event_type {
            "purchase" => (rng.gen::<f64>() * 200.0 * 100.0).round() / 100.0,
            "refund" => (rng.gen::<f64>() * 100.0 * 100.0).round() / 100.0,
            _ => 0.0,
        };
        let ts = now
            - Duration::days(rng.gen_range(0..180))
            - Duration::seconds(rng.gen_range(0..86_400));
        min_ts = min_ts.min(ts);
        max_ts = max_ts.max(ts);

        out.push_str(&format!(
            "{},{},{},{:.2},{},{},{},{}\n",
            event_id,
            user_id,
            event_type,
            amount,
            ts.format("%Y-%m-%dT%H:%M:%S"),
            pick_country(rng.gen()),
            pick_device(rng.gen()),
            pick_source(rng.gen()),
        ));
    }

    let path = data_dir.join("events.csv");
    std::fs::write(&path, out)?;
    info!(path = %path.display(), rows = n_rows, "demo events seeded");

    Ok(SeedStats {
        table: "events".to_string(),
        rows: n_rows,
        min_ts: min_ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
        max_ts: max_ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_events_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let stats = seed_events(dir.path(), 50).unwrap();
        assert_eq!(stats.rows, 50);
        assert!(stats.min_ts <= stats.max_ts);

        let content = std::fs::read_to_string(dir.path().join("events.csv")).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "event_id,user_id,event_type,amount,event_ts,country,device,source"
        );
        assert_eq!(lines.count(), 50);
    }
}
