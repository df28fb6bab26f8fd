//! Print a summary of a telemetry payload file.
//!
//! Usage: `inspect_payload <file.json> <YYYY-MM-DD> [utc-offset-minutes]`

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;

use fleetlog::domain::data_extent;
use fleetlog::normalize::{normalize, normalize_sample_times};
use fleetlog::parsers::{JsonPayload, PayloadParser};
use fleetlog::time_align::DayClock;
use fleetlog::units::CoordinateConvention;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("usage: inspect_payload <file.json> <YYYY-MM-DD> [utc-offset-minutes]");
    }

    let path = PathBuf::from(&args[0]);
    let date = NaiveDate::parse_from_str(&args[1], "%Y-%m-%d")
        .with_context(|| format!("Invalid date {:?}", args[1]))?;
    let offset: i32 = match args.get(2) {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid UTC offset {:?}", value))?,
        None => 0,
    };
    let clock = DayClock::with_offset_minutes(date, offset);

    let body = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let raw = JsonPayload
        .parse(&body)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    let series = normalize(&raw, &clock, &CoordinateConvention::default());
    let sample_times = normalize_sample_times(&raw.sample_times, &clock);

    println!(
        "{} ({} channels, {} sample times)",
        path.display(),
        raw.channel_count(),
        sample_times.len()
    );
    match data_extent(&series) {
        Some(extent) => println!(
            "Extent: {} - {}",
            clock.format_time(extent.start),
            clock.format_time(extent.end)
        ),
        None => println!("Extent: no data"),
    }

    for s in &series {
        let span = match s.extent() {
            Some(extent) => format!(
                "{} - {}",
                clock.format_time(extent.start),
                clock.format_time(extent.end)
            ),
            None => "empty".to_string(),
        };
        println!(
            "  {:<12} {:<24} {:>7} {:>10} points, {} dropped, {}",
            s.id,
            s.name,
            s.kind.to_string(),
            s.points.len(),
            s.dropped_points,
            span
        );
    }

    Ok(())
}
