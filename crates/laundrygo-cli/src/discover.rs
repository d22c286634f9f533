//! `list` and `watch` command handlers.
//!
//! Both spawn the discovery task over either the live database or a JSON
//! export, with a fixed location taken from `--lat`/`--lng`.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use laundrygo_core::{facility_count, format_distance, format_price, parse_price, AppConfig, FilterKind};
use laundrygo_discovery::{spawn_discovery, DiscoveryOptions, DiscoveryState, FixedLocation};
use laundrygo_feed::{decode_records, MemoryFeed, RealtimeClient, RecordFeed};

use crate::DiscoverArgs;

/// Location wait used when no configuration is available.
const OFFLINE_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Rank the feed once and print the settled state.
///
/// # Errors
///
/// Returns an error if the snapshot file cannot be read, or if no snapshot
/// was given and the configuration or client cannot be built.
pub(crate) async fn run_list(config: Option<&AppConfig>, args: &DiscoverArgs) -> anyhow::Result<()> {
    let feed = open_feed(config, args)?;
    let options = discovery_options(config, args);
    let mut handle = spawn_discovery(feed.as_ref(), location(args), options);

    let state = handle.ready().await;
    handle.shutdown();
    print_state(&state, args.json)
}

/// Print every state change until Ctrl-C or until the feed ends.
///
/// # Errors
///
/// Same conditions as [`run_list`], plus failure to install the signal
/// handler.
pub(crate) async fn run_watch(
    config: Option<&AppConfig>,
    args: &DiscoverArgs,
) -> anyhow::Result<()> {
    let feed = open_feed(config, args)?;
    let options = discovery_options(config, args);
    let mut handle = spawn_discovery(feed.as_ref(), location(args), options);

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                tracing::info!("interrupted");
                break;
            }
            state = handle.changed() => match state {
                Some(state) => print_state(&state, args.json)?,
                None => break,
            },
        }
    }

    handle.shutdown();
    Ok(())
}

fn open_feed(config: Option<&AppConfig>, args: &DiscoverArgs) -> anyhow::Result<Box<dyn RecordFeed>> {
    if let Some(path) = &args.snapshot {
        let records = read_snapshot(path)?;
        tracing::info!(path = %path.display(), count = records.len(), "loaded snapshot");
        return Ok(Box::new(MemoryFeed::with_records(records)));
    }
    let config = config.context("database configuration is required without --snapshot")?;
    let client = RealtimeClient::from_config(config)?;
    Ok(Box::new(client))
}

/// Decode a JSON export of a record collection.
pub(crate) fn read_snapshot(path: &Path) -> anyhow::Result<Vec<laundrygo_core::ShopRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(decode_records(&value))
}

fn discovery_options(config: Option<&AppConfig>, args: &DiscoverArgs) -> DiscoveryOptions {
    let filter = FilterKind::parse(&args.filter);
    match config {
        Some(config) => DiscoveryOptions::from_config(config, filter),
        None => DiscoveryOptions {
            filter,
            path: String::new(),
            location_timeout: OFFLINE_LOCATION_TIMEOUT,
        },
    }
}

pub(crate) fn location(args: &DiscoverArgs) -> FixedLocation {
    match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => FixedLocation::at(lat, lng),
        _ => FixedLocation::unavailable("no --lat/--lng given"),
    }
}

fn print_state(state: &DiscoveryState, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(state)?);
    } else {
        for line in render_state(state) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Plain-text rendering of a discovery state, one line per row.
pub(crate) fn render_state(state: &DiscoveryState) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", state.filter.title())];
    if let Some(notice) = &state.location_notice {
        lines.push(format!("! {notice}"));
    }
    if let Some(error) = &state.feed_error {
        lines.push(format!("! {error}"));
    }
    if state.loading {
        lines.push("loading...".to_string());
    }
    if state.records.is_empty() && !state.loading {
        lines.push("no laundries found".to_string());
    }

    for ranked in &state.records {
        let record = &ranked.record;
        let mut line = format!(
            "{:<28}{:>12}  {} facilities",
            record.display_name(),
            format_price(parse_price(record.price_per_kg.as_deref())),
            facility_count(record.facilities.as_ref()),
        );
        if let Some(distance) = ranked.distance_km.and_then(format_distance) {
            line.push_str("  ");
            line.push_str(&distance);
        }
        lines.push(line);
    }
    lines
}
