//! `points` and `markers` command handlers. Both read the points collection
//! once over REST.

use laundrygo_core::{
    fit_region, group_by_name, markers, AppConfig, Marker, RecordGroup, Region, DEFAULT_REGION,
};
use laundrygo_feed::RealtimeClient;
use serde::Serialize;

/// List points grouped by shop name, newest group first.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the fetch fails.
pub(crate) async fn run_points(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let client = RealtimeClient::from_config(config)?;
    let records = client.fetch_records(&config.points_path).await?;
    let groups = group_by_name(&records);

    if json {
        println!("{}", serde_json::to_string(&groups)?);
        return Ok(());
    }
    if groups.is_empty() {
        println!("no points registered; add one with `laundrygo add`");
        return Ok(());
    }
    for line in render_groups(&groups) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn render_groups(groups: &[RecordGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(format!("{} ({})", group.title, group.records.len()));
        for record in &group.records {
            lines.push(format!(
                "  {:<24}{:<28}{}",
                record.id,
                record.coordinates.as_deref().unwrap_or("-"),
                record.phone.as_deref().unwrap_or("-"),
            ));
        }
    }
    lines
}

#[derive(Debug, Serialize)]
struct MarkerView<'a> {
    region: Region,
    markers: &'a [Marker],
}

/// Print map markers and the region that frames them.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the fetch fails.
pub(crate) async fn run_markers(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let client = RealtimeClient::from_config(config)?;
    let records = client.fetch_records(&config.points_path).await?;
    let markers = markers(&records);
    let skipped = records.len() - markers.len();
    if skipped > 0 {
        tracing::warn!(skipped, "records without usable coordinates have no marker");
    }
    let region = fit_region(&markers).unwrap_or(DEFAULT_REGION);

    if json {
        let view = MarkerView {
            region,
            markers: &markers,
        };
        println!("{}", serde_json::to_string(&view)?);
        return Ok(());
    }

    println!(
        "region {:.5},{:.5} span {:.5} x {:.5}",
        region.latitude, region.longitude, region.latitude_delta, region.longitude_delta
    );
    for marker in &markers {
        println!(
            "{:<24}{:<28}{:.6},{:.6}",
            marker.id, marker.name, marker.latitude, marker.longitude
        );
    }
    Ok(())
}
