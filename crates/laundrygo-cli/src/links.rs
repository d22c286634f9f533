//! `links` command handler.

use laundrygo_core::links::{directions_link_for, map_search_link, phone_link, whatsapp_link};
use laundrygo_core::{AppConfig, DeepLink, Platform, ShopRecord};
use laundrygo_feed::RealtimeClient;

/// Print every outbound link available for one shop.
///
/// The shop is looked up in the points collection first and then in the
/// discovery collection.
///
/// # Errors
///
/// Returns an error for an unknown platform, a failed fetch, or an id that
/// exists in neither collection.
pub(crate) async fn run_links(config: &AppConfig, id: &str, platform: &str) -> anyhow::Result<()> {
    let platform: Platform = platform.parse()?;
    let client = RealtimeClient::from_config(config)?;

    let mut found = None;
    for path in [&config.points_path, &config.records_path] {
        if let Some(record) = client.fetch_record(path, id).await? {
            found = Some(record);
            break;
        }
    }
    let record = found.ok_or_else(|| anyhow::anyhow!("shop '{id}' not found"))?;

    println!("{}", record.display_name());
    for (label, link) in shop_links(&record, platform) {
        println!("  {label:<11}{}", link.preferred());
        if link.native.is_some() {
            println!("  {:<11}{}", "", link.fallback);
        }
    }
    Ok(())
}

/// Labelled links for a record; links whose source field is missing or
/// unusable are left out.
pub(crate) fn shop_links(record: &ShopRecord, platform: Platform) -> Vec<(&'static str, DeepLink)> {
    let mut links = Vec::new();
    if let Some(coordinates) = record.coordinates.as_deref() {
        links.push(("map", map_search_link(coordinates)));
        if let Some(link) = directions_link_for(coordinates, platform) {
            links.push(("directions", link));
        }
    }
    if let Some(phone) = record.phone.as_deref() {
        if let Some(link) = phone_link(phone) {
            links.push(("phone", link));
        }
        if let Some(link) = whatsapp_link(phone) {
            links.push(("whatsapp", link));
        }
    }
    links
}
