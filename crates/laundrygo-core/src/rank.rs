//! Ranking engine: filter a feed snapshot down to a curated category and
//! order it.
//!
//! Category membership is editorial. Each filter kind owns a fixed allowlist
//! of exact shop names; nothing in the record itself decides membership.

use std::cmp::Reverse;
use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo::{distance_km, parse_coordinates, GeoPoint};
use crate::normalize::{facility_count, parse_price};
use crate::records::ShopRecord;

/// Shops listed under "nearest".
pub const NEAREST_ALLOWLIST: &[&str] = &["Joy Laundry Sardjito", "9 Laundry Jogja", "Marta Laundry"];

/// Shops listed under "cheapest".
pub const CHEAPEST_ALLOWLIST: &[&str] = &[
    "Diamond Laundry",
    "Jogja Laundry Express",
    "Ayra Laundry",
    "Marta Laundry",
    "Joy Laundry Sardjito",
];

/// Shops listed under "best facilities".
pub const BEST_FACILITIES_ALLOWLIST: &[&str] = &[
    "Exo Laundry",
    "Jogja Laundry Express",
    "Joy Laundry Sardjito",
    "Laundry Langganan",
    "Malika Laundry",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Nearest,
    Cheapest,
    BestFacilities,
    #[default]
    All,
}

impl FilterKind {
    /// Parse a filter name. Unknown names fall back to [`FilterKind::All`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "nearest" => Self::Nearest,
            "cheapest" => Self::Cheapest,
            "best_facilities" => Self::BestFacilities,
            _ => Self::All,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Cheapest => "cheapest",
            Self::BestFacilities => "best_facilities",
            Self::All => "all",
        }
    }

    /// Heading shown above a filtered list.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Nearest => "Nearest",
            Self::Cheapest => "Cheapest",
            Self::BestFacilities => "Best facilities",
            Self::All => "All",
        }
    }

    #[must_use]
    pub fn allowlist(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Nearest => Some(NEAREST_ALLOWLIST),
            Self::Cheapest => Some(CHEAPEST_ALLOWLIST),
            Self::BestFacilities => Some(BEST_FACILITIES_ALLOWLIST),
            Self::All => None,
        }
    }

    /// Whether ranking under this filter depends on the user's location.
    #[must_use]
    pub fn needs_location(self) -> bool {
        matches!(self, Self::Nearest)
    }
}

impl FromStr for FilterKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shop record with the distance derived for the "nearest" filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecord {
    #[serde(flatten)]
    pub record: ShopRecord,
    /// Set only under [`FilterKind::Nearest`]; `f64::INFINITY` when either
    /// end of the measurement is unknown.
    #[serde(rename = "distanceKm", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl RankedRecord {
    fn plain(record: &ShopRecord) -> Self {
        Self {
            record: record.clone(),
            distance_km: None,
        }
    }
}

/// Distance from `origin` to the record's coordinates, or infinity when
/// either is unavailable.
#[must_use]
pub fn distance_from(origin: Option<GeoPoint>, record: &ShopRecord) -> f64 {
    let target = record.coordinates.as_deref().and_then(parse_coordinates);
    match (origin, target) {
        (Some(origin), Some(target)) => distance_km(origin, target),
        _ => f64::INFINITY,
    }
}

fn allowlisted<'a>(
    records: &'a [ShopRecord],
    allowlist: &'static [&'static str],
) -> impl Iterator<Item = &'a ShopRecord> {
    records
        .iter()
        .filter(move |r| allowlist.contains(&r.name.as_str()))
}

/// Filter and order `records` for the given filter kind.
///
/// Never fails: records with unusable fields are ranked last instead of
/// being rejected. All sorts are stable, so ties keep feed order.
#[must_use]
pub fn rank(
    records: &[ShopRecord],
    filter: FilterKind,
    user_location: Option<GeoPoint>,
) -> Vec<RankedRecord> {
    match filter {
        FilterKind::All => records.iter().map(RankedRecord::plain).collect(),
        FilterKind::Nearest => {
            let mut ranked: Vec<RankedRecord> = allowlisted(records, NEAREST_ALLOWLIST)
                .map(|record| RankedRecord {
                    record: record.clone(),
                    distance_km: Some(distance_from(user_location, record)),
                })
                .collect();
            ranked.sort_by(|a, b| {
                let a = a.distance_km.unwrap_or(f64::INFINITY);
                let b = b.distance_km.unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            });
            ranked
        }
        FilterKind::Cheapest => {
            let mut keyed: Vec<(f64, &ShopRecord)> = allowlisted(records, CHEAPEST_ALLOWLIST)
                .map(|record| (parse_price(record.price_per_kg.as_deref()), record))
                .collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            keyed
                .into_iter()
                .map(|(_, record)| RankedRecord::plain(record))
                .collect()
        }
        FilterKind::BestFacilities => {
            let mut keyed: Vec<(usize, &ShopRecord)> =
                allowlisted(records, BEST_FACILITIES_ALLOWLIST)
                    .map(|record| (facility_count(record.facilities.as_ref()), record))
                    .collect();
            keyed.sort_by_key(|(count, _)| Reverse(*count));
            keyed
                .into_iter()
                .map(|(_, record)| RankedRecord::plain(record))
                .collect()
        }
    }
}

#[cfg(test)]
#[path = "rank_test.rs"]
mod tests;
