//! Pure state model behind the discovery view.
//!
//! [`DiscoveryModel`] folds feed and location events into the latest inputs
//! and derives a [`DiscoveryState`] by re-running the ranking engine. It does
//! no I/O, so every transition is testable without a runtime.

use chrono::{DateTime, Utc};
use laundrygo_core::{rank, FilterKind, GeoPoint, RankedRecord, ShopRecord};
use serde::Serialize;

use crate::location::{LocationError, LocationFix};

const PERMISSION_DENIED_NOTICE: &str =
    "Location permission denied. Sorting by distance is unavailable.";
const LOCATION_FAILED_NOTICE: &str = "Could not determine your location.";

/// What the view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryState {
    pub filter: FilterKind,
    pub loading: bool,
    pub records: Vec<RankedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_error: Option<String>,
    /// When the snapshot behind `records` arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
enum LocationStatus {
    Pending,
    Resolved(GeoPoint),
    Failed(&'static str),
}

#[derive(Debug, Clone)]
pub struct DiscoveryModel {
    filter: FilterKind,
    snapshot: Option<Vec<ShopRecord>>,
    location: LocationStatus,
    feed_error: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

impl DiscoveryModel {
    #[must_use]
    pub fn new(filter: FilterKind) -> Self {
        Self {
            filter,
            snapshot: None,
            location: LocationStatus::Pending,
            feed_error: None,
            updated_at: None,
        }
    }

    #[must_use]
    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    /// A fresh snapshot replaces the previous one and clears any feed error.
    pub fn apply_snapshot(&mut self, records: Vec<ShopRecord>, received_at: DateTime<Utc>) {
        self.snapshot = Some(records);
        self.feed_error = None;
        self.updated_at = Some(received_at);
    }

    /// Keeps the last good snapshot; only the notice changes.
    pub fn apply_feed_error(&mut self, message: &str) {
        self.feed_error = Some(format!("Failed to load laundry data: {message}"));
    }

    pub fn apply_location(&mut self, result: Result<LocationFix, LocationError>) {
        self.location = match result {
            Ok(fix) => match fix.point() {
                Some(point) => LocationStatus::Resolved(point),
                None => LocationStatus::Failed(LOCATION_FAILED_NOTICE),
            },
            Err(LocationError::PermissionDenied) => {
                LocationStatus::Failed(PERMISSION_DENIED_NOTICE)
            }
            Err(LocationError::Unavailable(_)) => LocationStatus::Failed(LOCATION_FAILED_NOTICE),
        };
    }

    /// The location request took too long; treated as unavailable.
    pub fn location_timed_out(&mut self) {
        self.location = LocationStatus::Failed(LOCATION_FAILED_NOTICE);
    }

    /// Loading until the feed has answered (with data or an error) and, for
    /// filters that need it, until the location request has settled.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        let feed_pending = self.snapshot.is_none() && self.feed_error.is_none();
        let location_pending =
            self.filter.needs_location() && self.location == LocationStatus::Pending;
        feed_pending || location_pending
    }

    #[must_use]
    pub fn user_location(&self) -> Option<GeoPoint> {
        match self.location {
            LocationStatus::Resolved(point) => Some(point),
            LocationStatus::Pending | LocationStatus::Failed(_) => None,
        }
    }

    /// Derive the render state from the current inputs.
    #[must_use]
    pub fn state(&self) -> DiscoveryState {
        let location = self.user_location();
        let records = self
            .snapshot
            .as_deref()
            .map(|records| rank(records, self.filter, location))
            .unwrap_or_default();
        let location_notice = match self.location {
            LocationStatus::Failed(notice) => Some(notice.to_string()),
            LocationStatus::Pending | LocationStatus::Resolved(_) => None,
        };

        DiscoveryState {
            filter: self.filter,
            loading: self.is_loading(),
            records,
            location,
            location_notice,
            feed_error: self.feed_error.clone(),
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop(id: &str, name: &str, coordinates: &str, price: &str) -> ShopRecord {
        ShopRecord {
            id: id.to_string(),
            name: name.to_string(),
            coordinates: Some(coordinates.to_string()),
            price_per_kg: Some(price.to_string()),
            ..ShopRecord::default()
        }
    }

    fn marta_and_joy() -> Vec<ShopRecord> {
        vec![
            shop("joy", "Joy Laundry Sardjito", "-7.0,110.0", "3000"),
            shop("marta", "Marta Laundry", "-7.8,110.4", "5000"),
        ]
    }

    fn ids(state: &DiscoveryState) -> Vec<&str> {
        state.records.iter().map(|r| r.record.id.as_str()).collect()
    }

    #[test]
    fn starts_loading_with_no_records() {
        let state = DiscoveryModel::new(FilterKind::All).state();
        assert!(state.loading);
        assert!(state.records.is_empty());
        assert!(state.updated_at.is_none());
    }

    #[test]
    fn non_location_filter_is_ready_after_first_snapshot() {
        let mut model = DiscoveryModel::new(FilterKind::Cheapest);
        model.apply_snapshot(marta_and_joy(), Utc::now());
        let state = model.state();
        assert!(!state.loading);
        assert_eq!(ids(&state), vec!["joy", "marta"]);
    }

    #[test]
    fn nearest_waits_for_location_then_reranks() {
        let mut model = DiscoveryModel::new(FilterKind::Nearest);
        model.apply_snapshot(marta_and_joy(), Utc::now());

        let waiting = model.state();
        assert!(waiting.loading);
        assert_eq!(ids(&waiting), vec!["joy", "marta"]);
        assert!(waiting
            .records
            .iter()
            .all(|r| r.distance_km.is_some_and(f64::is_infinite)));

        model.apply_location(Ok(LocationFix::new(-7.8, 110.4)));
        let ready = model.state();
        assert!(!ready.loading);
        assert_eq!(ids(&ready), vec!["marta", "joy"]);
        assert_eq!(ready.location, GeoPoint::new(-7.8, 110.4));
    }

    #[test]
    fn location_before_snapshot_is_kept() {
        let mut model = DiscoveryModel::new(FilterKind::Nearest);
        model.apply_location(Ok(LocationFix::new(-7.8, 110.4)));
        assert!(model.state().loading);

        model.apply_snapshot(marta_and_joy(), Utc::now());
        assert_eq!(ids(&model.state()), vec!["marta", "joy"]);
    }

    #[test]
    fn denied_location_settles_with_notice() {
        let mut model = DiscoveryModel::new(FilterKind::Nearest);
        model.apply_snapshot(marta_and_joy(), Utc::now());
        model.apply_location(Err(LocationError::PermissionDenied));

        let state = model.state();
        assert!(!state.loading);
        assert_eq!(state.location_notice.as_deref(), Some(PERMISSION_DENIED_NOTICE));
        assert_eq!(ids(&state), vec!["joy", "marta"], "feed order without a location");
    }

    #[test]
    fn timeout_and_unavailable_share_a_notice() {
        let mut model = DiscoveryModel::new(FilterKind::Nearest);
        model.location_timed_out();
        assert_eq!(
            model.state().location_notice.as_deref(),
            Some(LOCATION_FAILED_NOTICE)
        );

        model.apply_location(Err(LocationError::Unavailable("gps off".to_string())));
        assert_eq!(
            model.state().location_notice.as_deref(),
            Some(LOCATION_FAILED_NOTICE)
        );

        model.apply_location(Ok(LocationFix::new(f64::NAN, 0.0)));
        assert!(model.user_location().is_none());
    }

    #[test]
    fn feed_error_keeps_last_snapshot_and_clears_on_recovery() {
        let mut model = DiscoveryModel::new(FilterKind::All);
        model.apply_snapshot(marta_and_joy(), Utc::now());
        model.apply_feed_error("connection reset");

        let state = model.state();
        assert_eq!(state.records.len(), 2);
        assert_eq!(
            state.feed_error.as_deref(),
            Some("Failed to load laundry data: connection reset")
        );

        model.apply_snapshot(Vec::new(), Utc::now());
        let state = model.state();
        assert!(state.feed_error.is_none());
        assert!(state.records.is_empty());
        assert!(!state.loading);
    }

    #[test]
    fn feed_error_before_any_snapshot_ends_loading() {
        let mut model = DiscoveryModel::new(FilterKind::BestFacilities);
        model.apply_feed_error("permission denied");
        assert!(!model.is_loading());
    }
}
