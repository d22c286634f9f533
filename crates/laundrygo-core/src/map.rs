//! Map markers and viewport fitting.

use serde::Serialize;

use crate::geo::parse_coordinates;
use crate::records::ShopRecord;

/// Span used when centring on a single marker.
pub const SINGLE_MARKER_DELTA: f64 = 0.01;

/// Fraction of the marker bounding box added on each side.
pub const EDGE_PADDING: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// A visible map area: centre plus span in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Initial view over Yogyakarta, shown until markers are known.
pub const DEFAULT_REGION: Region = Region {
    latitude: -7.7956,
    longitude: 110.3695,
    latitude_delta: 0.02,
    longitude_delta: 0.01,
};

/// Markers for every record whose coordinates parse; the rest are skipped.
#[must_use]
pub fn markers(records: &[ShopRecord]) -> Vec<Marker> {
    records
        .iter()
        .filter_map(|record| {
            let point = record.coordinates.as_deref().and_then(parse_coordinates)?;
            Some(Marker {
                id: record.id.clone(),
                name: record.name.clone(),
                phone: record.phone.clone(),
                latitude: point.latitude,
                longitude: point.longitude,
            })
        })
        .collect()
}

/// Region that shows every marker.
///
/// `None` for no markers, so the caller keeps its current view. One marker
/// is centred with a fixed span; several are fitted to their bounding box
/// plus [`EDGE_PADDING`].
#[must_use]
pub fn fit_region(markers: &[Marker]) -> Option<Region> {
    let (first, rest) = markers.split_first()?;
    if rest.is_empty() {
        return Some(Region {
            latitude: first.latitude,
            longitude: first.longitude,
            latitude_delta: SINGLE_MARKER_DELTA,
            longitude_delta: SINGLE_MARKER_DELTA,
        });
    }

    let mut min_lat = first.latitude;
    let mut max_lat = first.latitude;
    let mut min_lng = first.longitude;
    let mut max_lng = first.longitude;
    for m in rest {
        min_lat = min_lat.min(m.latitude);
        max_lat = max_lat.max(m.latitude);
        min_lng = min_lng.min(m.longitude);
        max_lng = max_lng.max(m.longitude);
    }

    let span = |lo: f64, hi: f64| ((hi - lo) * (1.0 + 2.0 * EDGE_PADDING)).max(SINGLE_MARKER_DELTA);
    Some(Region {
        latitude: (min_lat + max_lat) / 2.0,
        longitude: (min_lng + max_lng) / 2.0,
        latitude_delta: span(min_lat, max_lat),
        longitude_delta: span(min_lng, max_lng),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, coordinates: Option<&str>) -> ShopRecord {
        ShopRecord {
            id: id.to_string(),
            name: format!("Shop {id}"),
            coordinates: coordinates.map(str::to_string),
            ..ShopRecord::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn markers_skip_unparseable_coordinates() {
        let records = vec![
            record("a", Some("-7.8,110.4")),
            record("b", None),
            record("c", Some("somewhere")),
            record("d", Some("-7.7, 110.3")),
        ];
        let markers = markers(&records);
        let ids: Vec<&str> = markers.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert!(close(markers[1].longitude, 110.3));
    }

    #[test]
    fn no_markers_keeps_current_view() {
        assert_eq!(fit_region(&[]), None);
    }

    #[test]
    fn single_marker_is_centred() {
        let markers = markers(&[record("a", Some("-7.8,110.4"))]);
        let region = fit_region(&markers).unwrap();
        assert!(close(region.latitude, -7.8));
        assert!(close(region.longitude, 110.4));
        assert!(close(region.latitude_delta, SINGLE_MARKER_DELTA));
    }

    #[test]
    fn several_markers_fit_padded_bounds() {
        let markers = markers(&[
            record("a", Some("-7.0,110.0")),
            record("b", Some("-8.0,111.0")),
        ]);
        let region = fit_region(&markers).unwrap();
        assert!(close(region.latitude, -7.5));
        assert!(close(region.longitude, 110.5));
        assert!(close(region.latitude_delta, 1.4));
        assert!(close(region.longitude_delta, 1.4));
    }

    #[test]
    fn coincident_markers_get_minimum_span() {
        let markers = markers(&[
            record("a", Some("-7.8,110.4")),
            record("b", Some("-7.8,110.4")),
        ]);
        let region = fit_region(&markers).unwrap();
        assert!(close(region.latitude_delta, SINGLE_MARKER_DELTA));
    }

    #[test]
    fn region_serializes_camel_case() {
        let json = serde_json::to_value(DEFAULT_REGION).unwrap();
        assert_eq!(json["latitudeDelta"], 0.02);
    }
}
