//! One-shot device location.

use std::future::Future;

use laundrygo_core::GeoPoint;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius in metres, when the provider reports one.
    pub accuracy_m: Option<f64>,
}

impl LocationFix {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
        }
    }

    /// The fix as a point, or `None` if either component is not finite.
    #[must_use]
    pub fn point(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Source of the user's current position.
pub trait LocationProvider: Send + Sync {
    /// Resolve the current position once.
    fn current_location(
        &self,
    ) -> impl Future<Output = Result<LocationFix, LocationError>> + Send;
}

/// A provider with a predetermined answer: a fixed position from the command
/// line, or a refusal when none was given.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedLocation(Result<LocationFix, LocationError>);

impl FixedLocation {
    #[must_use]
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self(Ok(LocationFix::new(latitude, longitude)))
    }

    #[must_use]
    pub fn denied() -> Self {
        Self(Err(LocationError::PermissionDenied))
    }

    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self(Err(LocationError::Unavailable(reason.into())))
    }
}

impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<LocationFix, LocationError> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_location_answers_immediately() {
        let fix = FixedLocation::at(-7.8, 110.4).current_location().await.unwrap();
        assert_eq!(fix.point(), GeoPoint::new(-7.8, 110.4));
        assert_eq!(
            FixedLocation::denied().current_location().await,
            Err(LocationError::PermissionDenied)
        );
    }

    #[test]
    fn non_finite_fix_has_no_point() {
        assert!(LocationFix::new(f64::NAN, 110.4).point().is_none());
    }
}
