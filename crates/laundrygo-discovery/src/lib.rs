//! Discovery view: a live, ranked list of laundry shops.
//!
//! Combines a [`RecordFeed`](laundrygo_feed::RecordFeed) subscription with a
//! one-shot [`LocationProvider`] and republishes a [`DiscoveryState`] every
//! time either input changes.

pub mod driver;
pub mod location;
pub mod view;

pub use driver::{spawn_discovery, DiscoveryHandle, DiscoveryOptions};
pub use location::{FixedLocation, LocationError, LocationFix, LocationProvider};
pub use view::{DiscoveryModel, DiscoveryState};
