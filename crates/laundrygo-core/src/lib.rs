pub mod app_config;
pub mod config;
pub mod display;
pub mod forms;
pub mod geo;
pub mod grouping;
pub mod links;
pub mod map;
pub mod normalize;
pub mod rank;
pub mod records;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use display::{format_distance, format_price};
pub use forms::{format_accuracy, FormError, ShopDraft, ShopForm};
pub use geo::{distance_km, parse_coordinates, GeoPoint};
pub use grouping::{group_by_name, RecordGroup};
pub use links::{DeepLink, Platform};
pub use map::{fit_region, markers, Marker, Region, DEFAULT_REGION};
pub use normalize::{facility_count, parse_price};
pub use rank::{rank, FilterKind, RankedRecord};
pub use records::{Facilities, ShopRecord};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
