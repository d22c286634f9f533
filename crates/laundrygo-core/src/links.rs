//! Outbound deep links for maps, phone calls and WhatsApp.

use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use thiserror::Error;

use crate::forms::digits_only;
use crate::geo::{parse_coordinates, GeoPoint};

/// Query-safe set that leaves coordinate punctuation readable.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b',')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

const COUNTRY_CODE: &str = "62";

/// A link with an optional app-specific URL and an HTTPS fallback.
///
/// Callers try `native` first when set and open `fallback` if the app cannot
/// handle it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeepLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native: Option<String>,
    pub fallback: String,
}

impl DeepLink {
    fn web(url: String) -> Self {
        Self {
            native: None,
            fallback: url,
        }
    }

    /// The URL to try first.
    #[must_use]
    pub fn preferred(&self) -> &str {
        self.native.as_deref().unwrap_or(&self.fallback)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    #[default]
    Web,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown platform: {0} (expected android, ios or web)")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            "web" => Ok(Self::Web),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

/// Google Maps search for a raw coordinate string.
#[must_use]
pub fn map_search_link(coordinates: &str) -> DeepLink {
    let query = utf8_percent_encode(coordinates.trim(), QUERY);
    DeepLink::web(format!(
        "https://www.google.com/maps/search/?api=1&query={query}"
    ))
}

/// Turn-by-turn directions to `destination`.
#[must_use]
pub fn directions_link(destination: GeoPoint, platform: Platform) -> DeepLink {
    let GeoPoint {
        latitude: lat,
        longitude: lng,
    } = destination;
    let native = match platform {
        Platform::Android => Some(format!("google.navigation:q={lat},{lng}")),
        Platform::Ios => Some(format!("maps://app?daddr={lat},{lng}")),
        Platform::Web => None,
    };
    DeepLink {
        native,
        fallback: format!("https://www.google.com/maps/dir/?api=1&destination={lat},{lng}"),
    }
}

/// Directions from a stored coordinate string, if it parses.
#[must_use]
pub fn directions_link_for(coordinates: &str, platform: Platform) -> Option<DeepLink> {
    parse_coordinates(coordinates).map(|point| directions_link(point, platform))
}

/// `tel:` link. Accepts numbers already stored with the scheme.
#[must_use]
pub fn phone_link(phone: &str) -> Option<DeepLink> {
    let phone = phone.trim();
    let number = phone.strip_prefix("tel:").unwrap_or(phone).trim();
    (!number.is_empty()).then(|| DeepLink::web(format!("tel:{number}")))
}

/// Normalize a phone number to the international form WhatsApp expects.
///
/// Non-digits are dropped, a leading `0` becomes `62`, and `62` is prefixed
/// when missing. Returns `None` when no digits remain.
#[must_use]
pub fn normalize_whatsapp_number(phone: &str) -> Option<String> {
    let digits = digits_only(phone);
    if digits.is_empty() {
        return None;
    }
    let local = digits.strip_prefix('0').map_or_else(
        || digits.clone(),
        |rest| format!("{COUNTRY_CODE}{rest}"),
    );
    if local.starts_with(COUNTRY_CODE) {
        Some(local)
    } else {
        Some(format!("{COUNTRY_CODE}{local}"))
    }
}

#[must_use]
pub fn whatsapp_link(phone: &str) -> Option<DeepLink> {
    let number = normalize_whatsapp_number(phone)?;
    Some(DeepLink {
        native: Some(format!("whatsapp://send?phone={number}")),
        fallback: format!("https://wa.me/{number}"),
    })
}
