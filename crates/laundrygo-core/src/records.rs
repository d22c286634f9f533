//! Shop records as delivered by the realtime feed.
//!
//! The feed is edited by hand through the app forms, so every scalar field is
//! decoded leniently: strings and numbers are both accepted, anything else is
//! treated as absent. A record is never rejected because one field is odd.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Facilities offered by a shop: either the comma-delimited text typed into
/// the form or a list written by another client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Facilities {
    List(Vec<String>),
    Text(String),
}

/// One laundry shop entry from the feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopRecord {
    /// Feed-assigned key. Not part of the stored payload.
    #[serde(default, deserialize_with = "lenient_name")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(
        rename = "jamOperasional",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub operating_hours: Option<String>,
    #[serde(
        rename = "fasilitas",
        default,
        deserialize_with = "lenient_facilities",
        skip_serializing_if = "Option::is_none"
    )]
    pub facilities: Option<Facilities>,
    #[serde(
        rename = "hargaPerKg",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub price_per_kg: Option<String>,
    /// `"<lat>,<lng>"`; see [`crate::geo::parse_coordinates`].
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub coordinates: Option<String>,
    #[serde(
        rename = "accuration",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub accuracy: Option<String>,
    #[serde(
        rename = "deskripsi",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
}

impl ShopRecord {
    /// Decode a feed payload and attach its key.
    ///
    /// Returns `None` when the payload is not a JSON object.
    #[must_use]
    pub fn from_payload(id: &str, payload: &Value) -> Option<Self> {
        if !payload.is_object() {
            return None;
        }
        let mut record = Self::deserialize(payload).ok()?;
        record.id = id.to_string();
        Some(record)
    }

    /// Display name, with a placeholder for unnamed shops.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unnamed laundry"
        } else {
            &self.name
        }
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value))
}

fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

fn lenient_facilities<'de, D>(deserializer: D) -> Result<Option<Facilities>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(Facilities::List(
            items.into_iter().filter_map(scalar_to_string).collect(),
        )),
        other => scalar_to_string(other).map(Facilities::Text),
    })
}
