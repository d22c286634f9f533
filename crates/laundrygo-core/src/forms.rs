//! Validation for the add and edit shop forms.
//!
//! A [`ShopForm`] holds raw user input. Validation turns it into a
//! [`ShopDraft`], the payload written to the points collection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::records::{Facilities, ShopRecord};

/// Required prefix for phone numbers on new shops (Indonesian mobile).
pub const PHONE_PREFIX: &str = "628";

const TEL_SCHEME: &str = "tel:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("required field is empty: {0}")]
    MissingField(&'static str),

    #[error("phone number must start with 628")]
    InvalidPhone,
}

/// Raw form input, one string per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopForm {
    pub name: String,
    pub coordinates: String,
    pub accuracy: String,
    pub phone: String,
    pub price_per_kg: String,
    pub facilities: String,
    pub description: String,
    pub operating_hours: String,
}

/// Validated payload, serialized with the feed's field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopDraft {
    pub name: String,
    pub coordinates: String,
    #[serde(rename = "accuration")]
    pub accuracy: String,
    pub phone: String,
    #[serde(rename = "hargaPerKg")]
    pub price_per_kg: String,
    #[serde(rename = "fasilitas")]
    pub facilities: String,
    /// Absent on edits, which leave the stored description untouched.
    #[serde(rename = "deskripsi", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "jamOperasional")]
    pub operating_hours: String,
}

impl ShopForm {
    /// Prefill the edit form from a stored record.
    #[must_use]
    pub fn from_record(record: &ShopRecord) -> Self {
        let facilities = match &record.facilities {
            Some(Facilities::Text(text)) => text.clone(),
            Some(Facilities::List(items)) => items.join(", "),
            None => String::new(),
        };
        let phone = record.phone.as_deref().unwrap_or_default();
        Self {
            name: record.name.clone(),
            coordinates: record.coordinates.clone().unwrap_or_default(),
            accuracy: record.accuracy.clone().unwrap_or_default(),
            phone: phone.strip_prefix(TEL_SCHEME).unwrap_or(phone).to_string(),
            price_per_kg: record.price_per_kg.clone().unwrap_or_default(),
            facilities,
            description: record.description.clone().unwrap_or_default(),
            operating_hours: record.operating_hours.clone().unwrap_or_default(),
        }
    }

    /// Validate input for a new shop.
    ///
    /// Name, coordinates and phone are required. The phone is reduced to its
    /// digits and must start with [`PHONE_PREFIX`].
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingField`] for the first empty required field
    /// and [`FormError::InvalidPhone`] for a phone with the wrong prefix.
    pub fn validate_new(&self) -> Result<ShopDraft, FormError> {
        let name = required("name", &self.name)?;
        let coordinates = required("coordinates", &self.coordinates)?;
        let phone = digits_only(&self.phone);
        if phone.is_empty() {
            return Err(FormError::MissingField("phone"));
        }
        if !phone.starts_with(PHONE_PREFIX) {
            return Err(FormError::InvalidPhone);
        }

        Ok(ShopDraft {
            name,
            coordinates,
            phone,
            description: Some(self.description.trim().to_string()),
            ..self.optional_fields()
        })
    }

    /// Validate input for an existing shop identified by `id`.
    ///
    /// The phone is stored as a `tel:` link; an empty phone stays empty.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingField`] when the id, name or coordinates
    /// are empty.
    pub fn validate_edit(&self, id: &str) -> Result<ShopDraft, FormError> {
        required("id", id)?;
        let name = required("name", &self.name)?;
        let coordinates = required("coordinates", &self.coordinates)?;
        let digits = digits_only(&self.phone);
        let phone = if digits.is_empty() {
            String::new()
        } else {
            format!("{TEL_SCHEME}{digits}")
        };

        Ok(ShopDraft {
            name,
            coordinates,
            phone,
            ..self.optional_fields()
        })
    }

    fn optional_fields(&self) -> ShopDraft {
        ShopDraft {
            accuracy: self.accuracy.trim().to_string(),
            price_per_kg: self.price_per_kg.trim().to_string(),
            facilities: self.facilities.trim().to_string(),
            operating_hours: self.operating_hours.trim().to_string(),
            ..ShopDraft::default()
        }
    }
}

fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

/// Keep only ASCII digits.
#[must_use]
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Render a location accuracy in metres as `"12.34 m"`, or `"N/A"`.
#[must_use]
pub fn format_accuracy(accuracy_m: Option<f64>) -> String {
    match accuracy_m {
        Some(m) if m.is_finite() && m > 0.0 => format!("{m:.2} m"),
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
