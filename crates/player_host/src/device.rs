//! Device descriptor shapes and wire-record decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic location assigned to a player device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceLocation {
    /// City name.
    pub city: Option<String>,
    /// State or region name.
    pub state: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
}

/// Details of the player device running the gadget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Device name.
    pub name: Option<String>,
    /// Unique registration key.
    pub registration_key: Option<String>,
    /// Device type label.
    pub device_type: Option<String>,
    /// When the device entered service. Absent when the host record carries
    /// no parseable timestamp.
    pub entered_service: Option<DateTime<Utc>>,
    /// Language code assigned to the device.
    pub lang_code: Option<String>,
    /// Timezone assigned to the device.
    pub time_zone: Option<String>,
    /// Tags, one per line of the device description.
    pub tags: Vec<String>,
    /// Assigned location, when known.
    pub location: Option<DeviceLocation>,
}

/// Wire record as the host serializes it: lowercase run-together field names
/// and a newline-delimited description.
#[derive(Debug, Deserialize)]
struct DeviceRecord {
    name: Option<String>,
    key: Option<String>,
    #[serde(rename = "devicetype")]
    device_type: Option<String>,
    #[serde(rename = "enteredservice")]
    entered_service: Option<String>,
    #[serde(rename = "langcode")]
    lang_code: Option<String>,
    timezone: Option<String>,
    description: Option<String>,
    location: Option<LocationRecord>,
}

#[derive(Debug, Deserialize)]
struct LocationRecord {
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
    #[serde(rename = "postalcode")]
    postal_code: Option<String>,
    address: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Decodes a serialized device descriptor into the public shape.
///
/// A literal `null` record decodes to `Ok(None)`; anything unparseable is an
/// error for the caller to degrade.
pub(crate) fn decode_device(raw: &str) -> Result<Option<Device>, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|err| format!("device record is not JSON: {err}"))?;
    if value.is_null() {
        return Ok(None);
    }
    let record: DeviceRecord = serde_json::from_value(value)
        .map_err(|err| format!("device record has an unexpected shape: {err}"))?;
    Ok(Some(record.into_device()))
}

impl DeviceRecord {
    fn into_device(self) -> Device {
        Device {
            name: self.name,
            registration_key: self.key,
            device_type: self.device_type,
            entered_service: self.entered_service.as_deref().and_then(parse_timestamp),
            lang_code: self.lang_code,
            time_zone: self.timezone,
            tags: self
                .description
                .map(|description| description.split('\n').map(str::to_string).collect())
                .unwrap_or_default(),
            location: self.location.map(|location| DeviceLocation {
                city: location.city,
                state: location.state,
                country: location.country,
                postal_code: location.postal_code,
                address: location.address,
                latitude: location.latitude,
                longitude: location.longitude,
            }),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}
