use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A point on the globe in decimal degrees.
///
/// The text form is `"lat,lng"`; the wire form is `{"lat": .., "lng": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    #[serde(rename = "lng", alias = "longitude")]
    pub longitude: f64,
}

impl GeoLocation {
    /// Creates a location, rejecting coordinates outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidGeoLocation(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidGeoLocation(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parses the `"lat,lng"` text form. Surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let (lat, lng) = text
            .split_once(',')
            .ok_or_else(|| Error::InvalidGeoLocation(text.to_string()))?;
        let latitude = parse_degrees(lat, text)?;
        let longitude = parse_degrees(lng, text)?;
        Self::new(latitude, longitude)
    }

    /// Reads the JSON object form, accepting `lat`/`lng` or
    /// `latitude`/`longitude` keys holding numbers or numeric strings.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::InvalidGeoLocation(value.to_string()))?;
        let coordinate = |short: &str, long: &str| -> Result<f64> {
            let raw = obj
                .get(short)
                .or_else(|| obj.get(long))
                .ok_or_else(|| Error::InvalidGeoLocation(format!("missing {short}")))?;
            match raw {
                serde_json::Value::Number(n) => n
                    .as_f64()
                    .ok_or_else(|| Error::InvalidGeoLocation(raw.to_string())),
                serde_json::Value::String(s) => parse_degrees(s, s),
                other => Err(Error::InvalidGeoLocation(other.to_string())),
            }
        };
        Self::new(coordinate("lat", "latitude")?, coordinate("lng", "longitude")?)
    }

    /// Returns the wire (JSON object) form.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "lat": self.latitude, "lng": self.longitude })
    }
}

fn parse_degrees(part: &str, whole: &str) -> Result<f64> {
    part.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
        .ok_or_else(|| Error::InvalidGeoLocation(whole.to_string()))
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for GeoLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
