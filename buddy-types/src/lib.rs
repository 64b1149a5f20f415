//! Core value types for the Buddy SDK.
//!
//! This crate defines the small, platform-agnostic value types that the
//! entity model and the settings store share:
//! - [`Ticks`]: 100 ns intervals since 0001-01-01 UTC, the unit used by
//!   persisted setting expiry stamps
//! - [`GeoLocation`]: a latitude/longitude pair with its text and JSON forms
//! - [`Uri`]: a validated absolute URI
//!
//! Domain objects (users, pictures, check-ins, ...) belong in `buddy-model`.

mod geo;
mod ticks;
mod uri;

pub use geo::GeoLocation;
pub use ticks::Ticks;
pub use uri::Uri;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing or converting core values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid geolocation: {0}")]
    InvalidGeoLocation(String),

    #[error("invalid URI: {0}")]
    InvalidUri(String),

    #[error("tick count out of range: {0}")]
    InvalidTicks(i64),
}
