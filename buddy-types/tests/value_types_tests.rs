use buddy_types::{Error, GeoLocation, Uri};
use serde_json::json;

// ── GeoLocation ──────────────────────────────────────────────────

#[test]
fn geo_parses_text_form() {
    let geo = GeoLocation::parse("47.6062, -122.3321").unwrap();
    assert_eq!(geo.latitude, 47.6062);
    assert_eq!(geo.longitude, -122.3321);
}

#[test]
fn geo_text_form_roundtrips_through_display() {
    let geo = GeoLocation::new(10.5, 20.25).unwrap();
    assert_eq!(geo.to_string(), "10.5,20.25");
    assert_eq!(geo.to_string().parse::<GeoLocation>().unwrap(), geo);
}

#[test]
fn geo_rejects_missing_comma() {
    assert!(matches!(
        GeoLocation::parse("47.6"),
        Err(Error::InvalidGeoLocation(_))
    ));
}

#[test]
fn geo_rejects_out_of_range() {
    assert!(GeoLocation::new(91.0, 0.0).is_err());
    assert!(GeoLocation::new(0.0, -180.5).is_err());
    assert!(GeoLocation::parse("NaN,1").is_err());
}

#[test]
fn geo_from_short_json_keys() {
    let geo = GeoLocation::from_json(&json!({"lat": 1.5, "lng": 2.5})).unwrap();
    assert_eq!(geo, GeoLocation::new(1.5, 2.5).unwrap());
}

#[test]
fn geo_from_long_json_keys_and_strings() {
    let geo = GeoLocation::from_json(&json!({"latitude": "3", "longitude": "-4"})).unwrap();
    assert_eq!(geo, GeoLocation::new(3.0, -4.0).unwrap());
}

#[test]
fn geo_from_json_requires_object() {
    assert!(GeoLocation::from_json(&json!([1, 2])).is_err());
    assert!(GeoLocation::from_json(&json!({"lat": 1})).is_err());
}

#[test]
fn geo_serde_uses_wire_keys() {
    let geo = GeoLocation::new(1.0, 2.0).unwrap();
    assert_eq!(serde_json::to_value(geo).unwrap(), json!({"lat": 1.0, "lng": 2.0}));
    assert_eq!(geo.to_json(), json!({"lat": 1.0, "lng": 2.0}));
}

// ── Uri ──────────────────────────────────────────────────────────

#[test]
fn uri_accepts_absolute() {
    let uri = Uri::parse("HTTPS://buddy.com/pics/1.png").unwrap();
    assert_eq!(uri.scheme(), "https");
    assert_eq!(uri.as_str(), "HTTPS://buddy.com/pics/1.png");
}

#[test]
fn uri_accepts_non_http_schemes() {
    assert!(Uri::parse("mailto:someone@buddy.com").is_ok());
    assert!(Uri::parse("ms-app.x+y:thing").is_ok());
}

#[test]
fn uri_rejects_relative_and_malformed() {
    assert!(Uri::parse("/relative/path").is_err());
    assert!(Uri::parse("no scheme here").is_err());
    assert!(Uri::parse("1http://x").is_err());
    assert!(Uri::parse("http:").is_err());
    assert!(Uri::parse("http://a b").is_err());
}

#[test]
fn uri_serde_validates() {
    let ok: Uri = serde_json::from_value(json!("http://x.y")).unwrap();
    assert_eq!(ok.to_string(), "http://x.y");
    assert!(serde_json::from_value::<Uri>(json!("nope")).is_err());
}
