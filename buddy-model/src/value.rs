//! Stored field values and typed coercion.
//!
//! An [`Entity`](crate::Entity) stores every field as a [`Value`]. Typed
//! access goes through [`FieldValue`], whose conversions are spelled out per
//! target type:
//!
//! 1. a value already of the target's variant is returned as is;
//! 2. enumerations accept a variant name (any case) or a declared
//!    discriminant, and fall back to the caller's default otherwise;
//! 3. `Null` reads as `None` for `Option<T>` and as the default for any
//!    other target;
//! 4. the remaining scalar conversions below, or a [`Mismatch`].

use buddy_types::{GeoLocation, Uri};
use chrono::{DateTime, SecondsFormat, Utc};

/// One stored field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Geo(GeoLocation),
    Uri(Uri),
    /// Structured wire data no declared field kind claims.
    Json(serde_json::Value),
}

impl Value {
    /// Short variant name used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Geo(_) => "geolocation",
            Value::Uri(_) => "uri",
            Value::Json(_) => "json",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts a decoded wire value. Numbers that fit `i64` become `Int`.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Json(other),
        }
    }

    /// Converts to the wire form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(t) => {
                serde_json::Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Geo(g) => g.to_json(),
            Value::Uri(u) => serde_json::Value::String(u.to_string()),
            Value::Json(j) => j.clone(),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self::from_json(json)
    }
}

/// A failed coercion: the requested type and the stored variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

impl Mismatch {
    fn new(expected: &'static str, value: &Value) -> Self {
        Self {
            expected,
            found: value.type_name(),
        }
    }
}

/// Outcome of a coercion. `Ok(None)` means "use the caller's default".
pub type Coerced<T> = Result<Option<T>, Mismatch>;

/// A Rust type that can be read from and written to an entity field.
pub trait FieldValue: Sized + PartialEq {
    fn from_value(value: &Value) -> Coerced<Self>;
    fn into_value(self) -> Value;

    /// What an unset field reads as when compared against a write: the
    /// type's zero value, or `None` when it has none.
    fn unset() -> Option<Self> {
        Self::from_value(&Value::Null).ok().flatten()
    }
}

impl FieldValue for String {
    fn from_value(value: &Value) -> Coerced<Self> {
        Ok(match value {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Timestamp(t) => Some(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Geo(g) => Some(g.to_string()),
            Value::Uri(u) => Some(u.to_string()),
            Value::Json(j) => Some(j.to_string()),
        })
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl FieldValue for bool {
    fn from_value(value: &Value) -> Coerced<Self> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            Value::Int(i) => Ok(Some(*i != 0)),
            Value::Float(f) => Ok(Some(*f != 0.0)),
            Value::Text(s) if s.trim().eq_ignore_ascii_case("true") => Ok(Some(true)),
            Value::Text(s) if s.trim().eq_ignore_ascii_case("false") => Ok(Some(false)),
            other => Err(Mismatch::new("bool", other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn unset() -> Option<Self> {
        Some(false)
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

impl FieldValue for i64 {
    fn from_value(value: &Value) -> Coerced<Self> {
        match value {
            Value::Null => Ok(None),
            Value::Int(i) => Ok(Some(*i)),
            Value::Bool(b) => Ok(Some(i64::from(*b))),
            Value::Float(f) => float_to_i64(*f)
                .map(Some)
                .ok_or_else(|| Mismatch::new("integer", value)),
            Value::Text(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| Mismatch::new("integer", value)),
            other => Err(Mismatch::new("integer", other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn unset() -> Option<Self> {
        Some(0)
    }
}

impl FieldValue for i32 {
    fn from_value(value: &Value) -> Coerced<Self> {
        match i64::from_value(value) {
            Ok(Some(wide)) => i32::try_from(wide)
                .map(Some)
                .map_err(|_| Mismatch::new("32-bit integer", value)),
            Ok(None) => Ok(None),
            Err(_) => Err(Mismatch::new("32-bit integer", value)),
        }
    }

    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }

    fn unset() -> Option<Self> {
        Some(0)
    }
}

impl FieldValue for f64 {
    fn from_value(value: &Value) -> Coerced<Self> {
        match value {
            Value::Null => Ok(None),
            Value::Float(f) => Ok(Some(*f)),
            Value::Int(i) => Ok(Some(*i as f64)),
            Value::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
            Value::Text(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| Mismatch::new("float", value)),
            other => Err(Mismatch::new("float", other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn unset() -> Option<Self> {
        Some(0.0)
    }
}

impl FieldValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Coerced<Self> {
        match value {
            Value::Null => Ok(None),
            Value::Timestamp(t) => Ok(Some(*t)),
            Value::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|t| Some(t.with_timezone(&Utc)))
                .map_err(|_| Mismatch::new("timestamp", value)),
            other => Err(Mismatch::new("timestamp", other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Timestamp(self)
    }
}

impl FieldValue for GeoLocation {
    fn from_value(value: &Value) -> Coerced<Self> {
        match value {
            Value::Null => Ok(None),
            Value::Geo(g) => Ok(Some(*g)),
            Value::Text(s) => GeoLocation::parse(s)
                .map(Some)
                .map_err(|_| Mismatch::new("geolocation", value)),
            Value::Json(j) => GeoLocation::from_json(j)
                .map(Some)
                .map_err(|_| Mismatch::new("geolocation", value)),
            other => Err(Mismatch::new("geolocation", other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Geo(self)
    }
}

impl FieldValue for Uri {
    fn from_value(value: &Value) -> Coerced<Self> {
        match value {
            Value::Null => Ok(None),
            Value::Uri(u) => Ok(Some(u.clone())),
            Value::Text(s) => Uri::parse(s)
                .map(Some)
                .map_err(|_| Mismatch::new("uri", value)),
            other => Err(Mismatch::new("uri", other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Uri(self)
    }
}

impl FieldValue for serde_json::Value {
    fn from_value(value: &Value) -> Coerced<Self> {
        Ok(Some(value.to_json()))
    }

    fn into_value(self) -> Value {
        Value::from_json(self)
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn from_value(value: &Value) -> Coerced<Self> {
        match value {
            Value::Null => Ok(Some(None)),
            other => T::from_value(other).map(|inner| inner.map(Some)),
        }
    }

    fn into_value(self) -> Value {
        self.map_or(Value::Null, T::into_value)
    }
}

/// One declared enumerator: its name and discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: &'static str,
    pub value: i32,
}

/// A closed enumeration storable in an entity field.
///
/// Implemented by [`field_enum!`](crate::field_enum).
pub trait FieldEnum: Copy + PartialEq + 'static {
    const VARIANTS: &'static [EnumVariant];

    fn from_discriminant(value: i32) -> Option<Self>;

    fn discriminant(self) -> i32;

    /// Case-insensitive lookup by variant name.
    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::VARIANTS
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .and_then(|v| Self::from_discriminant(v.value))
    }

    fn name(self) -> &'static str {
        Self::VARIANTS
            .iter()
            .find(|v| v.value == self.discriminant())
            .map_or("", |v| v.name)
    }
}

/// Coerces a stored value to an enumeration. Never fails on unknown input:
/// unknown names and undefined numbers read as the caller's default.
pub fn coerce_enum<E: FieldEnum>(value: &Value) -> Coerced<E> {
    match value {
        Value::Null => Ok(None),
        Value::Text(s) => Ok(E::from_name(s).or_else(|| {
            s.trim()
                .parse::<i32>()
                .ok()
                .and_then(E::from_discriminant)
        })),
        Value::Int(i) => Ok(i32::try_from(*i).ok().and_then(E::from_discriminant)),
        Value::Float(f) => Ok(float_to_i64(*f)
            .and_then(|i| i32::try_from(i).ok())
            .and_then(E::from_discriminant)),
        other => Err(Mismatch::new("enumeration", other)),
    }
}

/// Stores an enumeration by variant name.
pub fn enum_into_value<E: FieldEnum>(value: E) -> Value {
    match value.name() {
        "" => Value::Int(i64::from(value.discriminant())),
        name => Value::Text(name.to_string()),
    }
}

/// Declares a fieldless enum usable as an entity field.
///
/// Adds `Debug, Clone, Copy, PartialEq, Eq, Hash` and `#[repr(i32)]`;
/// discriminants must be non-negative integer literals.
///
/// ```
/// buddy_model::field_enum! {
///     pub enum Visibility {
///         Hidden = 0,
///         Public = 1,
///     }
/// }
/// ```
#[macro_export]
macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $crate::FieldEnum for $name {
            const VARIANTS: &'static [$crate::EnumVariant] = &[
                $( $crate::EnumVariant { name: stringify!($variant), value: $value } ),+
            ];

            fn from_discriminant(value: i32) -> ::std::option::Option<Self> {
                $( if value == $value { return ::std::option::Option::Some(Self::$variant); } )+
                ::std::option::Option::None
            }

            fn discriminant(self) -> i32 {
                self as i32
            }
        }

        impl $crate::FieldValue for $name {
            fn from_value(value: &$crate::Value) -> $crate::Coerced<Self> {
                $crate::value::coerce_enum::<Self>(value)
            }

            fn into_value(self) -> $crate::Value {
                $crate::value::enum_into_value(self)
            }

            fn unset() -> ::std::option::Option<Self> {
                <Self as $crate::FieldEnum>::from_discriminant(0)
            }
        }
    };
}
