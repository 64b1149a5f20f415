use buddy_types::{GeoLocation, Uri};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::error::ModelResult;
use crate::value::{EnumVariant, FieldEnum, Value};
use crate::well_known::{Permissions, fields};

/// Describes an entity type's fields and how they appear on the wire.
///
/// Built once per type (typically in a `static LazyLock`) and shared by
/// every instance, so a field's wire name never changes for the life of the
/// type.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    entity_type: &'static str,
    path: Option<&'static str>,
    fields: Vec<FieldSpec>,
    by_name: HashMap<String, usize>,
    by_wire: HashMap<&'static str, usize>,
}

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Public field name (e.g., "FirstName"). Compared case-insensitively.
    pub name: &'static str,
    /// Name used in server payloads (e.g., "firstName").
    pub wire_name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    fn simple(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            wire_name: name,
            kind,
        }
    }

    /// Shorthand for a free-text field.
    pub fn text(name: &'static str) -> Self {
        Self::simple(name, FieldKind::Text)
    }

    /// Shorthand for an integer field.
    pub fn integer(name: &'static str) -> Self {
        Self::simple(name, FieldKind::Integer)
    }

    /// Shorthand for a floating-point field.
    pub fn float(name: &'static str) -> Self {
        Self::simple(name, FieldKind::Float)
    }

    /// Shorthand for a boolean field.
    pub fn bool(name: &'static str) -> Self {
        Self::simple(name, FieldKind::Bool)
    }

    /// Shorthand for a UTC timestamp field.
    pub fn timestamp(name: &'static str) -> Self {
        Self::simple(name, FieldKind::Timestamp)
    }

    /// Shorthand for a geographic point field.
    pub fn geo_location(name: &'static str) -> Self {
        Self::simple(name, FieldKind::GeoLocation)
    }

    /// Shorthand for an absolute URI field.
    pub fn uri(name: &'static str) -> Self {
        Self::simple(name, FieldKind::Uri)
    }

    /// Shorthand for an opaque JSON field.
    pub fn json(name: &'static str) -> Self {
        Self::simple(name, FieldKind::Json)
    }

    /// Shorthand for an enumeration field declared with `field_enum!`.
    pub fn enumeration<E: FieldEnum>(name: &'static str) -> Self {
        Self::simple(name, FieldKind::Enum(E::VARIANTS))
    }

    /// Overrides the wire name.
    pub fn wire(mut self, wire_name: &'static str) -> Self {
        self.wire_name = wire_name;
        self
    }
}

/// The semantic kind of a field, used to normalize incoming values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Bool,
    Timestamp,
    GeoLocation,
    Uri,
    Json,
    Enum(&'static [EnumVariant]),
}

impl FieldKind {
    /// Brings a raw value into the kind's canonical shape before it is stored.
    ///
    /// - geolocations parse from `"lat,lng"` text or a `{lat, lng}` object
    /// - URIs parse from text
    /// - timestamps parse from RFC 3339 text, keeping unparsable text as is
    /// - enumerations store the canonical variant name; a name or number that
    ///   matches no variant yields `Ok(None)` and the write is dropped
    ///
    /// Malformed geolocations and URIs are errors.
    pub fn normalize(&self, value: Value) -> ModelResult<Option<Value>> {
        let normalized = match (self, value) {
            (_, Value::Null) => Value::Null,
            (FieldKind::GeoLocation, Value::Text(s)) => Value::Geo(GeoLocation::parse(&s)?),
            (FieldKind::GeoLocation, Value::Json(j)) => Value::Geo(GeoLocation::from_json(&j)?),
            (FieldKind::Uri, Value::Text(s)) => Value::Uri(Uri::parse(&s)?),
            (FieldKind::Timestamp, Value::Text(s)) => match DateTime::parse_from_rfc3339(s.trim()) {
                Ok(t) => Value::Timestamp(t.with_timezone(&Utc)),
                Err(_) => Value::Text(s),
            },
            (FieldKind::Integer, Value::Float(f)) if f.fract() == 0.0 && f.abs() < 9.0e15 => {
                Value::Int(f as i64)
            }
            (FieldKind::Enum(variants), raw) => {
                let matched = match &raw {
                    Value::Text(s) => variants
                        .iter()
                        .find(|v| v.name.eq_ignore_ascii_case(s.trim()))
                        .or_else(|| {
                            let n = s.trim().parse::<i64>().ok()?;
                            variants.iter().find(|v| i64::from(v.value) == n)
                        }),
                    Value::Int(n) => variants.iter().find(|v| i64::from(v.value) == *n),
                    _ => None,
                };
                match matched {
                    Some(variant) => Value::Text(variant.name.to_string()),
                    None => {
                        debug!(value = ?raw, "value matches no enumerator, ignoring write");
                        return Ok(None);
                    }
                }
            }
            (_, other) => other,
        };
        Ok(Some(normalized))
    }
}

impl EntitySchema {
    /// Starts a schema with the fields every entity carries
    /// (see [`fields`](crate::fields)).
    pub fn builder(entity_type: &'static str) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            entity_type,
            path: None,
            fields: vec![
                FieldSpec::text(fields::ID).wire("id"),
                FieldSpec::timestamp(fields::CREATED).wire("created"),
                FieldSpec::timestamp(fields::LAST_MODIFIED).wire("lastModified"),
                FieldSpec::text(fields::TAG).wire("tag"),
                FieldSpec::enumeration::<Permissions>(fields::READ_PERMISSIONS)
                    .wire("readPermissions"),
                FieldSpec::enumeration::<Permissions>(fields::WRITE_PERMISSIONS)
                    .wire("writePermissions"),
                FieldSpec::geo_location(fields::LOCATION).wire("location"),
            ],
        }
    }

    pub fn entity_type(&self) -> &'static str {
        self.entity_type
    }

    /// Resource path prefix (e.g., "/users"), if the type is addressable.
    pub fn path(&self) -> Option<&'static str> {
        self.path
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by public name, ignoring ASCII case.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.fields[i])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Public name of the field serialized as `wire_name` (exact match).
    pub fn public_name(&self, wire_name: &str) -> Option<&'static str> {
        self.by_wire.get(wire_name).map(|&i| self.fields[i].name)
    }

    /// Wire name of a declared field, or the name itself when undeclared.
    pub fn wire_name<'a>(&self, name: &'a str) -> &'a str {
        self.field(name).map_or(name, |f| f.wire_name)
    }
}

/// Builder returned by [`EntitySchema::builder`].
#[derive(Debug)]
pub struct EntitySchemaBuilder {
    entity_type: &'static str,
    path: Option<&'static str>,
    fields: Vec<FieldSpec>,
}

impl EntitySchemaBuilder {
    /// Sets the resource path prefix.
    pub fn path(mut self, path: &'static str) -> Self {
        self.path = Some(path);
        self
    }

    /// Declares a field. A field with the same public name (any case)
    /// replaces the earlier declaration in place.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        match self
            .fields
            .iter_mut()
            .find(|f| f.name.eq_ignore_ascii_case(spec.name))
        {
            Some(existing) => *existing = spec,
            None => self.fields.push(spec),
        }
        self
    }

    pub fn build(self) -> EntitySchema {
        let by_name = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.to_ascii_lowercase(), i))
            .collect();
        let mut by_wire = HashMap::with_capacity(self.fields.len());
        for (i, f) in self.fields.iter().enumerate() {
            by_wire.entry(f.wire_name).or_insert(i);
        }
        EntitySchema {
            entity_type: self.entity_type,
            path: self.path,
            fields: self.fields,
            by_name,
            by_wire,
        }
    }
}
