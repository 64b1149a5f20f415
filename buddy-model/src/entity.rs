use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::{ModelError, ModelResult};
use crate::notify::{ChangeSink, PropertyChanged};
use crate::schema::EntitySchema;
use crate::value::{FieldValue, Value};
use crate::well_known::fields;

/// A generic, change-tracked field container.
///
/// Fields are addressed by public name (ASCII case-insensitive). Local
/// writes mark a field dirty; a [`merge`](Entity::merge) of server data
/// clears every dirty flag. Mutation takes `&mut self`, so one entity is
/// never written from two threads at once.
#[derive(Clone)]
pub struct Entity {
    schema: &'static EntitySchema,
    values: HashMap<String, ValueEntry>,
    deleted: bool,
    populated: bool,
    sink: Option<Arc<dyn ChangeSink>>,
}

#[derive(Debug, Clone)]
struct ValueEntry {
    /// Spelling used for export; the map key is the lowercased form.
    name: String,
    value: Value,
    dirty: bool,
}

/// A validated write waiting to be applied.
struct Staged {
    key: String,
    name: String,
    value: Value,
}

fn same_id(a: &Value, b: &Value) -> bool {
    matches!(
        (String::from_value(a), String::from_value(b)),
        (Ok(Some(a)), Ok(Some(b))) if a == b
    )
}

/// Which sources [`Entity::merge_from`] refuses.
///
/// The SDK has always refused a source of the entity's own type; whether
/// that is intended is unresolved, so the check is selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeSourceGuard {
    /// Refuse a source of the same entity type.
    #[default]
    RejectCompatible,
    /// Refuse a source of a different entity type.
    RejectIncompatible,
}

/// Options for [`Entity::set_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOptions {
    /// Deliver a change notification when the value changes.
    pub notify: bool,
    /// Reject names the schema does not declare.
    pub check_field: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self {
            notify: true,
            check_field: true,
        }
    }
}

/// A domain type backed by an [`Entity`].
pub trait Record {
    fn entity(&self) -> &Entity;
    fn entity_mut(&mut self) -> &mut Entity;
}

fn key_of(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl Entity {
    /// Creates an empty entity with no id.
    pub fn new(schema: &'static EntitySchema) -> Self {
        Self {
            schema,
            values: HashMap::new(),
            deleted: false,
            populated: false,
            sink: None,
        }
    }

    /// Creates an unpopulated entity referring to an existing object.
    pub fn with_id(schema: &'static EntitySchema, id: impl Into<String>) -> Self {
        let mut entity = Self::new(schema);
        entity.seed(fields::ID, Value::Text(id.into()));
        entity
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Routes change notifications to `sink`, replacing any previous one.
    pub fn set_change_sink(&mut self, sink: Arc<dyn ChangeSink>) {
        self.sink = Some(sink);
    }

    pub fn clear_change_sink(&mut self) {
        self.sink = None;
    }

    /// Makes the entity inert: every later read or write fails.
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// True once server data has been merged at least once.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// True if any field was written locally since the last merge.
    pub fn is_dirty(&self) -> bool {
        self.values.values().any(|e| e.dirty)
    }

    /// Public names of the dirty fields, sorted.
    pub fn dirty_fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .values
            .values()
            .filter(|e| e.dirty)
            .map(|e| e.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    fn ensure_valid(&self) -> ModelResult<()> {
        if self.deleted {
            return Err(ModelError::Disposed);
        }
        Ok(())
    }

    /// Reads a field coerced to `T`; `Ok(None)` when unset (or when an
    /// enumeration value matches no variant).
    pub fn get<T: FieldValue>(&self, name: &str) -> ModelResult<Option<T>> {
        self.ensure_valid()?;
        match self.values.get(&key_of(name)) {
            None => Ok(None),
            Some(entry) => T::from_value(&entry.value).map_err(|m| ModelError::TypeConversion {
                field: name.to_string(),
                expected: m.expected,
                found: m.found,
            }),
        }
    }

    /// Reads a field coerced to `T`, or `default` when unset.
    pub fn get_or_default<T: FieldValue>(&self, name: &str, default: T) -> ModelResult<T> {
        Ok(self.get(name)?.unwrap_or(default))
    }

    /// The stored value without coercion.
    pub fn raw(&self, name: &str) -> ModelResult<Option<&Value>> {
        self.ensure_valid()?;
        Ok(self.values.get(&key_of(name)).map(|e| &e.value))
    }

    /// Writes a declared field and notifies. See [`set_with`](Self::set_with).
    pub fn set<T: FieldValue>(&mut self, name: &str, value: T) -> ModelResult<bool> {
        self.set_with(name, value, SetOptions::default())
    }

    /// Writes a field. Returns whether the stored value changed.
    ///
    /// Writing the value already stored is a no-op: the field stays clean
    /// and no notification is sent. The same holds for writing
    /// [`FieldValue::unset`] (e.g. `None`, `0`, `false`) to an unset field.
    /// Values are normalized by the field's
    /// declared kind before storage (see [`FieldKind::normalize`]).
    ///
    /// [`FieldKind::normalize`]: crate::FieldKind::normalize
    pub fn set_with<T: FieldValue>(
        &mut self,
        name: &str,
        value: T,
        options: SetOptions,
    ) -> ModelResult<bool> {
        self.ensure_valid()?;
        if options.check_field && !self.schema.has_field(name) {
            return Err(ModelError::InvalidArgument(format!(
                "{name} is not a field of {}",
                self.schema.entity_type()
            )));
        }

        // An unset field reads as the type's unset value; a stored value of
        // another shape counts as different.
        let current = match self.values.get(&key_of(name)) {
            Some(entry) => T::from_value(&entry.value).ok().flatten(),
            None => T::unset(),
        };
        if current.as_ref() == Some(&value) {
            return Ok(false);
        }

        let changed = self.store(name, value.into_value())?;
        if changed && options.notify {
            self.notify(Some(name));
        }
        Ok(changed)
    }

    /// Normalizes and stores a value as dirty. Returns false when the value
    /// was dropped by normalization or equals the stored raw value.
    fn store(&mut self, name: &str, value: Value) -> ModelResult<bool> {
        match self.stage(name, value)? {
            Some(staged) => {
                self.commit(staged);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Validates a write without applying it. `Ok(None)` means there is
    /// nothing to write.
    fn stage(&self, name: &str, value: Value) -> ModelResult<Option<Staged>> {
        let schema = self.schema;
        let spec = schema.field(name);
        let value = match spec.map(|f| f.kind) {
            Some(kind) => match kind.normalize(value)? {
                Some(v) => v,
                None => return Ok(None),
            },
            None => value,
        };
        let key = key_of(name);

        if let Some(existing) = self.values.get(&key) {
            if existing.value == value {
                return Ok(None);
            }
            if key == key_of(fields::ID) && !existing.value.is_null() {
                // A null or equivalent id (42 vs "42") leaves the id alone.
                if value.is_null() || same_id(&existing.value, &value) {
                    return Ok(None);
                }
                return Err(ModelError::InvalidOperation(
                    "id cannot be reassigned".to_string(),
                ));
            }
        }

        Ok(Some(Staged {
            key,
            name: spec.map_or(name, |f| f.name).to_string(),
            value,
        }))
    }

    fn commit(&mut self, staged: Staged) {
        trace!(entity_type = self.schema.entity_type(), field = %staged.name, "field written");
        self.values.insert(
            staged.key,
            ValueEntry {
                name: staged.name,
                value: staged.value,
                dirty: true,
            },
        );
    }

    /// Stores a value that is not a local modification (constructor data).
    pub(crate) fn seed(&mut self, name: &str, value: Value) {
        let canonical = self.schema.field(name).map_or(name, |f| f.name).to_string();
        self.values.insert(
            key_of(name),
            ValueEntry {
                name: canonical,
                value,
                dirty: false,
            },
        );
    }

    /// Applies a server payload keyed by wire name.
    ///
    /// Wire names resolve to public names through the schema; unknown names
    /// are stored under the wire name itself. Afterwards the entity is
    /// populated, no field is dirty, and exactly one notification with no
    /// field name is sent.
    pub fn merge(&mut self, wire: &serde_json::Map<String, serde_json::Value>) -> ModelResult<()> {
        self.merge_values(
            wire.iter()
                .map(|(name, raw)| (name.clone(), Value::from_json(raw.clone()))),
        )
    }

    /// Like [`merge`](Self::merge) for a payload that must be a JSON object.
    pub fn merge_json(&mut self, payload: &serde_json::Value) -> ModelResult<()> {
        match payload.as_object() {
            Some(map) => self.merge(map),
            None => Err(ModelError::InvalidArgument(format!(
                "expected a JSON object for {}, got {payload}",
                self.schema.entity_type()
            ))),
        }
    }

    /// Stages every value first, so a payload with one bad value changes
    /// nothing.
    fn merge_values(&mut self, values: impl IntoIterator<Item = (String, Value)>) -> ModelResult<()> {
        self.ensure_valid()?;

        let mut staged = Vec::new();
        for (wire_name, value) in values {
            let name = self
                .schema
                .public_name(&wire_name)
                .unwrap_or(wire_name.as_str());
            if let Some(write) = self.stage(name, value)? {
                staged.push(write);
            }
        }

        self.populated = true;
        let applied = staged.len();
        for write in staged {
            self.commit(write);
        }
        for entry in self.values.values_mut() {
            entry.dirty = false;
        }
        debug!(
            entity_type = self.schema.entity_type(),
            applied, "merged server values"
        );

        self.notify(None);
        Ok(())
    }

    /// Whether `other` is of this entity's type.
    pub fn is_compatible_source(&self, other: &Entity) -> bool {
        self.schema.entity_type() == other.schema.entity_type()
    }

    /// Copies every stored value of `other` into this entity and merges,
    /// refusing sources per [`MergeSourceGuard::default`].
    pub fn merge_from(&mut self, other: &Entity) -> ModelResult<()> {
        self.merge_from_with(other, MergeSourceGuard::default())
    }

    /// [`merge_from`](Self::merge_from) with an explicit source guard.
    pub fn merge_from_with(&mut self, other: &Entity, guard: MergeSourceGuard) -> ModelResult<()> {
        self.ensure_valid()?;
        other.ensure_valid()?;
        let compatible = self.is_compatible_source(other);
        let refused = match guard {
            MergeSourceGuard::RejectCompatible => compatible,
            MergeSourceGuard::RejectIncompatible => !compatible,
        };
        if refused {
            return Err(ModelError::InvalidArgument(format!(
                "cannot merge {} into {} ({guard:?})",
                other.schema.entity_type(),
                self.schema.entity_type()
            )));
        }
        let copied: Vec<(String, Value)> = other
            .values
            .values()
            .map(|e| (e.name.clone(), e.value.clone()))
            .collect();
        self.merge_values(copied)
    }

    /// Dirty fields keyed by wire name, in wire form.
    pub fn dirty_wire_values(&self) -> ModelResult<serde_json::Map<String, serde_json::Value>> {
        self.ensure_valid()?;
        Ok(self
            .values
            .values()
            .filter(|e| e.dirty)
            .map(|e| (self.schema.wire_name(&e.name).to_string(), e.value.to_json()))
            .collect())
    }

    /// Every stored field keyed by public name, in wire form.
    pub fn to_json(&self) -> ModelResult<serde_json::Map<String, serde_json::Value>> {
        self.ensure_valid()?;
        Ok(self
            .values
            .values()
            .map(|e| (e.name.clone(), e.value.to_json()))
            .collect())
    }

    /// Resource path of this object, `"{path}/{id}"`.
    pub fn object_path(&self) -> ModelResult<String> {
        let id = self
            .id()?
            .ok_or_else(|| ModelError::InvalidOperation("ID required.".to_string()))?;
        let path = self.schema.path().ok_or_else(|| {
            ModelError::InvalidOperation(format!(
                "{} has no resource path",
                self.schema.entity_type()
            ))
        })?;
        Ok(format!("{path}/{id}"))
    }

    fn notify(&self, field: Option<&str>) {
        let Some(sink) = &self.sink else {
            return;
        };
        let entity_id = match self.values.get(&key_of(fields::ID)) {
            Some(ValueEntry {
                value: Value::Text(id),
                ..
            }) => Some(id.clone()),
            _ => None,
        };
        sink.deliver(PropertyChanged {
            entity_type: self.schema.entity_type(),
            entity_id,
            field: field.map(|f| self.schema.field(f).map_or(f, |s| s.name).to_string()),
        });
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("entity_type", &self.schema.entity_type())
            .field("values", &self.values)
            .field("deleted", &self.deleted)
            .field("populated", &self.populated)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
