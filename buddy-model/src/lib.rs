//! Core entity model for the Buddy SDK.
//!
//! Every domain object (users, pictures, check-ins, ...) is a thin typed
//! facade over one generic container:
//! - [`Entity`] — field storage with per-field dirty tracking, bulk merge of
//!   server responses and change notification
//! - [`EntitySchema`] — the declared fields of an entity type and their wire
//!   names, built once per type
//! - [`Value`] / [`FieldValue`] — the closed set of storable values and the
//!   typed coercions out of it
//! - [`ChangeSink`] — where change notifications go ([`ChangeFeed`] or
//!   [`BridgeSink`])
//!
//! Domain types declare a `static` schema and wrap an [`Entity`]; see
//! [`User`] for the pattern.

mod entity;
mod error;
mod notify;
mod schema;
mod user;
pub mod value;
mod well_known;

pub use entity::{Entity, MergeSourceGuard, Record, SetOptions};
pub use error::{ModelError, ModelResult};
pub use notify::{BridgeSink, ChangeFeed, ChangeSink, PropertyChanged};
pub use schema::{EntitySchema, EntitySchemaBuilder, FieldKind, FieldSpec};
pub use user::{AuthenticatedUser, User, UserFields, UserGender};
pub use value::{Coerced, EnumVariant, FieldEnum, FieldValue, Mismatch, Value};
pub use well_known::{Permissions, fields};
