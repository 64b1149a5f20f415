//! Fields every entity carries, and their typed accessors.

use buddy_types::GeoLocation;
use chrono::{DateTime, Utc};

use crate::entity::{Entity, SetOptions};
use crate::error::ModelResult;

/// Public names of the fields declared on every schema.
pub mod fields {
    pub const ID: &str = "Id";
    pub const CREATED: &str = "Created";
    pub const LAST_MODIFIED: &str = "LastModified";
    pub const TAG: &str = "Tag";
    pub const READ_PERMISSIONS: &str = "ReadPermissions";
    pub const WRITE_PERMISSIONS: &str = "WritePermissions";
    pub const LOCATION: &str = "Location";
}

crate::field_enum! {
    /// Who may read or write an object.
    pub enum Permissions {
        /// Only the owning user.
        User = 1,
        /// Every user of the application.
        App = 2,
    }
}

const WELL_KNOWN: SetOptions = SetOptions {
    notify: true,
    check_field: false,
};

impl Entity {
    /// Server-assigned identifier. Immutable once set.
    pub fn id(&self) -> ModelResult<Option<String>> {
        self.get(fields::ID)
    }

    pub fn created(&self) -> ModelResult<Option<DateTime<Utc>>> {
        self.get(fields::CREATED)
    }

    pub fn set_created(&mut self, created: DateTime<Utc>) -> ModelResult<bool> {
        self.set_with(fields::CREATED, created, WELL_KNOWN)
    }

    pub fn last_modified(&self) -> ModelResult<Option<DateTime<Utc>>> {
        self.get(fields::LAST_MODIFIED)
    }

    pub fn set_last_modified(&mut self, last_modified: DateTime<Utc>) -> ModelResult<bool> {
        self.set_with(fields::LAST_MODIFIED, last_modified, WELL_KNOWN)
    }

    /// Free-form application tag.
    pub fn tag(&self) -> ModelResult<Option<String>> {
        self.get(fields::TAG)
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) -> ModelResult<bool> {
        self.set_with(fields::TAG, tag.into(), WELL_KNOWN)
    }

    pub fn read_permissions(&self) -> ModelResult<Option<Permissions>> {
        self.get(fields::READ_PERMISSIONS)
    }

    pub fn set_read_permissions(&mut self, permissions: Permissions) -> ModelResult<bool> {
        self.set_with(fields::READ_PERMISSIONS, permissions, WELL_KNOWN)
    }

    pub fn write_permissions(&self) -> ModelResult<Option<Permissions>> {
        self.get(fields::WRITE_PERMISSIONS)
    }

    pub fn set_write_permissions(&mut self, permissions: Permissions) -> ModelResult<bool> {
        self.set_with(fields::WRITE_PERMISSIONS, permissions, WELL_KNOWN)
    }

    pub fn location(&self) -> ModelResult<Option<GeoLocation>> {
        self.get(fields::LOCATION)
    }

    pub fn set_location(&mut self, location: GeoLocation) -> ModelResult<bool> {
        self.set_with(fields::LOCATION, location, WELL_KNOWN)
    }
}
