//! User objects.

use buddy_types::Uri;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::LazyLock;

use crate::entity::{Entity, Record};
use crate::error::ModelResult;
use crate::schema::{EntitySchema, EntitySchemaBuilder, FieldSpec};
use crate::value::Value;

crate::field_enum! {
    pub enum UserGender {
        Unknown = 0,
        Male = 1,
        Female = 2,
    }
}

fn user_fields(builder: EntitySchemaBuilder) -> EntitySchemaBuilder {
    builder
        .path("/users")
        .field(FieldSpec::text("FirstName").wire("firstName"))
        .field(FieldSpec::text("LastName").wire("lastName"))
        .field(FieldSpec::text("UserName").wire("userName"))
        .field(FieldSpec::text("Email").wire("email"))
        .field(FieldSpec::enumeration::<UserGender>("Gender").wire("gender"))
        .field(FieldSpec::timestamp("DateOfBirth").wire("dateOfBirth"))
        .field(FieldSpec::uri("ProfilePictureUrl").wire("profilePictureUrl"))
}

static USER_SCHEMA: LazyLock<EntitySchema> =
    LazyLock::new(|| user_fields(EntitySchema::builder("User")).build());

static AUTHENTICATED_USER_SCHEMA: LazyLock<EntitySchema> = LazyLock::new(|| {
    user_fields(EntitySchema::builder("AuthenticatedUser"))
        .field(FieldSpec::text("AccessToken").wire("accessToken"))
        .build()
});

/// Typed accessors shared by every user-shaped record.
pub trait UserFields: Record {
    fn first_name(&self) -> ModelResult<Option<String>> {
        self.entity().get("FirstName")
    }

    fn set_first_name(&mut self, value: impl Into<String>) -> ModelResult<bool> {
        self.entity_mut().set("FirstName", value.into())
    }

    fn last_name(&self) -> ModelResult<Option<String>> {
        self.entity().get("LastName")
    }

    fn set_last_name(&mut self, value: impl Into<String>) -> ModelResult<bool> {
        self.entity_mut().set("LastName", value.into())
    }

    fn user_name(&self) -> ModelResult<Option<String>> {
        self.entity().get("UserName")
    }

    fn set_user_name(&mut self, value: impl Into<String>) -> ModelResult<bool> {
        self.entity_mut().set("UserName", value.into())
    }

    fn email(&self) -> ModelResult<Option<String>> {
        self.entity().get("Email")
    }

    fn set_email(&mut self, value: impl Into<String>) -> ModelResult<bool> {
        self.entity_mut().set("Email", value.into())
    }

    fn gender(&self) -> ModelResult<UserGender> {
        self.entity().get_or_default("Gender", UserGender::Unknown)
    }

    fn set_gender(&mut self, value: UserGender) -> ModelResult<bool> {
        self.entity_mut().set("Gender", value)
    }

    fn date_of_birth(&self) -> ModelResult<Option<DateTime<Utc>>> {
        self.entity().get("DateOfBirth")
    }

    fn set_date_of_birth(&mut self, value: DateTime<Utc>) -> ModelResult<bool> {
        self.entity_mut().set("DateOfBirth", value)
    }

    fn profile_picture_url(&self) -> ModelResult<Option<Uri>> {
        self.entity().get("ProfilePictureUrl")
    }

    /// Accepts the raw string form; it is parsed into a [`Uri`] on write.
    fn set_profile_picture_url(&mut self, value: impl Into<String>) -> ModelResult<bool> {
        self.entity_mut().set("ProfilePictureUrl", value.into())
    }
}

/// A Buddy user.
#[derive(Debug, Clone)]
pub struct User {
    entity: Entity,
}

impl User {
    pub fn schema() -> &'static EntitySchema {
        &USER_SCHEMA
    }

    pub fn new() -> Self {
        Self {
            entity: Entity::new(Self::schema()),
        }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            entity: Entity::with_id(Self::schema(), id),
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for User {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

impl UserFields for User {}

/// The signed-in user, carrying the secret token that authenticates requests.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    entity: Entity,
}

impl AuthenticatedUser {
    pub fn schema() -> &'static EntitySchema {
        &AUTHENTICATED_USER_SCHEMA
    }

    /// An authenticated user not yet populated from the server.
    pub fn new(id: impl Into<String>, access_token: impl Into<String>) -> Self {
        let mut entity = Entity::with_id(Self::schema(), id);
        entity.seed("AccessToken", Value::Text(access_token.into()));
        Self { entity }
    }

    pub fn access_token(&self) -> ModelResult<Option<String>> {
        self.entity.get("AccessToken")
    }
}

impl Record for AuthenticatedUser {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

impl UserFields for AuthenticatedUser {}

impl fmt::Display for AuthenticatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.entity.id().ok().flatten().unwrap_or_default();
        let email = self.email().ok().flatten().unwrap_or_default();
        write!(f, "AuthenticatedUser {id}, Email: {email}")
    }
}
