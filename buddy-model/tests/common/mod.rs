//! Shared test schema for entity tests.

#![allow(dead_code)]

use buddy_model::{ChangeFeed, Entity, EntitySchema, FieldSpec, PropertyChanged};
use std::sync::{Arc, LazyLock};
use tokio::sync::mpsc::UnboundedReceiver;

buddy_model::field_enum! {
    pub enum Mood {
        Calm = 0,
        Happy = 1,
        Angry = 5,
    }
}

pub static NOTE: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Note")
        .path("/notes")
        .field(FieldSpec::text("Title").wire("title"))
        .field(FieldSpec::integer("Views").wire("viewCount"))
        .field(FieldSpec::float("Rating"))
        .field(FieldSpec::bool("Pinned").wire("pinned"))
        .field(FieldSpec::enumeration::<Mood>("Mood").wire("mood"))
        .field(FieldSpec::uri("Website").wire("website"))
        .build()
});

pub static SCRATCH: LazyLock<EntitySchema> =
    LazyLock::new(|| EntitySchema::builder("Scratch").build());

/// A note wired to a change feed.
pub fn observed_note() -> (Entity, UnboundedReceiver<PropertyChanged>) {
    let (feed, rx) = ChangeFeed::channel();
    let mut note = Entity::new(&NOTE);
    note.set_change_sink(Arc::new(feed));
    (note, rx)
}

/// Drains every queued notification.
pub fn drain(rx: &mut UnboundedReceiver<PropertyChanged>) -> Vec<PropertyChanged> {
    let mut out = Vec::new();
    while let Ok(change) = rx.try_recv() {
        out.push(change);
    }
    out
}
