mod common;

use buddy_model::{Entity, MergeSourceGuard, ModelError, Permissions, SetOptions, Value, fields};
use buddy_types::{GeoLocation, Uri};
use chrono::{TimeZone, Utc};
use common::{Mood, NOTE, SCRATCH, drain, observed_note};
use pretty_assertions::assert_eq;
use serde_json::json;

fn payload(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    value.as_object().cloned().unwrap()
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn new_entity_is_clean_and_unpopulated() {
    let note = Entity::new(&NOTE);
    assert_eq!(note.id().unwrap(), None);
    assert!(!note.is_dirty());
    assert!(!note.is_populated());
    assert!(!note.is_deleted());
}

#[test]
fn with_id_seeds_id_without_dirtying() {
    let note = Entity::with_id(&NOTE, "n-1");
    assert_eq!(note.id().unwrap().as_deref(), Some("n-1"));
    assert!(!note.is_dirty());
    assert!(!note.is_populated());
}

// ── Set / get ────────────────────────────────────────────────────

#[test]
fn set_then_get_round_trips_and_marks_dirty() {
    let mut note = Entity::new(&NOTE);
    assert!(note.set("Title", "groceries".to_string()).unwrap());
    assert!(note.set("Views", 7i64).unwrap());
    assert!(note.set("Pinned", true).unwrap());

    assert_eq!(note.get::<String>("Title").unwrap().as_deref(), Some("groceries"));
    assert_eq!(note.get::<i64>("Views").unwrap(), Some(7));
    assert_eq!(note.get::<bool>("Pinned").unwrap(), Some(true));
    assert!(note.is_dirty());
    assert_eq!(note.dirty_fields(), vec!["Pinned", "Title", "Views"]);
}

#[test]
fn field_names_are_case_insensitive() {
    let mut note = Entity::new(&NOTE);
    note.set("title", "a".to_string()).unwrap();
    assert_eq!(note.get::<String>("TITLE").unwrap().as_deref(), Some("a"));
    // Stored under the declared spelling.
    assert_eq!(note.dirty_fields(), vec!["Title"]);
}

#[test]
fn unset_field_reads_none_or_default() {
    let note = Entity::new(&NOTE);
    assert_eq!(note.get::<String>("Title").unwrap(), None);
    assert_eq!(note.get_or_default("Views", 3i64).unwrap(), 3);
    assert_eq!(note.get_or_default("Mood", Mood::Calm).unwrap(), Mood::Calm);
}

#[test]
fn setting_the_stored_value_is_a_no_op() {
    let (mut note, mut rx) = observed_note();
    note.merge(&payload(json!({ "title": "same" }))).unwrap();
    drain(&mut rx);

    assert!(!note.set("Title", "same".to_string()).unwrap());
    assert!(!note.is_dirty());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn effective_set_notifies_with_the_declared_name() {
    let (mut note, mut rx) = observed_note();
    note.set("views", 1i64).unwrap();

    let changes = drain(&mut rx);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].entity_type, "Note");
    assert_eq!(changes[0].field.as_deref(), Some("Views"));
    assert!(!changes[0].is_bulk());
}

#[test]
fn set_without_notify_is_silent() {
    let (mut note, mut rx) = observed_note();
    let options = SetOptions {
        notify: false,
        ..SetOptions::default()
    };
    assert!(note.set_with("Title", "quiet".to_string(), options).unwrap());
    assert!(drain(&mut rx).is_empty());
    assert!(note.is_dirty());
}

#[test]
fn unknown_field_is_rejected_unless_unchecked() {
    let mut note = Entity::new(&NOTE);
    let err = note.set("Colour", "red".to_string()).unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));

    let unchecked = SetOptions {
        check_field: false,
        ..SetOptions::default()
    };
    assert!(note.set_with("Colour", "red".to_string(), unchecked).unwrap());
    assert_eq!(note.get::<String>("colour").unwrap().as_deref(), Some("red"));
}

#[test]
fn incompatible_read_is_a_type_conversion_error() {
    let mut note = Entity::new(&NOTE);
    note.set("Title", "not a number".to_string()).unwrap();
    let err = note.get::<i64>("Title").unwrap_err();
    assert_eq!(
        err,
        ModelError::TypeConversion {
            field: "Title".to_string(),
            expected: "integer",
            found: "text",
        }
    );
}

#[test]
fn numeric_text_reads_as_number() {
    let mut note = Entity::new(&NOTE);
    note.merge(&payload(json!({ "viewCount": "42", "Rating": 4 }))).unwrap();
    assert_eq!(note.get::<i64>("Views").unwrap(), Some(42));
    assert_eq!(note.get::<f64>("Rating").unwrap(), Some(4.0));
}

#[test]
fn null_reads_as_default_unless_optional() {
    let mut note = Entity::new(&NOTE);
    note.set("Title", "draft".to_string()).unwrap();
    assert!(note.set("Title", Option::<String>::None).unwrap());
    assert_eq!(note.raw("Title").unwrap(), Some(&Value::Null));
    assert_eq!(note.get::<String>("Title").unwrap(), None);
    assert_eq!(note.get::<Option<String>>("Title").unwrap(), Some(None));
}

#[test]
fn writing_none_to_unset_field_is_a_no_op() {
    let (mut note, mut rx) = observed_note();
    assert!(!note.set("Title", Option::<String>::None).unwrap());
    assert!(!note.is_dirty());
    assert_eq!(note.raw("Title").unwrap(), None);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn writing_zero_value_to_unset_field_is_a_no_op() {
    let (mut note, mut rx) = observed_note();
    assert!(!note.set("Views", 0i64).unwrap());
    assert!(!note.set("Pinned", false).unwrap());
    assert!(!note.set("Mood", Mood::Calm).unwrap());
    assert!(!note.is_dirty());
    assert!(drain(&mut rx).is_empty());

    // Other values, and an empty string, are real writes.
    assert!(note.set("Views", 1i64).unwrap());
    assert!(note.set("Title", String::new()).unwrap());
    assert_eq!(note.dirty_fields(), vec!["Title", "Views"]);
}

#[test]
fn whole_float_written_to_integer_field_is_stored_as_int() {
    let mut note = Entity::new(&NOTE);
    note.set("Views", 3.0f64).unwrap();
    assert_eq!(note.raw("Views").unwrap(), Some(&Value::Int(3)));
}

// ── Special field kinds ──────────────────────────────────────────

#[test]
fn location_text_is_parsed_on_write() {
    let mut note = Entity::new(&NOTE);
    note.set(fields::LOCATION, "47.6,-122.3".to_string()).unwrap();
    assert!(matches!(note.raw("Location").unwrap(), Some(Value::Geo(_))));
    assert_eq!(
        note.location().unwrap(),
        Some(GeoLocation::new(47.6, -122.3).unwrap())
    );
}

#[test]
fn malformed_location_is_an_error() {
    let mut note = Entity::new(&NOTE);
    let err = note.set(fields::LOCATION, "north-ish".to_string()).unwrap_err();
    assert!(matches!(
        err,
        ModelError::Types(buddy_types::Error::InvalidGeoLocation(_))
    ));
    assert_eq!(note.raw("Location").unwrap(), None);
}

#[test]
fn location_object_from_server_is_parsed() {
    let mut note = Entity::new(&NOTE);
    note.merge(&payload(json!({ "location": { "lat": 1.5, "lng": 2.5 } })))
        .unwrap();
    assert_eq!(
        note.location().unwrap(),
        Some(GeoLocation::new(1.5, 2.5).unwrap())
    );
}

#[test]
fn uri_text_is_parsed_on_write() {
    let mut note = Entity::new(&NOTE);
    note.set("Website", "https://example.com/a".to_string()).unwrap();
    assert_eq!(
        note.get::<Uri>("Website").unwrap(),
        Some(Uri::parse("https://example.com/a").unwrap())
    );
    assert!(note.set("Website", "not a uri".to_string()).is_err());
}

#[test]
fn server_timestamps_are_parsed() {
    let mut note = Entity::new(&NOTE);
    note.merge(&payload(json!({ "created": "2014-03-09T08:30:15Z" })))
        .unwrap();
    assert_eq!(
        note.created().unwrap(),
        Some(Utc.with_ymd_and_hms(2014, 3, 9, 8, 30, 15).unwrap())
    );
}

#[test]
fn unparsable_timestamp_text_is_kept_raw() {
    let mut note = Entity::new(&NOTE);
    note.merge(&payload(json!({ "lastModified": "sometime" })))
        .unwrap();
    assert_eq!(
        note.raw("LastModified").unwrap(),
        Some(&Value::Text("sometime".to_string()))
    );
    assert!(note.last_modified().is_err());
}

// ── Enumerations ─────────────────────────────────────────────────

#[test]
fn enum_is_stored_by_name() {
    let mut note = Entity::new(&NOTE);
    note.set("Mood", Mood::Angry).unwrap();
    assert_eq!(note.raw("Mood").unwrap(), Some(&Value::Text("Angry".to_string())));
    assert_eq!(note.get::<Mood>("Mood").unwrap(), Some(Mood::Angry));
}

#[test]
fn enum_accepts_names_in_any_case_and_discriminants() {
    let mut note = Entity::new(&NOTE);
    note.set("Mood", "happy".to_string()).unwrap();
    assert_eq!(note.get::<Mood>("Mood").unwrap(), Some(Mood::Happy));

    note.set("Mood", 5i64).unwrap();
    assert_eq!(note.get::<Mood>("Mood").unwrap(), Some(Mood::Angry));
}

#[test]
fn out_of_range_enum_write_keeps_prior_value() {
    let mut note = Entity::new(&NOTE);
    note.set("Mood", Mood::Happy).unwrap();
    assert!(!note.set("Mood", 99i64).unwrap());
    assert!(!note.set("Mood", "furious".to_string()).unwrap());
    assert_eq!(note.get::<Mood>("Mood").unwrap(), Some(Mood::Happy));
}

#[test]
fn out_of_range_enum_on_fresh_entity_reads_default() {
    let mut note = Entity::new(&NOTE);
    note.merge(&payload(json!({ "mood": 42 }))).unwrap();
    assert_eq!(note.raw("Mood").unwrap(), None);
    assert_eq!(note.get_or_default("Mood", Mood::Calm).unwrap(), Mood::Calm);
}

#[test]
fn undeclared_enum_storage_coerces_leniently() {
    let mut scratch = Entity::new(&SCRATCH);
    let unchecked = SetOptions {
        check_field: false,
        ..SetOptions::default()
    };
    scratch.set_with("Level", 1i64, unchecked).unwrap();
    scratch.set_with("Other", 77i64, unchecked).unwrap();
    assert_eq!(scratch.get::<Mood>("Level").unwrap(), Some(Mood::Happy));
    assert_eq!(scratch.get::<Mood>("Other").unwrap(), None);
}

#[test]
fn permissions_round_trip() {
    let mut note = Entity::new(&NOTE);
    note.set_read_permissions(Permissions::App).unwrap();
    note.set_write_permissions(Permissions::User).unwrap();
    assert_eq!(note.read_permissions().unwrap(), Some(Permissions::App));
    assert_eq!(note.write_permissions().unwrap(), Some(Permissions::User));
}

// ── Merge ────────────────────────────────────────────────────────

#[test]
fn merge_populates_cleans_and_notifies_once() {
    let (mut note, mut rx) = observed_note();
    note.set("Title", "draft".to_string()).unwrap();
    drain(&mut rx);

    note.merge(&payload(json!({
        "id": "n-9",
        "title": "final",
        "viewCount": 3,
        "pinned": false,
    })))
    .unwrap();

    assert!(note.is_populated());
    assert!(!note.is_dirty());
    assert_eq!(note.get::<String>("Title").unwrap().as_deref(), Some("final"));
    assert_eq!(note.get::<i64>("Views").unwrap(), Some(3));

    let changes = drain(&mut rx);
    assert_eq!(changes.len(), 1);
    assert!(changes[0].is_bulk());
    assert_eq!(changes[0].entity_id.as_deref(), Some("n-9"));
    assert!(changes[0].affects("anything"));
}

#[test]
fn merge_stores_unknown_wire_names_verbatim() {
    let mut note = Entity::new(&NOTE);
    note.merge(&payload(json!({ "serverOnly": [1, 2] }))).unwrap();
    assert_eq!(
        note.raw("serverOnly").unwrap(),
        Some(&Value::Json(json!([1, 2])))
    );
}

#[test]
fn merge_json_requires_an_object() {
    let mut note = Entity::new(&NOTE);
    let err = note.merge_json(&json!([1, 2, 3])).unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));
    assert!(!note.is_populated());

    note.merge_json(&json!({ "title": "ok" })).unwrap();
    assert!(note.is_populated());
}

#[test]
fn merge_with_one_bad_value_changes_nothing() {
    let (mut note, mut rx) = observed_note();
    note.set("Tag", "local".to_string()).unwrap();
    drain(&mut rx);

    let err = note
        .merge(&payload(json!({
            "lastModified": "2024-01-01T00:00:00Z",
            "location": "not-a-point",
            "title": "t",
        })))
        .unwrap_err();
    assert!(matches!(err, ModelError::Types(_)));

    assert!(!note.is_populated());
    assert_eq!(note.dirty_fields(), vec!["Tag"]);
    assert_eq!(note.raw("LastModified").unwrap(), None);
    assert_eq!(note.raw("Title").unwrap(), None);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn id_cannot_be_reassigned() {
    let mut note = Entity::with_id(&NOTE, "n-1");
    let err = note.set(fields::ID, "n-2".to_string()).unwrap_err();
    assert!(matches!(err, ModelError::InvalidOperation(_)));

    let err = note.merge(&payload(json!({ "id": "n-3" }))).unwrap_err();
    assert!(matches!(err, ModelError::InvalidOperation(_)));
    assert_eq!(note.id().unwrap().as_deref(), Some("n-1"));
    assert!(!note.is_populated());

    // Re-merging the same id is fine.
    note.merge(&payload(json!({ "id": "n-1" }))).unwrap();
}

#[test]
fn equivalent_or_null_wire_id_keeps_the_id() {
    let mut note = Entity::with_id(&NOTE, "42");
    note.merge(&payload(json!({ "id": 42, "title": "a" }))).unwrap();
    note.merge(&payload(json!({ "id": null, "title": "b" }))).unwrap();
    assert_eq!(note.id().unwrap().as_deref(), Some("42"));
    assert_eq!(note.raw("Id").unwrap(), Some(&Value::Text("42".to_string())));
    assert_eq!(note.get::<String>("Title").unwrap().as_deref(), Some("b"));
}

#[test]
fn merge_from_refuses_same_type_by_default() {
    let source = Entity::with_id(&NOTE, "n-1");
    let mut target = Entity::with_id(&NOTE, "n-1");
    assert!(target.is_compatible_source(&source));
    let err = target.merge_from(&source).unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));
    assert!(!target.is_populated());
}

#[test]
fn merge_from_accepts_another_type_by_default() {
    let unchecked = SetOptions {
        check_field: false,
        ..SetOptions::default()
    };
    let mut source = Entity::new(&SCRATCH);
    source.set_with("Title", "from scratch".to_string(), unchecked).unwrap();

    let mut target = Entity::new(&NOTE);
    assert!(!target.is_compatible_source(&source));
    target.merge_from(&source).unwrap();
    assert!(target.is_populated());
    assert!(!target.is_dirty());
    assert_eq!(
        target.get::<String>("Title").unwrap().as_deref(),
        Some("from scratch")
    );
}

#[test]
fn merge_from_copies_values_of_the_same_type_when_asked() {
    let mut source = Entity::with_id(&NOTE, "n-1");
    source.set("Title", "copied".to_string()).unwrap();
    source.set("Mood", Mood::Happy).unwrap();

    let mut target = Entity::with_id(&NOTE, "n-1");
    target
        .merge_from_with(&source, MergeSourceGuard::RejectIncompatible)
        .unwrap();

    assert!(target.is_populated());
    assert!(!target.is_dirty());
    assert_eq!(target.get::<String>("Title").unwrap().as_deref(), Some("copied"));
    assert_eq!(target.get::<Mood>("Mood").unwrap(), Some(Mood::Happy));
}

#[test]
fn merge_from_rejects_another_type_when_asked() {
    let source = Entity::new(&SCRATCH);
    let mut target = Entity::new(&NOTE);
    let err = target
        .merge_from_with(&source, MergeSourceGuard::RejectIncompatible)
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));
    assert!(!target.is_populated());
}

// ── Export ───────────────────────────────────────────────────────

#[test]
fn dirty_wire_values_use_wire_names() {
    let mut note = Entity::new(&NOTE);
    note.merge(&payload(json!({ "title": "server" }))).unwrap();
    note.set("Views", 12i64).unwrap();
    note.set("Mood", Mood::Angry).unwrap();

    let dirty = note.dirty_wire_values().unwrap();
    assert_eq!(
        serde_json::Value::Object(dirty),
        json!({ "viewCount": 12, "mood": "Angry" })
    );
}

#[test]
fn to_json_uses_public_names() {
    let mut note = Entity::with_id(&NOTE, "n-1");
    note.set("Pinned", true).unwrap();
    assert_eq!(
        serde_json::Value::Object(note.to_json().unwrap()),
        json!({ "Id": "n-1", "Pinned": true })
    );
}

#[test]
fn object_path_requires_id_and_path() {
    assert_eq!(
        Entity::with_id(&NOTE, "abc").object_path().unwrap(),
        "/notes/abc"
    );
    assert_eq!(
        Entity::new(&NOTE).object_path().unwrap_err(),
        ModelError::InvalidOperation("ID required.".to_string())
    );
    assert!(matches!(
        Entity::with_id(&SCRATCH, "x").object_path(),
        Err(ModelError::InvalidOperation(_))
    ));
}

// ── Deletion ─────────────────────────────────────────────────────

#[test]
fn deleted_entity_rejects_every_access() {
    let mut note = Entity::with_id(&NOTE, "n-1");
    note.mark_deleted();
    assert!(note.is_deleted());
    assert_eq!(note.get::<String>("Title").unwrap_err(), ModelError::Disposed);
    assert_eq!(
        note.set("Title", "x".to_string()).unwrap_err(),
        ModelError::Disposed
    );
    assert_eq!(
        note.merge(&payload(json!({}))).unwrap_err(),
        ModelError::Disposed
    );
    assert_eq!(note.object_path().unwrap_err(), ModelError::Disposed);
    assert_eq!(note.dirty_wire_values().unwrap_err(), ModelError::Disposed);
}

#[test]
fn deleted_source_cannot_be_merged() {
    let mut source = Entity::new(&NOTE);
    source.mark_deleted();
    let mut target = Entity::new(&NOTE);
    assert_eq!(target.merge_from(&source).unwrap_err(), ModelError::Disposed);
}
