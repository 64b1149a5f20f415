//! Text encodings used by the settings blob.
//!
//! Two layers:
//! - an entry value carries its expiry: `"{ticks}\t{value}"`, where ticks
//!   `0` means "never expires"
//! - the blob is a run of `key=entry;` records
//!
//! Inside records, `\`, `=` and `;` are written as `\\`, `\=` and `\;`.
//! Text free of those three characters encodes exactly as older releases
//! wrote it, so their files load unchanged. A backslash followed by any
//! other character reads literally, which keeps legacy Windows paths
//! intact; a legacy value holding `\\`, `\=` or `\;` (or ending in `\`)
//! still reads differently.

use buddy_types::Ticks;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Decoded settings, ordered by key.
pub type Settings = BTreeMap<String, String>;

/// Classification of one stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a> {
    /// Not expired; the payload after the tab.
    Live(&'a str),
    /// Carries an expiry stamp at or before the reference instant.
    Expired,
    /// No tab, or the ticks do not parse.
    Corrupt,
}

/// Tags `value` with its expiry. `None` never expires.
pub fn encode(value: &str, expires_at: Option<DateTime<Utc>>) -> String {
    let ticks = expires_at.map_or(Ticks::NEVER, Ticks::from_datetime);
    format!("{ticks}\t{value}")
}

/// Classifies an encoded entry against `now`.
pub fn classify(raw: &str, now: DateTime<Utc>) -> Entry<'_> {
    let Some((ticks, value)) = raw.split_once('\t') else {
        return Entry::Corrupt;
    };
    match ticks.parse::<Ticks>() {
        Ok(ticks) if ticks.has_passed(now) => Entry::Expired,
        Ok(_) => Entry::Live(value),
        Err(_) => Entry::Corrupt,
    }
}

/// The live payload of an encoded entry, or `None` if it is expired or
/// malformed.
pub fn decode(raw: &str) -> Option<&str> {
    decode_at(raw, Utc::now())
}

/// [`decode`] against an explicit clock.
pub fn decode_at(raw: &str, now: DateTime<Utc>) -> Option<&str> {
    match classify(raw, now) {
        Entry::Live(value) => Some(value),
        Entry::Expired | Entry::Corrupt => None,
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        if matches!(c, '\\' | '=' | ';') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Serializes every record, in key order.
pub fn serialize_records(settings: &Settings) -> String {
    let mut out = String::new();
    for (key, value) in settings {
        escape_into(&mut out, key);
        out.push('=');
        escape_into(&mut out, value);
        out.push(';');
    }
    out
}

/// Parses a blob of records. Later duplicates replace earlier ones.
///
/// A record with no `=` is skipped. Text after the last `;` is an
/// unterminated record and is ignored. Line breaks before a key are
/// dropped, so blobs ending in a newline load too. A `\` that does not
/// start an escape is kept as is.
pub fn parse_records(text: &str) -> Settings {
    let mut settings = Settings::new();
    let mut key = String::new();
    let mut value = String::new();
    let mut in_value = false;

    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if matches!(c, '\r' | '\n') && !in_value && key.is_empty() {
            continue;
        }
        let target = if in_value { &mut value } else { &mut key };
        match c {
            '\\' => match chars.clone().next() {
                Some(escaped @ ('\\' | '=' | ';')) => {
                    chars.next();
                    target.push(escaped);
                }
                _ => target.push('\\'),
            },
            '=' if !in_value => in_value = true,
            ';' => {
                if in_value {
                    settings.insert(key.clone(), std::mem::take(&mut value));
                } else {
                    warn!(record = %key, "skipping settings record without '='");
                }
                key.clear();
                in_value = false;
            }
            _ => target.push(c),
        }
    }

    if in_value || !key.trim().is_empty() {
        debug!(len = key.len() + value.len(), "ignoring unterminated settings record");
    }
    settings
}
