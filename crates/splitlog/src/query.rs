//! Linear scan queries over a record log.
//!
//! Predicates are an explicit ordered slice of `(field, expected value)`
//! pairs. A record matches when every predicate field is present and
//! equal by value; extra fields in the record are ignored. Results come
//! back in file order, which makes the earliest-appended matching record
//! authoritative for point lookups.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::log;

/// An ordered set of field/value equality predicates.
pub type Fields<'a> = &'a [(&'a str, Value)];

/// Structural subset match: every predicate field present and equal.
///
/// Non-object records never match.
#[must_use]
pub fn matches(record: &Value, fields: Fields<'_>) -> bool {
    let Some(map) = record.as_object() else {
        return false;
    };
    fields.iter().all(|(key, want)| map.get(*key) == Some(want))
}

/// All records in `path` matching `fields`, lazily, oldest first.
pub fn find_all<'a>(path: &'a Path, fields: Fields<'a>) -> impl Iterator<Item = Value> + 'a {
    log::scan(path).filter(move |record| matches(record, fields))
}

/// The first record in `path` matching `fields`, or `None`.
///
/// First match wins: this is the tie-break rule for every uniqueness
/// lookup in the engine.
#[must_use]
pub fn find_first(path: &Path, fields: Fields<'_>) -> Option<Value> {
    find_all(path, fields).next()
}

/// Like [`find_first`], deserialized into a typed record.
///
/// A matched line that does not fit `T` is treated like any other
/// malformed line: skipped, and the search continues.
#[must_use]
pub fn find_first_as<T: DeserializeOwned>(path: &Path, fields: Fields<'_>) -> Option<T> {
    find_all(path, fields).find_map(|value| serde_json::from_value(value).ok())
}
