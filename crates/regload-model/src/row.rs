//! Row representations for each stage of the import pipeline.
//!
//! A row moves through four stages, each a distinct immutable value:
//! [`RawRow`] (source columns, raw strings) is renamed and pruned into a
//! [`NormalizedRow`] (target fields), which the transformation engine refines
//! into a [`ResolvedRow`] (cross-references resolved, control fields marked
//! for purge) and finally a [`PersistableRow`] ready for the store.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::FieldValue;

/// One physical CSV data line, keyed by source column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self(fields)
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for RawRow {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A row renamed into target schema fields, nulls pruned, yes/no coerced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow(BTreeMap<String, FieldValue>);

impl NormalizedRow {
    pub fn new(fields: BTreeMap<String, FieldValue>) -> Self {
        Self(fields)
    }

    /// Wraps renamed raw text fields, the form produced by the field map.
    pub fn from_text_fields(fields: BTreeMap<String, String>) -> Self {
        Self(
            fields
                .into_iter()
                .map(|(field, value)| (field, FieldValue::Text(value)))
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn get_text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(FieldValue::as_text)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.0.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.0.remove(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, FieldValue> {
        self.0
    }
}

impl FromIterator<(String, FieldValue)> for NormalizedRow {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Engine output: resolved fields plus the set of fields that must never be
/// persisted (raw external codes, consumed address sub-fields, skip markers).
///
/// Purged fields stay readable here; later stages of the engine still need
/// values like the raw external code for display-name derivation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRow {
    fields: BTreeMap<String, FieldValue>,
    purge: BTreeSet<String>,
}

impl ResolvedRow {
    pub fn new(fields: BTreeMap<String, FieldValue>, purge: BTreeSet<String>) -> Self {
        Self { fields, purge }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn is_purged(&self, field: &str) -> bool {
        self.purge.contains(field)
    }

    pub fn into_persistable(self) -> PersistableRow {
        let Self { mut fields, purge } = self;
        for field in &purge {
            fields.remove(field);
        }
        PersistableRow(fields)
    }
}

/// The final shape handed to the record store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistableRow(BTreeMap<String, FieldValue>);

impl PersistableRow {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn get_text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(FieldValue::as_text)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.0.insert(field.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for PersistableRow {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
