//! Declarative mapping types: rename rules and transformation rules.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::row::{NormalizedRow, RawRow};

/// How a transformation rule treats the raw value of its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformCode {
    /// Abandon the row unconditionally.
    Skip,
    /// Abandon the row when the value equals `u` (case-insensitive).
    SkipIfU,
    /// Abandon the row when the value equals `j` (case-insensitive).
    SkipIfJ,
    /// Resolve the value to an earlier-created parent record.
    ParentId,
    /// Derive a secondary address record from the value.
    VisitationAddressId,
    /// Build the row's own external identifier from the value.
    ExternalId,
}

impl TransformCode {
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "skip" => Some(Self::Skip),
            "skip_if_u" => Some(Self::SkipIfU),
            "skip_if_j" => Some(Self::SkipIfJ),
            "parent_id" => Some(Self::ParentId),
            "visitation_address_id" => Some(Self::VisitationAddressId),
            "external_id" => Some(Self::ExternalId),
            _ => None,
        }
    }

    /// Skip-class rules abandon rows; their fields are internal-only markers.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip | Self::SkipIfU | Self::SkipIfJ)
    }
}

/// One transformation rule: a code plus its parameter (usually an
/// identifier prefix), parsed from a `"<code>,<parameter>"` cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRule {
    pub code: TransformCode,
    pub param: String,
}

impl TransformRule {
    pub fn new(code: TransformCode, param: impl Into<String>) -> Self {
        Self {
            code,
            param: param.into(),
        }
    }
}

/// Transformation rules keyed by the field name they apply to, as seen by
/// the engine after renaming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformSet(BTreeMap<String, TransformRule>);

impl TransformSet {
    pub fn new(rules: BTreeMap<String, TransformRule>) -> Self {
        Self(rules)
    }

    pub fn get(&self, field: &str) -> Option<&TransformRule> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, rule: TransformRule) {
        self.0.insert(field.into(), rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TransformRule)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields bound to skip-class rules; these never reach the store.
    pub fn control_fields(&self) -> BTreeSet<String> {
        self.0
            .iter()
            .filter(|(_, rule)| rule.code.is_skip())
            .map(|(field, _)| field.clone())
            .collect()
    }
}

impl FromIterator<(String, TransformRule)> for TransformSet {
    fn from_iter<T: IntoIterator<Item = (String, TransformRule)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A parsed per-entity-type mapping file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingSpec {
    /// Every declared source column, in file order. The data file's header
    /// must contain all of them.
    source_columns: Vec<String>,
    /// Target field name -> source column it is renamed from.
    field_map: BTreeMap<String, String>,
    /// Transformation rules, keyed by the target field their source column
    /// renames to (or the source column itself when no rename applies).
    transforms: TransformSet,
}

impl MappingSpec {
    pub fn new(
        source_columns: Vec<String>,
        field_map: BTreeMap<String, String>,
        transforms: TransformSet,
    ) -> Self {
        Self {
            source_columns,
            field_map,
            transforms,
        }
    }

    pub fn source_columns(&self) -> &[String] {
        &self.source_columns
    }

    pub fn field_map(&self) -> &BTreeMap<String, String> {
        &self.field_map
    }

    pub fn transforms(&self) -> &TransformSet {
        &self.transforms
    }

    /// Applies the rename rules, producing a row keyed by target fields.
    /// Source columns without a rename rule are dropped here.
    pub fn rename(&self, raw: &RawRow) -> NormalizedRow {
        let mut fields = BTreeMap::new();
        for (target, source) in &self.field_map {
            if let Some(value) = raw.get(source) {
                fields.insert(target.clone(), value.to_string());
            }
        }
        NormalizedRow::from_text_fields(fields)
    }
}
