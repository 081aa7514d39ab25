//! The transformation engine: rule-driven transforms followed by the static
//! post-pass, turning a normalized row into a persistable record plus an
//! optional derived address record.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use regload_model::{
    ExternalId, FieldValue, NormalizedRow, PersistableRow, ResolvedRow, TransformCode,
    TransformRule, TransformSet,
};
use regload_store::IdentifierRegistry;

use crate::config::EngineConfig;

/// Field names that make a record self-describing; when all are absent the
/// display name falls back to the row's external code.
const NAME_FIELDS: [&str; 3] = ["name", "lastname", "firstname"];

/// Address attributes shared between a primary record and its visitation
/// address, each with its own fallback condition.
const ADDRESS_ATTRS: [&str; 3] = ["state_id", "city", "zip"];

const VISITATION_PREFIX: &str = "visitation_address_";
const VISITATION_TYPE: &str = "visitation address";

/// Soft row-level rejection. The run continues with the next row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSkip {
    /// A skip-class rule matched.
    Rule { field: String, value: String },
    /// The row names a country other than the home country.
    ForeignCountry { value: String },
}

impl RowSkip {
    pub fn field(&self) -> &str {
        match self {
            Self::Rule { field, .. } => field,
            Self::ForeignCountry { .. } => "country_id",
        }
    }

    pub fn reason(&self) -> String {
        match self {
            Self::Rule { field, value } => format!("'{value}' in {field}"),
            Self::ForeignCountry { value } => format!("unsupported country '{value}'"),
        }
    }
}

/// A derived secondary record, processed as the second slot of the row's
/// worklist once the primary record exists.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressRecord {
    pub row: NormalizedRow,
    /// Local rule set for the second pass: the address's own external-id
    /// rule plus whatever was declared for the consumed sibling fields.
    pub transforms: TransformSet,
}

/// Result of resolving one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: PersistableRow,
    /// The row's own identity; `None` only when the mapping declares no
    /// external-id rule, in which case re-runs cannot deduplicate the row.
    pub external_id: Option<ExternalId>,
    pub address: Option<AddressRecord>,
    /// Reference lookups that missed; each dropped exactly one field.
    pub reference_misses: u64,
}

pub struct TransformEngine {
    config: EngineConfig,
}

impl TransformEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Applies the mapping-declared rules and the static post-pass.
    ///
    /// Field-level reference misses drop just the offending field and never
    /// escalate; only skip-class rules and a foreign country abandon the
    /// row.
    pub fn resolve<R: IdentifierRegistry>(
        &self,
        row: NormalizedRow,
        transforms: &TransformSet,
        registry: &R,
    ) -> Result<Resolution, RowSkip> {
        self.check_skip_rules(&row, transforms)?;

        let mut updates: Vec<(String, FieldValue)> = Vec::new();
        let mut purge: BTreeSet<String> = BTreeSet::new();
        let mut misses = 0u64;

        let (external_id, external_code) =
            self.derive_identity(&row, transforms, &mut updates, &mut purge);

        let mut address = None;
        let row_fields: Vec<String> = row.keys().cloned().collect();
        for field in &row_fields {
            let Some(rule) = transforms.get(field) else {
                continue;
            };
            match rule.code {
                TransformCode::ParentId => {
                    let Some(code) = row.get_text(field) else {
                        continue;
                    };
                    let id =
                        ExternalId::new(&self.config.module, format!("{}{code}", rule.param));
                    match registry.resolve(&id) {
                        Some(parent) => updates.push((field.clone(), FieldValue::Ref(parent))),
                        None => {
                            warn!(external_id = %id, field = %field, "parent not found, dropping field");
                            purge.insert(field.clone());
                            misses += 1;
                        }
                    }
                }
                TransformCode::VisitationAddressId => {
                    if let Some(street) = row.get_text(field) {
                        address = Some(self.derive_address(
                            &row,
                            field,
                            street,
                            rule,
                            transforms,
                            external_code.as_deref(),
                            &mut updates,
                            &mut purge,
                        ));
                    }
                }
                // identity handled above, skip rules in the gate pass
                TransformCode::ExternalId
                | TransformCode::Skip
                | TransformCode::SkipIfU
                | TransformCode::SkipIfJ => {}
            }
        }

        let mut fields = row.into_inner();
        for (field, value) in updates {
            fields.insert(field, value);
        }

        self.apply_display_name(&mut fields, external_code.as_deref());
        self.apply_country(&mut fields, registry, &mut misses)?;
        self.resolve_references(&mut fields, registry, &mut misses);

        purge.extend(transforms.control_fields());
        purge.extend(self.config.extra_control_fields.iter().cloned());

        Ok(Resolution {
            record: ResolvedRow::new(fields, purge).into_persistable(),
            external_id,
            address,
            reference_misses: misses,
        })
    }

    fn check_skip_rules(
        &self,
        row: &NormalizedRow,
        transforms: &TransformSet,
    ) -> Result<(), RowSkip> {
        for (field, rule) in transforms.iter() {
            let Some(value) = row.get(field) else {
                continue;
            };
            let matched = match rule.code {
                TransformCode::Skip => true,
                TransformCode::SkipIfU => text_equals(value, "u"),
                TransformCode::SkipIfJ => text_equals(value, "j"),
                _ => false,
            };
            if matched {
                return Err(RowSkip::Rule {
                    field: field.clone(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Builds the row's own external identifier and the role flags its
    /// prefix implies; the raw code field is marked for purge.
    fn derive_identity(
        &self,
        row: &NormalizedRow,
        transforms: &TransformSet,
        updates: &mut Vec<(String, FieldValue)>,
        purge: &mut BTreeSet<String>,
    ) -> (Option<ExternalId>, Option<String>) {
        for (field, rule) in transforms.iter() {
            if rule.code != TransformCode::ExternalId {
                continue;
            }
            let Some(code) = row.get_text(field) else {
                continue;
            };
            for flag in role_flags(&rule.param) {
                updates.push((flag.to_string(), FieldValue::Bool(true)));
            }
            purge.insert(field.clone());
            let id = ExternalId::new(&self.config.module, format!("{}{code}", rule.param));
            debug!(external_id = %id, "derived row identity");
            return (Some(id), Some(code.to_string()));
        }
        (None, None)
    }

    /// Synthesizes the visitation-address record and applies the
    /// per-attribute fallback onto the primary row.
    ///
    /// Each of state/city/zip is evaluated independently: the sibling value
    /// is copied onto the primary row when the row has neither its own
    /// street nor that attribute, or when its own street equals the
    /// visitation street and the attribute is absent. The conditions are
    /// deliberately kept attribute-by-attribute; they are not symmetric in
    /// the rule sets observed in production mappings.
    #[allow(clippy::too_many_arguments)]
    fn derive_address(
        &self,
        row: &NormalizedRow,
        field: &str,
        street: &str,
        rule: &TransformRule,
        transforms: &TransformSet,
        external_code: Option<&str>,
        updates: &mut Vec<(String, FieldValue)>,
        purge: &mut BTreeSet<String>,
    ) -> AddressRecord {
        let code = external_code.unwrap_or_default();
        let mut address_row = NormalizedRow::default();
        address_row.insert("external_id", FieldValue::text(code));
        address_row.insert("name", FieldValue::text(format!("{street}, {code}")));
        address_row.insert("street", FieldValue::text(street));
        address_row.insert("type", FieldValue::text(VISITATION_TYPE));

        let mut address_transforms = TransformSet::default();
        address_transforms.insert(
            "external_id",
            TransformRule::new(TransformCode::ExternalId, &rule.param),
        );

        if !row.contains("street")
            && !row.contains("state_id")
            && !row.contains("city")
            && !row.contains("zip")
        {
            updates.push(("street".to_string(), FieldValue::text(street)));
        }

        let same_street = row.get_text("street") == Some(street);
        for attr in ADDRESS_ATTRS {
            let sibling = format!("{VISITATION_PREFIX}{attr}");
            let Some(value) = row.get(&sibling).cloned() else {
                continue;
            };
            // The state sibling only feeds the local rule set and the
            // fallback; it is not copied into the address record itself.
            if attr != "state_id" {
                address_row.insert(attr, value.clone());
            }
            purge.insert(sibling.clone());
            if let Some(sibling_rule) = transforms.get(&sibling) {
                address_transforms.insert(attr, sibling_rule.clone());
            }
            let fallback = (!row.contains("street") && !row.contains(attr))
                || (row.contains("street") && same_street && !row.contains(attr));
            if fallback {
                updates.push((attr.to_string(), value));
            }
        }

        let country_sibling = format!("{VISITATION_PREFIX}country_id");
        if let Some(value) = row.get(&country_sibling).cloned() {
            address_row.insert("country_id", value);
            if let Some(sibling_rule) = transforms.get(&country_sibling) {
                address_transforms.insert("country_id", sibling_rule.clone());
            }
            purge.insert(country_sibling);
        }

        purge.insert(field.to_string());
        debug!(street, "derived visitation address");
        AddressRecord {
            row: address_row,
            transforms: address_transforms,
        }
    }

    fn apply_display_name(
        &self,
        fields: &mut BTreeMap<String, FieldValue>,
        external_code: Option<&str>,
    ) {
        let has_name_part = NAME_FIELDS.iter().any(|f| fields.contains_key(*f));
        if has_name_part {
            return;
        }
        let type_ok = match fields.get("type") {
            None => true,
            Some(value) => value.as_text() == Some("contact"),
        };
        if !type_ok {
            return;
        }
        let code = external_code.map(str::to_string).or_else(|| {
            fields
                .get("external_id")
                .and_then(FieldValue::as_text)
                .map(str::to_string)
        });
        if let Some(code) = code {
            fields.insert("name".to_string(), FieldValue::Text(code));
        }
    }

    /// Country gate: absent or domestic resolves to the default country id,
    /// anything else abandons the row whole rather than creating a record
    /// with a wrong country.
    fn apply_country<R: IdentifierRegistry>(
        &self,
        fields: &mut BTreeMap<String, FieldValue>,
        registry: &R,
        misses: &mut u64,
    ) -> Result<(), RowSkip> {
        let domestic = match fields.get("country_id") {
            None => true,
            Some(FieldValue::Text(value)) => {
                value.eq_ignore_ascii_case(&self.config.home_country_code)
                    || value.eq_ignore_ascii_case(&self.config.home_country_name)
            }
            Some(_) => false,
        };
        if !domestic {
            let value = fields
                .get("country_id")
                .map(ToString::to_string)
                .unwrap_or_default();
            warn!(country = %value, "unsupported country, skipping row");
            return Err(RowSkip::ForeignCountry { value });
        }
        match registry.resolve(&self.config.home_country_key) {
            Some(id) => {
                fields.insert("country_id".to_string(), FieldValue::Ref(id));
            }
            None => {
                warn!(key = %self.config.home_country_key, "default country not found, leaving empty");
                fields.remove("country_id");
                *misses += 1;
            }
        }
        Ok(())
    }

    fn resolve_references<R: IdentifierRegistry>(
        &self,
        fields: &mut BTreeMap<String, FieldValue>,
        registry: &R,
        misses: &mut u64,
    ) {
        for reference in &self.config.reference_fields {
            let Some(value) = fields.get(&reference.field) else {
                continue;
            };
            let Some(code) = value.as_text() else {
                continue;
            };
            if code == "0" {
                warn!(field = %reference.field, "code is 0, leaving empty");
                fields.remove(&reference.field);
                continue;
            }
            let code = if reference.pad_three_digit_codes && code.len() == 3 {
                format!("0{code}")
            } else {
                code.to_string()
            };
            let key = ExternalId::new(&reference.module, format!("{}{code}", reference.prefix));
            match registry.resolve(&key) {
                Some(id) => {
                    fields.insert(reference.field.clone(), FieldValue::Ref(id));
                }
                None => {
                    warn!(key = %key, field = %reference.field, "reference not found, leaving empty");
                    fields.remove(&reference.field);
                    *misses += 1;
                }
            }
        }
    }
}

/// Role flags implied by an external-id prefix: organizations and employer
/// codes mark companies, the contact prefix marks an employer contact, the
/// jobseeker prefix marks a jobseeker.
fn role_flags(prefix: &str) -> &'static [&'static str] {
    match prefix {
        "part_org_" | "part_emplr_" => &["is_employer", "is_company"],
        "part_cct_" => &["is_employer"],
        "part_jbskr_" => &["is_jobseeker"],
        _ => &[],
    }
}

fn text_equals(value: &FieldValue, expected: &str) -> bool {
    value
        .as_text()
        .is_some_and(|text| text.eq_ignore_ascii_case(expected))
}
