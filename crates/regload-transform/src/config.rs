//! Engine configuration: identifier namespace, the home country, and the
//! reference-data naming conventions.

use std::collections::BTreeSet;

use regload_model::ExternalId;

/// One reference-coded field resolved in the engine's static post-pass.
#[derive(Debug, Clone)]
pub struct ReferenceField {
    /// Target field carrying the raw code.
    pub field: String,
    /// Identifier module the reference data lives in.
    pub module: String,
    /// Lookup key is `prefix + code`.
    pub prefix: String,
    /// Zero-pad the code to 4 characters, but only when it is exactly 3
    /// characters long. Codes of any other length pass through unpadded.
    pub pad_three_digit_codes: bool,
}

impl ReferenceField {
    pub fn new(
        field: impl Into<String>,
        module: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            module: module.into(),
            prefix: prefix.into(),
            pad_three_digit_codes: false,
        }
    }

    pub fn with_three_digit_padding(mut self) -> Self {
        self.pad_three_digit_codes = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Identifier module for records created by this loader.
    pub module: String,
    /// Target model created records belong to.
    pub model: String,
    /// Country code treated as domestic (case-insensitive).
    pub home_country_code: String,
    /// Country display name treated as domestic (case-insensitive).
    pub home_country_name: String,
    /// Identifier the default country resolves through.
    pub home_country_key: ExternalId,
    pub reference_fields: Vec<ReferenceField>,
    /// Internal-only field names purged before persistence, in addition to
    /// the fields bound to skip-class rules.
    pub extra_control_fields: BTreeSet<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            module: "__partner_import__".to_string(),
            model: "partner".to_string(),
            home_country_code: "SE".to_string(),
            home_country_name: "sverige".to_string(),
            home_country_key: ExternalId::new("base", "se"),
            reference_fields: vec![
                ReferenceField::new("state_id", "base", "state_se_").with_three_digit_padding(),
                ReferenceField::new("sun_id", "res_sun", "sun_"),
                ReferenceField::new("education_level", "res_sun", "education_level_"),
            ],
            extra_control_fields: BTreeSet::new(),
        }
    }
}

impl EngineConfig {
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }
}
