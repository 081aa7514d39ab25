use std::fmt;

/// External identifier marking a record as already imported.
///
/// Rendered as `<module>.<name>`, where `name` is a transformation prefix
/// followed by the source registry's own code for the record.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ExternalId {
    module: String,
    name: String,
}

impl ExternalId {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

/// Internal numeric id of a created record, assigned by the store.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct RecordId(pub i64);

impl RecordId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_id_renders_module_dot_name() {
        let id = ExternalId::new("__partner_import__", "part_org_12345");
        assert_eq!(id.to_string(), "__partner_import__.part_org_12345");
        assert_eq!(id.module(), "__partner_import__");
        assert_eq!(id.name(), "part_org_12345");
    }

    #[test]
    fn record_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&RecordId(42)).unwrap();
        assert_eq!(json, "42");
    }
}
