use regload_model::{
    ExternalId, FieldValue, NormalizedRow, RecordId, TransformCode, TransformRule, TransformSet,
};
use regload_store::MemoryBackend;
use regload_transform::{EngineConfig, RowSkip, TransformEngine};

fn engine() -> TransformEngine {
    TransformEngine::new(EngineConfig::default())
}

/// Registry pre-seeded with the reference data the static post-pass needs.
fn backend() -> MemoryBackend {
    let mut backend = MemoryBackend::new();
    backend.seed(&ExternalId::new("base", "se"), RecordId(100));
    backend.seed(&ExternalId::new("base", "state_se_0250"), RecordId(101));
    backend.seed(&ExternalId::new("base", "state_se_25"), RecordId(102));
    backend.seed(&ExternalId::new("res_sun", "sun_7"), RecordId(103));
    backend
}

fn text_row(pairs: &[(&str, &str)]) -> NormalizedRow {
    pairs
        .iter()
        .map(|(field, value)| (field.to_string(), FieldValue::text(*value)))
        .collect()
}

fn rules(pairs: &[(&str, TransformCode, &str)]) -> TransformSet {
    pairs
        .iter()
        .map(|(field, code, param)| (field.to_string(), TransformRule::new(*code, *param)))
        .collect()
}

#[test]
fn skip_rule_abandons_the_row() {
    let row = text_row(&[("import_marker", "x"), ("name", "Acme")]);
    let transforms = rules(&[("import_marker", TransformCode::Skip, "")]);

    let err = engine()
        .resolve(row, &transforms, &backend())
        .unwrap_err();
    assert!(matches!(err, RowSkip::Rule { ref field, .. } if field == "import_marker"));
}

#[test]
fn skip_if_j_matches_case_insensitively() {
    let transforms = rules(&[("deleted_marker", TransformCode::SkipIfJ, "")]);

    let row = text_row(&[("deleted_marker", "J"), ("name", "Acme")]);
    assert!(engine().resolve(row, &transforms, &backend()).is_err());

    let row = text_row(&[("deleted_marker", "N"), ("name", "Acme")]);
    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    // the marker is internal-only and never persisted
    assert!(!resolution.record.contains("deleted_marker"));
    assert_eq!(resolution.record.get_text("name"), Some("Acme"));
}

#[test]
fn skip_if_u_passes_other_values_through() {
    let transforms = rules(&[("org_type_marker", TransformCode::SkipIfU, "")]);
    let row = text_row(&[("org_type_marker", "A"), ("name", "Acme")]);
    assert!(engine().resolve(row, &transforms, &backend()).is_ok());
}

#[test]
fn parent_hit_replaces_code_with_internal_id() {
    let mut backend = backend();
    backend.seed(
        &ExternalId::new("__partner_import__", "part_org_42"),
        RecordId(7),
    );
    let row = text_row(&[("parent_id", "42"), ("name", "Branch")]);
    let transforms = rules(&[("parent_id", TransformCode::ParentId, "part_org_")]);

    let resolution = engine().resolve(row, &transforms, &backend).unwrap();
    assert_eq!(
        resolution.record.get("parent_id"),
        Some(&FieldValue::Ref(RecordId(7)))
    );
    assert_eq!(resolution.reference_misses, 0);
}

#[test]
fn parent_miss_drops_the_field_and_keeps_the_row() {
    let row = text_row(&[("parent_id", "42"), ("name", "Branch")]);
    let transforms = rules(&[("parent_id", TransformCode::ParentId, "part_org_")]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert!(!resolution.record.contains("parent_id"));
    assert_eq!(resolution.record.get_text("name"), Some("Branch"));
    assert_eq!(resolution.reference_misses, 1);
}

#[test]
fn external_id_sets_role_flags_and_is_never_persisted() {
    let row = text_row(&[("external_id", "12345"), ("name", "Acme")]);
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_org_")]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert_eq!(
        resolution.external_id,
        Some(ExternalId::new("__partner_import__", "part_org_12345"))
    );
    assert!(!resolution.record.contains("external_id"));
    assert_eq!(
        resolution.record.get("is_employer"),
        Some(&FieldValue::Bool(true))
    );
    assert_eq!(
        resolution.record.get("is_company"),
        Some(&FieldValue::Bool(true))
    );
    assert!(!resolution.record.contains("is_jobseeker"));
}

#[test]
fn jobseeker_prefix_marks_only_the_jobseeker_flag() {
    let row = text_row(&[("external_id", "9", ), ("firstname", "Kim")]);
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_jbskr_")]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert_eq!(
        resolution.record.get("is_jobseeker"),
        Some(&FieldValue::Bool(true))
    );
    assert!(!resolution.record.contains("is_employer"));
    assert!(!resolution.record.contains("is_company"));
}

#[test]
fn visitation_address_derives_a_second_record() {
    let row = text_row(&[
        ("external_id", "555"),
        ("visitation_address_id", "Main St 1"),
    ]);
    let transforms = rules(&[
        ("external_id", TransformCode::ExternalId, "part_emplr_"),
        (
            "visitation_address_id",
            TransformCode::VisitationAddressId,
            "part_visit_",
        ),
    ]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();

    // no pre-existing street/state/city/zip: the street falls back onto the
    // primary record too
    assert_eq!(resolution.record.get_text("street"), Some("Main St 1"));
    assert!(!resolution.record.contains("visitation_address_id"));

    let address = resolution.address.expect("address record");
    assert_eq!(address.row.get_text("street"), Some("Main St 1"));
    assert_eq!(address.row.get_text("name"), Some("Main St 1, 555"));
    assert_eq!(address.row.get_text("type"), Some("visitation address"));
    assert_eq!(address.row.get_text("external_id"), Some("555"));

    let rule = address.transforms.get("external_id").expect("identity rule");
    assert_eq!(rule.code, TransformCode::ExternalId);
    assert_eq!(rule.param, "part_visit_");
}

#[test]
fn address_siblings_move_and_fall_back_per_attribute() {
    let row = text_row(&[
        ("external_id", "555"),
        ("visitation_address_id", "Main St 1"),
        ("visitation_address_city", "Umea"),
        ("visitation_address_zip", "90325"),
    ]);
    let transforms = rules(&[
        ("external_id", TransformCode::ExternalId, "part_emplr_"),
        (
            "visitation_address_id",
            TransformCode::VisitationAddressId,
            "part_visit_",
        ),
    ]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();

    // siblings consumed from the primary record, copied onto it as fallback
    assert_eq!(resolution.record.get_text("city"), Some("Umea"));
    assert_eq!(resolution.record.get_text("zip"), Some("90325"));
    assert!(!resolution.record.contains("visitation_address_city"));
    assert!(!resolution.record.contains("visitation_address_zip"));

    let address = resolution.address.expect("address record");
    assert_eq!(address.row.get_text("city"), Some("Umea"));
    assert_eq!(address.row.get_text("zip"), Some("90325"));
}

#[test]
fn state_sibling_falls_back_but_stays_out_of_the_address_record() {
    let row = text_row(&[
        ("external_id", "555"),
        ("visitation_address_id", "Main St 1"),
        ("visitation_address_state_id", "250"),
    ]);
    let transforms = rules(&[
        ("external_id", TransformCode::ExternalId, "part_emplr_"),
        (
            "visitation_address_id",
            TransformCode::VisitationAddressId,
            "part_visit_",
        ),
        ("visitation_address_state_id", TransformCode::SkipIfU, ""),
    ]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();

    // the fallback lands on the primary record and resolves like any other
    // state code, padding included
    assert_eq!(
        resolution.record.get("state_id"),
        Some(&FieldValue::Ref(RecordId(101)))
    );
    assert!(!resolution.record.contains("visitation_address_state_id"));

    // the sibling's rule travels with the address, its value does not
    let address = resolution.address.expect("address record");
    assert!(!address.row.contains("state_id"));
    let rule = address.transforms.get("state_id").expect("sibling rule");
    assert_eq!(rule.code, TransformCode::SkipIfU);
}

#[test]
fn country_sibling_moves_with_its_declared_rule() {
    let row = text_row(&[
        ("external_id", "555"),
        ("visitation_address_id", "Main St 1"),
        ("visitation_address_country_id", "SE"),
    ]);
    let transforms = rules(&[
        ("external_id", TransformCode::ExternalId, "part_emplr_"),
        (
            "visitation_address_id",
            TransformCode::VisitationAddressId,
            "part_visit_",
        ),
        ("visitation_address_country_id", TransformCode::SkipIfU, ""),
    ]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();

    // moved, never fallback-copied
    assert!(!resolution.record.contains("visitation_address_country_id"));
    let address = resolution.address.expect("address record");
    assert_eq!(address.row.get_text("country_id"), Some("SE"));
    let rule = address.transforms.get("country_id").expect("sibling rule");
    assert_eq!(rule.code, TransformCode::SkipIfU);
}

#[test]
fn no_fallback_when_the_primary_row_has_its_own_street() {
    let row = text_row(&[
        ("external_id", "555"),
        ("street", "Other Rd 2"),
        ("visitation_address_id", "Main St 1"),
        ("visitation_address_city", "Umea"),
    ]);
    let transforms = rules(&[
        ("external_id", TransformCode::ExternalId, "part_emplr_"),
        (
            "visitation_address_id",
            TransformCode::VisitationAddressId,
            "part_visit_",
        ),
    ]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    // mailing address differs from the visitation address: keep them apart
    assert_eq!(resolution.record.get_text("street"), Some("Other Rd 2"));
    assert!(!resolution.record.contains("city"));
    let address = resolution.address.expect("address record");
    assert_eq!(address.row.get_text("city"), Some("Umea"));
}

#[test]
fn fallback_applies_when_own_street_equals_the_visitation_street() {
    let row = text_row(&[
        ("external_id", "555"),
        ("street", "Main St 1"),
        ("visitation_address_id", "Main St 1"),
        ("visitation_address_zip", "90325"),
    ]);
    let transforms = rules(&[
        ("external_id", TransformCode::ExternalId, "part_emplr_"),
        (
            "visitation_address_id",
            TransformCode::VisitationAddressId,
            "part_visit_",
        ),
    ]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert_eq!(resolution.record.get_text("zip"), Some("90325"));
}

#[test]
fn absent_country_resolves_to_the_default() {
    let row = text_row(&[("external_id", "1"), ("name", "Acme")]);
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_org_")]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert_eq!(
        resolution.record.get("country_id"),
        Some(&FieldValue::Ref(RecordId(100)))
    );
}

#[test]
fn domestic_country_values_resolve_case_insensitively() {
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_org_")]);
    for value in ["SE", "se", "Sverige", "SVERIGE"] {
        let row = text_row(&[("external_id", "1"), ("country_id", value)]);
        let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
        assert_eq!(
            resolution.record.get("country_id"),
            Some(&FieldValue::Ref(RecordId(100))),
            "country value {value}"
        );
    }
}

#[test]
fn foreign_country_abandons_the_row() {
    let row = text_row(&[("external_id", "1"), ("country_id", "DK")]);
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_org_")]);

    let err = engine().resolve(row, &transforms, &backend()).unwrap_err();
    assert_eq!(
        err,
        RowSkip::ForeignCountry {
            value: "DK".to_string()
        }
    );
}

#[test]
fn three_character_state_codes_are_zero_padded() {
    let row = text_row(&[("external_id", "1"), ("state_id", "250")]);
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_org_")]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert_eq!(
        resolution.record.get("state_id"),
        Some(&FieldValue::Ref(RecordId(101)))
    );
}

#[test]
fn shorter_state_codes_are_not_padded() {
    let row = text_row(&[("external_id", "1"), ("state_id", "25")]);
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_org_")]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert_eq!(
        resolution.record.get("state_id"),
        Some(&FieldValue::Ref(RecordId(102)))
    );
}

#[test]
fn zero_code_is_dropped_without_a_lookup() {
    let row = text_row(&[("external_id", "1"), ("state_id", "0")]);
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_org_")]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert!(!resolution.record.contains("state_id"));
    assert_eq!(resolution.reference_misses, 0);
}

#[test]
fn unresolvable_state_code_drops_only_that_field() {
    let row = text_row(&[("external_id", "1"), ("state_id", "3"), ("name", "Acme")]);
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_org_")]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert!(!resolution.record.contains("state_id"));
    assert_eq!(resolution.record.get_text("name"), Some("Acme"));
    assert_eq!(resolution.reference_misses, 1);
}

#[test]
fn taxonomy_codes_resolve_through_their_own_namespace() {
    let row = text_row(&[("external_id", "1"), ("sun_id", "7")]);
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_jbskr_")]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert_eq!(
        resolution.record.get("sun_id"),
        Some(&FieldValue::Ref(RecordId(103)))
    );
}

#[test]
fn nameless_rows_fall_back_to_the_external_code() {
    let row = text_row(&[("external_id", "12345")]);
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_org_")]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert_eq!(resolution.record.get_text("name"), Some("12345"));
}

#[test]
fn nameless_contact_rows_fall_back_too() {
    let row = text_row(&[("external_id", "12345"), ("type", "contact")]);
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_cct_")]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert_eq!(resolution.record.get_text("name"), Some("12345"));
}

#[test]
fn rows_with_a_name_part_keep_it() {
    let row = text_row(&[("external_id", "12345"), ("firstname", "Kim")]);
    let transforms = rules(&[("external_id", TransformCode::ExternalId, "part_jbskr_")]);

    let resolution = engine().resolve(row, &transforms, &backend()).unwrap();
    assert!(!resolution.record.contains("name"));
    assert_eq!(resolution.record.get_text("firstname"), Some("Kim"));
}
