//! Integration tests for the field schema registry and requirement resolver

use domain_schema::{
    FieldDataType, FieldPresence, FieldSchemaRegistry, FieldValue, RequirementResolver,
    SchemaError, TargetKind, TypeFieldSchema,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

struct Payload(BTreeMap<String, FieldValue>);

impl FieldPresence for Payload {
    fn has_value(&self, field: &str) -> bool {
        self.0.get(field).is_some_and(|v| !v.is_empty())
    }
}

fn baseline_payload() -> Payload {
    let mut fields = BTreeMap::new();
    fields.insert("name".into(), FieldValue::from("Vanguard - Brokerage (Ada)"));
    fields.insert("active".into(), FieldValue::from(true));
    fields.insert("currency_id".into(), FieldValue::Integer(1));
    fields.insert("institution".into(), FieldValue::from("Vanguard"));
    fields.insert("owner".into(), FieldValue::List(vec!["Ada".into()]));
    fields.insert("product_name".into(), FieldValue::from("Brokerage"));
    Payload(fields)
}

#[test]
fn registry_exposes_every_account_field_with_a_data_type() {
    let registry = FieldSchemaRegistry::standard();
    let fields = registry.fields_for(TargetKind::Account);
    assert!(fields.len() >= 40);

    for field in fields {
        assert!(!field.name.is_empty());
        assert!(!field.category.is_empty());
    }
    assert_eq!(
        registry.field(TargetKind::Account, "iban").map(|f| f.data_type),
        Some(FieldDataType::String)
    );
    assert_eq!(
        registry
            .field(TargetKind::Account, "virtual_balance")
            .map(|f| f.data_type),
        Some(FieldDataType::Decimal)
    );
}

#[test]
fn registry_groups_account_fields_by_category() {
    let registry = FieldSchemaRegistry::standard();
    let grouped = registry.fields_by_category(TargetKind::Account);

    assert!(grouped.contains_key("basic_info"));
    assert!(grouped.contains_key("financial"));
    assert!(grouped.contains_key("features"));
    assert!(grouped.contains_key("investment"));
    assert!(grouped.contains_key("fees"));

    let financial = &grouped["financial"];
    assert!(financial.iter().any(|f| f.name == "opening_balance"));
    assert!(financial.iter().any(|f| f.name == "liability_direction"));
}

#[test]
fn entity_fields_are_shared_across_non_account_kinds() {
    let registry = FieldSchemaRegistry::standard();
    for kind in [
        TargetKind::Institution,
        TargetKind::Trust,
        TargetKind::Business,
        TargetKind::Individual,
    ] {
        assert!(registry.field(kind, "tax_id_number").is_some(), "kind {kind}");
        assert!(registry.field(kind, "address").is_some(), "kind {kind}");
    }
    assert!(registry.field(TargetKind::Account, "address").is_none());
}

#[test]
fn resolver_falls_back_to_baseline_when_type_declares_nothing() {
    let resolver = RequirementResolver::new();
    let reqs = resolver.resolve(&TypeFieldSchema::default());

    assert!(resolver.validate(&baseline_payload(), &reqs).is_ok());
}

#[test]
fn resolver_adds_type_requirements_on_top_of_baseline() {
    let resolver = RequirementResolver::new();
    let schema = TypeFieldSchema::new(["liability_direction", "credit_limit"], ["interest_rate"]);
    let reqs = resolver.resolve(&schema);

    let err = resolver.validate(&baseline_payload(), &reqs).unwrap_err();
    assert_eq!(err, SchemaError::missing(["credit_limit", "liability_direction"]));

    let mut payload = baseline_payload();
    payload
        .0
        .insert("liability_direction".into(), FieldValue::from("credit"));
    payload.0.insert(
        "credit_limit".into(),
        FieldValue::Decimal("5000".parse().unwrap()),
    );
    assert!(resolver.validate(&payload, &reqs).is_ok());
}

#[test]
fn empty_list_counts_as_missing() {
    let resolver = RequirementResolver::new();
    let reqs = resolver.resolve(&TypeFieldSchema::default());

    let mut payload = baseline_payload();
    payload.0.insert("owner".into(), FieldValue::List(vec![]));

    let err = resolver.validate(&payload, &reqs).unwrap_err();
    assert_eq!(err, SchemaError::missing(["owner"]));
}

proptest! {
    /// Resolved required and optional sets never overlap, and required
    /// always contains the full baseline.
    #[test]
    fn resolved_sets_are_disjoint(
        type_required in proptest::collection::vec("[a-z_]{1,12}", 0..8),
        type_optional in proptest::collection::vec("[a-z_]{1,12}", 0..8),
    ) {
        let resolver = RequirementResolver::new();
        let schema = TypeFieldSchema::new(type_required.clone(), type_optional);
        let reqs = resolver.resolve(&schema);

        prop_assert!(reqs.required.is_disjoint(&reqs.optional));
        for field in domain_schema::requirements::BASELINE_REQUIRED {
            prop_assert!(reqs.required.contains(*field));
        }
        for field in &type_required {
            prop_assert!(reqs.required.contains(field));
        }
    }
}
