//! The field schema registry
//!
//! A static catalog mapping a target-entity kind to an ordered set of field
//! definitions. Entity kinds other than `Account` inherit a shared set of
//! entity fields (tax identifiers, address block, beneficiaries) appended
//! after their own fields.
//!
//! The registry is built once at process start and never mutated afterwards;
//! it is safe to share across threads behind an `Arc` without locking. It is
//! always constructed explicitly and injected - never reached through a
//! global.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::fields::{FieldDataType, FieldDefinition, FieldValue};

/// The entity kind a field set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Account,
    Institution,
    Trust,
    Business,
    Individual,
}

impl TargetKind {
    /// Stable string key for the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Account => "account",
            TargetKind::Institution => "institution",
            TargetKind::Trust => "trust",
            TargetKind::Business => "business",
            TargetKind::Individual => "individual",
        }
    }

    /// Whether the shared entity fields are merged into this kind
    pub fn inherits_entity_fields(&self) -> bool {
        !matches!(self, TargetKind::Account)
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable catalog of field definitions per target kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchemaRegistry {
    fields: BTreeMap<TargetKind, Vec<FieldDefinition>>,
}

impl FieldSchemaRegistry {
    /// Builds a registry from explicit per-kind field sets.
    ///
    /// Shared entity fields are appended to every kind that inherits them.
    pub fn new(
        kind_fields: impl IntoIterator<Item = (TargetKind, Vec<FieldDefinition>)>,
        entity_fields: Vec<FieldDefinition>,
    ) -> Self {
        let mut fields = BTreeMap::new();
        for (kind, mut defs) in kind_fields {
            if kind.inherits_entity_fields() {
                defs.extend(entity_fields.iter().cloned());
            }
            fields.insert(kind, defs);
        }
        Self { fields }
    }

    /// Builds the standard catalog shipped with the system
    pub fn standard() -> Self {
        Self::new(
            [
                (TargetKind::Account, account_fields()),
                (TargetKind::Institution, institution_fields()),
                (TargetKind::Trust, trust_fields()),
                (TargetKind::Business, business_fields()),
                (TargetKind::Individual, individual_fields()),
            ],
            entity_fields(),
        )
    }

    /// Returns the ordered field definitions for a kind
    pub fn fields_for(&self, kind: TargetKind) -> &[FieldDefinition] {
        self.fields.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Looks up a single field definition by name
    pub fn field(&self, kind: TargetKind, name: &str) -> Option<&FieldDefinition> {
        self.fields_for(kind).iter().find(|f| f.name == name)
    }

    /// Returns the names of all fields marked required for a kind
    pub fn required_names(&self, kind: TargetKind) -> Vec<&str> {
        self.fields_for(kind)
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Groups the fields of a kind by their category tag
    pub fn fields_by_category(&self, kind: TargetKind) -> BTreeMap<&str, Vec<&FieldDefinition>> {
        let mut grouped: BTreeMap<&str, Vec<&FieldDefinition>> = BTreeMap::new();
        for field in self.fields_for(kind) {
            grouped.entry(field.category.as_str()).or_default().push(field);
        }
        grouped
    }

    /// Baseline default value for a field, by its data type
    pub fn field_default(&self, kind: TargetKind, name: &str) -> Option<FieldValue> {
        self.field(kind, name)
            .and_then(|f| FieldValue::default_for(f.data_type))
    }

    /// Returns the opaque validation rules for a kind, keyed by field name.
    ///
    /// Rules that do not start with "required" are prefixed with "nullable|"
    /// so the request-validation collaborator treats absence as acceptable.
    pub fn validation_rules(&self, kind: TargetKind) -> BTreeMap<&str, String> {
        let mut rules = BTreeMap::new();
        for field in self.fields_for(kind) {
            if let Some(rule) = &field.validation_rule {
                let rule = if rule.starts_with("required") || rule.contains("nullable") {
                    rule.clone()
                } else {
                    format!("nullable|{rule}")
                };
                rules.insert(field.name.as_str(), rule);
            }
        }
        rules
    }
}

impl Default for FieldSchemaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn account_fields() -> Vec<FieldDefinition> {
    use FieldDataType::*;
    vec![
        // Core required fields
        FieldDefinition::new("account_holders", Json)
            .required()
            .with_input_hint("entity_multiselect")
            .with_rule("required|array|min:1"),
        FieldDefinition::new("institution", String)
            .required()
            .with_rule("required|string|max:255"),
        FieldDefinition::new("product_name", String)
            .required()
            .with_rule("required|string|max:255"),
        FieldDefinition::new("active", Boolean).with_input_hint("checkbox"),
        FieldDefinition::new("currency_id", Integer).with_input_hint("currency_select"),
        // Core optional fields
        FieldDefinition::new("description", String)
            .with_input_hint("textarea")
            .with_rule("string|max:1000"),
        FieldDefinition::new("account_number", String).with_rule("string|max:50"),
        FieldDefinition::new("routing_number", String).with_rule("string|size:9"),
        FieldDefinition::new("iban", String).with_rule("string|max:34"),
        FieldDefinition::new("opening_date", Date)
            .with_input_hint("date")
            .with_rule("date"),
        FieldDefinition::new("closing_date", Date)
            .with_input_hint("date")
            .with_rule("date|after:opening_date"),
        FieldDefinition::new("notes", String)
            .with_input_hint("textarea")
            .with_rule("string|max:1000"),
        // Financial fields
        FieldDefinition::new("current_balance", Decimal)
            .with_input_hint("number")
            .with_category("financial")
            .with_rule("numeric"),
        FieldDefinition::new("virtual_balance", Decimal)
            .with_input_hint("number")
            .with_category("financial")
            .with_rule("numeric"),
        FieldDefinition::new("opening_balance", Decimal)
            .with_input_hint("number")
            .with_category("financial")
            .with_rule("numeric"),
        FieldDefinition::new("opening_balance_date", Date)
            .with_input_hint("date")
            .with_category("financial")
            .with_rule("date"),
        FieldDefinition::new("interest_rate", Decimal)
            .with_input_hint("number")
            .with_category("financial")
            .with_rule("numeric|min:0|max:100"),
        FieldDefinition::new("minimum_balance", Decimal)
            .with_input_hint("number")
            .with_category("financial")
            .with_rule("numeric|min:0"),
        FieldDefinition::new("credit_limit", Decimal)
            .with_input_hint("number")
            .with_category("financial")
            .with_rule("numeric|min:0"),
        FieldDefinition::new("available_credit", Decimal)
            .with_input_hint("number")
            .with_category("financial")
            .with_rule("numeric|min:0"),
        FieldDefinition::new("minimum_payment", Decimal)
            .with_input_hint("number")
            .with_category("financial")
            .with_rule("numeric|min:0"),
        FieldDefinition::new("payment_due_date", Date)
            .with_input_hint("date")
            .with_category("financial")
            .with_rule("date"),
        FieldDefinition::new("payment_frequency", String)
            .with_category("financial")
            .with_rule("in:weekly,biweekly,monthly,quarterly,annually")
            .with_options(["weekly", "biweekly", "monthly", "quarterly", "annually"]),
        FieldDefinition::new("liability_direction", String)
            .with_category("financial")
            .with_rule("in:debit,credit")
            .with_options(["debit", "credit"]),
        // Feature flags
        FieldDefinition::new("check_writing", Boolean)
            .with_input_hint("checkbox")
            .with_category("features"),
        FieldDefinition::new("debit_card", Boolean)
            .with_input_hint("checkbox")
            .with_category("features"),
        FieldDefinition::new("credit_card", Boolean)
            .with_input_hint("checkbox")
            .with_category("features"),
        FieldDefinition::new("online_banking", Boolean)
            .with_input_hint("checkbox")
            .with_category("features"),
        FieldDefinition::new("overdraft_protection", Boolean)
            .with_input_hint("checkbox")
            .with_category("features"),
        FieldDefinition::new("direct_deposit", Boolean)
            .with_input_hint("checkbox")
            .with_category("features"),
        FieldDefinition::new("automatic_payments", Boolean)
            .with_input_hint("checkbox")
            .with_category("features"),
        // Investment fields
        FieldDefinition::new("contribution_limit", Decimal)
            .with_input_hint("number")
            .with_category("investment")
            .with_rule("numeric|min:0"),
        FieldDefinition::new("current_contribution", Decimal)
            .with_input_hint("number")
            .with_category("investment")
            .with_rule("numeric|min:0"),
        FieldDefinition::new("employer_match", Decimal)
            .with_input_hint("number")
            .with_category("investment")
            .with_rule("numeric|min:0|max:100"),
        FieldDefinition::new("vesting_schedule", String)
            .with_category("investment")
            .with_rule("string|max:255"),
        FieldDefinition::new("plan_administrator", String)
            .with_category("investment")
            .with_rule("string|max:255"),
        FieldDefinition::new("investment_style", String)
            .with_category("investment")
            .with_rule("in:conservative,moderate,aggressive")
            .with_options(["conservative", "moderate", "aggressive"]),
        // Digital fields
        FieldDefinition::new("wallet_address", String)
            .with_category("digital")
            .with_rule("string|max:255"),
        FieldDefinition::new("wallet_type", String)
            .with_category("digital")
            .with_rule("string|max:100"),
        FieldDefinition::new("crypto_type", String)
            .with_category("digital")
            .with_rule("string|max:100"),
        // Fee fields
        FieldDefinition::new("monthly_fee", Decimal)
            .with_input_hint("number")
            .with_category("fees")
            .with_rule("numeric|min:0"),
        FieldDefinition::new("annual_fee", Decimal)
            .with_input_hint("number")
            .with_category("fees")
            .with_rule("numeric|min:0"),
        FieldDefinition::new("transaction_fee", Decimal)
            .with_input_hint("number")
            .with_category("fees")
            .with_rule("numeric|min:0"),
        FieldDefinition::new("late_payment_fee", Decimal)
            .with_input_hint("number")
            .with_category("fees")
            .with_rule("numeric|min:0"),
    ]
}

fn institution_fields() -> Vec<FieldDefinition> {
    use FieldDataType::*;
    vec![
        FieldDefinition::new("institution_name", String)
            .required()
            .with_rule("required|string|max:255"),
        FieldDefinition::new("institution_type", String).with_options([
            "bank",
            "credit_union",
            "brokerage",
            "investment_firm",
            "insurance_company",
            "fintech",
            "other",
        ]),
        FieldDefinition::new("institution_phone", String)
            .with_input_hint("tel")
            .with_category("contact")
            .with_rule("string|max:20"),
        FieldDefinition::new("institution_email", String)
            .with_input_hint("email")
            .with_category("contact")
            .with_rule("email|max:255"),
        FieldDefinition::new("institution_website", String)
            .with_input_hint("url")
            .with_category("contact")
            .with_rule("url|max:255"),
        FieldDefinition::new("institution_address", String)
            .with_category("location")
            .with_rule("string|max:500"),
        FieldDefinition::new("institution_city", String)
            .with_category("location")
            .with_rule("string|max:100"),
        FieldDefinition::new("institution_state", String)
            .with_category("location")
            .with_rule("string|max:100"),
        FieldDefinition::new("institution_country", String)
            .with_category("location")
            .with_rule("string|max:100"),
        FieldDefinition::new("institution_postal_code", String)
            .with_category("location")
            .with_rule("string|max:20"),
        FieldDefinition::new("federal_reserve_id", String)
            .with_category("regulatory")
            .with_rule("string|max:50"),
        FieldDefinition::new("fdic_certificate_number", String)
            .with_category("regulatory")
            .with_rule("string|max:50"),
        FieldDefinition::new("sec_number", String)
            .with_category("regulatory")
            .with_rule("string|max:50"),
        FieldDefinition::new("established_date", Date)
            .with_input_hint("date")
            .with_category("business")
            .with_rule("date|before:today"),
        FieldDefinition::new("number_of_branches", Integer)
            .with_input_hint("number")
            .with_category("business")
            .with_rule("integer|min:0"),
    ]
}

fn trust_fields() -> Vec<FieldDefinition> {
    use FieldDataType::*;
    vec![
        FieldDefinition::new("trust_type", String)
            .required()
            .with_category("legal")
            .with_rule("required|string")
            .with_options([
                "revocable_living",
                "irrevocable_living",
                "testamentary",
                "charitable",
                "special_needs",
                "other",
            ]),
        FieldDefinition::new("trustee_name", String)
            .required()
            .with_category("legal")
            .with_rule("required|string|max:255"),
        FieldDefinition::new("trust_established_date", Date)
            .with_input_hint("date")
            .with_category("legal")
            .with_rule("date|before:today"),
        FieldDefinition::new("trust_termination_date", Date)
            .with_input_hint("date")
            .with_category("legal")
            .with_rule("date|after:trust_established_date"),
        FieldDefinition::new("trust_purpose", String)
            .with_input_hint("textarea")
            .with_category("legal")
            .with_rule("string|max:1000"),
    ]
}

fn business_fields() -> Vec<FieldDefinition> {
    use FieldDataType::*;
    vec![
        FieldDefinition::new("business_type", String)
            .required()
            .with_category("legal")
            .with_rule("required|string")
            .with_options([
                "sole_proprietorship",
                "partnership",
                "llc",
                "corporation",
                "s_corporation",
                "nonprofit",
                "other",
            ]),
        FieldDefinition::new("legal_structure", String)
            .with_category("legal")
            .with_rule("string|max:255"),
        FieldDefinition::new("registration_number", String)
            .with_category("legal")
            .with_rule("string|max:100"),
        FieldDefinition::new("license_number", String)
            .with_category("legal")
            .with_rule("string|max:100"),
        FieldDefinition::new("authorized_representatives", Json)
            .with_input_hint("json")
            .with_category("legal")
            .with_rule("array"),
        FieldDefinition::new("business_established_date", Date)
            .with_input_hint("date")
            .with_category("legal")
            .with_rule("date|before:today"),
    ]
}

fn individual_fields() -> Vec<FieldDefinition> {
    use FieldDataType::*;
    vec![
        FieldDefinition::new("individual_name", String)
            .required()
            .with_rule("required|string|max:255"),
        FieldDefinition::new("display_name", String)
            .required()
            .with_rule("required|string|max:255"),
        FieldDefinition::new("date_of_birth", Date)
            .with_input_hint("date")
            .with_category("personal")
            .with_rule("date|before:today"),
        FieldDefinition::new("marital_status", String)
            .with_category("tax")
            .with_options(["single", "married", "divorced", "widowed", "other"]),
        FieldDefinition::new("citizenship", String)
            .with_category("tax")
            .with_options([
                "us_citizen",
                "permanent_resident",
                "visa_holder",
                "non_resident",
                "dual_citizen",
                "other",
            ]),
    ]
}

fn entity_fields() -> Vec<FieldDefinition> {
    use FieldDataType::*;
    vec![
        FieldDefinition::new("tax_id_type", String)
            .with_category("tax")
            .with_rule("in:ssn,ein,itin")
            .with_options(["ssn", "ein", "itin"]),
        FieldDefinition::new("tax_id_number", String)
            .with_category("tax")
            .with_rule("string|max:20"),
        FieldDefinition::new("address", String)
            .with_category("address")
            .with_rule("string|max:500"),
        FieldDefinition::new("city", String)
            .with_category("address")
            .with_rule("string|max:100"),
        FieldDefinition::new("state", String)
            .with_category("address")
            .with_rule("string|max:100"),
        FieldDefinition::new("country", String)
            .with_category("address")
            .with_rule("string|max:100"),
        FieldDefinition::new("postal_code", String)
            .with_category("address")
            .with_rule("string|max:20"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_kind_does_not_inherit_entity_fields() {
        let registry = FieldSchemaRegistry::standard();
        assert!(registry.field(TargetKind::Account, "tax_id_number").is_none());
        assert!(registry.field(TargetKind::Trust, "tax_id_number").is_some());
        assert!(registry.field(TargetKind::Individual, "postal_code").is_some());
    }

    #[test]
    fn test_entity_fields_come_after_specific_fields() {
        let registry = FieldSchemaRegistry::standard();
        let fields = registry.fields_for(TargetKind::Trust);
        let trust_pos = fields.iter().position(|f| f.name == "trust_type").unwrap();
        let entity_pos = fields.iter().position(|f| f.name == "tax_id_type").unwrap();
        assert!(trust_pos < entity_pos);
    }

    #[test]
    fn test_required_names_for_account() {
        let registry = FieldSchemaRegistry::standard();
        let required = registry.required_names(TargetKind::Account);
        assert!(required.contains(&"institution"));
        assert!(required.contains(&"product_name"));
        assert!(required.contains(&"account_holders"));
        assert!(!required.contains(&"notes"));
    }

    #[test]
    fn test_validation_rules_get_nullable_prefix() {
        let registry = FieldSchemaRegistry::standard();
        let rules = registry.validation_rules(TargetKind::Account);
        assert_eq!(rules["notes"], "nullable|string|max:1000");
        assert_eq!(rules["institution"], "required|string|max:255");
    }

    #[test]
    fn test_unknown_kind_yields_empty_slice() {
        let registry =
            FieldSchemaRegistry::new([] as [(TargetKind, Vec<FieldDefinition>); 0], vec![]);
        assert!(registry.fields_for(TargetKind::Account).is_empty());
    }
}
