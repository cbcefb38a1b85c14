//! Requirement resolution
//!
//! Every account type carries its own field schema on top of a shared
//! baseline. The resolver merges the two into the authoritative required and
//! optional sets for that type, then checks a payload against them.
//!
//! Presence is structural: a field is satisfied only when the payload carries
//! a non-empty value for it. An explicit empty string or empty list counts
//! the same as absence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::SchemaError;

/// Field names every account must satisfy regardless of type
pub const BASELINE_REQUIRED: &[&str] = &[
    "name",
    "active",
    "currency_id",
    "institution",
    "owner",
    "product_name",
];

/// Field names every account may carry regardless of type
pub const BASELINE_OPTIONAL: &[&str] = &[
    "description",
    "account_number",
    "routing_number",
    "iban",
    "opening_date",
    "closing_date",
    "notes",
    "virtual_balance",
    "opening_balance",
    "opening_balance_date",
    "interest_rate",
    "credit_limit",
    "liability_direction",
];

/// The per-type field schema an account type declares
///
/// Types that declare nothing fall back to the baseline alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeFieldSchema {
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub optional_fields: Vec<String>,
}

impl TypeFieldSchema {
    pub fn new(
        required: impl IntoIterator<Item = impl Into<String>>,
        optional: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            required_fields: required.into_iter().map(Into::into).collect(),
            optional_fields: optional.into_iter().map(Into::into).collect(),
        }
    }
}

/// The resolved required and optional sets for one account type
///
/// The two sets are disjoint: a field required anywhere is never optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRequirements {
    pub required: BTreeSet<String>,
    pub optional: BTreeSet<String>,
}

impl FieldRequirements {
    /// Returns true if the field appears in either set
    pub fn knows(&self, field: &str) -> bool {
        self.required.contains(field) || self.optional.contains(field)
    }
}

/// Anything that can answer "does this payload carry a value for field X"
pub trait FieldPresence {
    /// Whether the payload has a non-empty value for the named field
    fn has_value(&self, field: &str) -> bool;
}

/// Merges the baseline with a type's own schema and validates payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementResolver;

impl RequirementResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves the authoritative requirement sets for a type schema.
    ///
    /// Required is the union of the baseline and the type's own required
    /// fields. Optional is the union of the optional sides minus anything
    /// required, so a field listed as required by the type and optional by
    /// the baseline stays required.
    pub fn resolve(&self, type_schema: &TypeFieldSchema) -> FieldRequirements {
        let mut required: BTreeSet<String> =
            BASELINE_REQUIRED.iter().map(|s| s.to_string()).collect();
        required.extend(type_schema.required_fields.iter().cloned());

        let mut optional: BTreeSet<String> =
            BASELINE_OPTIONAL.iter().map(|s| s.to_string()).collect();
        optional.extend(type_schema.optional_fields.iter().cloned());
        optional.retain(|f| !required.contains(f));

        FieldRequirements { required, optional }
    }

    /// Checks a payload against resolved requirements.
    ///
    /// Collects every unsatisfied required field and reports them together,
    /// sorted, rather than failing on the first.
    pub fn validate<P: FieldPresence>(
        &self,
        payload: &P,
        requirements: &FieldRequirements,
    ) -> Result<(), SchemaError> {
        let missing: Vec<&String> = requirements
            .required
            .iter()
            .filter(|field| !payload.has_value(field))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::missing(missing.iter().map(|s| s.as_str())))
        }
    }

    /// Resolves and validates in one step
    pub fn check<P: FieldPresence>(
        &self,
        payload: &P,
        type_schema: &TypeFieldSchema,
    ) -> Result<FieldRequirements, SchemaError> {
        let requirements = self.resolve(type_schema);
        self.validate(payload, &requirements)?;
        Ok(requirements)
    }
}
