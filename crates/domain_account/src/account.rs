//! The account aggregate

use chrono::{DateTime, Utc};
use core_kernel::{AccountId, AccountTypeId, CurrencyId, OwnerId, UserGroupId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use domain_schema::FieldValue;

/// A financial account
///
/// Structural fields live on the struct; everything else the field schema
/// registry knows about lives in the typed `fields` map. `current_balance`
/// is the stored figure a direct-balance account reports; container and
/// security accounts compute theirs on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub owner: OwnerId,
    pub user_group: UserGroupId,
    pub account_type_id: AccountTypeId,
    pub name: String,
    pub active: bool,
    pub institution: Option<String>,
    /// Display names of the people on the account; order carries no meaning
    pub account_holders: Vec<String>,
    pub product_name: Option<String>,
    pub account_number: Option<String>,
    pub iban: Option<String>,
    pub currency_id: Option<CurrencyId>,
    pub current_balance: Decimal,
    pub virtual_balance: Option<Decimal>,
    /// Registry-driven fields, keyed by field name
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates an account with generated id and timestamps
    pub fn new(
        owner: OwnerId,
        user_group: UserGroupId,
        account_type_id: AccountTypeId,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new_v7(),
            owner,
            user_group,
            account_type_id,
            name: name.into(),
            active: true,
            institution: None,
            account_holders: Vec::new(),
            product_name: None,
            account_number: None,
            iban: None,
            currency_id: None,
            current_balance: Decimal::ZERO,
            virtual_balance: None,
            fields: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Order-independent view of the holder list.
    ///
    /// Two accounts with the same holders in different order have equal sets.
    pub fn holder_set(&self) -> BTreeSet<&str> {
        self.account_holders.iter().map(String::as_str).collect()
    }

    /// Canonical identity key within (owner, type), or `None` when any
    /// identity component is missing.
    ///
    /// Case-insensitive on institution and product name; holders sorted.
    pub fn identity_key(&self) -> Option<String> {
        let institution = self.institution.as_deref()?.trim();
        let product = self.product_name.as_deref()?.trim();
        if institution.is_empty() || product.is_empty() || self.account_holders.is_empty() {
            return None;
        }
        let holders: Vec<String> = self
            .holder_set()
            .into_iter()
            .map(|h| h.to_lowercase())
            .collect();
        Some(format!(
            "{}|{}|{}",
            institution.to_lowercase(),
            holders.join(","),
            product.to_lowercase()
        ))
    }

    /// Marks the account as modified
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A parent-contains-child edge between two accounts
///
/// The cash component of a container is an ordinary contained account with
/// the `cash_component` tag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainmentEdge {
    pub parent: AccountId,
    pub child: AccountId,
    pub cash_component: bool,
}

impl ContainmentEdge {
    pub fn new(parent: AccountId, child: AccountId) -> Self {
        Self {
            parent,
            child,
            cash_component: false,
        }
    }

    pub fn cash(parent: AccountId, child: AccountId) -> Self {
        Self {
            parent,
            child,
            cash_component: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_with(institution: &str, holders: &[&str], product: &str) -> Account {
        let mut account = Account::new(
            OwnerId::new_v7(),
            UserGroupId::new_v7(),
            AccountTypeId::new_v7(),
            "test",
        );
        account.institution = Some(institution.to_string());
        account.account_holders = holders.iter().map(|h| h.to_string()).collect();
        account.product_name = Some(product.to_string());
        account
    }

    #[test]
    fn test_holder_set_ignores_order_and_duplicates() {
        let a = account_with("First National", &["Ada", "Grace"], "Checking");
        let b = account_with("First National", &["Grace", "Ada", "Ada"], "Checking");
        assert_eq!(a.holder_set(), b.holder_set());
    }

    #[test]
    fn test_identity_key_is_order_and_case_insensitive() {
        let a = account_with("First National", &["Ada", "Grace"], "Checking");
        let b = account_with("first national", &["Grace", "Ada"], "CHECKING");
        assert_eq!(a.identity_key(), b.identity_key());
        assert!(a.identity_key().is_some());
    }

    #[test]
    fn test_identity_key_invariant_under_holder_permutation() {
        use proptest::prelude::*;

        proptest!(|(holders in proptest::collection::vec("[A-Za-z]{1,10}", 1..6), seed in any::<u64>())| {
            let mut forward = account_with("First National", &[], "Checking");
            forward.account_holders = holders.clone();

            // Deterministic shuffle driven by the seed
            let mut shuffled = holders.clone();
            let mut state = seed;
            for i in (1..shuffled.len()).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                shuffled.swap(i, (state as usize) % (i + 1));
            }
            let mut backward = account_with("First National", &[], "Checking");
            backward.account_holders = shuffled;

            prop_assert_eq!(forward.identity_key(), backward.identity_key());
        });
    }

    #[test]
    fn test_identity_key_requires_all_components() {
        let mut account = account_with("First National", &["Ada"], "Checking");
        account.product_name = None;
        assert_eq!(account.identity_key(), None);

        let mut account = account_with("First National", &["Ada"], "Checking");
        account.account_holders.clear();
        assert_eq!(account.identity_key(), None);

        let mut account = account_with("  ", &["Ada"], "Checking");
        account.institution = Some("  ".into());
        assert_eq!(account.identity_key(), None);
    }
}
