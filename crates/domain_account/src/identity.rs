//! Duplicate-account identity resolution
//!
//! An account's identity within (owner, type) is the triple (institution,
//! holder set, product name). Holder order never matters. When the candidate
//! carries an account number it additionally constrains the match.
//!
//! Finding more than one existing match is a data-integrity failure and is
//! reported loudly with every match named; the resolver never picks one.

use core_kernel::{AccountTypeId, OwnerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

use crate::account::Account;
use crate::error::AccountError;
use crate::ports::AccountStore;

/// The identity components of a would-be account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityCandidate {
    pub institution: Option<String>,
    pub account_holders: Vec<String>,
    pub product_name: Option<String>,
    pub account_number: Option<String>,
}

impl IdentityCandidate {
    fn holder_set(&self) -> BTreeSet<&str> {
        self.account_holders.iter().map(String::as_str).collect()
    }

    /// The three components that must all be present for a lookup
    fn core(&self) -> Option<(&str, BTreeSet<&str>, &str)> {
        let institution = self.institution.as_deref()?.trim();
        let product = self.product_name.as_deref()?.trim();
        if institution.is_empty() || product.is_empty() || self.account_holders.is_empty() {
            return None;
        }
        Some((institution, self.holder_set(), product))
    }

    fn describe(&self) -> String {
        format!(
            "institution \"{}\", holders [{}], product \"{}\"",
            self.institution.as_deref().unwrap_or(""),
            self.holder_set().into_iter().collect::<Vec<_>>().join(", "),
            self.product_name.as_deref().unwrap_or("")
        )
    }
}

/// Looks for an existing account with the candidate's identity.
///
/// Returns `None` without touching the store when any identity component is
/// absent. Exactly one match is returned; two or more fail with
/// `AccountError::DataIntegrity`.
pub async fn find_existing(
    candidate: &IdentityCandidate,
    account_type_id: AccountTypeId,
    owner: OwnerId,
    store: &dyn AccountStore,
) -> Result<Option<Account>, AccountError> {
    let Some((institution, holders, product)) = candidate.core() else {
        return Ok(None);
    };

    let accounts = store.accounts_by_owner_type(owner, account_type_id).await?;
    let matches: Vec<Account> = accounts
        .into_iter()
        .filter(|account| {
            account.institution.as_deref().map(str::trim) == Some(institution)
                && account.holder_set() == holders
                && account.product_name.as_deref().map(str::trim) == Some(product)
        })
        .filter(|account| match &candidate.account_number {
            Some(number) => account.account_number.as_deref() == Some(number.as_str()),
            None => true,
        })
        .collect();

    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.into_iter().next()),
        _ => {
            let criteria = candidate.describe();
            warn!(%owner, %account_type_id, matches = matches.len(), "duplicate account identities found");
            Err(AccountError::DataIntegrity {
                criteria,
                matches: matches
                    .into_iter()
                    .map(|a| (a.id, a.name))
                    .collect(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryAccountStore;
    use core_kernel::UserGroupId;

    fn candidate(institution: &str, holders: &[&str], product: &str) -> IdentityCandidate {
        IdentityCandidate {
            institution: Some(institution.to_string()),
            account_holders: holders.iter().map(|h| h.to_string()).collect(),
            product_name: Some(product.to_string()),
            account_number: None,
        }
    }

    fn account(
        owner: OwnerId,
        type_id: AccountTypeId,
        institution: &str,
        holders: &[&str],
        product: &str,
    ) -> Account {
        let mut account = Account::new(owner, UserGroupId::new_v7(), type_id, product);
        account.institution = Some(institution.to_string());
        account.account_holders = holders.iter().map(|h| h.to_string()).collect();
        account.product_name = Some(product.to_string());
        account
    }

    #[tokio::test]
    async fn test_missing_component_short_circuits() {
        let store = MemoryAccountStore::new();
        let owner = OwnerId::new_v7();
        let type_id = AccountTypeId::new_v7();

        let mut c = candidate("First National", &["Ada"], "Checking");
        c.product_name = None;
        assert!(find_existing(&c, type_id, owner, &store).await.unwrap().is_none());

        let mut c = candidate("First National", &["Ada"], "Checking");
        c.account_holders.clear();
        assert!(find_existing(&c, type_id, owner, &store).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_single_match_is_found_regardless_of_holder_order() {
        let store = MemoryAccountStore::new();
        let owner = OwnerId::new_v7();
        let type_id = AccountTypeId::new_v7();
        let existing = store
            .insert_account(account(owner, type_id, "First National", &["Ada", "Grace"], "Joint"))
            .await
            .unwrap();

        let found = find_existing(
            &candidate("First National", &["Grace", "Ada"], "Joint"),
            type_id,
            owner,
            &store,
        )
        .await
        .unwrap();
        assert_eq!(found.map(|a| a.id), Some(existing.id));
    }

    #[tokio::test]
    async fn test_account_number_constrains_the_match() {
        let store = MemoryAccountStore::new();
        let owner = OwnerId::new_v7();
        let type_id = AccountTypeId::new_v7();
        let mut existing = account(owner, type_id, "First National", &["Ada"], "Checking");
        existing.account_number = Some("1111".into());
        store.insert_account(existing).await.unwrap();

        let mut c = candidate("First National", &["Ada"], "Checking");
        c.account_number = Some("2222".into());
        assert!(find_existing(&c, type_id, owner, &store).await.unwrap().is_none());

        c.account_number = Some("1111".into());
        assert!(find_existing(&c, type_id, owner, &store).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_multiple_matches_fail_loudly() {
        let store = MemoryAccountStore::new();
        let owner = OwnerId::new_v7();
        let type_id = AccountTypeId::new_v7();

        // Two rows share the identity triple but carry different account
        // numbers, so both live under the store's unique index.
        let mut first = account(owner, type_id, "First National", &["Ada"], "Checking");
        first.account_number = Some("1111".into());
        let first = store.insert_account(first).await.unwrap();

        let mut second = account(owner, type_id, "First National", &["Ada"], "Checking");
        second.account_number = Some("2222".into());
        let second = store.insert_account(second).await.unwrap();

        let err = find_existing(
            &candidate("First National", &["Ada"], "Checking"),
            type_id,
            owner,
            &store,
        )
        .await
        .unwrap_err();

        match err {
            AccountError::DataIntegrity { matches, .. } => {
                let ids: Vec<_> = matches.iter().map(|(id, _)| *id).collect();
                assert!(ids.contains(&first.id));
                assert!(ids.contains(&second.id));
            }
            other => panic!("expected DataIntegrity, got {other}"),
        }
    }
}
