//! In-memory `AccountStore` adapter
//!
//! Backs every integration test and doubles as an embedded store. Enforces
//! the same identity unique constraint a database adapter would carry as a
//! unique index on (owner, type, identity_key).

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;

use core_kernel::{AccountId, AccountTypeId, LedgerEntryId, OwnerId, PositionId};

use crate::account::{Account, ContainmentEdge};
use crate::position::{PositionAllocation, SecurityPosition};
use crate::ports::{AccountStore, StoreError};
use crate::taxonomy::{standard_taxonomy, AccountType};

#[derive(Debug, Default)]
struct Inner {
    types: HashMap<AccountTypeId, AccountType>,
    accounts: HashMap<AccountId, Account>,
    /// Unique index: "(owner)|(type)|(identity_key)" -> account
    identity_index: HashMap<String, AccountId>,
    containment: Vec<ContainmentEdge>,
    positions: HashMap<PositionId, SecurityPosition>,
    allocations: Vec<PositionAllocation>,
    opening_balances: HashMap<AccountId, (LedgerEntryId, Decimal, NaiveDate)>,
    credit_records: HashMap<AccountId, (String, Decimal)>,
    notes: HashMap<AccountId, String>,
    locations: HashMap<AccountId, (Decimal, Decimal)>,
}

/// In-memory account store
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    inner: RwLock<Inner>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with the standard taxonomy
    pub async fn with_standard_taxonomy() -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write().await;
            for account_type in standard_taxonomy() {
                inner.types.insert(account_type.id, account_type);
            }
        }
        store
    }

    /// Number of stored accounts, for test assertions
    pub async fn account_count(&self) -> usize {
        self.inner.read().await.accounts.len()
    }

    /// Opening balance record for an account, if any
    pub async fn opening_balance(&self, account_id: AccountId) -> Option<(Decimal, NaiveDate)> {
        self.inner
            .read()
            .await
            .opening_balances
            .get(&account_id)
            .map(|(_, amount, date)| (*amount, *date))
    }

    /// Credit record for a liability account, if any
    pub async fn credit_record(&self, account_id: AccountId) -> Option<(String, Decimal)> {
        self.inner.read().await.credit_records.get(&account_id).cloned()
    }

    /// Note attached to an account, if any
    pub async fn note(&self, account_id: AccountId) -> Option<String> {
        self.inner.read().await.notes.get(&account_id).cloned()
    }

    /// Index key: owner, type, identity triple, plus the account number so
    /// that distinct real-world accounts sharing a triple can coexist
    fn identity_index_key(account: &Account) -> Option<String> {
        account.identity_key().map(|key| {
            format!(
                "{}|{}|{}|{}",
                account.owner,
                account.account_type_id,
                key,
                account.account_number.as_deref().unwrap_or("")
            )
        })
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn type_by_name(&self, name: &str) -> Result<Option<AccountType>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .types
            .values()
            .find(|t| t.active && t.name == name)
            .cloned())
    }

    async fn type_by_id(&self, id: AccountTypeId) -> Result<Option<AccountType>, StoreError> {
        Ok(self.inner.read().await.types.get(&id).cloned())
    }

    async fn type_by_category_behavior(
        &self,
        category: &str,
        behavior: &str,
    ) -> Result<Option<AccountType>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .types
            .values()
            .find(|t| t.active && t.category.name == category && t.behavior.name == behavior)
            .cloned())
    }

    async fn insert_type(&self, account_type: AccountType) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner
            .types
            .values()
            .any(|t| t.name == account_type.name && t.id != account_type.id)
        {
            return Err(StoreError::unique_violation(format!(
                "account_types.name ({})",
                account_type.name
            )));
        }
        inner.types.insert(account_type.id, account_type);
        Ok(())
    }

    async fn insert_account(&self, account: Account) -> Result<Account, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(key) = Self::identity_index_key(&account) {
            if inner.identity_index.contains_key(&key) {
                return Err(StoreError::unique_violation(format!(
                    "accounts.identity_key ({key})"
                )));
            }
            inner.identity_index.insert(key, account.id);
        }
        inner.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.read().await.accounts.get(&id).cloned())
    }

    async fn accounts_by_owner_type(
        &self,
        owner: OwnerId,
        account_type_id: AccountTypeId,
    ) -> Result<Vec<Account>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .values()
            .filter(|a| a.owner == owner && a.account_type_id == account_type_id)
            .cloned()
            .collect())
    }

    async fn find_by_owner_type_name(
        &self,
        owner: OwnerId,
        account_type_id: AccountTypeId,
        name: &str,
    ) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .values()
            .find(|a| a.owner == owner && a.account_type_id == account_type_id && a.name == name)
            .cloned())
    }

    async fn children_of(&self, parent: AccountId) -> Result<Vec<Account>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .containment
            .iter()
            .filter(|edge| edge.parent == parent)
            .filter_map(|edge| inner.accounts.get(&edge.child).cloned())
            .collect())
    }

    async fn add_containment(&self, edge: ContainmentEdge) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.accounts.contains_key(&edge.parent) {
            return Err(StoreError::not_found("Account", edge.parent));
        }
        if !inner.accounts.contains_key(&edge.child) {
            return Err(StoreError::not_found("Account", edge.child));
        }
        inner.containment.push(edge);
        Ok(())
    }

    async fn cash_component_of(&self, parent: AccountId) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .containment
            .iter()
            .find(|edge| edge.parent == parent && edge.cash_component)
            .and_then(|edge| inner.accounts.get(&edge.child).cloned()))
    }

    async fn positions_for(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<SecurityPosition>, StoreError> {
        let inner = self.inner.read().await;
        let mut positions: Vec<_> = inner
            .positions
            .values()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect();
        positions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(positions)
    }

    async fn position(&self, id: PositionId) -> Result<Option<SecurityPosition>, StoreError> {
        Ok(self.inner.read().await.positions.get(&id).cloned())
    }

    async fn insert_position(&self, position: SecurityPosition) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.positions.insert(position.id, position);
        Ok(())
    }

    async fn allocations_into(
        &self,
        container: AccountId,
    ) -> Result<Vec<PositionAllocation>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .allocations
            .iter()
            .filter(|a| a.container_account_id == container)
            .cloned()
            .collect())
    }

    async fn allocations_for_position(
        &self,
        position_id: PositionId,
    ) -> Result<Vec<PositionAllocation>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .allocations
            .iter()
            .filter(|a| a.position_id == position_id)
            .cloned()
            .collect())
    }

    async fn insert_allocation(&self, allocation: PositionAllocation) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.positions.contains_key(&allocation.position_id) {
            return Err(StoreError::not_found("SecurityPosition", allocation.position_id));
        }
        inner.allocations.push(allocation);
        Ok(())
    }

    async fn upsert_opening_balance(
        &self,
        account_id: AccountId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<LedgerEntryId, StoreError> {
        let mut inner = self.inner.write().await;
        let entry_id = inner
            .opening_balances
            .get(&account_id)
            .map(|(id, _, _)| *id)
            .unwrap_or_else(LedgerEntryId::new_v7);
        inner
            .opening_balances
            .insert(account_id, (entry_id, amount, date));
        Ok(entry_id)
    }

    async fn delete_opening_balance(&self, account_id: AccountId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.opening_balances.remove(&account_id);
        Ok(())
    }

    async fn upsert_credit_record(
        &self,
        account_id: AccountId,
        direction: String,
        amount: Decimal,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.credit_records.insert(account_id, (direction, amount));
        Ok(())
    }

    async fn delete_credit_record(&self, account_id: AccountId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.credit_records.remove(&account_id);
        Ok(())
    }

    async fn set_note(&self, account_id: AccountId, text: String) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.notes.insert(account_id, text);
        Ok(())
    }

    async fn set_location(
        &self,
        account_id: AccountId,
        latitude: Decimal,
        longitude: Decimal,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.locations.insert(account_id, (latitude, longitude));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::UserGroupId;

    fn identified_account(owner: OwnerId, type_id: AccountTypeId, holders: &[&str]) -> Account {
        let mut account = Account::new(owner, UserGroupId::new_v7(), type_id, "test");
        account.institution = Some("First National".into());
        account.account_holders = holders.iter().map(|h| h.to_string()).collect();
        account.product_name = Some("Checking".into());
        account
    }

    #[tokio::test]
    async fn test_identity_unique_constraint() {
        let store = MemoryAccountStore::new();
        let owner = OwnerId::new_v7();
        let type_id = AccountTypeId::new_v7();

        store
            .insert_account(identified_account(owner, type_id, &["Ada", "Grace"]))
            .await
            .unwrap();

        // Same identity with holders reordered loses the race
        let err = store
            .insert_account(identified_account(owner, type_id, &["Grace", "Ada"]))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        // Different owner is a different identity
        store
            .insert_account(identified_account(OwnerId::new_v7(), type_id, &["Ada", "Grace"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_accounts_without_identity_key_are_not_indexed() {
        let store = MemoryAccountStore::new();
        let owner = OwnerId::new_v7();
        let type_id = AccountTypeId::new_v7();

        let bare = Account::new(owner, UserGroupId::new_v7(), type_id, "cash");
        store.insert_account(bare.clone()).await.unwrap();
        store
            .insert_account(Account::new(owner, UserGroupId::new_v7(), type_id, "cash"))
            .await
            .unwrap();
        assert_eq!(store.account_count().await, 2);
    }

    #[tokio::test]
    async fn test_type_by_name_skips_inactive() {
        let store = MemoryAccountStore::with_standard_taxonomy().await;
        let mut checking = store.type_by_name("Checking").await.unwrap().unwrap();

        checking.active = false;
        let id = checking.id;
        store.insert_type(checking).await.unwrap();

        assert!(store.type_by_name("Checking").await.unwrap().is_none());
        assert!(store.type_by_id(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cash_component_lookup() {
        let store = MemoryAccountStore::new();
        let owner = OwnerId::new_v7();
        let type_id = AccountTypeId::new_v7();
        let group = UserGroupId::new_v7();

        let parent = store
            .insert_account(Account::new(owner, group, type_id, "portfolio"))
            .await
            .unwrap();
        let cash = store
            .insert_account(Account::new(owner, group, type_id, "cash"))
            .await
            .unwrap();
        let holding = store
            .insert_account(Account::new(owner, group, type_id, "holding"))
            .await
            .unwrap();

        store
            .add_containment(ContainmentEdge::cash(parent.id, cash.id))
            .await
            .unwrap();
        store
            .add_containment(ContainmentEdge::new(parent.id, holding.id))
            .await
            .unwrap();

        let found = store.cash_component_of(parent.id).await.unwrap().unwrap();
        assert_eq!(found.id, cash.id);
        assert!(store.cash_component_of(cash.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_opening_balance_upsert_keeps_entry_id() {
        use chrono::NaiveDate;
        use rust_decimal_macros::dec;

        let store = MemoryAccountStore::new();
        let account_id = AccountId::new_v7();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let first = store
            .upsert_opening_balance(account_id, dec!(100.00), date)
            .await
            .unwrap();
        let second = store
            .upsert_opening_balance(account_id, dec!(250.00), date)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            store.opening_balance(account_id).await,
            Some((dec!(250.00), date))
        );
    }

    #[tokio::test]
    async fn test_containment_requires_both_accounts() {
        let store = MemoryAccountStore::new();
        let owner = OwnerId::new_v7();
        let type_id = AccountTypeId::new_v7();
        let parent = store
            .insert_account(Account::new(owner, UserGroupId::new_v7(), type_id, "parent"))
            .await
            .unwrap();

        let err = store
            .add_containment(ContainmentEdge::new(parent.id, AccountId::new_v7()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
