//! Account Domain Ports
//!
//! The `AccountStore` trait is the single seam between the account domain and
//! whatever holds its data. Adapters can be a real database, an external
//! system, or the in-memory store under `adapters::memory` used by tests.
//!
//! The store is dumb on purpose: it answers lookups and enforces the identity
//! unique constraint. Classification, validation, and balance math live in
//! the domain.

use async_trait::async_trait;
use chrono::NaiveDate;
use core_kernel::{AccountId, AccountTypeId, LedgerEntryId, OwnerId, PositionId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::{Account, ContainmentEdge};
use crate::position::{PositionAllocation, SecurityPosition};
use crate::taxonomy::AccountType;

/// Errors an `AccountStore` adapter can surface
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// An insert lost against an existing row with the same unique key
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("store conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn unique_violation(constraint: impl Into<String>) -> Self {
        StoreError::UniqueViolation {
            constraint: constraint.into(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}

/// Port over account persistence
#[async_trait]
pub trait AccountStore: Send + Sync {
    // Taxonomy lookups

    /// Active type by exact name
    async fn type_by_name(&self, name: &str) -> Result<Option<AccountType>, StoreError>;

    /// Type by primary key, regardless of the active flag
    async fn type_by_id(&self, id: AccountTypeId) -> Result<Option<AccountType>, StoreError>;

    /// Active type matching both a category name and a behavior name
    async fn type_by_category_behavior(
        &self,
        category: &str,
        behavior: &str,
    ) -> Result<Option<AccountType>, StoreError>;

    async fn insert_type(&self, account_type: AccountType) -> Result<(), StoreError>;

    // Accounts

    /// Inserts a new account, enforcing identity-key uniqueness within
    /// (owner, type). A losing concurrent insert gets `UniqueViolation`.
    async fn insert_account(&self, account: Account) -> Result<Account, StoreError>;

    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    async fn accounts_by_owner_type(
        &self,
        owner: OwnerId,
        account_type_id: AccountTypeId,
    ) -> Result<Vec<Account>, StoreError>;

    /// Exact-name lookup among one owner's accounts of one type
    async fn find_by_owner_type_name(
        &self,
        owner: OwnerId,
        account_type_id: AccountTypeId,
        name: &str,
    ) -> Result<Option<Account>, StoreError>;

    // Containment

    /// Direct children of a container account
    async fn children_of(&self, parent: AccountId) -> Result<Vec<Account>, StoreError>;

    async fn add_containment(&self, edge: ContainmentEdge) -> Result<(), StoreError>;

    /// The contained account flagged as the container's cash slice, if one
    /// was linked with `ContainmentEdge::cash`
    async fn cash_component_of(&self, parent: AccountId) -> Result<Option<Account>, StoreError>;

    // Positions

    async fn positions_for(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<SecurityPosition>, StoreError>;

    async fn position(&self, id: PositionId) -> Result<Option<SecurityPosition>, StoreError>;

    async fn insert_position(&self, position: SecurityPosition) -> Result<(), StoreError>;

    /// Allocations whose target container is the given account
    async fn allocations_into(
        &self,
        container: AccountId,
    ) -> Result<Vec<PositionAllocation>, StoreError>;

    /// Allocations carved out of the given position
    async fn allocations_for_position(
        &self,
        position_id: PositionId,
    ) -> Result<Vec<PositionAllocation>, StoreError>;

    async fn insert_allocation(&self, allocation: PositionAllocation) -> Result<(), StoreError>;

    // Side records reconciled by the factory

    /// Creates or updates the account's opening-balance ledger entry and
    /// returns its id. An update keeps the existing entry's id.
    async fn upsert_opening_balance(
        &self,
        account_id: AccountId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<LedgerEntryId, StoreError>;

    async fn delete_opening_balance(&self, account_id: AccountId) -> Result<(), StoreError>;

    async fn upsert_credit_record(
        &self,
        account_id: AccountId,
        direction: String,
        amount: Decimal,
    ) -> Result<(), StoreError>;

    async fn delete_credit_record(&self, account_id: AccountId) -> Result<(), StoreError>;

    async fn set_note(&self, account_id: AccountId, text: String) -> Result<(), StoreError>;

    async fn set_location(
        &self,
        account_id: AccountId,
        latitude: Decimal,
        longitude: Decimal,
    ) -> Result<(), StoreError>;
}
