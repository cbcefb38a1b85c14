//! Core Kernel - Foundational types for the account engine
//!
//! This crate provides the building blocks used across all domain modules:
//! - Strongly-typed identifiers for every entity
//! - Decimal precision helpers for balances and share quantities

pub mod identifiers;
pub mod money;

pub use identifiers::{
    AccountId, AccountTypeId, AllocationId, BehaviorId, CategoryId,
    CurrencyId, LedgerEntryId, OwnerId, PositionId, UserGroupId,
};
pub use money::{round_balance, round_shares, BALANCE_PRECISION, SHARE_PRECISION};
