//! Account Domain
//!
//! Dynamic account classification and balance computation. An account's type
//! is seed data, not an enum: each type pairs an accounting category with a
//! balance behavior and a field schema, so a new kind of account is a new
//! row, never a code change.
//!
//! # Key Concepts
//!
//! - **Taxonomy**: `AccountCategory` (nature) x `AccountBehavior`
//!   (calculation method) x `TypeFieldSchema` = `AccountType`
//! - **TypeRef**: explicit tagged reference for resolving a caller-supplied
//!   type (name, id, legacy alias, or category+behavior pair)
//! - **Identity resolution**: duplicate detection on (institution, holder
//!   set, product name) within owner and type
//! - **BalanceCalculator**: behavior-dispatched, computed on read, cycle-safe
//! - **AccountFactory**: the one write path for new accounts
//! - **AccountStore**: the persistence port; `adapters::memory` ships an
//!   in-memory implementation

pub mod account;
pub mod adapters;
pub mod balance;
pub mod error;
pub mod factory;
pub mod identity;
pub mod ports;
pub mod position;
pub mod taxonomy;

pub use account::{Account, ContainmentEdge};
pub use adapters::MemoryAccountStore;
pub use balance::BalanceCalculator;
pub use error::AccountError;
pub use factory::{AccountFactory, AccountPayload};
pub use identity::{find_existing, IdentityCandidate};
pub use ports::{AccountStore, StoreError};
pub use position::{PositionAllocation, SecurityPosition};
pub use taxonomy::{
    legacy_alias, standard_taxonomy, AccountBehavior, AccountCategory, AccountType,
    CalculationMethod, CategoryNature, TypeRef,
};
