//! Account domain errors

use core_kernel::{AccountId, PositionId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ports::StoreError;
use domain_schema::SchemaError;

/// Errors that can occur in the account domain
#[derive(Debug, Error)]
pub enum AccountError {
    /// No account type matched the reference the caller supplied
    #[error("account type not found: {attempted}")]
    TypeNotFound { attempted: String },

    /// Required fields were absent or empty
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// More than one existing account matched the identity criteria
    #[error("data integrity: {} accounts match {criteria}: {}", matches.len(),
        matches.iter().map(|(id, name)| format!("{id} \"{name}\""))
            .collect::<Vec<_>>().join(", "))]
    DataIntegrity {
        criteria: String,
        /// Every matching account, id and name
        matches: Vec<(AccountId, String)>,
    },

    /// A concurrent create for the same identity won the race
    #[error("concurrent create conflict for \"{name}\"")]
    ConcurrentCreateConflict { name: String },

    /// A containment chain loops back onto an account already on the path
    #[error("cyclic containment detected at account {account_id}")]
    CyclicContainment { account_id: AccountId },

    /// A calculation method tag did not parse to a known method
    #[error("unknown calculation method \"{0}\"")]
    UnknownCalculationMethod(String),

    /// An allocation would exceed the shares the position holds
    #[error("over-allocation of position {position_id}: requested {requested}, available {available}")]
    OverAllocated {
        position_id: PositionId,
        requested: Decimal,
        available: Decimal,
    },

    /// Payload failed structural constraints
    #[error("invalid account data: {0}")]
    InvalidData(String),

    /// The backing store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AccountError {
    /// Creates a TypeNotFound error describing what was attempted
    pub fn type_not_found(attempted: impl Into<String>) -> Self {
        AccountError::TypeNotFound {
            attempted: attempted.into(),
        }
    }

    /// Creates an InvalidData error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        AccountError::InvalidData(message.into())
    }

    /// Whether this error is the loud multiple-match signal
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, AccountError::DataIntegrity { .. })
    }
}
