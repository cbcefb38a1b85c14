//! Security positions and their allocations into containers

use chrono::NaiveDate;
use core_kernel::money::market_value;
use core_kernel::{round_balance, round_shares, AccountId, AllocationId, PositionId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AccountError;

/// Shares of one security held by a security account
///
/// Share quantities carry 6 decimal places; monetary figures carry 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityPosition {
    pub id: PositionId,
    pub account_id: AccountId,
    pub symbol: String,
    pub name: Option<String>,
    pub shares: Decimal,
    /// Total acquisition cost of the position
    pub cost_basis: Decimal,
    pub current_price: Decimal,
    pub purchase_date: Option<NaiveDate>,
}

impl SecurityPosition {
    pub fn new(
        account_id: AccountId,
        symbol: impl Into<String>,
        shares: Decimal,
        cost_basis: Decimal,
        current_price: Decimal,
    ) -> Self {
        Self {
            id: PositionId::new_v7(),
            account_id,
            symbol: symbol.into(),
            name: None,
            shares: round_shares(shares),
            cost_basis: round_balance(cost_basis),
            current_price: round_balance(current_price),
            purchase_date: None,
        }
    }

    /// Current market value: shares times price, 2 dp
    pub fn market_value(&self) -> Decimal {
        market_value(self.shares, self.current_price)
    }

    /// Market value minus cost basis
    pub fn unrealized_gain_loss(&self) -> Decimal {
        self.market_value() - self.cost_basis
    }

    /// Gain/loss as a percentage of cost basis, `None` for a zero basis
    pub fn unrealized_gain_loss_percent(&self) -> Option<Decimal> {
        if self.cost_basis.is_zero() {
            return None;
        }
        Some(round_balance(
            self.unrealized_gain_loss() / self.cost_basis * dec!(100),
        ))
    }

    /// Carves an allocation of this position into a container account.
    ///
    /// `already_allocated` is the share total of existing allocations of this
    /// position. The new allocation must fit in the unallocated remainder.
    pub fn allocate_into(
        &self,
        container_account_id: AccountId,
        shares: Decimal,
        already_allocated: Decimal,
    ) -> Result<PositionAllocation, AccountError> {
        let shares = round_shares(shares);
        let available = self.shares - already_allocated;
        if shares > available {
            return Err(AccountError::OverAllocated {
                position_id: self.id,
                requested: shares,
                available,
            });
        }

        let fraction = if self.shares.is_zero() {
            Decimal::ZERO
        } else {
            shares / self.shares
        };
        Ok(PositionAllocation {
            id: AllocationId::new_v7(),
            position_id: self.id,
            container_account_id,
            shares,
            cost_basis: round_balance(self.cost_basis * fraction),
            percentage: round_balance(fraction * dec!(100)),
        })
    }
}

/// A slice of a security position attributed to a container account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionAllocation {
    pub id: AllocationId,
    pub position_id: PositionId,
    pub container_account_id: AccountId,
    pub shares: Decimal,
    /// Cost basis attributed to this slice
    pub cost_basis: Decimal,
    /// Share of the whole position, 0 to 100
    pub percentage: Decimal,
}

impl PositionAllocation {
    /// Market value of the allocated shares at the given price, 2 dp
    pub fn market_value(&self, current_price: Decimal) -> Decimal {
        market_value(self.shares, current_price)
    }
}
