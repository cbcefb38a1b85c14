//! Behavior-dispatched balance computation
//!
//! Balances are computed on read, never cached here. Dispatch is an
//! exhaustive match on the type's `CalculationMethod`:
//!
//! - direct: the stored balance, verbatim
//! - container: sum of direct children (each by its own method) plus the
//!   market value of position allocations into the container
//! - security: first position's shares times price, zero when no position
//!
//! Containment recursion carries the path of container ids; revisiting an
//! account already on the path is a cycle and fails instead of hanging.

use rust_decimal::Decimal;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

use core_kernel::{round_balance, AccountId};

use crate::account::Account;
use crate::error::AccountError;
use crate::ports::{AccountStore, StoreError};
use crate::taxonomy::CalculationMethod;

/// Computes account balances against a store
pub struct BalanceCalculator {
    store: Arc<dyn AccountStore>,
}

impl BalanceCalculator {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Balance of one account, rounded to 2 dp
    pub async fn calculate(&self, account: &Account) -> Result<Decimal, AccountError> {
        let mut path = HashSet::new();
        self.calculate_on_path(account.clone(), &mut path).await
    }

    /// Balance of one account looked up by id
    pub async fn calculate_by_id(&self, id: AccountId) -> Result<Decimal, AccountError> {
        let account = self
            .store
            .account(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Account", id))?;
        self.calculate(&account).await
    }

    fn calculate_on_path<'a>(
        &'a self,
        account: Account,
        path: &'a mut HashSet<AccountId>,
    ) -> Pin<Box<dyn Future<Output = Result<Decimal, AccountError>> + Send + 'a>> {
        Box::pin(async move {
            if !path.insert(account.id) {
                return Err(AccountError::CyclicContainment {
                    account_id: account.id,
                });
            }

            let account_type = self
                .store
                .type_by_id(account.account_type_id)
                .await?
                .ok_or_else(|| {
                    AccountError::type_not_found(format!("id {}", account.account_type_id))
                })?;

            let total = match account_type.behavior.method {
                CalculationMethod::DirectBalance => account.current_balance,
                CalculationMethod::SharesTimesPrice => {
                    let positions = self.store.positions_for(account.id).await?;
                    match positions.first() {
                        Some(position) => position.shares * position.current_price,
                        None => Decimal::ZERO,
                    }
                }
                CalculationMethod::SumContained => {
                    let mut sum = Decimal::ZERO;
                    for child in self.store.children_of(account.id).await? {
                        sum += self.calculate_on_path(child, path).await?;
                    }
                    for allocation in self.store.allocations_into(account.id).await? {
                        let position = self
                            .store
                            .position(allocation.position_id)
                            .await?
                            .ok_or_else(|| {
                                StoreError::not_found("SecurityPosition", allocation.position_id)
                            })?;
                        sum += allocation.market_value(position.current_price);
                    }
                    sum
                }
            };

            path.remove(&account.id);
            let balance = round_balance(total);
            debug!(account = %account.id, method = %account_type.behavior.method, %balance, "balance computed");
            Ok(balance)
        })
    }
}
