//! Integration tests for behavior-dispatched balance computation

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AccountId, OwnerId, UserGroupId};
use domain_account::{
    Account, AccountError, AccountStore, BalanceCalculator, ContainmentEdge, MemoryAccountStore,
    SecurityPosition,
};

struct Env {
    store: Arc<MemoryAccountStore>,
    calculator: BalanceCalculator,
    owner: OwnerId,
}

impl Env {
    async fn new() -> Self {
        let store = Arc::new(MemoryAccountStore::with_standard_taxonomy().await);
        let calculator = BalanceCalculator::new(store.clone());
        Self {
            store,
            calculator,
            owner: OwnerId::new_v7(),
        }
    }

    async fn account_of_type(&self, type_name: &str, balance: Decimal) -> Account {
        let account_type = self.store.type_by_name(type_name).await.unwrap().unwrap();
        let mut account = Account::new(
            self.owner,
            UserGroupId::new_v7(),
            account_type.id,
            format!("{type_name} {balance}"),
        );
        account.current_balance = balance;
        self.store.insert_account(account).await.unwrap()
    }

    async fn contain(&self, parent: AccountId, child: AccountId) {
        self.store
            .add_containment(ContainmentEdge::new(parent, child))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn direct_balance_returns_the_stored_figure() {
    let env = Env::new().await;
    let account = env.account_of_type("Checking", dec!(123.45)).await;

    assert_eq!(env.calculator.calculate(&account).await.unwrap(), dec!(123.45));
}

#[tokio::test]
async fn direct_balance_ignores_contained_children() {
    let env = Env::new().await;
    let account = env.account_of_type("Checking", dec!(50)).await;
    let stray = env.account_of_type("Savings", dec!(99)).await;
    env.contain(account.id, stray.id).await;

    // Dispatch follows the behavior, not the data shape
    assert_eq!(env.calculator.calculate(&account).await.unwrap(), dec!(50.00));
}

#[tokio::test]
async fn container_sums_children_and_allocations() {
    let env = Env::new().await;
    let container = env.account_of_type("Brokerage", dec!(999)).await;

    // Cash component 10.00, a negative direct child -3.50
    let cash = env.account_of_type("Cash", dec!(10.00)).await;
    let margin = env.account_of_type("Checking", dec!(-3.50)).await;
    env.store
        .add_containment(ContainmentEdge::cash(container.id, cash.id))
        .await
        .unwrap();
    env.contain(container.id, margin.id).await;

    // 2 shares allocated into the container at 5.00 each
    let security = env.account_of_type("Security", Decimal::ZERO).await;
    let position = SecurityPosition::new(security.id, "ACME", dec!(8), dec!(30), dec!(5.00));
    let allocation = position
        .allocate_into(container.id, dec!(2), Decimal::ZERO)
        .unwrap();
    env.store.insert_position(position).await.unwrap();
    env.store.insert_allocation(allocation).await.unwrap();

    // 10.00 - 3.50 + 2 x 5.00; the container's own stored balance is ignored
    assert_eq!(env.calculator.calculate(&container).await.unwrap(), dec!(16.50));
}

#[tokio::test]
async fn nested_containers_recurse_per_child_behavior() {
    let env = Env::new().await;
    let outer = env.account_of_type("Brokerage", Decimal::ZERO).await;
    let inner = env.account_of_type("401(k)", Decimal::ZERO).await;
    let leaf = env.account_of_type("Savings", dec!(250.25)).await;

    env.contain(outer.id, inner.id).await;
    env.contain(inner.id, leaf.id).await;

    assert_eq!(env.calculator.calculate(&outer).await.unwrap(), dec!(250.25));
}

#[tokio::test]
async fn security_account_multiplies_shares_by_price() {
    let env = Env::new().await;
    let security = env.account_of_type("Security", Decimal::ZERO).await;
    let position = SecurityPosition::new(security.id, "VTI", dec!(10.5), dec!(2000), dec!(251.13));
    env.store.insert_position(position).await.unwrap();

    // 10.5 x 251.13 = 2636.865, banker's rounding lands on the even cent
    assert_eq!(env.calculator.calculate(&security).await.unwrap(), dec!(2636.86));
}

#[tokio::test]
async fn security_account_without_position_is_zero() {
    let env = Env::new().await;
    let security = env.account_of_type("Security", dec!(777)).await;

    // current_balance is not consulted for a security account
    assert_eq!(env.calculator.calculate(&security).await.unwrap(), Decimal::ZERO);
}

#[tokio::test]
async fn cyclic_containment_fails_instead_of_hanging() {
    let env = Env::new().await;
    let a = env.account_of_type("Brokerage", Decimal::ZERO).await;
    let b = env.account_of_type("401(k)", Decimal::ZERO).await;
    env.contain(a.id, b.id).await;
    env.contain(b.id, a.id).await;

    let err = env.calculator.calculate(&a).await.unwrap_err();
    assert!(matches!(err, AccountError::CyclicContainment { account_id } if account_id == a.id));
}

#[tokio::test]
async fn self_containment_is_a_cycle() {
    let env = Env::new().await;
    let a = env.account_of_type("Brokerage", Decimal::ZERO).await;
    env.contain(a.id, a.id).await;

    let err = env.calculator.calculate(&a).await.unwrap_err();
    assert!(matches!(err, AccountError::CyclicContainment { .. }));
}

#[tokio::test]
async fn shared_child_under_two_parents_is_not_a_cycle() {
    let env = Env::new().await;
    let outer = env.account_of_type("Brokerage", Decimal::ZERO).await;
    let left = env.account_of_type("401(k)", Decimal::ZERO).await;
    let right = env.account_of_type("Roth IRA", Decimal::ZERO).await;
    let shared = env.account_of_type("Savings", dec!(5)).await;

    env.contain(outer.id, left.id).await;
    env.contain(outer.id, right.id).await;
    env.contain(left.id, shared.id).await;
    env.contain(right.id, shared.id).await;

    // Diamond shape: the shared leaf is counted once per path
    assert_eq!(env.calculator.calculate(&outer).await.unwrap(), dec!(10.00));
}

#[tokio::test]
async fn calculate_by_id_reports_missing_accounts() {
    let env = Env::new().await;
    let err = env.calculator.calculate_by_id(AccountId::new_v7()).await.unwrap_err();
    assert!(matches!(err, AccountError::Store(_)));
}
