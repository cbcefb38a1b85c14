//! Pre-wired test environments

use std::sync::Arc;

use core_kernel::OwnerId;
use domain_account::{
    Account, AccountError, AccountFactory, AccountPayload, BalanceCalculator, MemoryAccountStore,
};
use domain_schema::FieldSchemaRegistry;

/// A store, factory and calculator wired together over the standard taxonomy
pub struct TestEnv {
    pub store: Arc<MemoryAccountStore>,
    pub factory: AccountFactory,
    pub calculator: BalanceCalculator,
    pub owner: OwnerId,
}

impl TestEnv {
    pub async fn new() -> Self {
        crate::init_test_tracing();
        let store = Arc::new(MemoryAccountStore::with_standard_taxonomy().await);
        let registry = Arc::new(FieldSchemaRegistry::standard());
        let factory = AccountFactory::new(store.clone(), registry);
        let calculator = BalanceCalculator::new(store.clone());
        Self {
            store,
            factory,
            calculator,
            owner: OwnerId::new_v7(),
        }
    }

    /// Creates an account for the default test owner
    pub async fn create(&self, payload: AccountPayload) -> Result<Account, AccountError> {
        self.factory.create(payload, self.owner).await
    }
}
