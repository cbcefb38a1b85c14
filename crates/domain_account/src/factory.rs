//! Account creation
//!
//! The factory owns the whole creation flow: resolve the requested type,
//! normalize and validate the payload, check for an existing identical
//! account, persist, then reconcile best-effort side records. Creation is
//! idempotent: resubmitting the payload of an existing account returns that
//! account unchanged.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::Validate;

use core_kernel::{round_balance, AccountTypeId, CurrencyId, OwnerId, UserGroupId};
use domain_schema::{
    FieldPresence, FieldSchemaRegistry, FieldValue, RequirementResolver, TargetKind,
};

use crate::account::Account;
use crate::error::AccountError;
use crate::identity::{find_existing, IdentityCandidate};
use crate::ports::AccountStore;
use crate::taxonomy::{legacy_alias, AccountType, CategoryNature, TypeRef};

/// Struct fields never duplicated into the registry-driven map
const STRUCTURAL_FIELDS: &[&str] = &[
    "active",
    "name",
    "account_holders",
    "institution",
    "product_name",
];

/// Everything a caller can supply when creating an account
///
/// Type selection accepts any of the four reference shapes; `TypeRef`
/// precedence applies when several are filled. Fields the struct does not
/// name go in `extra`, keyed by registry field name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AccountPayload {
    // Type selection
    pub account_type_name: Option<String>,
    pub account_type_id: Option<AccountTypeId>,
    pub legacy_type: Option<String>,
    pub category: Option<String>,
    pub behavior: Option<String>,

    // Identity and structure
    #[validate(length(max = 255))]
    pub name: Option<String>,
    pub active: Option<bool>,
    #[validate(length(max = 255))]
    pub institution: Option<String>,
    #[serde(default)]
    pub account_holders: Vec<String>,
    #[validate(length(max = 255))]
    pub product_name: Option<String>,
    #[validate(length(max = 50))]
    pub account_number: Option<String>,
    #[validate(length(min = 9, max = 9))]
    pub routing_number: Option<String>,
    #[validate(length(max = 34))]
    pub iban: Option<String>,
    pub currency_id: Option<CurrencyId>,
    pub user_group: Option<UserGroupId>,

    // Financial
    pub current_balance: Option<Decimal>,
    pub virtual_balance: Option<Decimal>,
    pub opening_balance: Option<Decimal>,
    pub opening_balance_date: Option<NaiveDate>,
    pub interest_rate: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
    pub liability_direction: Option<String>,
    pub opening_date: Option<NaiveDate>,
    pub closing_date: Option<NaiveDate>,

    // Free text and location
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,

    /// Remaining registry-known fields
    #[serde(default)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl AccountPayload {
    /// The type reference this payload carries, following precedence
    pub fn type_ref(&self) -> Option<TypeRef> {
        TypeRef::from_parts(
            self.account_type_name.as_deref(),
            self.account_type_id,
            self.legacy_type.as_deref(),
            self.category.as_deref(),
            self.behavior.as_deref(),
        )
    }

    /// Normalizes the payload in place: IBAN whitespace stripped, `active`
    /// defaulted to true, display name derived when absent.
    pub fn normalize(&mut self) {
        if let Some(iban) = &self.iban {
            let stripped: String = iban.chars().filter(|c| !c.is_whitespace()).collect();
            self.iban = if stripped.is_empty() { None } else { Some(stripped) };
        }
        if self.active.is_none() {
            self.active = Some(true);
        }
        if self.name.as_deref().map(str::trim).unwrap_or("").is_empty() {
            self.name = self.derive_display_name();
        }
    }

    /// `"{institution} - {product_name} ({holder, holder})"`, the holder
    /// list rendered even for a single holder. `None` when institution or
    /// product name is missing.
    fn derive_display_name(&self) -> Option<String> {
        let institution = self.institution.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let product = self.product_name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let base = format!("{institution} - {product}");
        if self.account_holders.is_empty() {
            Some(base)
        } else {
            Some(format!("{base} ({})", self.account_holders.join(", ")))
        }
    }

    fn identity_candidate(&self) -> IdentityCandidate {
        IdentityCandidate {
            institution: self.institution.clone(),
            account_holders: self.account_holders.clone(),
            product_name: self.product_name.clone(),
            account_number: self.account_number.clone(),
        }
    }

    /// Typed value for a registry field name, struct fields first
    fn value_for(&self, field: &str) -> Option<FieldValue> {
        let text = |s: &Option<String>| s.clone().map(FieldValue::Text);
        let decimal = |d: &Option<Decimal>| d.map(FieldValue::Decimal);
        let date = |d: &Option<NaiveDate>| d.map(FieldValue::Date);
        match field {
            "account_number" => text(&self.account_number),
            "routing_number" => text(&self.routing_number),
            "iban" => text(&self.iban),
            "description" => text(&self.description),
            "notes" => text(&self.notes),
            "liability_direction" => text(&self.liability_direction),
            "currency_id" => self.currency_id.map(|id| FieldValue::Text(id.to_string())),
            "current_balance" => decimal(&self.current_balance),
            "virtual_balance" => decimal(&self.virtual_balance),
            "opening_balance" => decimal(&self.opening_balance),
            "interest_rate" => decimal(&self.interest_rate),
            "credit_limit" => decimal(&self.credit_limit),
            "opening_balance_date" => date(&self.opening_balance_date),
            "opening_date" => date(&self.opening_date),
            "closing_date" => date(&self.closing_date),
            other => self.extra.get(other).cloned(),
        }
    }
}

impl FieldPresence for AccountPayload {
    fn has_value(&self, field: &str) -> bool {
        let non_blank = |s: &Option<String>| {
            s.as_deref().map(str::trim).is_some_and(|s| !s.is_empty())
        };
        match field {
            "name" => non_blank(&self.name),
            "active" => self.active.is_some(),
            // The baseline "owner" requirement is carried by the holder list
            "owner" | "account_holders" => !self.account_holders.is_empty(),
            "institution" => non_blank(&self.institution),
            "product_name" => non_blank(&self.product_name),
            "currency_id" => self.currency_id.is_some(),
            other => self.value_for(other).is_some_and(|v| !v.is_empty()),
        }
    }
}

/// Creates accounts against a store and a field schema registry
pub struct AccountFactory {
    store: Arc<dyn AccountStore>,
    registry: Arc<FieldSchemaRegistry>,
    resolver: RequirementResolver,
}

impl AccountFactory {
    pub fn new(store: Arc<dyn AccountStore>, registry: Arc<FieldSchemaRegistry>) -> Self {
        Self {
            store,
            registry,
            resolver: RequirementResolver::new(),
        }
    }

    /// Creates an account, or returns the existing one with the same
    /// identity. All errors propagate; only the documented side records are
    /// best-effort.
    pub async fn create(
        &self,
        mut payload: AccountPayload,
        owner: OwnerId,
    ) -> Result<Account, AccountError> {
        let type_ref = payload
            .type_ref()
            .ok_or_else(|| AccountError::type_not_found("no type reference supplied"))?;
        let account_type = self.resolve_type(&type_ref).await?;

        payload.normalize();
        payload
            .validate()
            .map_err(|errors| AccountError::invalid_data(errors.to_string()))?;

        let requirements = self.resolver.resolve(&account_type.schema);
        self.resolver.validate(&payload, &requirements)?;

        if let Some(existing) =
            find_existing(&payload.identity_candidate(), account_type.id, owner, self.store.as_ref())
                .await?
        {
            debug!(account = %existing.id, "identical account already exists, returning it");
            return Ok(existing);
        }

        let account = self.materialize(&payload, &account_type, owner);
        let name = account.name.clone();
        let account = self.store.insert_account(account).await.map_err(|err| {
            if err.is_unique_violation() {
                AccountError::ConcurrentCreateConflict { name: name.clone() }
            } else {
                AccountError::Store(err)
            }
        })?;
        info!(account = %account.id, account_type = %account_type.name, %owner, "account created");

        self.reconcile_side_records(&account, &account_type, &payload).await;

        let persisted = self
            .store
            .account(account.id)
            .await?
            .ok_or_else(|| crate::ports::StoreError::not_found("Account", account.id))?;
        Ok(persisted)
    }

    /// Exact (type, name) lookup among the owner's accounts, creating a
    /// minimal account when absent. Legacy convenience for system singletons
    /// such as a per-owner Cash account; skips schema validation.
    pub async fn find_or_create(
        &self,
        name: &str,
        type_name: &str,
        owner: OwnerId,
    ) -> Result<Account, AccountError> {
        let account_type = self.resolve_type(&TypeRef::Name(type_name.to_string())).await?;

        if let Some(existing) = self
            .store
            .find_by_owner_type_name(owner, account_type.id, name)
            .await?
        {
            return Ok(existing);
        }

        let mut account = Account::new(owner, UserGroupId::new_v7(), account_type.id, name);
        account.product_name = Some(name.to_string());
        let account = self.store.insert_account(account).await?;
        info!(account = %account.id, account_type = %account_type.name, "system account created");
        Ok(account)
    }

    /// Resolves a type reference against the store. Never defaults: a miss
    /// anywhere along the chain is `TypeNotFound`.
    pub async fn resolve_type(&self, type_ref: &TypeRef) -> Result<AccountType, AccountError> {
        let resolved = match type_ref {
            TypeRef::Name(name) => self.store.type_by_name(name).await?,
            TypeRef::Id(id) => self.store.type_by_id(*id).await?,
            TypeRef::LegacyName(legacy) => {
                let name = legacy_alias(legacy).unwrap_or(legacy.as_str());
                self.store.type_by_name(name).await?
            }
            TypeRef::CategoryBehavior { category, behavior } => {
                self.store
                    .type_by_category_behavior(category, behavior)
                    .await?
            }
        };
        resolved.ok_or_else(|| AccountError::type_not_found(type_ref.describe()))
    }

    /// Builds the account row: structural fields on the struct, every other
    /// registry-known field materialized in the typed map, present-or-null.
    fn materialize(
        &self,
        payload: &AccountPayload,
        account_type: &AccountType,
        owner: OwnerId,
    ) -> Account {
        let mut account = Account::new(
            owner,
            payload.user_group.unwrap_or_else(UserGroupId::new_v7),
            account_type.id,
            payload.name.clone().unwrap_or_default(),
        );
        account.active = payload.active.unwrap_or(true);
        account.institution = payload.institution.clone();
        account.account_holders = payload.account_holders.clone();
        account.product_name = payload.product_name.clone();
        account.account_number = payload.account_number.clone();
        account.iban = payload.iban.clone();
        account.currency_id = payload.currency_id;
        account.current_balance = round_balance(
            payload
                .current_balance
                .or(payload.opening_balance)
                .unwrap_or(Decimal::ZERO),
        );
        // Virtual balances only make sense for assets
        account.virtual_balance = if account_type.category.nature == CategoryNature::Asset {
            payload.virtual_balance.map(round_balance)
        } else {
            None
        };

        for definition in self.registry.fields_for(TargetKind::Account) {
            if STRUCTURAL_FIELDS.contains(&definition.name.as_str()) {
                continue;
            }
            let value = payload
                .value_for(&definition.name)
                .or_else(|| FieldValue::default_for(definition.data_type));
            if let Some(value) = value {
                account.fields.insert(definition.name.clone(), value);
            }
        }
        account
    }

    /// Reconciles opening-balance, credit, note and location records.
    /// Failures are logged and never fail the creation.
    async fn reconcile_side_records(
        &self,
        account: &Account,
        account_type: &AccountType,
        payload: &AccountPayload,
    ) {
        match account_type.category.nature {
            CategoryNature::Asset => {
                let result = match (payload.opening_balance, payload.opening_balance_date) {
                    (Some(amount), Some(date)) => {
                        self.store
                            .upsert_opening_balance(account.id, round_balance(amount), date)
                            .await
                            .map(|_| ())
                    }
                    _ => self.store.delete_opening_balance(account.id).await,
                };
                if let Err(err) = result {
                    warn!(account = %account.id, %err, "opening balance reconciliation failed");
                }
            }
            CategoryNature::Liability => {
                let direction = payload
                    .liability_direction
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty());
                let result = match direction {
                    Some("credit") => {
                        let amount = payload.opening_balance.unwrap_or(Decimal::ZERO);
                        self.store
                            .upsert_credit_record(account.id, "credit".to_string(), round_balance(amount))
                            .await
                    }
                    _ => self.store.delete_credit_record(account.id).await,
                };
                if let Err(err) = result {
                    warn!(account = %account.id, %err, "credit record reconciliation failed");
                }
            }
            _ => {}
        }

        if let Some(notes) = payload.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            if let Err(err) = self.store.set_note(account.id, notes.to_string()).await {
                warn!(account = %account.id, %err, "note attachment failed");
            }
        }

        if let (Some(latitude), Some(longitude)) = (payload.latitude, payload.longitude) {
            if let Err(err) = self.store.set_location(account.id, latitude, longitude).await {
                warn!(account = %account.id, %err, "location attachment failed");
            }
        }
    }
}
