//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out the fields they
//! care about.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::AccountId;
use domain_account::{AccountPayload, SecurityPosition};
use domain_schema::FieldValue;

/// Builder for account creation payloads
pub struct PayloadBuilder {
    payload: AccountPayload,
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadBuilder {
    /// A payload that passes baseline validation for a simple asset account
    pub fn new() -> Self {
        Self {
            payload: AccountPayload {
                account_type_name: Some("Checking".to_string()),
                institution: Some("First National".to_string()),
                account_holders: vec!["Ada".to_string()],
                product_name: Some("Checking".to_string()),
                currency_id: Some(Default::default()),
                ..Default::default()
            },
        }
    }

    pub fn with_type_name(mut self, name: impl Into<String>) -> Self {
        self.payload.account_type_name = Some(name.into());
        self
    }

    pub fn without_type(mut self) -> Self {
        self.payload.account_type_name = None;
        self
    }

    pub fn with_category_behavior(
        mut self,
        category: impl Into<String>,
        behavior: impl Into<String>,
    ) -> Self {
        self.payload.category = Some(category.into());
        self.payload.behavior = Some(behavior.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.payload.name = Some(name.into());
        self
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.payload.institution = Some(institution.into());
        self
    }

    pub fn with_holders<I, S>(mut self, holders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.payload.account_holders = holders.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_product_name(mut self, product: impl Into<String>) -> Self {
        self.payload.product_name = Some(product.into());
        self
    }

    pub fn with_account_number(mut self, number: impl Into<String>) -> Self {
        self.payload.account_number = Some(number.into());
        self
    }

    pub fn with_current_balance(mut self, balance: Decimal) -> Self {
        self.payload.current_balance = Some(balance);
        self
    }

    pub fn with_opening_balance(mut self, amount: Decimal, date: NaiveDate) -> Self {
        self.payload.opening_balance = Some(amount);
        self.payload.opening_balance_date = Some(date);
        self
    }

    pub fn with_liability_direction(mut self, direction: impl Into<String>) -> Self {
        self.payload.liability_direction = Some(direction.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.payload.notes = Some(notes.into());
        self
    }

    pub fn with_extra(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.payload.extra.insert(field.into(), value);
        self
    }

    pub fn build(self) -> AccountPayload {
        self.payload
    }
}

/// Builder for security positions
pub struct PositionBuilder {
    account_id: AccountId,
    symbol: String,
    shares: Decimal,
    cost_basis: Decimal,
    current_price: Decimal,
}

impl PositionBuilder {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            symbol: "VTI".to_string(),
            shares: dec!(10),
            cost_basis: dec!(2000),
            current_price: dec!(250),
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    pub fn with_shares(mut self, shares: Decimal) -> Self {
        self.shares = shares;
        self
    }

    pub fn with_cost_basis(mut self, cost_basis: Decimal) -> Self {
        self.cost_basis = cost_basis;
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.current_price = price;
        self
    }

    pub fn build(self) -> SecurityPosition {
        SecurityPosition::new(
            self.account_id,
            self.symbol,
            self.shares,
            self.cost_basis,
            self.current_price,
        )
    }
}
