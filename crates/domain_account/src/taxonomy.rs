//! Classification taxonomy
//!
//! An account's classification is the product of three pieces:
//!
//! - **Category**: the accounting nature (asset, liability, expense, revenue,
//!   equity)
//! - **Behavior**: how the balance is computed, carried as a closed
//!   `CalculationMethod` enum so dispatch is exhaustive
//! - **Field schema**: which fields the type requires on top of the baseline
//!
//! Types are data, not variants: new account types are added by seeding a new
//! `AccountType` row, never by touching an enum. Only the nature and the
//! calculation method are closed sets.

use core_kernel::{AccountTypeId, BehaviorId, CategoryId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AccountError;
use domain_schema::TypeFieldSchema;

/// The accounting nature of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryNature {
    Asset,
    Liability,
    Expense,
    Revenue,
    Equity,
}

impl fmt::Display for CategoryNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CategoryNature::Asset => "asset",
            CategoryNature::Liability => "liability",
            CategoryNature::Expense => "expense",
            CategoryNature::Revenue => "revenue",
            CategoryNature::Equity => "equity",
        };
        write!(f, "{name}")
    }
}

/// A top-level account category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountCategory {
    pub id: CategoryId,
    /// Unique display name
    pub name: String,
    pub nature: CategoryNature,
    pub description: Option<String>,
}

impl AccountCategory {
    pub fn new(name: impl Into<String>, nature: CategoryNature) -> Self {
        Self {
            id: CategoryId::new_v7(),
            name: name.into(),
            nature,
            description: None,
        }
    }
}

/// How an account's balance is computed
///
/// Closed set. An unknown tag fails at the parse boundary; once a behavior
/// holds a `CalculationMethod`, dispatch on it is exhaustive and cannot fall
/// through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// The stored balance is the balance
    DirectBalance,
    /// Sum of contained accounts plus allocated security positions
    SumContained,
    /// Shares held times current price
    SharesTimesPrice,
}

impl CalculationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMethod::DirectBalance => "direct_balance",
            CalculationMethod::SumContained => "sum_contained",
            CalculationMethod::SharesTimesPrice => "shares_times_price",
        }
    }
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CalculationMethod {
    type Err = AccountError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "direct_balance" => Ok(CalculationMethod::DirectBalance),
            "sum_contained" => Ok(CalculationMethod::SumContained),
            "shares_times_price" => Ok(CalculationMethod::SharesTimesPrice),
            other => Err(AccountError::UnknownCalculationMethod(other.to_string())),
        }
    }
}

/// A named balance-computation behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBehavior {
    pub id: BehaviorId,
    /// Unique display name
    pub name: String,
    pub method: CalculationMethod,
    pub description: Option<String>,
}

impl AccountBehavior {
    pub fn new(name: impl Into<String>, method: CalculationMethod) -> Self {
        Self {
            id: BehaviorId::new_v7(),
            name: name.into(),
            method,
            description: None,
        }
    }
}

/// A concrete account type: one category, one behavior, one field schema
///
/// The name is the stable identity used in lookups and display. The same
/// (category, behavior) pair may back several types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountType {
    pub id: AccountTypeId,
    /// Globally unique name
    pub name: String,
    pub category: AccountCategory,
    pub behavior: AccountBehavior,
    /// Fields this type requires or allows on top of the baseline
    #[serde(default)]
    pub schema: TypeFieldSchema,
    /// Soft-disable flag; inactive types resolve by id but not by name
    pub active: bool,
}

impl AccountType {
    pub fn new(
        name: impl Into<String>,
        category: AccountCategory,
        behavior: AccountBehavior,
    ) -> Self {
        Self {
            id: AccountTypeId::new_v7(),
            name: name.into(),
            category,
            behavior,
            schema: TypeFieldSchema::default(),
            active: true,
        }
    }

    pub fn with_schema(mut self, schema: TypeFieldSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn is_container(&self) -> bool {
        self.behavior.method == CalculationMethod::SumContained
    }

    pub fn is_security(&self) -> bool {
        self.behavior.method == CalculationMethod::SharesTimesPrice
    }

    pub fn is_simple(&self) -> bool {
        self.behavior.method == CalculationMethod::DirectBalance
    }
}

/// A reference to an account type, as supplied by a caller
///
/// Callers arrive holding different shapes of input. Each shape is an
/// explicit variant so resolution never guesses which field was meant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum TypeRef {
    /// Exact type name, active types only
    Name(String),
    /// Primary key, resolves regardless of the active flag
    Id(AccountTypeId),
    /// A legacy type name routed through the alias table
    LegacyName(String),
    /// Category name plus behavior name, active types only
    CategoryBehavior { category: String, behavior: String },
}

impl TypeRef {
    /// Builds a reference from heterogeneous optional input.
    ///
    /// Precedence when several parts are supplied: name, then id, then legacy
    /// name, then the category/behavior pair. Blank strings count as absent.
    /// Returns `None` when nothing usable was supplied.
    pub fn from_parts(
        name: Option<&str>,
        id: Option<AccountTypeId>,
        legacy_name: Option<&str>,
        category: Option<&str>,
        behavior: Option<&str>,
    ) -> Option<TypeRef> {
        fn non_blank(s: Option<&str>) -> Option<&str> {
            s.map(str::trim).filter(|s| !s.is_empty())
        }

        if let Some(name) = non_blank(name) {
            return Some(TypeRef::Name(name.to_string()));
        }
        if let Some(id) = id {
            return Some(TypeRef::Id(id));
        }
        if let Some(legacy) = non_blank(legacy_name) {
            return Some(TypeRef::LegacyName(legacy.to_string()));
        }
        if let (Some(category), Some(behavior)) = (non_blank(category), non_blank(behavior)) {
            return Some(TypeRef::CategoryBehavior {
                category: category.to_string(),
                behavior: behavior.to_string(),
            });
        }
        None
    }

    /// Human-readable description of the reference, for error messages
    pub fn describe(&self) -> String {
        match self {
            TypeRef::Name(name) => format!("name \"{name}\""),
            TypeRef::Id(id) => format!("id {id}"),
            TypeRef::LegacyName(name) => format!("legacy name \"{name}\""),
            TypeRef::CategoryBehavior { category, behavior } => {
                format!("category \"{category}\" + behavior \"{behavior}\"")
            }
        }
    }
}

/// Maps a legacy type name onto the current catalog name
pub fn legacy_alias(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "default account" | "asset account" => Some("Checking"),
        "savings account" => Some("Savings"),
        "cash account" | "cash wallet" => Some("Cash"),
        "brokerage account" | "investment account" => Some("Brokerage"),
        "credit card account" | "ccasset" => Some("Credit Card"),
        "mortgage account" => Some("Mortgage"),
        "loan account" | "debt" => Some("Loan"),
        "expense account" | "beneficiary account" => Some("Expense"),
        "revenue account" => Some("Revenue"),
        "initial balance account" | "equity account" => Some("Equity"),
        _ => None,
    }
}

/// Builds the standard seed taxonomy: five categories, three behaviors, and
/// the named types the system ships with.
pub fn standard_taxonomy() -> Vec<AccountType> {
    let asset = AccountCategory::new("Asset", CategoryNature::Asset);
    let liability = AccountCategory::new("Liability", CategoryNature::Liability);
    let expense = AccountCategory::new("Expense", CategoryNature::Expense);
    let revenue = AccountCategory::new("Revenue", CategoryNature::Revenue);
    let equity = AccountCategory::new("Equity", CategoryNature::Equity);

    let simple = AccountBehavior::new("Simple", CalculationMethod::DirectBalance);
    let container = AccountBehavior::new("Container", CalculationMethod::SumContained);
    let security = AccountBehavior::new("Security", CalculationMethod::SharesTimesPrice);

    let liability_schema = TypeFieldSchema::new(
        ["liability_direction"],
        ["interest_rate", "credit_limit"],
    );
    let retirement_schema = TypeFieldSchema::new(
        [] as [&str; 0],
        ["contribution_limit", "employer_match", "plan_administrator"],
    );

    vec![
        AccountType::new("Checking", asset.clone(), simple.clone()),
        AccountType::new("Savings", asset.clone(), simple.clone()),
        AccountType::new("Cash", asset.clone(), simple.clone()),
        AccountType::new("Brokerage", asset.clone(), container.clone()),
        AccountType::new("401(k)", asset.clone(), container.clone())
            .with_schema(retirement_schema.clone()),
        AccountType::new("Roth IRA", asset.clone(), container.clone())
            .with_schema(retirement_schema),
        AccountType::new("Security", asset.clone(), security),
        AccountType::new("Credit Card", liability.clone(), simple.clone())
            .with_schema(liability_schema.clone()),
        AccountType::new("Mortgage", liability.clone(), simple.clone())
            .with_schema(liability_schema.clone()),
        AccountType::new("Loan", liability, simple.clone()).with_schema(liability_schema),
        AccountType::new("Expense", expense, simple.clone()),
        AccountType::new("Revenue", revenue, simple.clone()),
        AccountType::new("Equity", equity, simple),
    ]
}
