//! Field definitions and typed field values
//!
//! A `FieldDefinition` describes one field in the schema registry. Definitions
//! are immutable once the registry is built. A `FieldValue` is the typed
//! runtime value an account carries for a registry-driven field - a closed
//! set of variants, never a stringly-typed bag.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic data types a field can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDataType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    Json,
}

impl fmt::Display for FieldDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldDataType::String => "string",
            FieldDataType::Integer => "integer",
            FieldDataType::Decimal => "decimal",
            FieldDataType::Boolean => "boolean",
            FieldDataType::Date => "date",
            FieldDataType::Json => "json",
        };
        write!(f, "{name}")
    }
}

/// A typed value for a registry-driven field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    Date(NaiveDate),
    Json(serde_json::Value),
    List(Vec<String>),
}

impl FieldValue {
    /// Returns true if the value counts as "no value" for requirement checks.
    ///
    /// An explicit empty string or empty list is treated identically to
    /// absence, as is JSON null.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Json(value) => value.is_null(),
            _ => false,
        }
    }

    /// Baseline default value for a data type, used when an account row is
    /// materialized with every registry-known field present-or-null.
    pub fn default_for(data_type: FieldDataType) -> Option<FieldValue> {
        match data_type {
            FieldDataType::String => Some(FieldValue::Text(String::new())),
            FieldDataType::Boolean => Some(FieldValue::Boolean(false)),
            FieldDataType::Integer
            | FieldDataType::Decimal
            | FieldDataType::Date
            | FieldDataType::Json => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

/// One entry in the field schema registry
///
/// The input hint and validation rule are opaque to this core; they are
/// carried for the form-rendering and request-validation collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Stable field name, used as the key everywhere
    pub name: String,
    /// Semantic data type
    pub data_type: FieldDataType,
    /// Presentation hint (e.g. "text", "select", "date")
    pub input_hint: String,
    /// Grouping tag (e.g. "basic_info", "financial")
    pub category: String,
    /// Whether the field is required for its kind
    pub required: bool,
    /// Opaque validation rule expression (e.g. "string|max:255")
    pub validation_rule: Option<String>,
    /// Allowed values for select-like fields
    pub options: Option<Vec<String>>,
}

impl FieldDefinition {
    /// Creates a new optional field with a plain text input hint
    pub fn new(name: impl Into<String>, data_type: FieldDataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            input_hint: "text".to_string(),
            category: "basic_info".to_string(),
            required: false,
            validation_rule: None,
            options: None,
        }
    }

    /// Marks the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the presentation hint
    pub fn with_input_hint(mut self, hint: impl Into<String>) -> Self {
        self.input_hint = hint.into();
        self
    }

    /// Sets the grouping category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the validation rule expression
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.validation_rule = Some(rule.into());
        self
    }

    /// Sets the allowed values for a select-like field
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self.input_hint = "select".to_string();
        self
    }
}
