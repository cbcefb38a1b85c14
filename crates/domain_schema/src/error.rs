//! Schema domain errors

use thiserror::Error;

/// Errors that can occur in the schema domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// One or more required fields were absent or empty
    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields {
        /// The offending field names, sorted
        fields: Vec<String>,
    },

    /// A field was referenced that the registry does not know for the kind
    #[error("unknown field \"{field}\" for kind \"{kind}\"")]
    UnknownField { kind: String, field: String },
}

impl SchemaError {
    /// Creates a MissingFields error from any iterator of field names
    pub fn missing(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        fields.sort();
        SchemaError::MissingFields { fields }
    }
}
