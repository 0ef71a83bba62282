//! Errors reported by the extractor.

use thiserror::Error;

/// Things that can go wrong when configuring the extractor or handing it input.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document was not a string.
    #[error("invalid input: expected document text to be a string, found {found}")]
    InvalidInput { found: &'static str },

    /// A record did not say unambiguously where to find its document.
    #[error("invalid record: {0}")]
    InvalidRecord(&'static str),

    /// A date pattern failed to compile.
    #[error("invalid date pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// No locales were configured, so no month name could ever be read.
    #[error("at least one locale must be configured")]
    NoLocales,
}

impl ExtractError {
    /// Describe a JSON value that should have been a string.
    pub fn not_a_string(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        let found = match value {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        };
        ExtractError::InvalidInput { found }
    }
}
