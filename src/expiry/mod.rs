//! Finding expiry dates in document text.
//!
//! Extraction is a single pass over the text:
//!
//! 1. [`CandidateScanner`] finds every date-shaped substring.
//! 2. [`KeywordContext`] drops candidates with no expiry keyword nearby.
//! 3. [`DateParser`] turns the survivors into calendar dates.
//! 4. A [`SelectionStrategy`] picks one of them (by default, the latest).
//!
//! An [`Extractor`] is built once from an
//! [`ExtractorConfig`](crate::config::ExtractorConfig) and then shared by
//! reference. It holds no mutable state, so extraction is deterministic.

use std::{collections::BTreeSet, fmt, str::FromStr};

use schemars::{JsonSchema, r#gen::SchemaGenerator, schema::Schema};
use serde::{Deserializer, Serializer, de};

use crate::prelude::*;

pub mod candidates;
pub mod context;
pub mod error;
pub mod locale;
pub mod parse;
pub mod select;

pub use self::{
    candidates::CandidateScanner,
    context::KeywordContext,
    error::ExtractError,
    locale::Locale,
    parse::DateParser,
    select::{LatestDate, SelectionStrategy},
};

/// The text we write when no expiry date was found.
pub const NOT_FOUND: &str = "Not found";

/// Older spellings of [`NOT_FOUND`] that we still accept when reading records.
/// A JSON `null` also means [`ExpiryDate::NotFound`].
const NOT_FOUND_ALIASES: &[&str] = &[NOT_FOUND, "None", "No date found", "null"];

/// The result of looking for an expiry date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExpiryDate {
    /// We found a date.
    Found(NaiveDate),

    /// No date near an expiry keyword could be parsed.
    #[default]
    NotFound,
}

impl ExpiryDate {
    /// The date, if we found one.
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            ExpiryDate::Found(date) => Some(date),
            ExpiryDate::NotFound => None,
        }
    }
}

impl From<Option<NaiveDate>> for ExpiryDate {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map_or(ExpiryDate::NotFound, ExpiryDate::Found)
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryDate::Found(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            ExpiryDate::NotFound => f.write_str(NOT_FOUND),
        }
    }
}

impl FromStr for ExpiryDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if NOT_FOUND_ALIASES
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(s))
        {
            return Ok(ExpiryDate::NotFound);
        }
        Ok(ExpiryDate::Found(NaiveDate::parse_from_str(s, "%Y-%m-%d")?))
    }
}

impl Serialize for ExpiryDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExpiryDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => s.parse().map_err(de::Error::custom),
            None => Ok(ExpiryDate::NotFound),
        }
    }
}

impl JsonSchema for ExpiryDate {
    fn schema_name() -> String {
        "ExpiryDate".to_owned()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}

/// Extracts expiry dates from document text.
pub struct Extractor {
    scanner: CandidateScanner,
    context: KeywordContext,
    parser: DateParser,
    selector: Box<dyn SelectionStrategy>,
}

impl Extractor {
    /// Assemble an extractor from its stages, selecting the latest date.
    pub fn new(scanner: CandidateScanner, context: KeywordContext, parser: DateParser) -> Self {
        Self {
            scanner,
            context,
            parser,
            selector: Box::new(LatestDate),
        }
    }

    /// Replace the selection strategy.
    #[allow(dead_code)]
    pub fn with_selector(mut self, selector: impl SelectionStrategy + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// Find the expiry date in `text`.
    #[instrument(level = "debug", skip_all, fields(text_len = text.len()))]
    pub fn extract(&self, text: &str) -> ExpiryDate {
        let dates = self.expiry_dates(text);
        let result = ExpiryDate::from(self.selector.select(&dates));
        debug!(candidates = dates.len(), %result, "selected expiry date");
        result
    }

    /// Find the expiry date in a JSON value, which must be a string.
    pub fn extract_value(&self, value: &Value) -> Result<ExpiryDate, ExtractError> {
        match value {
            Value::String(text) => Ok(self.extract(text)),
            other => Err(ExtractError::not_a_string(other)),
        }
    }

    /// Every parseable date that appears near an expiry keyword.
    pub fn expiry_dates(&self, text: &str) -> BTreeSet<NaiveDate> {
        let mut dates = BTreeSet::new();
        for candidate in self.scanner.scan(text) {
            if !self.context.has_expiry_context(text, &candidate) {
                trace!(candidate = candidate.text, "no expiry keyword nearby");
                continue;
            }
            match self.parser.parse(candidate.text) {
                Some(date) => {
                    trace!(candidate = candidate.text, %date, "accepted candidate");
                    dates.insert(date);
                }
                None => debug!(candidate = candidate.text, "could not parse candidate"),
            }
        }
        dates
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("scanner", &self.scanner)
            .field("context", &self.context)
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}
