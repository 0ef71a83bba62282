//! Languages we know how to read dates in.

use std::fmt;

use schemars::JsonSchema;

use crate::prelude::*;

/// A document language.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    JsonSchema,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub enum Locale {
    /// French.
    #[serde(rename = "fr")]
    French,

    /// Dutch.
    #[serde(rename = "nl")]
    Dutch,
}

/// French month names.
///
/// The unaccented spellings are seen in OCR output. The built-in patterns
/// only match accented names, so these are reached through user patterns.
const FRENCH_MONTHS: &[(&str, u32)] = &[
    ("janvier", 1),
    ("février", 2),
    ("fevrier", 2),
    ("mars", 3),
    ("avril", 4),
    ("mai", 5),
    ("juin", 6),
    ("juillet", 7),
    ("août", 8),
    ("aout", 8),
    ("septembre", 9),
    ("octobre", 10),
    ("novembre", 11),
    ("décembre", 12),
    ("decembre", 12),
];

/// Dutch month names.
const DUTCH_MONTHS: &[(&str, u32)] = &[
    ("januari", 1),
    ("februari", 2),
    ("maart", 3),
    ("april", 4),
    ("mei", 5),
    ("juni", 6),
    ("juli", 7),
    ("augustus", 8),
    ("september", 9),
    ("oktober", 10),
    ("november", 11),
    ("december", 12),
];

impl Locale {
    /// Every locale we support.
    #[cfg(test)]
    pub const ALL: &[Locale] = &[Locale::French, Locale::Dutch];

    /// The short language code, as used in configuration files.
    pub fn code(self) -> &'static str {
        match self {
            Locale::French => "fr",
            Locale::Dutch => "nl",
        }
    }

    /// Month names for this locale, lowercase.
    fn months(self) -> &'static [(&'static str, u32)] {
        match self {
            Locale::French => FRENCH_MONTHS,
            Locale::Dutch => DUTCH_MONTHS,
        }
    }

    /// Look up a month by name. `name` must already be lowercase.
    pub fn month_number(self, name: &str) -> Option<u32> {
        self.months()
            .iter()
            .find(|(month, _)| *month == name)
            .map(|(_, number)| *number)
    }

    /// Does this locale write numeric dates day first?
    pub fn is_day_first(self) -> bool {
        match self {
            Locale::French | Locale::Dutch => true,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Look up a month name in any of `locales`.
pub fn month_in_locales(locales: &[Locale], name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    locales
        .iter()
        .find_map(|locale| locale.month_number(&name))
}
