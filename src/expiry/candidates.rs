//! Scanning text for date-shaped substrings.

use regex::{Regex, RegexBuilder};

use super::error::ExtractError;

/// A substring of the document that looks like a date.
///
/// `start` and `end` are byte offsets into the scanned text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// The matched text.
    pub text: &'a str,

    /// Where the match starts.
    pub start: usize,

    /// Where the match ends (exclusive).
    pub end: usize,
}

/// A compiled, ordered set of date patterns.
#[derive(Clone, Debug)]
pub struct CandidateScanner {
    patterns: Vec<Regex>,
}

impl CandidateScanner {
    /// Compile `patterns`. All patterns match case-insensitively.
    pub fn new<S>(patterns: &[S]) -> Result<Self, ExtractError>
    where
        S: AsRef<str>,
    {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ExtractError::InvalidPattern {
                        pattern: pattern.to_owned(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Find every match of every pattern in `text`.
    ///
    /// Matches from one pattern never overlap each other, but matches from
    /// different patterns may.
    pub fn scan<'a>(&self, text: &'a str) -> Vec<Candidate<'a>> {
        self.patterns
            .iter()
            .flat_map(|regex| regex.find_iter(text))
            .map(|m| Candidate {
                text: m.as_str(),
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }
}
