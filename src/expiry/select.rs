//! Choosing one date from the dates we found.

use std::collections::BTreeSet;

use crate::prelude::*;

/// A policy for picking the expiry date out of every plausible date.
pub trait SelectionStrategy: Send + Sync {
    /// Pick a date, or `None` if nothing qualifies.
    fn select(&self, dates: &BTreeSet<NaiveDate>) -> Option<NaiveDate>;
}

/// Pick the latest date.
///
/// Documents often mention an issue date or an inspection date next to the
/// expiry date, and the expiry date is usually the latest of them. When a
/// later, unrelated date also sits near an expiry keyword, this picks the
/// wrong one.
#[derive(Clone, Copy, Debug, Default)]
pub struct LatestDate;

impl SelectionStrategy for LatestDate {
    fn select(&self, dates: &BTreeSet<NaiveDate>) -> Option<NaiveDate> {
        dates.last().copied()
    }
}
