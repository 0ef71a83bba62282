//! Turning candidate strings into calendar dates.

use chrono::Datelike as _;

use super::locale::{Locale, month_in_locales};
use crate::prelude::*;

/// Parses date candidates written in one of several locales.
#[derive(Clone, Debug)]
pub struct DateParser {
    /// Locales whose month names we accept.
    locales: Vec<Locale>,

    /// Read `01/02/2030` as 1 February rather than 2 January?
    day_first: bool,

    /// Supplies the year when a candidate has none.
    reference_date: NaiveDate,
}

impl DateParser {
    /// Create a parser for `locales`.
    pub fn new(locales: &[Locale], reference_date: NaiveDate) -> Self {
        Self {
            locales: locales.to_vec(),
            day_first: locales.iter().all(|locale| locale.is_day_first()),
            reference_date,
        }
    }

    /// Parse `candidate`, returning `None` if it isn't a valid date.
    pub fn parse(&self, candidate: &str) -> Option<NaiveDate> {
        let candidate = candidate.trim();
        if candidate.chars().any(char::is_alphabetic) {
            self.parse_month_name(candidate)
        } else {
            self.parse_numeric(candidate)
        }
    }

    /// Parse `d/m/y`, `d-m-y` and friends.
    ///
    /// Two-digit years get `chrono`'s usual `%y` century.
    fn parse_numeric(&self, candidate: &str) -> Option<NaiveDate> {
        let parts = candidate.split(['/', '-']).collect::<Vec<_>>();
        let [first, second, year] = parts.as_slice() else {
            return None;
        };
        let year_format = match year.len() {
            4 => "%Y",
            2 => "%y",
            _ => return None,
        };
        let normalized = format!("{first}/{second}/{year}");
        let day_first = format!("%d/%m/{year_format}");
        let month_first = format!("%m/%d/{year_format}");
        let (preferred, fallback) = if self.day_first {
            (day_first, month_first)
        } else {
            (month_first, day_first)
        };
        NaiveDate::parse_from_str(&normalized, &preferred)
            .or_else(|_| NaiveDate::parse_from_str(&normalized, &fallback))
            .ok()
    }

    /// Parse `15 juin 2025`, `juni 6` or `juin 6, 2025`.
    fn parse_month_name(&self, candidate: &str) -> Option<NaiveDate> {
        let tokens = candidate
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>();
        let (day, month, year) = match tokens.as_slice() {
            [day, month, year] if starts_with_digit(day) => (*day, *month, Some(*year)),
            [month, day, year] => (*day, *month, Some(*year)),
            [month, day] => (*day, *month, None),
            _ => return None,
        };
        let month = month_in_locales(&self.locales, month)?;
        let day = day.trim_end_matches("er").parse::<u32>().ok()?;
        let year = match year {
            Some(year) if year.len() == 4 => year.parse::<i32>().ok()?,
            Some(_) => return None,
            None => self.reference_date.year(),
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}
