//! Checking whether a date candidate sits near an expiry keyword.

use super::candidates::Candidate;

/// Expiry keywords, plus the size of the window we search for them.
#[derive(Clone, Debug)]
pub struct KeywordContext {
    /// Normalized keywords. See [`normalize`].
    keywords: Vec<String>,

    /// How many characters to look at on each side of a candidate.
    window: usize,
}

impl KeywordContext {
    /// Create a new context filter. Keywords are normalized here, once.
    pub fn new<I, S>(keywords: I, window: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords = keywords
            .into_iter()
            .map(|kw| normalize(kw.as_ref()))
            .filter(|kw| !kw.is_empty())
            .collect::<Vec<_>>();
        keywords.sort();
        keywords.dedup();
        Self { keywords, window }
    }

    /// The window size, in characters.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Does any keyword appear within `window` characters of `candidate`?
    ///
    /// A keyword only counts if it lies entirely inside the window.
    pub fn has_expiry_context(&self, text: &str, candidate: &Candidate<'_>) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let lo = chars_before(text, candidate.start, self.window);
        let hi = chars_after(text, candidate.end, self.window);
        let context = normalize(&text[lo..hi]);
        self.keywords.iter().any(|kw| context.contains(kw.as_str()))
    }
}

/// Lowercase `s` and fold typographic apostrophes to `'`.
fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '`' => '\'',
            c => c,
        })
        .collect()
}

/// Byte offset `n` characters before `pos`, or 0.
fn chars_before(text: &str, pos: usize, n: usize) -> usize {
    if n == 0 {
        return pos;
    }
    text[..pos]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map_or(0, |(i, _)| i)
}

/// Byte offset `n` characters after `pos`, or the end of `text`.
fn chars_after(text: &str, pos: usize, n: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(i, _)| pos + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a candidate for the first occurrence of `needle`.
    fn candidate<'a>(text: &'a str, needle: &str) -> Candidate<'a> {
        let start = text.find(needle).unwrap();
        let end = start + needle.len();
        Candidate {
            text: &text[start..end],
            start,
            end,
        }
    }

    #[test]
    fn keyword_before_or_after_counts() {
        let ctx = KeywordContext::new(["geldig tot"], 80);
        let before = "Geldig tot 31/12/2030";
        assert!(ctx.has_expiry_context(before, &candidate(before, "31/12/2030")));
        let after = "31/12/2030 is de datum waarop dit attest geldig tot blijft";
        assert!(ctx.has_expiry_context(after, &candidate(after, "31/12/2030")));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let ctx = KeywordContext::new(["Date d'Expiration"], 80);
        let text = "DATE D'EXPIRATION: 15/09/2031";
        assert!(ctx.has_expiry_context(text, &candidate(text, "15/09/2031")));
    }

    #[test]
    fn curly_apostrophes_match_straight_ones() {
        let ctx = KeywordContext::new(["date d'expiration"], 80);
        let text = "Date d\u{2019}expiration : 15/09/2031";
        assert!(ctx.has_expiry_context(text, &candidate(text, "15/09/2031")));
    }

    #[test]
    fn empty_keyword_set_never_matches() {
        let ctx = KeywordContext::new(Vec::<String>::new(), 80);
        let text = "expire le 15/09/2031";
        assert!(!ctx.has_expiry_context(text, &candidate(text, "15/09/2031")));
    }

    #[test]
    fn window_edge_is_inclusive() {
        let window = 20;
        let ctx = KeywordContext::new(["verval"], window);

        // Keyword starts exactly `window` characters before the date.
        let text = format!("verval{}31/12/2030", "x".repeat(window - 6));
        assert!(ctx.has_expiry_context(&text, &candidate(&text, "31/12/2030")));

        // One character further away, the first letter falls outside.
        let text = format!("verval{}31/12/2030", "x".repeat(window - 5));
        assert!(!ctx.has_expiry_context(&text, &candidate(&text, "31/12/2030")));
    }

    #[test]
    fn window_after_the_candidate_is_symmetric() {
        let window = 20;
        let ctx = KeywordContext::new(["verval"], window);

        let text = format!("31/12/2030{}verval", "x".repeat(window - 6));
        assert!(ctx.has_expiry_context(&text, &candidate(&text, "31/12/2030")));

        let text = format!("31/12/2030{}verval", "x".repeat(window - 5));
        assert!(!ctx.has_expiry_context(&text, &candidate(&text, "31/12/2030")));
    }

    #[test]
    fn window_counts_characters_not_bytes() {
        // Twelve characters, but nineteen bytes, before the date.
        let window = 12;
        let ctx = KeywordContext::new(["fin"], window);
        let text = "fin ééééééé 01/01/2030";
        assert!(ctx.has_expiry_context(text, &candidate(text, "01/01/2030")));
    }

    #[test]
    fn window_is_clamped_to_the_text() {
        let ctx = KeywordContext::new(["expire le"], 500);
        let text = "expire le 01/01/2030";
        assert!(ctx.has_expiry_context(text, &candidate(text, "01/01/2030")));
    }
}
