use chrono::{DateTime, Utc};
use promptbank_core::{Keyword, Response};
use regex::Regex;

use crate::error::EngineError;

#[derive(Debug, Clone)]
enum TextMatcher {
    Literal(String),
    Pattern(Regex),
}

impl TextMatcher {
    fn is_match(&self, text: &str) -> bool {
        match self {
            TextMatcher::Literal(needle) => text.contains(needle.as_str()),
            TextMatcher::Pattern(regex) => regex.is_match(text),
        }
    }
}

/// Match test for a single keyword: text containment plus inclusive
/// temporal bounds on the response's creation time.
#[derive(Debug, Clone)]
pub struct KeywordPredicate {
    matcher: TextMatcher,
    start_bound: Option<DateTime<Utc>>,
    end_bound: Option<DateTime<Utc>>,
}

impl KeywordPredicate {
    /// Build the predicate for `keyword`.
    ///
    /// Pattern keywords are compiled once here; literal keywords match by
    /// case-sensitive substring containment. An empty text matches every
    /// response in either mode.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PatternCompilation`] if the keyword uses pattern
    /// matching and its text is not a valid regular expression.
    pub fn build(keyword: &Keyword) -> Result<Self, EngineError> {
        let matcher = if keyword.uses_pattern_match {
            let regex =
                Regex::new(&keyword.text).map_err(|source| EngineError::PatternCompilation {
                    keyword: keyword.clone(),
                    source,
                })?;
            TextMatcher::Pattern(regex)
        } else {
            TextMatcher::Literal(keyword.text.clone())
        };

        Ok(Self {
            matcher,
            start_bound: keyword.start_bound,
            end_bound: keyword.end_bound,
        })
    }

    #[must_use]
    pub fn matches(&self, response: &Response) -> bool {
        self.within_bounds(response.created_at) && self.matcher.is_match(&response.text)
    }

    fn within_bounds(&self, created_at: DateTime<Utc>) -> bool {
        match (self.start_bound, self.end_bound) {
            (None, None) => true,
            (Some(start), None) => created_at >= start,
            (None, Some(end)) => created_at <= end,
            (Some(start), Some(end)) => start <= created_at && created_at <= end,
        }
    }
}
