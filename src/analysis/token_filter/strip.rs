//! Strip filter implementation.
//!
//! Removes characters of a configured class from the start and end of each
//! token. The class is a regex character class; the default strips every
//! character that is neither a letter nor a number.

use regex::Regex;

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::{Result, XiphosError};

/// Default stripped class: anything that is not a Unicode letter or number.
pub const DEFAULT_STRIP_CLASS: &str = r"[^\p{L}\p{N}]";

#[derive(Clone, Debug)]
pub struct StripFilter {
    class: String,
    leading: Regex,
    trailing: Regex,
}

impl StripFilter {
    /// Create a filter stripping [`DEFAULT_STRIP_CLASS`].
    pub fn new() -> Result<Self> {
        Self::with_class(DEFAULT_STRIP_CLASS)
    }

    /// Create a filter stripping characters matching `class`, for example
    /// `[\p{P}\p{S}]`.
    pub fn with_class(class: &str) -> Result<Self> {
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| {
                XiphosError::analysis(format!("Invalid strip character class {class:?}: {e}"))
            })
        };

        Ok(StripFilter {
            class: class.to_string(),
            leading: compile(format!("^(?:{class})+"))?,
            trailing: compile(format!("(?:{class})+$"))?,
        })
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Byte range of `text` left after stripping both edges.
    fn stripped_range(&self, text: &str) -> (usize, usize) {
        let start = self.leading.find(text).map(|m| m.end()).unwrap_or(0);
        let end = self
            .trailing
            .find(&text[start..])
            .map(|m| start + m.start())
            .unwrap_or(text.len());
        (start, end)
    }
}

impl Filter for StripFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filter = self.clone();
        Ok(Box::new(tokens.map(move |token| {
            if token.is_stopped() || token.keyword {
                return token;
            }
            let (start, end) = filter.stripped_range(&token.text);
            if start == 0 && end == token.text.len() {
                return token;
            }

            let text = &token.text;
            let char_len = text.chars().count();
            let mut stripped = token.with_text(&text[start..end]);
            // Narrow offsets when they line up with the token text.
            if token.end_offset.saturating_sub(token.start_offset) == char_len {
                stripped.start_offset = token.start_offset + text[..start].chars().count();
                stripped.end_offset = token.end_offset - text[end..].chars().count();
            }
            stripped
        })))
    }

    fn name(&self) -> &'static str {
        "strip"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    fn run(filter: &StripFilter, words: &[&str]) -> Vec<String> {
        let tokens: Vec<Token> = words.iter().map(|w| Token::new(*w)).collect();
        filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_strip_default_class() {
        let filter = StripFilter::new().unwrap();
        let result = run(&filter, &["quick-fox!", "\"hello\"", "(a)", "o'neil", "!!!"]);

        assert_eq!(result, vec!["quick-fox", "hello", "a", "o'neil", ""]);
    }

    #[test]
    fn test_strip_custom_class() {
        let filter = StripFilter::with_class(r"[#@]").unwrap();
        let result = run(&filter, &["#rust", "@user!", "mid#dle"]);

        assert_eq!(result, vec!["rust", "user!", "mid#dle"]);
    }

    #[test]
    fn test_strip_narrows_offsets() {
        let filter = StripFilter::new().unwrap();
        let tokens = vec![Token::with_offsets("«été»", 3, 8)];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        assert_eq!(result[0].text, "été");
        assert_eq!(result[0].start_offset, 4);
        assert_eq!(result[0].end_offset, 7);
    }

    #[test]
    fn test_invalid_class() {
        assert!(StripFilter::with_class("[unclosed").is_err());
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(StripFilter::new().unwrap().name(), "strip");
    }
}
