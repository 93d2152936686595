//! Stop filter implementation.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use xiphos::analysis::stopwords::StopwordSet;
//! use xiphos::analysis::token::Token;
//! use xiphos::analysis::token_filter::Filter;
//! use xiphos::analysis::token_filter::stop::StopFilter;
//!
//! let stopwords = Arc::new(StopwordSet::from_words("custom", ["the"]));
//! let filter = StopFilter::new(stopwords);
//! let tokens = vec![Token::new("the"), Token::new("quick"), Token::new("brown")];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[0].text, "quick");
//! assert_eq!(result[0].position_increment, 2);
//! ```

use std::sync::Arc;

use crate::analysis::stopwords::StopwordSet;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{Filter, retain_with_gaps};
use crate::error::Result;

/// Removes tokens whose text is an exact member of a shared stopword set.
#[derive(Clone, Debug)]
pub struct StopFilter {
    stop_words: Arc<StopwordSet>,
    remove_stopped: bool,
}

impl StopFilter {
    pub fn new(stop_words: Arc<StopwordSet>) -> Self {
        StopFilter {
            stop_words,
            remove_stopped: true,
        }
    }

    /// Only mark stop words instead of removing them.
    pub fn mark_only(mut self) -> Self {
        self.remove_stopped = false;
        self
    }

    pub fn stop_words(&self) -> &Arc<StopwordSet> {
        &self.stop_words
    }

    fn is_stop_word(&self, text: &str) -> bool {
        self.stop_words.contains(text)
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        if self.remove_stopped {
            let kept = retain_with_gaps(tokens, |token| {
                token.keyword || !self.is_stop_word(&token.text)
            });
            Ok(Box::new(kept.into_iter()))
        } else {
            let stop_words = Arc::clone(&self.stop_words);
            Ok(Box::new(tokens.map(move |token| {
                if !token.keyword && stop_words.contains(&token.text) {
                    token.stop()
                } else {
                    token
                }
            })))
        }
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    fn stopwords() -> Arc<StopwordSet> {
        Arc::new(StopwordSet::from_words("test", ["the", "and"]))
    }

    #[test]
    fn test_stop_filter_removes_and_keeps_gaps() {
        let filter = StopFilter::new(stopwords());
        let tokens = vec![
            Token::new("cats"),
            Token::new("and"),
            Token::new("the"),
            Token::new("dogs"),
        ];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].text, "dogs");
        assert_eq!(result[1].position_increment, 3);
    }

    #[test]
    fn test_stop_filter_is_case_sensitive() {
        let filter = StopFilter::new(stopwords());
        let tokens = vec![Token::new("The")];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_mark_only() {
        let filter = StopFilter::new(stopwords()).mark_only();
        let tokens = vec![Token::new("the"), Token::new("fox")];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        assert_eq!(result.len(), 2);
        assert!(result[0].is_stopped());
        assert!(!result[1].is_stopped());
    }
}
