//! Character n-gram filter.
//!
//! Replaces each token by all of its overlapping substrings of exactly `n`
//! characters. The first gram of a token keeps the token's position
//! increment, the following grams are stacked on it. A token shorter than
//! `n` produces nothing; no padding is applied.
//!
//! # Examples
//!
//! ```
//! use xiphos::analysis::token::Token;
//! use xiphos::analysis::token_filter::Filter;
//! use xiphos::analysis::token_filter::ngram::NgramFilter;
//!
//! let filter = NgramFilter::new(3).unwrap();
//! let grams: Vec<String> = filter
//!     .filter(Box::new(vec![Token::new("cats"), Token::new("ca")].into_iter()))
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//!
//! assert_eq!(grams, vec!["cat", "ats"]);
//! ```

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::token_filter::Filter;
use crate::error::{Result, XiphosError};

#[derive(Clone, Debug)]
pub struct NgramFilter {
    n: usize,
}

impl NgramFilter {
    /// Create a filter emitting grams of `n` characters (`n >= 1`).
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(XiphosError::analysis("n-gram size must be at least 1"));
        }
        Ok(NgramFilter { n })
    }

    pub fn n(&self) -> usize {
        self.n
    }
}

impl Filter for NgramFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut out: Vec<Token> = Vec::new();
        let mut pending = 0;

        for token in tokens {
            let chars: Vec<char> = token.text.chars().collect();
            if token.is_stopped() || chars.len() < self.n {
                pending += token.position_increment;
                continue;
            }

            for (i, window) in chars.windows(self.n).enumerate() {
                let increment = if i == 0 {
                    token.position_increment + std::mem::take(&mut pending)
                } else {
                    0
                };
                let gram: String = window.iter().collect();
                out.push(
                    token
                        .with_text(gram)
                        .with_token_type(TokenType::Gram)
                        .with_position_increment(increment)
                        .with_position_length(1),
                );
            }
        }

        Ok(Box::new(out.into_iter()))
    }

    fn name(&self) -> &'static str {
        "ngram"
    }
}
