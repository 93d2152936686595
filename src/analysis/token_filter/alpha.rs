//! Alphabetic filter: removes every character that is not a letter.
//!
//! Numbers vanish entirely (`1,500.25` becomes empty) and punctuation is
//! deleted from inside words (`don't` becomes `dont`). Empty results are left
//! for [`RemoveEmptyFilter`](super::remove_empty::RemoveEmptyFilter).

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct AlphaFilter;

impl AlphaFilter {
    pub fn new() -> Self {
        AlphaFilter
    }
}

impl Filter for AlphaFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.is_stopped() || token.text.chars().all(char::is_alphabetic) {
                return token;
            }
            let letters: String = token.text.chars().filter(|c| c.is_alphabetic()).collect();
            token.with_text(letters)
        })))
    }

    fn name(&self) -> &'static str {
        "alpha"
    }
}
