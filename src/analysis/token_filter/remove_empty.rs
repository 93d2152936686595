//! Remove empty filter implementation.
//!
//! Drops zero-length tokens and tokens marked as stopped.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{Filter, retain_with_gaps};
use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct RemoveEmptyFilter;

impl RemoveEmptyFilter {
    pub fn new() -> Self {
        RemoveEmptyFilter
    }
}

impl Filter for RemoveEmptyFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let kept = retain_with_gaps(tokens, |token| {
            !token.is_stopped() && !token.text.is_empty()
        });
        Ok(Box::new(kept.into_iter()))
    }

    fn name(&self) -> &'static str {
        "remove_empty"
    }
}
