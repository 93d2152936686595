//! Token filters transform the token stream produced by a tokenizer.
//!
//! - [`lowercase::LowercaseFilter`] lowercases token text
//! - [`strip::StripFilter`] strips a character class from token edges
//! - [`word_delimiter::WordDelimiterFilter`] splits tokens into sub-words
//! - [`possessive::PossessiveFilter`] removes English possessive `'s`
//! - [`stop::StopFilter`] removes stop words
//! - [`remove_empty::RemoveEmptyFilter`] removes empty and stopped tokens
//! - [`alpha::AlphaFilter`] keeps alphabetic characters only
//! - [`ngram::NgramFilter`] emits fixed-length character n-grams
//! - [`snowball::SnowballFilter`] applies a Snowball stemmer
//!
//! Filters that drop tokens add the dropped token's `position_increment` to
//! the next surviving token so that position gaps are preserved.
//!
//! ```text
//! Tokenizer → Lowercase → Strip → WordDelimiter → Possessive → Stop → RemoveEmpty
//! ```

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Trait for filters that transform token streams.
///
/// # Examples
///
/// ```
/// use xiphos::analysis::token::{Token, TokenStream};
/// use xiphos::analysis::token_filter::Filter;
/// use xiphos::error::Result;
///
/// struct ReverseFilter;
///
/// impl Filter for ReverseFilter {
///     fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
///         let reversed: Vec<Token> = tokens
///             .map(|mut t| {
///                 t.text = t.text.chars().rev().collect();
///                 t
///             })
///             .collect();
///         Ok(Box::new(reversed.into_iter()))
///     }
///
///     fn name(&self) -> &'static str {
///         "reverse"
///     }
/// }
/// ```
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// Keep the tokens matching `keep`, folding the position increments of
/// dropped tokens into the next kept token.
pub(crate) fn retain_with_gaps<F>(tokens: TokenStream, keep: F) -> Vec<Token>
where
    F: Fn(&Token) -> bool,
{
    let mut kept = Vec::new();
    let mut pending = 0;

    for mut token in tokens {
        if keep(&token) {
            token.position_increment += pending;
            pending = 0;
            kept.push(token);
        } else {
            pending += token.position_increment;
        }
    }

    kept
}

pub mod alpha;
pub mod lowercase;
pub mod ngram;
pub mod possessive;
pub mod remove_empty;
pub mod snowball;
pub mod stop;
pub mod strip;
pub mod word_delimiter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retain_with_gaps() {
        let tokens = vec![Token::new("a"), Token::new("b"), Token::new("c")];
        let kept = retain_with_gaps(Box::new(tokens.into_iter()), |t| t.text != "b");

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].position_increment, 1);
        assert_eq!(kept[1].text, "c");
        assert_eq!(kept[1].position_increment, 2);
    }

    #[test]
    fn test_retain_with_gaps_trailing_drop() {
        let tokens = vec![Token::new("a"), Token::new("")];
        let kept = retain_with_gaps(Box::new(tokens.into_iter()), |t| !t.is_empty());

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].position_increment, 1);
    }
}
