//! Tokenizers break raw text into the initial token sequence of a pipeline.
//!
//! - [`whitespace::WhitespaceTokenizer`] splits on Unicode whitespace only.
//! - [`standard::StandardTokenizer`] follows Unicode word boundaries and
//!   separates punctuation from word characters.
//! - [`keyword::KeywordTokenizer`] emits the whole input as one token.
//!
//! # Examples
//!
//! ```
//! use xiphos::analysis::tokenizer::Tokenizer;
//! use xiphos::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//!
//! let tokenizer = WhitespaceTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Hello world").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// Offsets on emitted tokens are character offsets into `text`.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod keyword;
pub mod standard;
pub mod whitespace;
