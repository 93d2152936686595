//! Grammar-aware tokenizer based on Unicode word boundaries (UAX #29).

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// Splits text at Unicode word boundaries, dropping whitespace and
/// punctuation-only segments.
///
/// Apostrophes and periods inside a word follow UAX #29, so `l'été` stays
/// a single segment while `end.` loses its trailing period.
#[derive(Clone, Debug, Default)]
pub struct StandardTokenizer;

impl StandardTokenizer {
    pub fn new() -> Self {
        StandardTokenizer
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut char_offset = 0;

        for segment in text.split_word_bounds() {
            let len = segment.chars().count();
            if segment.chars().any(|c| c.is_alphanumeric()) {
                let token_type = TokenType::detect(segment);
                tokens.push(
                    Token::with_offsets(segment, char_offset, char_offset + len)
                        .with_token_type(token_type),
                );
            }
            char_offset += len;
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}
