//! Whitespace tokenizer.

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// Splits text on whitespace. Punctuation stays attached to words.
#[derive(Clone, Debug, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    pub fn new() -> Self {
        WhitespaceTokenizer
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut word = String::new();
        let mut start = 0;

        for (offset, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                if !word.is_empty() {
                    let text = std::mem::take(&mut word);
                    let token_type = TokenType::detect(&text);
                    tokens.push(Token::with_offsets(text, start, offset).with_token_type(token_type));
                }
            } else {
                if word.is_empty() {
                    start = offset;
                }
                word.push(c);
            }
        }

        if !word.is_empty() {
            let end = start + word.chars().count();
            let token_type = TokenType::detect(&word);
            tokens.push(Token::with_offsets(word, start, end).with_token_type(token_type));
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}
