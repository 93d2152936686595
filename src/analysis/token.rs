//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows through an analysis pipeline. Token
//! graphs are expressed with `position_increment` and `position_length`:
//!
//! ```text
//! Input: "wi-fi" with preserve_original
//!
//!   "wi-fi" (pos_inc=1, pos_len=2)
//!   "wi"    (pos_inc=0, pos_len=1)  <- stacked on the original
//!   "fi"    (pos_inc=1, pos_len=1)
//! ```
//!
//! # Examples
//!
//! ```
//! use xiphos::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("world", 6, 11).with_token_type(TokenType::Alphanum);
//! assert_eq!(token.text, "world");
//! assert_eq!(token.position_increment, 1);
//! assert_eq!(token.token_type, TokenType::Alphanum);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single analyzed token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The term text.
    pub text: String,

    /// Character offset of the first character in the original text.
    pub start_offset: usize,

    /// Character offset one past the last character in the original text.
    pub end_offset: usize,

    /// Classification tag assigned by the tokenizer or a filter.
    pub token_type: TokenType,

    /// Distance from the previous token. Zero stacks this token on the
    /// previous position.
    pub position_increment: usize,

    /// Number of positions this token spans.
    pub position_length: usize,

    /// Keyword tokens are exempt from further normalization.
    pub keyword: bool,

    /// Marked for removal by a later stage.
    pub stopped: bool,
}

/// Token classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Letters and/or digits.
    Alphanum,
    /// Only digits.
    Num,
    /// Only punctuation.
    Punctuation,
    /// Sub-token produced by word-delimiter splitting.
    Subword,
    /// Character n-gram.
    Gram,
    /// Whole-field keyword.
    Keyword,
    Other,
}

impl TokenType {
    /// Classify a word as produced by a tokenizer.
    pub fn detect(word: &str) -> TokenType {
        if word.is_empty() {
            return TokenType::Other;
        }

        if word.chars().all(|c| c.is_numeric()) {
            return TokenType::Num;
        }

        if word.chars().all(|c| c.is_alphanumeric()) {
            return TokenType::Alphanum;
        }

        if word
            .chars()
            .all(|c| c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace()))
        {
            return TokenType::Punctuation;
        }

        TokenType::Other
    }

    /// Short label used when printing tokens.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Alphanum => "<ALPHANUM>",
            TokenType::Num => "<NUM>",
            TokenType::Punctuation => "<PUNCT>",
            TokenType::Subword => "<SUBWORD>",
            TokenType::Gram => "<GRAM>",
            TokenType::Keyword => "<KEYWORD>",
            TokenType::Other => "<OTHER>",
        }
    }
}

impl Token {
    /// Create a new token without offsets.
    pub fn new<S: Into<String>>(text: S) -> Self {
        Token {
            text: text.into(),
            start_offset: 0,
            end_offset: 0,
            token_type: TokenType::Other,
            position_increment: 1,
            position_length: 1,
            keyword: false,
            stopped: false,
        }
    }

    /// Create a new token covering `start_offset..end_offset` in the source.
    pub fn with_offsets<S: Into<String>>(text: S, start_offset: usize, end_offset: usize) -> Self {
        Token {
            start_offset,
            end_offset,
            ..Token::new(text)
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = token_type;
        self
    }

    /// Copy this token with replacement text, keeping offsets and graph data.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        let mut token = self.clone();
        token.text = text.into();
        token
    }

    pub fn with_position_increment(mut self, increment: usize) -> Self {
        self.position_increment = increment;
        self
    }

    pub fn with_position_length(mut self, length: usize) -> Self {
        self.position_length = length;
        self
    }

    pub fn as_keyword(mut self) -> Self {
        self.keyword = true;
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A stream of tokens.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

/// Convert a collection into a [`TokenStream`].
pub trait IntoTokenStream {
    fn into_token_stream(self) -> TokenStream;
}

impl IntoTokenStream for Vec<Token> {
    fn into_token_stream(self) -> TokenStream {
        Box::new(self.into_iter())
    }
}
