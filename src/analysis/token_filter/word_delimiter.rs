//! Word delimiter filter.
//!
//! Splits a token into sub-words at internal delimiters (any character that
//! is not a letter or digit), at lower-to-upper case transitions and at
//! letter/digit transitions. An apostrophe surrounded by word characters is
//! part of the word, so possessives survive for a later possessive stage.
//!
//! ```text
//! "quick-fox"  -> "quick" "fox"
//! "PowerShot"  -> "Power" "Shot"
//! "SD500"      -> "SD" "500"
//! ```
//!
//! With `preserve_original` the unsplit token is emitted first and the
//! first sub-word is stacked on it (`position_increment = 0`). With
//! `catenate_words` the joined sub-words are stacked on the first sub-word.

use serde::{Deserialize, Serialize};

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Options for [`WordDelimiterFilter`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordDelimiterConfig {
    pub split_on_case_change: bool,
    pub split_on_numerics: bool,
    pub preserve_original: bool,
    pub catenate_words: bool,
}

impl Default for WordDelimiterConfig {
    fn default() -> Self {
        WordDelimiterConfig {
            split_on_case_change: true,
            split_on_numerics: true,
            preserve_original: false,
            catenate_words: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct WordDelimiterFilter {
    config: WordDelimiterConfig,
}

/// A sub-word as a character range of the parent token.
#[derive(Debug, PartialEq)]
struct Part {
    start: usize,
    end: usize,
}

#[derive(Clone, Copy, PartialEq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
    Other,
}

fn classify(c: char) -> CharClass {
    if c.is_numeric() {
        CharClass::Digit
    } else if c.is_uppercase() {
        CharClass::Upper
    } else if c.is_alphabetic() {
        CharClass::Lower
    } else {
        CharClass::Other
    }
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '\u{FF07}')
}

impl WordDelimiterFilter {
    pub fn new() -> Self {
        WordDelimiterFilter::default()
    }

    pub fn with_config(config: WordDelimiterConfig) -> Self {
        WordDelimiterFilter { config }
    }

    pub fn config(&self) -> &WordDelimiterConfig {
        &self.config
    }

    fn is_word_char(chars: &[char], i: usize) -> bool {
        let c = chars[i];
        if c.is_alphanumeric() {
            return true;
        }
        is_apostrophe(c)
            && i > 0
            && i + 1 < chars.len()
            && chars[i - 1].is_alphanumeric()
            && chars[i + 1].is_alphanumeric()
    }

    fn is_boundary(&self, prev: char, next: char) -> bool {
        let (a, b) = (classify(prev), classify(next));
        if self.config.split_on_case_change && a == CharClass::Lower && b == CharClass::Upper {
            return true;
        }
        if self.config.split_on_numerics {
            let a_letter = matches!(a, CharClass::Lower | CharClass::Upper);
            let b_letter = matches!(b, CharClass::Lower | CharClass::Upper);
            if (a_letter && b == CharClass::Digit) || (a == CharClass::Digit && b_letter) {
                return true;
            }
        }
        false
    }

    fn split(&self, chars: &[char]) -> Vec<Part> {
        let mut parts = Vec::new();
        let mut start: Option<usize> = None;
        // Last non-apostrophe character of the current part.
        let mut last: Option<char> = None;

        for i in 0..chars.len() {
            if !Self::is_word_char(chars, i) {
                if let Some(s) = start.take() {
                    parts.push(Part { start: s, end: i });
                }
                last = None;
                continue;
            }

            let c = chars[i];
            match start {
                None => start = Some(i),
                Some(s) => {
                    if !is_apostrophe(c) {
                        if let Some(prev) = last {
                            if self.is_boundary(prev, c) && !is_apostrophe(chars[i - 1]) {
                                parts.push(Part { start: s, end: i });
                                start = Some(i);
                            }
                        }
                    }
                }
            }
            if !is_apostrophe(c) {
                last = Some(c);
            }
        }

        if let Some(s) = start {
            parts.push(Part {
                start: s,
                end: chars.len(),
            });
        }

        parts
    }

    fn expand(&self, token: Token, out: &mut Vec<Token>) {
        let chars: Vec<char> = token.text.chars().collect();
        let parts = self.split(&chars);

        if parts.len() == 1 && parts[0].start == 0 && parts[0].end == chars.len() {
            out.push(token);
            return;
        }

        if parts.is_empty() {
            out.push(token.with_text(""));
            return;
        }

        // Offsets can only be refined when they line up with the token text.
        let aligned = token.end_offset.saturating_sub(token.start_offset) == chars.len();
        let make_part = |part: &Part| {
            let text: String = chars[part.start..part.end].iter().collect();
            let mut sub = token.with_text(text).with_token_type(TokenType::Subword);
            sub.position_length = 1;
            if aligned {
                sub.start_offset = token.start_offset + part.start;
                sub.end_offset = token.start_offset + part.end;
            }
            sub
        };

        let mut first_increment = token.position_increment;
        if self.config.preserve_original {
            out.push(token.clone().with_position_length(parts.len()));
            first_increment = 0;
        }

        for (i, part) in parts.iter().enumerate() {
            let increment = if i == 0 { first_increment } else { 1 };
            out.push(make_part(part).with_position_increment(increment));

            if i == 0 && self.config.catenate_words && parts.len() > 1 {
                let joined: String = parts
                    .iter()
                    .map(|p| chars[p.start..p.end].iter().collect::<String>())
                    .collect();
                let mut catenated = make_part(&parts[0])
                    .with_text(joined)
                    .with_position_increment(0)
                    .with_position_length(parts.len());
                if aligned {
                    catenated.end_offset = token.start_offset + parts[parts.len() - 1].end;
                }
                out.push(catenated);
            }
        }
    }
}

impl Filter for WordDelimiterFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut out = Vec::new();
        for token in tokens {
            if token.is_stopped() || token.keyword {
                out.push(token);
            } else {
                self.expand(token, &mut out);
            }
        }
        Ok(Box::new(out.into_iter()))
    }

    fn name(&self) -> &'static str {
        "word_delimiter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(filter: &WordDelimiterFilter, token: Token) -> Vec<Token> {
        filter
            .filter(Box::new(vec![token].into_iter()))
            .unwrap()
            .collect()
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_split_on_delimiters() {
        let filter = WordDelimiterFilter::new();
        let result = run(&filter, Token::with_offsets("quick-fox!", 4, 14));

        assert_eq!(texts(&result), vec!["quick", "fox"]);
        assert_eq!(result[0].start_offset, 4);
        assert_eq!(result[0].end_offset, 9);
        assert_eq!(result[1].start_offset, 10);
        assert_eq!(result[1].end_offset, 13);
        assert_eq!(result[0].position_increment, 1);
        assert_eq!(result[1].position_increment, 1);
    }

    #[test]
    fn test_split_on_case_and_numerics() {
        let filter = WordDelimiterFilter::new();

        assert_eq!(texts(&run(&filter, Token::new("PowerShot"))), vec!["Power", "Shot"]);
        assert_eq!(texts(&run(&filter, Token::new("SD500"))), vec!["SD", "500"]);
        assert_eq!(texts(&run(&filter, Token::new("wi-fi4u"))), vec!["wi", "fi", "4", "u"]);
    }

    #[test]
    fn test_disable_case_and_numeric_splits() {
        let filter = WordDelimiterFilter::with_config(WordDelimiterConfig {
            split_on_case_change: false,
            split_on_numerics: false,
            ..Default::default()
        });

        let result = run(&filter, Token::new("PowerShot500"));
        assert_eq!(texts(&result), vec!["PowerShot500"]);
    }

    #[test]
    fn test_apostrophe_inside_word_is_kept() {
        let filter = WordDelimiterFilter::new();

        assert_eq!(texts(&run(&filter, Token::new("fox's"))), vec!["fox's"]);
        assert_eq!(texts(&run(&filter, Token::new("dogs'"))), vec!["dogs"]);
        assert_eq!(texts(&run(&filter, Token::new("'quoted'"))), vec!["quoted"]);
    }

    #[test]
    fn test_preserve_original() {
        let filter = WordDelimiterFilter::with_config(WordDelimiterConfig {
            preserve_original: true,
            ..Default::default()
        });
        let result = run(&filter, Token::new("wi-fi"));

        assert_eq!(texts(&result), vec!["wi-fi", "wi", "fi"]);
        assert_eq!(result[0].position_increment, 1);
        assert_eq!(result[0].position_length, 2);
        assert_eq!(result[1].position_increment, 0);
        assert_eq!(result[2].position_increment, 1);
    }

    #[test]
    fn test_catenate_words() {
        let filter = WordDelimiterFilter::with_config(WordDelimiterConfig {
            catenate_words: true,
            ..Default::default()
        });
        let result = run(&filter, Token::with_offsets("wi-fi", 0, 5));

        assert_eq!(texts(&result), vec!["wi", "wifi", "fi"]);
        assert_eq!(result[1].position_increment, 0);
        assert_eq!(result[1].position_length, 2);
        assert_eq!(result[1].start_offset, 0);
        assert_eq!(result[1].end_offset, 5);
    }

    #[test]
    fn test_only_delimiters_becomes_empty() {
        let filter = WordDelimiterFilter::new();
        let result = run(&filter, Token::new("--"));

        assert_eq!(result.len(), 1);
        assert!(result[0].is_empty());
    }

    #[test]
    fn test_unaligned_offsets_are_inherited() {
        let filter = WordDelimiterFilter::new();
        let result = run(&filter, Token::with_offsets("a-b", 10, 20));

        assert_eq!(result[1].start_offset, 10);
        assert_eq!(result[1].end_offset, 20);
    }
}
