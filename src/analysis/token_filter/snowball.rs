//! Snowball stemming filter backed by `rust-stemmers`.

use std::fmt;
use std::sync::Arc;

use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Languages with a Snowball stemmer available to analyzers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnowballLanguage {
    English,
    French,
}

impl SnowballLanguage {
    fn algorithm(self) -> Algorithm {
        match self {
            SnowballLanguage::English => Algorithm::English,
            SnowballLanguage::French => Algorithm::French,
        }
    }
}

#[derive(Clone)]
pub struct SnowballFilter {
    language: SnowballLanguage,
    stemmer: Arc<Stemmer>,
}

impl SnowballFilter {
    pub fn new(language: SnowballLanguage) -> Self {
        SnowballFilter {
            language,
            stemmer: Arc::new(Stemmer::create(language.algorithm())),
        }
    }

    pub fn language(&self) -> SnowballLanguage {
        self.language
    }
}

impl fmt::Debug for SnowballFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowballFilter")
            .field("language", &self.language)
            .finish()
    }
}

impl Filter for SnowballFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stemmer = Arc::clone(&self.stemmer);
        Ok(Box::new(tokens.map(move |token| {
            if token.is_stopped() || token.keyword {
                return token;
            }
            let stem = stemmer.stem(&token.text).into_owned();
            token.with_text(stem)
        })))
    }

    fn name(&self) -> &'static str {
        "snowball"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    fn stem(language: SnowballLanguage, word: &str) -> String {
        SnowballFilter::new(language)
            .filter(Box::new(vec![Token::new(word)].into_iter()))
            .unwrap()
            .next()
            .unwrap()
            .text
    }

    #[test]
    fn test_english_stemming() {
        assert_eq!(stem(SnowballLanguage::English, "running"), "run");
        assert_eq!(stem(SnowballLanguage::English, "cats"), "cat");
    }

    #[test]
    fn test_french_stemming() {
        assert_eq!(stem(SnowballLanguage::French, "chevaux"), "cheval");
    }

    #[test]
    fn test_keyword_not_stemmed() {
        let filter = SnowballFilter::new(SnowballLanguage::English);
        let result: Vec<Token> = filter
            .filter(Box::new(vec![Token::new("running").as_keyword()].into_iter()))
            .unwrap()
            .collect();

        assert_eq!(result[0].text, "running");
    }
}
