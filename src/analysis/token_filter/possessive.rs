//! English possessive filter: `fox's` becomes `fox`.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Removes a trailing `'s` (straight, curly or fullwidth apostrophe).
#[derive(Clone, Debug, Default)]
pub struct PossessiveFilter;

impl PossessiveFilter {
    pub fn new() -> Self {
        PossessiveFilter
    }

    fn strip(text: &str) -> Option<&str> {
        let mut chars = text.char_indices().rev();
        let (_, last) = chars.next()?;
        let (apostrophe_at, apostrophe) = chars.next()?;
        if matches!(last, 's' | 'S') && matches!(apostrophe, '\'' | '\u{2019}' | '\u{FF07}') {
            Some(&text[..apostrophe_at])
        } else {
            None
        }
    }
}

impl Filter for PossessiveFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.is_stopped() || token.keyword {
                return token;
            }
            match Self::strip(&token.text) {
                Some(stem) => {
                    let stem = stem.to_string();
                    token.with_text(stem)
                }
                None => token,
            }
        })))
    }

    fn name(&self) -> &'static str {
        "possessive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_possessive_filter() {
        let filter = PossessiveFilter::new();
        let tokens = vec![
            Token::new("fox's"),
            Token::new("JAMES’S"),
            Token::new("its"),
            Token::new("'s"),
            Token::new("s"),
        ];

        let result: Vec<String> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|t| t.text)
            .collect();

        assert_eq!(result, vec!["fox", "JAMES", "its", "", "s"]);
    }
}
