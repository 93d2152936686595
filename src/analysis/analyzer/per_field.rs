//! Per-field analyzer.
//!
//! Unlike a catch-all default, an unknown field is an error: a field must be
//! analyzed at query time by the analyzer that indexed it.

use std::sync::Arc;

use ahash::AHashMap;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::error::{Result, XiphosError};

#[derive(Clone, Default)]
pub struct PerFieldAnalyzer {
    field_analyzers: AHashMap<String, Arc<dyn Analyzer>>,
}

impl PerFieldAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_analyzer(&mut self, field: impl Into<String>, analyzer: Arc<dyn Analyzer>) {
        self.field_analyzers.insert(field.into(), analyzer);
    }

    pub fn get_analyzer(&self, field: &str) -> Result<&Arc<dyn Analyzer>> {
        self.field_analyzers
            .get(field)
            .ok_or_else(|| XiphosError::analysis(format!("No analyzer configured for field {field}")))
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.field_analyzers.contains_key(field)
    }

    pub fn analyze_field(&self, field: &str, text: &str) -> Result<TokenStream> {
        self.get_analyzer(field)?.analyze(text)
    }

    /// Field names in sorted order.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.field_analyzers.keys().map(String::as_str).collect();
        fields.sort_unstable();
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
    use crate::analysis::token_filter::lowercase::LowercaseFilter;
    use crate::analysis::tokenizer::keyword::KeywordTokenizer;
    use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;

    fn analyzer() -> PerFieldAnalyzer {
        let mut analyzer = PerFieldAnalyzer::new();
        analyzer.add_analyzer(
            "body",
            Arc::new(
                PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
                    .add_filter(Arc::new(LowercaseFilter::new())),
            ),
        );
        analyzer.add_analyzer(
            "id",
            Arc::new(PipelineAnalyzer::new(Arc::new(KeywordTokenizer::new()))),
        );
        analyzer
    }

    #[test]
    fn test_per_field_analyzer() {
        let analyzer = analyzer();

        let tokens: Vec<_> = analyzer.analyze_field("body", "Hello World").unwrap().collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "hello");

        let tokens: Vec<_> = analyzer.analyze_field("id", "Hello World").unwrap().collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "Hello World");

        assert_eq!(analyzer.fields(), vec!["body", "id"]);
    }

    #[test]
    fn test_unknown_field_is_error() {
        let analyzer = analyzer();
        assert!(!analyzer.contains_field("title"));
        assert!(analyzer.analyze_field("title", "x").is_err());
    }
}
