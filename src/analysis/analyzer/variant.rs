//! Named analyzer variants and the factory that builds them.
//!
//! | variant   | stages                                                                        |
//! |-----------|-------------------------------------------------------------------------------|
//! | `english` | whitespace, lowercase, strip, word_delimiter, possessive, stop, remove_empty  |
//! | `french`  | standard, lowercase                                                           |
//! | `ngram`   | whitespace, lowercase, alpha, remove_empty, ngram(n)                          |
//! | `keyword` | keyword                                                                       |
//! | `custom`  | as listed                                                                     |
//!
//! `english` and `french` append a Snowball stemmer when `stem` is set.
//!
//! # Examples
//!
//! ```
//! use xiphos::analysis::analyzer::variant::{AnalyzerFactory, AnalyzerVariant};
//!
//! let mut factory = AnalyzerFactory::new();
//! let english = factory.build(&AnalyzerVariant::english()).unwrap();
//! assert_eq!(english.terms("The Quick-Fox!").unwrap(), vec!["quick", "fox"]);
//!
//! let ngram = factory.build(&AnalyzerVariant::ngram(3)).unwrap();
//! assert_eq!(ngram.terms("cats").unwrap(), vec!["cat", "ats"]);
//! ```

use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::stopwords::{StopwordSet, StopwordSource};
use crate::analysis::token_filter::Filter;
use crate::analysis::token_filter::alpha::AlphaFilter;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::ngram::NgramFilter;
use crate::analysis::token_filter::possessive::PossessiveFilter;
use crate::analysis::token_filter::remove_empty::RemoveEmptyFilter;
use crate::analysis::token_filter::snowball::{SnowballFilter, SnowballLanguage};
use crate::analysis::token_filter::stop::StopFilter;
use crate::analysis::token_filter::strip::{DEFAULT_STRIP_CLASS, StripFilter};
use crate::analysis::token_filter::word_delimiter::{WordDelimiterConfig, WordDelimiterFilter};
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::keyword::KeywordTokenizer;
use crate::analysis::tokenizer::standard::StandardTokenizer;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::error::{Result, XiphosError};

fn default_strip_class() -> String {
    DEFAULT_STRIP_CLASS.to_string()
}

/// Tokenizer choice for custom pipelines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    Whitespace,
    Standard,
    Keyword,
}

/// One filter stage of a custom pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterConfig {
    Lowercase,
    Strip {
        #[serde(default = "default_strip_class")]
        class: String,
    },
    WordDelimiter(WordDelimiterConfig),
    Possessive,
    Stop {
        stopwords: StopwordSource,
    },
    RemoveEmpty,
    Alpha,
    Ngram {
        n: usize,
    },
    Snowball {
        language: SnowballLanguage,
    },
}

/// Serializable description of an analysis pipeline.
///
/// The resolved variant is stored with every index field so that query
/// analysis is rebuilt from exactly the configuration used at index time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyzerVariant {
    English {
        #[serde(default)]
        stopwords: StopwordSource,
        #[serde(default = "default_strip_class")]
        strip_class: String,
        #[serde(default)]
        word_delimiter: WordDelimiterConfig,
        #[serde(default)]
        stem: bool,
    },
    French {
        #[serde(default)]
        stem: bool,
    },
    Ngram {
        n: usize,
    },
    Keyword,
    Custom {
        tokenizer: TokenizerKind,
        #[serde(default)]
        filters: Vec<FilterConfig>,
    },
}

impl AnalyzerVariant {
    /// English with the terrier stop list.
    pub fn english() -> Self {
        AnalyzerVariant::English {
            stopwords: StopwordSource::terrier(),
            strip_class: default_strip_class(),
            word_delimiter: WordDelimiterConfig::default(),
            stem: false,
        }
    }

    pub fn english_with_stopwords(stopwords: StopwordSource) -> Self {
        match Self::english() {
            AnalyzerVariant::English {
                strip_class,
                word_delimiter,
                stem,
                ..
            } => AnalyzerVariant::English {
                stopwords,
                strip_class,
                word_delimiter,
                stem,
            },
            other => other,
        }
    }

    pub fn french() -> Self {
        AnalyzerVariant::French { stem: false }
    }

    pub fn ngram(n: usize) -> Self {
        AnalyzerVariant::Ngram { n }
    }

    /// Short label: `english`, `french`, `ngram3`, `keyword`, `custom`.
    pub fn label(&self) -> String {
        match self {
            AnalyzerVariant::English { .. } => "english".to_string(),
            AnalyzerVariant::French { .. } => "french".to_string(),
            AnalyzerVariant::Ngram { n } => format!("ngram{n}"),
            AnalyzerVariant::Keyword => "keyword".to_string(),
            AnalyzerVariant::Custom { .. } => "custom".to_string(),
        }
    }

    /// Check parameters and inline file-based stopword lists.
    pub fn resolve(&self) -> Result<AnalyzerVariant> {
        match self {
            AnalyzerVariant::English {
                stopwords,
                strip_class,
                word_delimiter,
                stem,
            } => {
                StripFilter::with_class(strip_class)?;
                Ok(AnalyzerVariant::English {
                    stopwords: stopwords.resolve()?,
                    strip_class: strip_class.clone(),
                    word_delimiter: word_delimiter.clone(),
                    stem: *stem,
                })
            }
            AnalyzerVariant::Ngram { n } => {
                NgramFilter::new(*n)?;
                Ok(self.clone())
            }
            AnalyzerVariant::Custom { tokenizer, filters } => {
                let filters = filters
                    .iter()
                    .map(|filter| match filter {
                        FilterConfig::Stop { stopwords } => Ok(FilterConfig::Stop {
                            stopwords: stopwords.resolve()?,
                        }),
                        FilterConfig::Strip { class } => {
                            StripFilter::with_class(class)?;
                            Ok(filter.clone())
                        }
                        FilterConfig::Ngram { n } => {
                            NgramFilter::new(*n)?;
                            Ok(filter.clone())
                        }
                        other => Ok(other.clone()),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(AnalyzerVariant::Custom {
                    tokenizer: *tokenizer,
                    filters,
                })
            }
            AnalyzerVariant::French { .. } | AnalyzerVariant::Keyword => Ok(self.clone()),
        }
    }
}

/// Builds analyzers from variants, loading each stopword source once and
/// sharing it between every pipeline that uses it.
#[derive(Default)]
pub struct AnalyzerFactory {
    stopwords: AHashMap<StopwordSource, Arc<StopwordSet>>,
}

impl AnalyzerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared stopword set for `source`, loaded on first use.
    pub fn stopwords(&mut self, source: &StopwordSource) -> Result<Arc<StopwordSet>> {
        if let Some(set) = self.stopwords.get(source) {
            return Ok(Arc::clone(set));
        }
        let set = Arc::new(source.load()?);
        self.stopwords.insert(source.clone(), Arc::clone(&set));
        Ok(set)
    }

    pub fn build(&mut self, variant: &AnalyzerVariant) -> Result<Arc<dyn Analyzer>> {
        let pipeline = match variant {
            AnalyzerVariant::English {
                stopwords,
                strip_class,
                word_delimiter,
                stem,
            } => {
                let stopwords = self.stopwords(stopwords)?;
                let mut pipeline = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
                    .add_filter(Arc::new(LowercaseFilter::new()))
                    .add_filter(Arc::new(StripFilter::with_class(strip_class)?))
                    .add_filter(Arc::new(WordDelimiterFilter::with_config(
                        word_delimiter.clone(),
                    )))
                    .add_filter(Arc::new(PossessiveFilter::new()))
                    .add_filter(Arc::new(StopFilter::new(stopwords)))
                    .add_filter(Arc::new(RemoveEmptyFilter::new()));
                if *stem {
                    pipeline = pipeline
                        .add_filter(Arc::new(SnowballFilter::new(SnowballLanguage::English)));
                }
                pipeline
            }
            AnalyzerVariant::French { stem } => {
                let mut pipeline = PipelineAnalyzer::new(Arc::new(StandardTokenizer::new()))
                    .add_filter(Arc::new(LowercaseFilter::new()));
                if *stem {
                    pipeline = pipeline
                        .add_filter(Arc::new(SnowballFilter::new(SnowballLanguage::French)));
                }
                pipeline
            }
            AnalyzerVariant::Ngram { n } => {
                PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
                    .add_filter(Arc::new(LowercaseFilter::new()))
                    .add_filter(Arc::new(AlphaFilter::new()))
                    .add_filter(Arc::new(RemoveEmptyFilter::new()))
                    .add_filter(Arc::new(NgramFilter::new(*n)?))
            }
            AnalyzerVariant::Keyword => PipelineAnalyzer::new(Arc::new(KeywordTokenizer::new())),
            AnalyzerVariant::Custom { tokenizer, filters } => {
                let tokenizer: Arc<dyn Tokenizer> = match tokenizer {
                    TokenizerKind::Whitespace => Arc::new(WhitespaceTokenizer::new()),
                    TokenizerKind::Standard => Arc::new(StandardTokenizer::new()),
                    TokenizerKind::Keyword => Arc::new(KeywordTokenizer::new()),
                };
                let mut pipeline = PipelineAnalyzer::new(tokenizer);
                for filter in filters {
                    pipeline = pipeline.add_filter(self.build_filter(filter)?);
                }
                pipeline
            }
        };

        Ok(Arc::new(pipeline.with_name(variant.label())))
    }

    fn build_filter(&mut self, config: &FilterConfig) -> Result<Arc<dyn Filter>> {
        let filter: Arc<dyn Filter> = match config {
            FilterConfig::Lowercase => Arc::new(LowercaseFilter::new()),
            FilterConfig::Strip { class } => Arc::new(StripFilter::with_class(class)?),
            FilterConfig::WordDelimiter(options) => {
                Arc::new(WordDelimiterFilter::with_config(options.clone()))
            }
            FilterConfig::Possessive => Arc::new(PossessiveFilter::new()),
            FilterConfig::Stop { stopwords } => Arc::new(StopFilter::new(self.stopwords(stopwords)?)),
            FilterConfig::RemoveEmpty => Arc::new(RemoveEmptyFilter::new()),
            FilterConfig::Alpha => Arc::new(AlphaFilter::new()),
            FilterConfig::Ngram { n } => Arc::new(NgramFilter::new(*n)?),
            FilterConfig::Snowball { language } => Arc::new(SnowballFilter::new(*language)),
        };
        Ok(filter)
    }
}

/// Parse a variant label such as `english`, `french`, `keyword` or `ngram4`.
pub fn parse_variant_label(label: &str) -> Result<AnalyzerVariant> {
    match label {
        "english" => Ok(AnalyzerVariant::english()),
        "french" => Ok(AnalyzerVariant::french()),
        "keyword" => Ok(AnalyzerVariant::Keyword),
        other => {
            let n = other
                .strip_prefix("ngram")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| XiphosError::invalid_config(format!("Unknown analyzer: {other}")))?;
            Ok(AnalyzerVariant::ngram(n))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(variant: &AnalyzerVariant, text: &str) -> Vec<String> {
        AnalyzerFactory::new().build(variant).unwrap().terms(text).unwrap()
    }

    #[test]
    fn test_english_pipeline() {
        let variant = AnalyzerVariant::english_with_stopwords(StopwordSource::Inline {
            name: "test".to_string(),
            words: vec!["the".to_string()],
        });

        assert_eq!(terms(&variant, "The Quick-Fox!"), vec!["quick", "fox"]);
    }

    #[test]
    fn test_english_possessive_and_stopwords() {
        let variant = AnalyzerVariant::english();
        assert_eq!(
            terms(&variant, "The fox's den, and the dogs' bowls"),
            vec!["fox", "den", "dogs", "bowls"]
        );
    }

    #[test]
    fn test_english_offsets_and_positions() {
        let analyzer = AnalyzerFactory::new()
            .build(&AnalyzerVariant::english())
            .unwrap();
        let tokens: Vec<_> = analyzer.analyze("The Quick-Fox!").unwrap().collect();

        assert_eq!(tokens[0].start_offset, 4);
        assert_eq!(tokens[0].end_offset, 9);
        assert_eq!(tokens[0].position_increment, 2);
        assert_eq!(tokens[1].start_offset, 10);
        assert_eq!(tokens[1].end_offset, 13);
    }

    #[test]
    fn test_english_with_stemming() {
        let variant = match AnalyzerVariant::english() {
            AnalyzerVariant::English {
                stopwords,
                strip_class,
                word_delimiter,
                ..
            } => AnalyzerVariant::English {
                stopwords,
                strip_class,
                word_delimiter,
                stem: true,
            },
            other => other,
        };
        assert_eq!(terms(&variant, "Running cats"), vec!["run", "cat"]);
    }

    #[test]
    fn test_french_pipeline() {
        assert_eq!(
            terms(&AnalyzerVariant::french(), "Le Chat, la Souris."),
            vec!["le", "chat", "la", "souris"]
        );
    }

    #[test]
    fn test_ngram_pipeline() {
        assert_eq!(terms(&AnalyzerVariant::ngram(3), "cats"), vec!["cat", "ats"]);
        assert!(terms(&AnalyzerVariant::ngram(3), "ca").is_empty());
        assert_eq!(
            terms(&AnalyzerVariant::ngram(3), "Dogs, 1,500 x!"),
            vec!["dog", "ogs"]
        );
    }

    #[test]
    fn test_custom_pipeline() {
        let variant = AnalyzerVariant::Custom {
            tokenizer: TokenizerKind::Standard,
            filters: vec![
                FilterConfig::Lowercase,
                FilterConfig::Stop {
                    stopwords: StopwordSource::Inline {
                        name: "fr".to_string(),
                        words: vec!["le".to_string()],
                    },
                },
            ],
        };
        assert_eq!(terms(&variant, "Le chat"), vec!["chat"]);
    }

    #[test]
    fn test_stopwords_are_shared() {
        let mut factory = AnalyzerFactory::new();
        let first = factory.stopwords(&StopwordSource::terrier()).unwrap();
        let second = factory.stopwords(&StopwordSource::terrier()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_resolve_rejects_bad_parameters() {
        assert!(AnalyzerVariant::ngram(0).resolve().is_err());
        let bad_builtin = AnalyzerVariant::english_with_stopwords(StopwordSource::Builtin {
            name: "nope".to_string(),
        });
        assert!(bad_builtin.resolve().is_err());
    }

    #[test]
    fn test_variant_serde() {
        let json = serde_json::to_string(&AnalyzerVariant::ngram(4)).unwrap();
        assert_eq!(json, r#"{"type":"ngram","n":4}"#);

        let variant: AnalyzerVariant = serde_json::from_str(r#"{"type":"english"}"#).unwrap();
        assert_eq!(variant, AnalyzerVariant::english());
    }

    #[test]
    fn test_parse_variant_label() {
        assert_eq!(parse_variant_label("ngram5").unwrap(), AnalyzerVariant::ngram(5));
        assert_eq!(parse_variant_label("french").unwrap(), AnalyzerVariant::french());
        assert!(parse_variant_label("german").is_err());
        assert!(parse_variant_label("ngramx").is_err());
    }
}
