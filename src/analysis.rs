//! Text analysis: tokenizers, token filters and analyzer pipelines.
//!
//! The same analyzer configuration is used when a field is indexed and when
//! a topic is turned into query terms for that field.

pub mod analyzer;
pub mod stopwords;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
