//! Analyzers combine a tokenizer with an ordered list of filters.
//!
//! ```text
//! Raw Text → Tokenizer → Filter 1 → ... → Filter N → Token Stream
//! ```
//!
//! - [`pipeline::PipelineAnalyzer`] is the generic tokenizer + filters chain.
//! - [`variant::AnalyzerVariant`] is the serializable description of a
//!   pipeline (english, french, ngram, keyword, custom) and
//!   [`variant::AnalyzerFactory`] turns it into a shared analyzer.
//! - [`per_field::PerFieldAnalyzer`] maps index fields to analyzers.
//!
//! Analysis is deterministic: the same text and configuration always yield
//! the same token sequence.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// The main analysis interface.
pub trait Analyzer: Send + Sync {
    /// Analyze text into a finite token stream.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Name used in logs and token dumps.
    fn name(&self) -> &str;

    /// Analyze text and keep only the term texts.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}

pub mod per_field;
pub mod pipeline;
pub mod variant;
