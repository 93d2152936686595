//! Output formatting for CLI commands.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::args::{OutputFormat, XiphosArgs};
use crate::error::Result;

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn render_human(&self) -> String;
}

/// Result of an index build.
#[derive(Debug, Serialize)]
pub struct IndexBuildResult {
    pub index_dir: PathBuf,
    pub documents: u64,
    pub flushes: u32,
    pub terms: u64,
    pub postings: u64,
    pub bytes_written: u64,
    pub duration_ms: u64,
    pub docs_per_second: f64,
}

/// Result of a search run.
#[derive(Debug, Serialize)]
pub struct SearchRunResult {
    pub run_file: PathBuf,
    pub topics: usize,
    pub lines: usize,
    pub empty_topics: usize,
    pub duration_ms: u64,
}

/// One analyzed token.
#[derive(Debug, Serialize)]
pub struct TokenRow {
    pub text: String,
    pub token_type: &'static str,
    pub start_offset: usize,
    pub end_offset: usize,
    pub position_increment: usize,
    pub position_length: usize,
}

/// Token dump of the `analyze` command.
#[derive(Debug, Serialize)]
pub struct AnalysisResult {
    pub analyzer: String,
    pub tokens: Vec<TokenRow>,
}

/// Statistics of one field.
#[derive(Debug, Serialize)]
pub struct FieldStatsRow {
    pub field: String,
    pub analyzer: String,
    pub documents: u64,
    pub total_tokens: u64,
    pub average_length: f64,
    pub unique_terms: usize,
}

/// Index statistics.
#[derive(Debug, Serialize)]
pub struct IndexStatsResult {
    pub documents: u64,
    pub segments: usize,
    pub index_size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub k1: f64,
    pub b: f64,
    pub fields: Vec<FieldStatsRow>,
}

/// Term frequencies of one term.
#[derive(Debug, Serialize)]
pub struct TermRow {
    pub term: String,
    pub doc_freq: u64,
    pub collection_freq: u64,
}

#[derive(Debug, Serialize)]
pub struct VocabularyResult {
    pub field: String,
    pub unique_terms: usize,
    pub terms: Vec<TermRow>,
}

/// One posting with its external identifier.
#[derive(Debug, Serialize)]
pub struct PostingRow {
    pub doc: u32,
    pub identifier: String,
    pub tf: u32,
}

#[derive(Debug, Serialize)]
pub struct PostingsResult {
    pub field: String,
    pub term: String,
    pub doc_freq: u64,
    pub collection_freq: u64,
    pub postings: Vec<PostingRow>,
}

/// Output a result in the selected format.
pub fn output_result<T: Serialize + HumanOutput>(result: &T, args: &XiphosArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            print!("{}", result.render_human());
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
            Ok(())
        }
    }
}

impl HumanOutput for IndexBuildResult {
    fn render_human(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Index: {}\n", self.index_dir.display()));
        out.push_str(&format!("Documents: {}\n", self.documents));
        out.push_str(&format!("Segments: {}\n", self.flushes));
        out.push_str(&format!("Terms: {}\n", self.terms));
        out.push_str(&format!("Postings: {}\n", self.postings));
        out.push_str(&format!("Size: {}\n", format_bytes(self.bytes_written)));
        out.push_str(&format!(
            "Time: {}ms ({:.1} docs/s)\n",
            self.duration_ms, self.docs_per_second
        ));
        out
    }
}

impl HumanOutput for SearchRunResult {
    fn render_human(&self) -> String {
        format!(
            "Run file: {}\nTopics: {} ({} without results)\nLines: {}\nTime: {}ms\n",
            self.run_file.display(),
            self.topics,
            self.empty_topics,
            self.lines,
            self.duration_ms
        )
    }
}

impl HumanOutput for AnalysisResult {
    fn render_human(&self) -> String {
        let mut out = format!("Analyzer: {}\n", self.analyzer);
        if self.tokens.is_empty() {
            out.push_str("(no tokens)\n");
        }
        for token in &self.tokens {
            out.push_str(&format!(
                "{:<20} {:<10} [{}..{}] +{} len {}\n",
                token.text,
                token.token_type,
                token.start_offset,
                token.end_offset,
                token.position_increment,
                token.position_length
            ));
        }
        out
    }
}

impl HumanOutput for IndexStatsResult {
    fn render_human(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Documents: {}\n", self.documents));
        out.push_str(&format!("Segments: {}\n", self.segments));
        out.push_str(&format!("Size: {}\n", format_bytes(self.index_size_bytes)));
        out.push_str(&format!("Committed: {}\n", self.created_at.to_rfc3339()));
        out.push_str(&format!("BM25: k1={} b={}\n\n", self.k1, self.b));
        out.push_str(&format!(
            "{:<16} {:<10} {:>10} {:>14} {:>10} {:>12}\n",
            "field", "analyzer", "docs", "tokens", "avg len", "unique"
        ));
        for field in &self.fields {
            out.push_str(&format!(
                "{:<16} {:<10} {:>10} {:>14} {:>10.2} {:>12}\n",
                field.field,
                field.analyzer,
                field.documents,
                field.total_tokens,
                field.average_length,
                field.unique_terms
            ));
        }
        out
    }
}

impl HumanOutput for VocabularyResult {
    fn render_human(&self) -> String {
        let mut out = format!(
            "Field {} ({} unique terms)\n{:<24} {:>10} {:>12}\n",
            self.field, self.unique_terms, "term", "df", "cf"
        );
        for term in &self.terms {
            out.push_str(&format!(
                "{:<24} {:>10} {:>12}\n",
                term.term, term.doc_freq, term.collection_freq
            ));
        }
        out
    }
}

impl HumanOutput for PostingsResult {
    fn render_human(&self) -> String {
        let mut out = format!(
            "{}:{} df={} cf={}\n",
            self.field, self.term, self.doc_freq, self.collection_freq
        );
        for posting in &self.postings {
            out.push_str(&format!(
                "{:>10} {:<24} {:>6}\n",
                posting.doc, posting.identifier, posting.tf
            ));
        }
        out
    }
}

/// Format bytes in human-readable format.
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_render_postings() {
        let result = PostingsResult {
            field: "english_body".to_string(),
            term: "fox".to_string(),
            doc_freq: 1,
            collection_freq: 2,
            postings: vec![PostingRow {
                doc: 3,
                identifier: "d4".to_string(),
                tf: 2,
            }],
        };
        let text = result.render_human();
        assert!(text.starts_with("english_body:fox df=1 cf=2\n"));
        assert!(text.contains("d4"));
    }

    #[test]
    fn test_render_empty_analysis() {
        let result = AnalysisResult {
            analyzer: "english".to_string(),
            tokens: Vec::new(),
        };
        assert_eq!(result.render_human(), "Analyzer: english\n(no tokens)\n");
    }
}
