//! Command line argument parsing for the xiphos CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::document::parser::ParserKind;
use crate::search::config::FieldPreset;

/// xiphos - build inverted indexes over JSON corpora and write TREC runs
#[derive(Parser, Debug, Clone)]
#[command(name = "xiphos")]
#[command(about = "Multilingual BM25 indexing and TREC-style topic search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct XiphosArgs {
    /// Verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl XiphosArgs {
    /// Get the effective verbosity level (0=quiet, 1=normal, 2=debug, 3+=trace)
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build an index from a corpus directory
    ///
    /// The build holds INDEX_DIR/write.lock until it finishes. A build that
    /// was killed leaves the lock behind; delete it by hand before rebuilding.
    Index(IndexArgs),

    /// Run every topic of a topic file and write a run file
    Search(SearchArgs),

    /// Show the tokens an analyzer produces for a text
    Analyze(AnalyzeArgs),

    /// Show per-field statistics of a committed index
    Stats(StatsArgs),

    /// List the terms of a field with their frequencies
    Vocabulary(VocabularyArgs),

    /// Dump the postings of one term
    Postings(PostingsArgs),
}

/// Arguments for building an index
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Corpus directory
    #[arg(value_name = "DOCS_DIR")]
    pub docs_dir: PathBuf,

    /// Index directory (created if absent)
    #[arg(value_name = "INDEX_DIR")]
    pub index_dir: PathBuf,

    /// Parallel corpus combined record by record with DOCS_DIR
    #[arg(long, value_name = "DIR")]
    pub secondary_docs: Option<PathBuf>,

    /// Build configuration file (JSON); flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extension of the corpus files
    #[arg(short, long)]
    pub extension: Option<String>,

    /// Charset of the corpus files
    #[arg(long)]
    pub charset: Option<String>,

    /// RAM buffer in megabytes before postings are flushed
    #[arg(long, value_name = "MB")]
    pub ram_buffer: Option<f64>,

    /// Expected document count (warns on mismatch)
    #[arg(long)]
    pub expected_docs: Option<u64>,

    /// Corpus file format
    #[arg(long)]
    pub parser: Option<CorpusFormat>,

    /// BM25 k1 recorded with the index
    #[arg(long)]
    pub k1: Option<f64>,

    /// BM25 b recorded with the index
    #[arg(long)]
    pub b: Option<f64>,

    /// Write segments on the calling thread
    #[arg(long)]
    pub no_background_flush: bool,
}

/// Arguments for a search run
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Index directory
    #[arg(value_name = "INDEX_DIR")]
    pub index_dir: PathBuf,

    /// Topic XML file
    #[arg(value_name = "TOPICS")]
    pub topics: PathBuf,

    /// Directory receiving <RUN_ID>.txt
    #[arg(value_name = "RUN_DIR")]
    pub run_dir: PathBuf,

    /// Run identifier written on every line
    #[arg(value_name = "RUN_ID")]
    pub run_id: String,

    /// Field preset
    #[arg(short, long, default_value = "en-ngram", conflicts_with = "fields")]
    pub preset: FieldPreset,

    /// Explicit fields to search (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Documents retrieved per topic
    #[arg(short = 'k', long, default_value = "1000")]
    pub max_docs: usize,

    /// Expected topic count (warns on mismatch)
    #[arg(long)]
    pub expected_topics: Option<usize>,

    /// BM25 k1 (defaults to the value recorded in the index)
    #[arg(long)]
    pub k1: Option<f64>,

    /// BM25 b (defaults to the value recorded in the index)
    #[arg(long)]
    pub b: Option<f64>,

    /// Worker threads for topic evaluation
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Arguments for the analyzer dump
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Text to analyze
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Analyzer: english, french, keyword or ngramN
    #[arg(short, long, default_value = "english", conflicts_with = "index")]
    pub analyzer: String,

    /// Use the analyzer of FIELD in this index instead
    #[arg(long, value_name = "INDEX_DIR", requires = "field")]
    pub index: Option<PathBuf>,

    /// Field whose analyzer is used with --index
    #[arg(long)]
    pub field: Option<String>,
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Index directory
    #[arg(value_name = "INDEX_DIR")]
    pub index_dir: PathBuf,
}

/// Arguments for the vocabulary dump
#[derive(Parser, Debug, Clone)]
pub struct VocabularyArgs {
    /// Index directory
    #[arg(value_name = "INDEX_DIR")]
    pub index_dir: PathBuf,

    /// Field to list
    #[arg(value_name = "FIELD")]
    pub field: String,

    /// Only the N most frequent terms
    #[arg(short, long)]
    pub top: Option<usize>,
}

/// Arguments for the postings dump
#[derive(Parser, Debug, Clone)]
pub struct PostingsArgs {
    /// Index directory
    #[arg(value_name = "INDEX_DIR")]
    pub index_dir: PathBuf,

    /// Field of the term
    #[arg(value_name = "FIELD")]
    pub field: String,

    /// Indexed term (not analyzed)
    #[arg(value_name = "TERM")]
    pub term: String,
}

/// Corpus formats accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorpusFormat {
    /// One JSON array per file
    JsonArray,
    /// One JSON object per line
    JsonLines,
}

impl From<CorpusFormat> for ParserKind {
    fn from(format: CorpusFormat) -> Self {
        match format {
            CorpusFormat::JsonArray => ParserKind::JsonArray,
            CorpusFormat::JsonLines => ParserKind::JsonLines,
        }
    }
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_command() {
        let args = XiphosArgs::try_parse_from([
            "xiphos",
            "index",
            "/data/en",
            "/data/index",
            "--secondary-docs",
            "/data/fr",
            "--ram-buffer",
            "512",
            "--parser",
            "json-lines",
        ])
        .unwrap();

        if let Command::Index(index_args) = args.command {
            assert_eq!(index_args.docs_dir, PathBuf::from("/data/en"));
            assert_eq!(index_args.index_dir, PathBuf::from("/data/index"));
            assert_eq!(index_args.secondary_docs, Some(PathBuf::from("/data/fr")));
            assert_eq!(index_args.ram_buffer, Some(512.0));
            assert_eq!(index_args.parser, Some(CorpusFormat::JsonLines));
            assert!(!index_args.no_background_flush);
        } else {
            panic!("Expected Index command");
        }
    }

    #[test]
    fn test_search_command() {
        let args = XiphosArgs::try_parse_from([
            "xiphos",
            "search",
            "/data/index",
            "topics.xml",
            "runs",
            "bm25-en",
            "--preset",
            "en-fr-ngram",
            "-k",
            "100",
        ])
        .unwrap();

        if let Command::Search(search_args) = args.command {
            assert_eq!(search_args.run_id, "bm25-en");
            assert_eq!(search_args.preset, FieldPreset::EnFrNgram);
            assert_eq!(search_args.max_docs, 100);
            assert!(search_args.fields.is_empty());
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_search_explicit_fields() {
        let args = XiphosArgs::try_parse_from([
            "xiphos",
            "search",
            "idx",
            "t.xml",
            "runs",
            "r",
            "--fields",
            "english_body,ngram",
        ])
        .unwrap();

        if let Command::Search(search_args) = args.command {
            assert_eq!(search_args.fields, vec!["english_body", "ngram"]);
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_analyze_requires_field_with_index() {
        assert!(XiphosArgs::try_parse_from(["xiphos", "analyze", "text", "--index", "idx"]).is_err());
        assert!(
            XiphosArgs::try_parse_from([
                "xiphos", "analyze", "text", "--index", "idx", "--field", "ngram"
            ])
            .is_ok()
        );
    }

    #[test]
    fn test_verbosity_levels() {
        let args = XiphosArgs::try_parse_from(["xiphos", "stats", "idx"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = XiphosArgs::try_parse_from(["xiphos", "-vv", "stats", "idx"]).unwrap();
        assert_eq!(args.verbosity(), 3);

        let args = XiphosArgs::try_parse_from(["xiphos", "--quiet", "stats", "idx"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_index_help_mentions_stale_lock() {
        use clap::CommandFactory;

        let command = XiphosArgs::command();
        let index = command.find_subcommand("index").unwrap();
        let help = index.get_long_about().unwrap().to_string();
        assert!(help.contains("write.lock"));
    }

    #[test]
    fn test_output_format() {
        let args =
            XiphosArgs::try_parse_from(["xiphos", "--format", "json", "stats", "idx"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
