//! Command implementations for the xiphos CLI.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::info;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::variant::{AnalyzerFactory, parse_variant_label};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{Result, XiphosError};
use crate::index::builder::build_index;
use crate::index::config::IndexConfig;
use crate::index::reader::IndexReader;
use crate::search::bm25::Bm25Params;
use crate::search::config::SearchConfig;
use crate::search::searcher::search_topics;

/// Execute a CLI command.
pub fn execute_command(args: XiphosArgs) -> Result<()> {
    match &args.command {
        Command::Index(index_args) => run_index(index_args, &args),
        Command::Search(search_args) => run_search(search_args, &args),
        Command::Analyze(analyze_args) => run_analyze(analyze_args, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &args),
        Command::Vocabulary(vocabulary_args) => show_vocabulary(vocabulary_args, &args),
        Command::Postings(postings_args) => show_postings(postings_args, &args),
    }
}

/// Load a JSON build configuration.
fn load_index_config(path: &Path) -> Result<IndexConfig> {
    let file = File::open(path).map_err(|e| {
        XiphosError::invalid_config(format!("Cannot read config {}: {e}", path.display()))
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Merge the config file (if any) with the command line flags.
pub fn index_config(args: &IndexArgs) -> Result<IndexConfig> {
    let mut config = match &args.config {
        Some(path) => load_index_config(path)?,
        None => IndexConfig::default(),
    };

    config.docs_dir = args.docs_dir.clone();
    config.index_dir = args.index_dir.clone();
    if let Some(secondary) = &args.secondary_docs {
        config.secondary_docs_dir = Some(secondary.clone());
    }
    if let Some(extension) = &args.extension {
        config.extension = extension.clone();
    }
    if let Some(charset) = &args.charset {
        config.charset = charset.clone();
    }
    if let Some(ram_buffer) = args.ram_buffer {
        config.ram_buffer_mb = ram_buffer;
    }
    if let Some(expected) = args.expected_docs {
        config.expected_docs = Some(expected);
    }
    if let Some(parser) = args.parser {
        config.parser = parser.into();
    }
    if let Some(k1) = args.k1 {
        config.bm25.k1 = k1;
    }
    if let Some(b) = args.b {
        config.bm25.b = b;
    }
    if args.no_background_flush {
        config.background_flush = false;
    }
    Ok(config)
}

/// Map search flags onto a run configuration.
pub fn search_config(args: &SearchArgs) -> Result<SearchConfig> {
    let mut config = SearchConfig::new(&args.index_dir, &args.topics, &args.run_dir, &args.run_id)
        .with_preset(args.preset);
    if !args.fields.is_empty() {
        config.fields = args.fields.clone();
    }
    config.max_docs_retrieved = args.max_docs;
    config.expected_topics = args.expected_topics;
    config.threads = args.threads;

    // A single override keeps the other parameter at its default.
    if args.k1.is_some() || args.b.is_some() {
        let defaults = Bm25Params::default();
        config.bm25 = Some(Bm25Params::new(
            args.k1.unwrap_or(defaults.k1),
            args.b.unwrap_or(defaults.b),
        )?);
    }
    Ok(config)
}

fn run_index(args: &IndexArgs, cli_args: &XiphosArgs) -> Result<()> {
    let config = index_config(args)?;
    info!(
        "Indexing {} into {}",
        config.docs_dir.display(),
        config.index_dir.display()
    );

    let start_time = Instant::now();
    let stats = build_index(&config)?;
    let duration = start_time.elapsed();

    output_result(
        &IndexBuildResult {
            index_dir: config.index_dir.clone(),
            documents: stats.docs_added,
            flushes: stats.flushes,
            terms: stats.terms,
            postings: stats.postings,
            bytes_written: stats.bytes_written,
            duration_ms: duration.as_millis() as u64,
            docs_per_second: if duration.as_secs_f64() > 0.0 {
                stats.docs_added as f64 / duration.as_secs_f64()
            } else {
                0.0
            },
        },
        cli_args,
    )
}

fn run_search(args: &SearchArgs, cli_args: &XiphosArgs) -> Result<()> {
    let config = search_config(args)?;

    let start_time = Instant::now();
    let summary = search_topics(&config)?;

    output_result(
        &SearchRunResult {
            run_file: summary.run_path,
            topics: summary.topics,
            lines: summary.lines,
            empty_topics: summary.empty_topics,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

fn run_analyze(args: &AnalyzeArgs, cli_args: &XiphosArgs) -> Result<()> {
    let (label, analyzer): (String, Arc<dyn Analyzer>) = match (&args.index, &args.field) {
        (Some(index_dir), Some(field)) => {
            let reader = IndexReader::open(index_dir)?;
            let analyzers = reader.analyzers()?;
            let analyzer = Arc::clone(analyzers.get_analyzer(field)?);
            (format!("{field} ({})", analyzer.name()), analyzer)
        }
        _ => {
            let variant = parse_variant_label(&args.analyzer)?.resolve()?;
            let analyzer = AnalyzerFactory::new().build(&variant)?;
            (variant.label(), analyzer)
        }
    };

    let tokens = analyzer
        .analyze(&args.text)?
        .map(|token| TokenRow {
            token_type: token.token_type.as_str(),
            start_offset: token.start_offset,
            end_offset: token.end_offset,
            position_increment: token.position_increment,
            position_length: token.position_length,
            text: token.text,
        })
        .collect();

    output_result(
        &AnalysisResult {
            analyzer: label,
            tokens,
        },
        cli_args,
    )
}

fn show_stats(args: &StatsArgs, cli_args: &XiphosArgs) -> Result<()> {
    let reader = IndexReader::open(&args.index_dir)?;
    let meta = reader.meta();

    let fields = reader
        .fields()
        .iter()
        .map(|field| FieldStatsRow {
            field: field.name().to_string(),
            analyzer: field.definition().effective_analyzer().label(),
            documents: field.doc_count(),
            total_tokens: field.total_length(),
            average_length: field.avg_length(),
            unique_terms: field.unique_terms(),
        })
        .collect();

    output_result(
        &IndexStatsResult {
            documents: reader.doc_count(),
            segments: meta.segments.len(),
            index_size_bytes: meta.segments.iter().map(|segment| segment.bytes).sum(),
            created_at: meta.created_at,
            k1: meta.bm25.k1,
            b: meta.bm25.b,
            fields,
        },
        cli_args,
    )
}

fn show_vocabulary(args: &VocabularyArgs, cli_args: &XiphosArgs) -> Result<()> {
    let reader = IndexReader::open(&args.index_dir)?;
    let field = reader.field(&args.field)?;

    let mut vocabulary = field.vocabulary();
    if let Some(top) = args.top {
        vocabulary.truncate(top);
    }

    output_result(
        &VocabularyResult {
            field: args.field.clone(),
            unique_terms: field.unique_terms(),
            terms: vocabulary
                .into_iter()
                .map(|stats| TermRow {
                    term: stats.term,
                    doc_freq: stats.doc_freq,
                    collection_freq: stats.collection_freq,
                })
                .collect(),
        },
        cli_args,
    )
}

fn show_postings(args: &PostingsArgs, cli_args: &XiphosArgs) -> Result<()> {
    let reader = IndexReader::open(&args.index_dir)?;
    let field = reader.field(&args.field)?;

    let (doc_freq, collection_freq, postings) = match field.term(&args.term) {
        Some(entry) => {
            let rows = entry
                .postings
                .iter()
                .map(|posting| PostingRow {
                    doc: posting.doc,
                    identifier: reader.identifier(posting.doc).unwrap_or_default().to_string(),
                    tf: posting.freq,
                })
                .collect();
            (entry.doc_freq(), entry.collection_freq, rows)
        }
        None => (0, 0, Vec::new()),
    };

    output_result(
        &PostingsResult {
            field: args.field.clone(),
            term: args.term.clone(),
            doc_freq,
            collection_freq,
            postings,
        },
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::*;
    use crate::document::parser::ParserKind;
    use crate::search::config::FieldPreset;

    fn parse(argv: &[&str]) -> XiphosArgs {
        XiphosArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_index_config_from_flags() {
        let args = parse(&[
            "xiphos",
            "index",
            "docs",
            "idx",
            "--extension",
            "jsonl",
            "--parser",
            "json-lines",
            "--k1",
            "0.9",
            "--no-background-flush",
        ]);
        let Command::Index(index_args) = &args.command else {
            panic!("Expected Index command");
        };

        let config = index_config(index_args).unwrap();
        assert_eq!(config.docs_dir, PathBuf::from("docs"));
        assert_eq!(config.index_dir, PathBuf::from("idx"));
        assert_eq!(config.extension, "jsonl");
        assert_eq!(config.parser, ParserKind::JsonLines);
        assert_eq!(config.bm25.k1, 0.9);
        assert_eq!(config.bm25.b, 0.75);
        assert!(!config.background_flush);
        assert_eq!(config.ram_buffer_mb, 256.0);
    }

    #[test]
    fn test_search_config_from_flags() {
        let args = parse(&[
            "xiphos", "search", "idx", "topics.xml", "runs", "r1", "--preset", "en", "--b", "0.5",
        ]);
        let Command::Search(search_args) = &args.command else {
            panic!("Expected Search command");
        };

        let config = search_config(search_args).unwrap();
        assert_eq!(config.fields, FieldPreset::En.fields());
        assert_eq!(config.run_id, "r1");
        assert_eq!(config.bm25, Some(Bm25Params { k1: 1.2, b: 0.5 }));
    }

    #[test]
    fn test_search_config_rejects_bad_bm25() {
        let args = parse(&["xiphos", "search", "idx", "t.xml", "runs", "r1", "--b", "2"]);
        let Command::Search(search_args) = &args.command else {
            panic!("Expected Search command");
        };
        assert!(search_config(search_args).is_err());
    }
}
