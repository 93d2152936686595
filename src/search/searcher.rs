//! BM25 retrieval and the topic-run driver.
//!
//! Evaluation is term-at-a-time: every query term walks its postings once
//! and adds its contribution to a per-document accumulator, after which the
//! accumulator is reduced to the top `k` hits. [`Searcher::score`] computes
//! the same sum for a single document, adding contributions in the same
//! order, so both paths produce bit-identical scores.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, info, warn};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::error::{Result, XiphosError};
use crate::index::DocNumber;
use crate::index::posting::Posting;
use crate::index::reader::{FieldIndex, IndexReader};
use crate::search::bm25::{Bm25Params, idf};
use crate::search::collector::{Collector, ScoredDoc, TopDocsCollector};
use crate::search::config::SearchConfig;
use crate::search::planner::{Query, QueryPlanner};
use crate::search::run::{RunWriter, run_path};
use crate::search::topic::{Topic, read_topics};

/// Topics evaluated in parallel before their lines are written.
const TOPIC_BATCH: usize = 64;

/// A ranked document with its external identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    pub doc: DocNumber,
    pub identifier: String,
    pub score: f64,
}

// One query term bound to its field statistics.
struct TermWeight<'a> {
    field: &'a FieldIndex,
    postings: &'a [Posting],
    idf: f64,
    weight: f64,
}

/// Ranks documents of a committed index.
#[derive(Debug, Clone)]
pub struct Searcher {
    reader: Arc<IndexReader>,
    params: Bm25Params,
}

impl Searcher {
    pub fn new(reader: Arc<IndexReader>, params: Bm25Params) -> Result<Self> {
        params.validate()?;
        Ok(Searcher { reader, params })
    }

    /// Searcher using the parameters recorded when the index was built.
    pub fn with_index_defaults(reader: Arc<IndexReader>) -> Result<Self> {
        let params = reader.meta().bm25;
        Self::new(reader, params)
    }

    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    fn weights<'a>(&'a self, query: &Query) -> Result<Vec<TermWeight<'a>>> {
        let mut weights = Vec::new();
        for clause in &query.clauses {
            let field = self.reader.field(&clause.field)?;
            for term in &clause.terms {
                // Terms missing from the field contribute nothing.
                let Some(entry) = field.term(&term.term) else {
                    continue;
                };
                weights.push(TermWeight {
                    field,
                    postings: &entry.postings,
                    idf: idf(field.doc_count(), entry.doc_freq()),
                    weight: f64::from(term.weight),
                });
            }
        }
        Ok(weights)
    }

    fn contribution(&self, weight: &TermWeight<'_>, posting: &Posting) -> f64 {
        weight.weight
            * self.params.term_score(
                weight.idf,
                posting.freq,
                weight.field.field_length(posting.doc),
                weight.field.avg_length(),
            )
    }

    /// BM25 score of one document, zero when no query term matches it.
    pub fn score(&self, doc: DocNumber, query: &Query) -> Result<f64> {
        let mut score = 0.0;
        for weight in self.weights(query)? {
            if let Ok(i) = weight.postings.binary_search_by_key(&doc, |p| p.doc) {
                score += self.contribution(&weight, &weight.postings[i]);
            }
        }
        Ok(score)
    }

    /// The best `k` documents for `query`, highest score first and ties in
    /// ascending document number.
    pub fn retrieve(&self, query: &Query, k: usize) -> Result<Vec<ScoredDoc>> {
        let weights = self.weights(query)?;
        if weights.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut accumulator: AHashMap<DocNumber, f64> = AHashMap::new();
        for weight in &weights {
            for posting in weight.postings {
                *accumulator.entry(posting.doc).or_insert(0.0) +=
                    self.contribution(weight, posting);
            }
        }

        let mut collector = TopDocsCollector::new(k);
        for (doc, score) in accumulator {
            collector.collect(doc, score);
        }
        Ok(collector.into_sorted())
    }

    /// [`retrieve`](Self::retrieve) with identifiers resolved.
    pub fn search(&self, query: &Query, k: usize) -> Result<Vec<Hit>> {
        self.retrieve(query, k)?
            .into_iter()
            .map(|scored| {
                let identifier = self.reader.identifier(scored.doc).ok_or_else(|| {
                    XiphosError::index(format!("No identifier stored for document {}", scored.doc))
                })?;
                Ok(Hit {
                    doc: scored.doc,
                    identifier: identifier.to_string(),
                    score: scored.score,
                })
            })
            .collect()
    }

    /// Plan and run one topic.
    pub fn search_topic(&self, planner: &QueryPlanner, topic: &Topic, k: usize) -> Result<Vec<Hit>> {
        let query = planner.query(&topic.title)?;
        if query.is_empty() {
            debug!("Topic {} has no query terms after analysis", topic.num);
        } else {
            debug!("Topic {}: {query}", topic.num);
        }
        self.search(&query, k)
    }
}

/// Outcome of a topic run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub run_path: PathBuf,
    pub topics: usize,
    pub lines: usize,
    /// Topics that retrieved nothing.
    pub empty_topics: usize,
}

/// Evaluate every topic of `config.topics_path` and write the run file.
///
/// Topics are evaluated in parallel, in batches, and written in input order
/// with one flush per topic. A failure stops the run; lines already flushed
/// stay on disk but the run is incomplete.
pub fn search_topics(config: &SearchConfig) -> Result<RunSummary> {
    config.validate()?;

    let reader = IndexReader::open(&config.index_dir)?.into_shared();
    let params = config.bm25.unwrap_or(reader.meta().bm25);
    let searcher = Searcher::new(Arc::clone(&reader), params)?;
    let planner = QueryPlanner::new(&reader, &config.fields)?;

    let topics = read_topics(&config.topics_path)?;
    info!(
        "Read {} topic(s) from {}",
        topics.len(),
        config.topics_path.display()
    );
    if let Some(expected) = config.expected_topics {
        if expected != topics.len() {
            warn!("Expected {expected} topic(s) but read {}", topics.len());
        }
    }

    let mut writer = RunWriter::create(&config.run_dir, &config.run_id)?;
    info!(
        "Searching fields {:?} with k1={} b={}, {} document(s) per topic",
        config.fields, params.k1, params.b, config.max_docs_retrieved
    );

    let empty_topics = match config.threads {
        Some(threads) => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("xiphos-search-{i}"))
                .build()
                .map_err(|e| XiphosError::other(format!("Failed to create thread pool: {e}")))?;
            pool.install(|| {
                run_topics(
                    &searcher,
                    &planner,
                    &topics,
                    config.max_docs_retrieved,
                    &mut writer,
                )
            })?
        }
        None => run_topics(
            &searcher,
            &planner,
            &topics,
            config.max_docs_retrieved,
            &mut writer,
        )?,
    };

    let summary = RunSummary {
        run_path: run_path(&config.run_dir, &config.run_id),
        topics: writer.topics_written(),
        lines: writer.lines_written(),
        empty_topics,
    };
    writer.into_inner()?;
    info!(
        "Wrote {} line(s) for {} topic(s) to {}",
        summary.lines,
        summary.topics,
        summary.run_path.display()
    );
    Ok(summary)
}

fn run_topics<W: Write + Send>(
    searcher: &Searcher,
    planner: &QueryPlanner,
    topics: &[Topic],
    k: usize,
    writer: &mut RunWriter<W>,
) -> Result<usize> {
    let mut empty_topics = 0;
    for batch in topics.chunks(TOPIC_BATCH) {
        let ranked = batch
            .par_iter()
            .map(|topic| searcher.search_topic(planner, topic, k))
            .collect::<Result<Vec<_>>>()?;

        for (topic, hits) in batch.iter().zip(ranked) {
            if hits.is_empty() {
                empty_topics += 1;
            }
            writer.write_topic(
                &topic.num,
                hits.iter().map(|hit| (hit.identifier.as_str(), hit.score)),
            )?;
        }
    }
    Ok(empty_topics)
}
