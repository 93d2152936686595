//! Criterion benchmarks for xiphos.
//!
//! - Analyzer pipelines (english, n-gram)
//! - Index building into memory storage
//! - BM25 retrieval over a built index

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use xiphos::analysis::analyzer::Analyzer;
use xiphos::analysis::analyzer::variant::{AnalyzerFactory, AnalyzerVariant};
use xiphos::document::document::ParsedDocument;
use xiphos::index::{IndexBuilder, IndexConfig, IndexReader};
use xiphos::search::{QueryPlanner, Searcher};
use xiphos::storage::memory::MemoryStorage;

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<ParsedDocument> {
    let words = [
        "search", "engine", "corpus", "Topic", "query", "document", "field", "term", "ranking",
        "relevance", "Évaluation", "recherche", "moteur", "requête", "multilingual", "wi-fi",
        "analysis", "tokenization", "stemming", "retrieval", "judgment's", "2024", "the", "and",
    ];

    (0..count)
        .map(|i| {
            let doc_length = 50 + (i % 100);
            let text: Vec<&str> = (0..doc_length)
                .map(|j| words[(i * 7 + j * 13) % words.len()])
                .collect();
            ParsedDocument::new(format!("doc-{i}"), text.join(" "))
        })
        .collect()
}

fn build(documents: &[ParsedDocument]) -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::new());
    let config = IndexConfig {
        background_flush: false,
        ..Default::default()
    };
    let mut builder = IndexBuilder::with_storage(config, storage.clone()).unwrap();
    for document in documents {
        builder.add_parsed(document.clone()).unwrap();
    }
    builder.commit().unwrap();
    storage
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    let documents = generate_test_documents(100);
    let mut factory = AnalyzerFactory::new();

    for variant in [AnalyzerVariant::english(), AnalyzerVariant::ngram(3)] {
        let analyzer = factory.build(&variant).unwrap();
        group.throughput(Throughput::Elements(documents.len() as u64));
        group.bench_function(variant.label(), |b| {
            b.iter(|| {
                for document in &documents {
                    black_box(analyzer.terms(black_box(&document.contents)).unwrap());
                }
            })
        });
    }

    group.finish();
}

fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexing");
    group.sample_size(10);
    let documents = generate_test_documents(1000);

    group.throughput(Throughput::Elements(documents.len() as u64));
    group.bench_function("build_1000_documents", |b| {
        b.iter(|| black_box(build(&documents)))
    });

    group.finish();
}

fn bench_retrieval(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieval");
    let storage = build(&generate_test_documents(2000));
    let reader = IndexReader::open_storage(storage.as_ref()).unwrap().into_shared();
    let fields = vec!["english_body".to_string(), "ngram".to_string()];
    let planner = QueryPlanner::new(&reader, &fields).unwrap();
    let searcher = Searcher::with_index_defaults(reader).unwrap();

    for title in ["ranking", "multilingual search engine", "recherche requête évaluation"] {
        let query = planner.query(title).unwrap();
        group.bench_function(title, |b| {
            b.iter(|| black_box(searcher.retrieve(black_box(&query), 1000).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analysis, bench_indexing, bench_retrieval);
criterion_main!(benches);
