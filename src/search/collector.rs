//! Top-k result collection.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;

use crate::index::DocNumber;

/// Receives scored documents during evaluation.
pub trait Collector: Send + Debug {
    fn collect(&mut self, doc: DocNumber, score: f64);

    /// Number of documents offered so far.
    fn total_hits(&self) -> u64;
}

/// A document with its final score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredDoc {
    pub doc: DocNumber,
    pub score: f64,
}

impl ScoredDoc {
    pub fn new(doc: DocNumber, score: f64) -> Self {
        ScoredDoc { doc, score }
    }

    /// Result order: higher score first, then lower document number.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.doc.cmp(&other.doc))
    }
}

// Heap entry whose maximum is the weakest retained hit.
#[derive(Debug)]
struct Entry(ScoredDoc);

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}

/// Keeps the best `max_docs` documents.
///
/// Ordering is total: equal scores are ranked by ascending document number,
/// so the result does not depend on the order documents are offered in.
#[derive(Debug)]
pub struct TopDocsCollector {
    max_docs: usize,
    hits: BinaryHeap<Entry>,
    total_hits: u64,
}

impl TopDocsCollector {
    pub fn new(max_docs: usize) -> Self {
        TopDocsCollector {
            max_docs,
            hits: BinaryHeap::with_capacity(max_docs.min(4096) + 1),
            total_hits: 0,
        }
    }

    pub fn max_docs(&self) -> usize {
        self.max_docs
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Retained hits in rank order.
    pub fn into_sorted(self) -> Vec<ScoredDoc> {
        // Ascending heap order is best first.
        self.hits
            .into_sorted_vec()
            .into_iter()
            .map(|entry| entry.0)
            .collect()
    }
}

impl Collector for TopDocsCollector {
    fn collect(&mut self, doc: DocNumber, score: f64) {
        self.total_hits += 1;
        if self.max_docs == 0 {
            return;
        }

        let candidate = Entry(ScoredDoc::new(doc, score));
        if self.hits.len() < self.max_docs {
            self.hits.push(candidate);
        } else if let Some(mut worst) = self.hits.peek_mut() {
            if candidate < *worst {
                *worst = candidate;
            }
        }
    }

    fn total_hits(&self) -> u64 {
        self.total_hits
    }
}
