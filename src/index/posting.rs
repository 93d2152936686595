//! Postings lists.
//!
//! In memory a field's postings are a map from term to the ordered list of
//! `(doc, tf)` pairs for the documents buffered since the last flush. On
//! disk each list is a run of varints: the gap to the previous document
//! number, then the frequency unless the field indexes documents only.

use ahash::AHashMap;

use crate::error::{Result, XiphosError};
use crate::index::DocNumber;
use crate::index::schema::IndexGranularity;
use crate::util::varint::{self, VarintCursor};

/// Rough per-entry overheads used for the memory budget.
const TERM_OVERHEAD: usize = 64;
const POSTING_SIZE: usize = std::mem::size_of::<Posting>();

/// One document entry of a postings list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Posting {
    pub doc: DocNumber,
    pub freq: u32,
}

impl Posting {
    pub fn new(doc: DocNumber, freq: u32) -> Self {
        Posting { doc, freq }
    }
}

/// Postings of one field accumulated since the last flush.
#[derive(Debug, Default)]
pub struct FieldPostings {
    terms: AHashMap<String, Vec<Posting>>,
    estimated_bytes: usize,
}

impl FieldPostings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `freq` occurrences of `term` in `doc`. Documents must be added
    /// in increasing order.
    pub fn add(&mut self, term: &str, doc: DocNumber, freq: u32) {
        match self.terms.get_mut(term) {
            Some(postings) => {
                debug_assert!(postings.last().is_none_or(|last| last.doc < doc));
                postings.push(Posting::new(doc, freq));
                self.estimated_bytes += POSTING_SIZE;
            }
            None => {
                self.terms
                    .insert(term.to_string(), vec![Posting::new(doc, freq)]);
                self.estimated_bytes += term.len() + TERM_OVERHEAD + POSTING_SIZE;
            }
        }
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn posting_count(&self) -> usize {
        self.terms.values().map(Vec::len).sum()
    }

    pub fn estimated_bytes(&self) -> usize {
        self.estimated_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in byte order with their postings.
    pub fn into_sorted(self) -> Vec<(String, Vec<Posting>)> {
        let mut terms: Vec<(String, Vec<Posting>)> = self.terms.into_iter().collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        terms
    }
}

/// Count term occurrences in one analyzed field, preserving first-seen order.
pub fn term_frequencies<I>(terms: I) -> Vec<(String, u32)>
where
    I: IntoIterator<Item = String>,
{
    let mut index: AHashMap<String, usize> = AHashMap::new();
    let mut counts: Vec<(String, u32)> = Vec::new();
    for term in terms {
        match index.get(&term) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(term.clone(), counts.len());
                counts.push((term, 1));
            }
        }
    }
    counts
}

/// Encode a sorted postings list.
pub fn encode(postings: &[Posting], granularity: IndexGranularity) -> Vec<u8> {
    let mut out = Vec::with_capacity(postings.len() * 2);
    let mut previous = 0;
    for (i, posting) in postings.iter().enumerate() {
        let gap = if i == 0 {
            posting.doc
        } else {
            posting.doc - previous
        };
        varint::encode_u64_into(u64::from(gap), &mut out);
        if granularity == IndexGranularity::DocsAndFreqs {
            varint::encode_u64_into(u64::from(posting.freq), &mut out);
        }
        previous = posting.doc;
    }
    out
}

/// Decode `count` postings, appending them to `out`.
pub fn decode_into(
    bytes: &[u8],
    count: usize,
    granularity: IndexGranularity,
    out: &mut Vec<Posting>,
) -> Result<()> {
    let mut cursor = VarintCursor::new(bytes);
    let mut doc: u64 = 0;
    for i in 0..count {
        let gap = cursor.next_u64()?;
        if i > 0 && gap == 0 {
            return Err(XiphosError::index("Postings list is not strictly increasing"));
        }
        doc += gap;
        let doc = DocNumber::try_from(doc)
            .map_err(|_| XiphosError::index(format!("Document number {doc} out of range")))?;
        let freq = match granularity {
            IndexGranularity::DocsAndFreqs => cursor.next_u32()?,
            IndexGranularity::Docs => 1,
        };
        out.push(Posting::new(doc, freq));
    }
    if !cursor.is_empty() {
        return Err(XiphosError::index("Trailing bytes after postings list"));
    }
    Ok(())
}
