//! # xiphos
//!
//! Multilingual BM25 search over JSON corpora, evaluated with TREC topic
//! files.
//!
//! - Configurable analysis pipelines (English, French, character n-grams)
//! - Streaming corpus parsing with charset decoding and lockstep pairing of
//!   parallel corpora
//! - Segment-based inverted index with a single commit point
//! - BM25 ranking over any combination of fields, written as TREC runs
//!
//! ```no_run
//! use xiphos::index::{IndexConfig, build_index};
//! use xiphos::search::{SearchConfig, search_topics};
//!
//! # fn main() -> xiphos::error::Result<()> {
//! build_index(&IndexConfig::new("index", "corpus/en"))?;
//! search_topics(&SearchConfig::new("index", "topics.xml", "runs", "bm25"))?;
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod document;
pub mod error;
pub mod index;
pub mod search;
pub mod storage;
pub mod util;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
