//! Topic search over a committed index.
//!
//! ```text
//! topics.xml ─► TopicReader ─► QueryPlanner ─► Searcher (BM25, top k) ─► RunWriter ─► <run_id>.txt
//! ```
//!
//! Query analysis is rebuilt from the analyzer configuration stored in the
//! index, so every field is searched with the pipeline it was indexed with.

pub mod bm25;
pub mod collector;
pub mod config;
pub mod planner;
pub mod run;
pub mod searcher;
pub mod topic;

pub use bm25::Bm25Params;
pub use config::{FieldPreset, SearchConfig};
pub use planner::{Query, QueryPlanner};
pub use searcher::{Hit, RunSummary, Searcher, search_topics};
pub use topic::{Topic, TopicReader, read_topics};
