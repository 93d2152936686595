//! Inverted index construction and reading.
//!
//! An index directory holds one `.post`/`.docs` pair per flushed segment
//! plus the `index.meta` commit point. Without `index.meta` the directory
//! is not an index: [`reader::IndexReader`] refuses it.
//!
//! ```text
//! Document ─► IndexBuilder::add ─► in-memory segment ─► flush ─► seg_000000.{post,docs}
//!                                                                     │
//!                                      IndexBuilder::commit ─► index.meta
//! ```

pub mod builder;
pub mod config;
pub mod flush;
pub mod meta;
pub mod posting;
pub mod reader;
pub mod schema;
pub mod segment;

pub use builder::{IndexBuilder, WriterStats, build_index};
pub use config::IndexConfig;
pub use reader::IndexReader;
pub use schema::{FieldDefinition, FieldSource, IndexGranularity, Schema};

/// Internal document number, dense from zero in ingestion order.
pub type DocNumber = u32;
