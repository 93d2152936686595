//! The commit point.
//!
//! `index.meta` is a JSON document written last, through a temporary file
//! and an atomic rename. Its presence is what makes a directory an index.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, XiphosError};
use crate::index::schema::Schema;
use crate::index::segment::SegmentInfo;
use crate::search::bm25::Bm25Params;
use crate::storage::Storage;

pub const META_FILE: &str = "index.meta";
const META_TEMP_FILE: &str = "index.meta.tmp";
pub const FORMAT_VERSION: u32 = 1;

/// Length statistics of one field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Documents that have the field.
    pub doc_count: u64,
    /// Sum of the field's token counts.
    pub total_length: u64,
}

impl FieldStats {
    pub fn add(&mut self, length: u32) {
        self.doc_count += 1;
        self.total_length += u64::from(length);
    }

    pub fn avg_length(&self) -> f64 {
        if self.doc_count == 0 {
            0.0
        } else {
            self.total_length as f64 / self.doc_count as f64
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub doc_count: u64,
    pub segments: Vec<SegmentInfo>,
    pub schema: Schema,
    pub field_stats: BTreeMap<String, FieldStats>,
    pub bm25: Bm25Params,
}

impl IndexMeta {
    /// Atomically publish the commit point.
    pub fn write(&self, storage: &dyn Storage) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        let mut output = storage.create_output(META_TEMP_FILE)?;
        output.write_all(&json)?;
        output.close()?;
        storage.rename_file(META_TEMP_FILE, META_FILE)?;
        storage.sync()
    }

    /// Load the commit point, failing if the index was never committed.
    pub fn read(storage: &dyn Storage) -> Result<Self> {
        if !storage.file_exists(META_FILE) {
            return Err(XiphosError::index(format!(
                "No {META_FILE} found: the index was never committed"
            )));
        }
        let bytes = storage.read_file(META_FILE)?;
        let meta: IndexMeta = serde_json::from_slice(&bytes)?;
        if meta.format_version != FORMAT_VERSION {
            return Err(XiphosError::index(format!(
                "Unsupported index format version {}",
                meta.format_version
            )));
        }
        Ok(meta)
    }

    /// Remove the commit point and any temporary copy.
    pub fn remove(storage: &dyn Storage) -> Result<()> {
        storage.delete_file(META_FILE)?;
        storage.delete_file(META_TEMP_FILE)?;
        storage.sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn meta() -> IndexMeta {
        let mut field_stats = BTreeMap::new();
        field_stats.insert(
            "english_body".to_string(),
            FieldStats {
                doc_count: 2,
                total_length: 7,
            },
        );
        IndexMeta {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            doc_count: 2,
            segments: Vec::new(),
            schema: Schema::single_language(),
            field_stats,
            bm25: Bm25Params::default(),
        }
    }

    #[test]
    fn test_write_then_read() {
        let storage = MemoryStorage::new();
        let meta = meta();
        meta.write(&storage).unwrap();

        assert!(!storage.file_exists(META_TEMP_FILE));
        assert_eq!(IndexMeta::read(&storage).unwrap(), meta);
    }

    #[test]
    fn test_missing_meta_is_rejected() {
        let storage = MemoryStorage::new();
        match IndexMeta::read(&storage) {
            Err(XiphosError::Index(message)) => assert!(message.contains("never committed")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_remove() {
        let storage = MemoryStorage::new();
        meta().write(&storage).unwrap();
        IndexMeta::remove(&storage).unwrap();
        assert!(IndexMeta::read(&storage).is_err());
    }

    #[test]
    fn test_avg_length() {
        let mut stats = FieldStats::default();
        assert_eq!(stats.avg_length(), 0.0);
        stats.add(3);
        stats.add(4);
        assert_eq!(stats.avg_length(), 3.5);
    }
}
