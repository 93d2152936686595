//! Index construction.
//!
//! [`IndexBuilder`] owns the index directory for its whole lifetime (through
//! `write.lock`). Documents are analyzed one at a time and merged into an
//! in-memory segment; when the segment's estimated size reaches the RAM
//! budget it is sealed and flushed. [`IndexBuilder::commit`] flushes the
//! rest, waits for the flusher and publishes `index.meta`. Until then the
//! directory holds no commit point and cannot be opened for search.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use xiphos::document::document::ParsedDocument;
//! use xiphos::index::{IndexBuilder, IndexConfig};
//! use xiphos::storage::memory::MemoryStorage;
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let mut builder = IndexBuilder::with_storage(IndexConfig::default(), storage).unwrap();
//! builder.add_parsed(ParsedDocument::new("d1", "The quick brown fox")).unwrap();
//! let stats = builder.commit().unwrap();
//! assert_eq!(stats.docs_added, 1);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use ahash::AHashSet;
use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;

use crate::analysis::analyzer::per_field::PerFieldAnalyzer;
use crate::document::corpus::{CorpusReader, PairedCorpus};
use crate::document::document::{Document, ParsedDocument};
use crate::error::{Result, XiphosError};
use crate::index::DocNumber;
use crate::index::config::IndexConfig;
use crate::index::flush::Flusher;
use crate::index::meta::{FORMAT_VERSION, FieldStats, IndexMeta};
use crate::index::posting::{FieldPostings, term_frequencies};
use crate::index::schema::{ID_FIELD, Schema};
use crate::index::segment::{SegmentData, SegmentField, is_segment_file};
use crate::storage::file::{FileStorage, ensure_writable_dir};
use crate::storage::{Storage, StorageConfig, StorageLock};

/// Name of the lock file held while a builder is open.
pub const WRITE_LOCK: &str = "write.lock";

const PROGRESS_INTERVAL: u64 = 10_000;

/// Fixed per-document cost added to the memory estimate.
const DOC_OVERHEAD: usize = 32;

/// Statistics about the writing process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriterStats {
    /// Number of documents added.
    pub docs_added: u64,
    /// Number of segments flushed.
    pub flushes: u32,
    /// Terms written, counted once per segment they appear in.
    pub terms: u64,
    /// Postings entries written.
    pub postings: u64,
    /// Size of the segment files.
    pub bytes_written: u64,
}

pub struct IndexBuilder {
    storage: Arc<dyn Storage>,
    config: IndexConfig,
    schema: Schema,
    analyzers: PerFieldAnalyzer,
    lock: Box<dyn StorageLock>,
    flusher: Flusher,
    segment: SegmentData,
    buffered_bytes: usize,
    budget: usize,
    identifiers: AHashSet<String>,
    next_doc: DocNumber,
    next_segment: u32,
    field_stats: BTreeMap<String, FieldStats>,
    stats: WriterStats,
    started: Instant,
}

impl IndexBuilder {
    /// Validate `config` and open a builder on `config.index_dir`.
    pub fn open(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        let schema = config.schema().resolve()?;
        let analyzers = schema.build_analyzers()?;

        ensure_writable_dir(&config.index_dir)?;
        let storage: Arc<dyn Storage> =
            Arc::new(FileStorage::new(&config.index_dir, StorageConfig::default())?);
        Self::create(config, schema, analyzers, storage)
    }

    /// Open a builder on an existing storage. `config.index_dir` is ignored.
    pub fn with_storage(config: IndexConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        config.validate()?;
        let schema = config.schema().resolve()?;
        let analyzers = schema.build_analyzers()?;
        Self::create(config, schema, analyzers, storage)
    }

    fn create(
        config: IndexConfig,
        schema: Schema,
        analyzers: PerFieldAnalyzer,
        storage: Arc<dyn Storage>,
    ) -> Result<Self> {
        let lock = storage.obtain_lock(WRITE_LOCK)?;

        // A previous build's commit point goes first so that a crash while
        // cleaning up can never leave an index pointing at deleted files.
        IndexMeta::remove(storage.as_ref())?;
        for name in storage.list_files()? {
            if is_segment_file(&name) {
                debug!("Removing stale segment file {name}");
                storage.delete_file(&name)?;
            }
        }

        let flusher = if config.background_flush {
            Flusher::background(Arc::clone(&storage))?
        } else {
            Flusher::inline(Arc::clone(&storage))
        };

        info!(
            "Opened index builder: fields {:?}, RAM buffer {} MB",
            schema.field_names(),
            config.ram_buffer_mb
        );

        let segment = empty_segment(&schema, 0, 0);
        Ok(IndexBuilder {
            budget: config.ram_buffer_bytes(),
            storage,
            config,
            schema,
            analyzers,
            lock,
            flusher,
            segment,
            buffered_bytes: 0,
            identifiers: AHashSet::new(),
            next_doc: 0,
            next_segment: 0,
            field_stats: BTreeMap::new(),
            stats: WriterStats::default(),
            started: Instant::now(),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    /// Analyze and buffer one document, returning its document number.
    pub fn add(&mut self, document: Document) -> Result<DocNumber> {
        let identifier = document.identifier();
        if identifier.is_empty() {
            return Err(XiphosError::index("Document identifier must not be empty"));
        }
        if self.identifiers.contains(identifier) {
            return Err(XiphosError::duplicate_identifier(identifier));
        }
        let doc = self.next_doc;
        let next_doc = doc
            .checked_add(1)
            .ok_or_else(|| XiphosError::index("Too many documents for one index"))?;

        // Analyze every field before touching the buffers, so a failure
        // leaves the segment exactly as it was.
        let mut analyzed = Vec::with_capacity(self.schema.fields().len());
        for definition in self.schema.fields() {
            let text = if definition.name == ID_FIELD {
                Some(identifier)
            } else {
                document.get_field(&definition.name)
            };
            let Some(text) = text else {
                analyzed.push(None);
                continue;
            };

            let terms = self.analyzers.get_analyzer(&definition.name)?.terms(text)?;
            let length = u32::try_from(terms.len()).map_err(|_| {
                XiphosError::index(format!("Field {} of {identifier} is too long", definition.name))
            })?;
            analyzed.push(Some((length, term_frequencies(terms))));
        }

        let mut added = identifier.len() + DOC_OVERHEAD;
        for ((definition, field), analysis) in self
            .schema
            .fields()
            .iter()
            .zip(self.segment.fields.iter_mut())
            .zip(analyzed)
        {
            let Some((length, frequencies)) = analysis else {
                field.lengths.push(None);
                continue;
            };

            let before = field.postings.estimated_bytes();
            for (term, freq) in frequencies {
                field.postings.add(&term, doc, freq);
            }
            added += field.postings.estimated_bytes() - before + 8;

            field.lengths.push(Some(length));
            self.field_stats
                .entry(definition.name.clone())
                .or_default()
                .add(length);
        }

        let stored: Vec<Option<String>> = self
            .segment
            .stored_fields
            .iter()
            .map(|name| document.get_field(name).map(str::to_string))
            .collect();
        added += stored.iter().flatten().map(String::len).sum::<usize>();
        self.segment.stored_values.push(stored);

        self.identifiers.insert(identifier.to_string());
        self.segment.identifiers.push(identifier.to_string());
        self.next_doc = next_doc;
        self.buffered_bytes += added;
        self.stats.docs_added += 1;

        if self.stats.docs_added % PROGRESS_INTERVAL == 0 {
            info!(
                "Indexed {} documents ({:.1}s)",
                self.stats.docs_added,
                self.started.elapsed().as_secs_f64()
            );
        }

        if self.buffered_bytes >= self.budget {
            self.flush()?;
        }
        Ok(doc)
    }

    /// Add a record from a single-language corpus.
    pub fn add_parsed(&mut self, document: ParsedDocument) -> Result<DocNumber> {
        let document = self.schema.assemble(document, None)?;
        self.add(document)
    }

    /// Add one record combined from two parallel corpora.
    pub fn add_pair(
        &mut self,
        primary: ParsedDocument,
        secondary: ParsedDocument,
    ) -> Result<DocNumber> {
        if primary.id != secondary.id {
            return Err(XiphosError::consistency(format!(
                "Cannot pair document {:?} with {:?}",
                primary.id, secondary.id
            )));
        }
        let document = self.schema.assemble(primary, Some(secondary))?;
        self.add(document)
    }

    /// Seal the buffered documents into a segment and hand it to the flusher.
    pub fn flush(&mut self) -> Result<()> {
        if self.segment.identifiers.is_empty() {
            return Ok(());
        }

        let next = empty_segment(&self.schema, self.next_segment + 1, self.next_doc);
        let segment = std::mem::replace(&mut self.segment, next);
        debug!(
            "Flushing segment {} with {} document(s), ~{} bytes buffered",
            segment.name,
            segment.doc_count(),
            self.buffered_bytes
        );

        self.flusher.submit(segment)?;
        self.next_segment += 1;
        self.buffered_bytes = 0;
        self.stats.flushes += 1;
        Ok(())
    }

    /// Flush everything and publish the commit point.
    ///
    /// Consumes the builder; on error the directory is left without a
    /// commit point.
    pub fn commit(mut self) -> Result<WriterStats> {
        self.flush()?;

        let IndexBuilder {
            storage,
            config,
            schema,
            mut lock,
            flusher,
            next_doc,
            field_stats,
            mut stats,
            started,
            ..
        } = self;

        let segments = flusher.finish()?;
        let mut expected_base = 0;
        for segment in &segments {
            if segment.doc_base != expected_base {
                return Err(XiphosError::index(format!(
                    "Segment {} starts at document {}, expected {expected_base}",
                    segment.name, segment.doc_base
                )));
            }
            expected_base += segment.doc_count;
            stats.terms += segment.terms;
            stats.postings += segment.postings;
            stats.bytes_written += segment.bytes;
        }
        if expected_base != next_doc {
            return Err(XiphosError::index(format!(
                "Segments hold {expected_base} documents, {next_doc} were added"
            )));
        }

        let meta = IndexMeta {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            doc_count: u64::from(next_doc),
            segments,
            schema,
            field_stats,
            bm25: config.bm25,
        };
        meta.write(storage.as_ref())?;
        lock.release()?;

        if let Some(expected) = config.expected_docs {
            if expected != stats.docs_added {
                warn!(
                    "Expected {expected} documents but indexed {}",
                    stats.docs_added
                );
            }
        }

        info!(
            "Committed {} documents in {} segment(s), {} bytes ({:.1}s)",
            stats.docs_added,
            stats.flushes,
            stats.bytes_written,
            started.elapsed().as_secs_f64()
        );
        Ok(stats)
    }
}

impl std::fmt::Debug for IndexBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexBuilder")
            .field("storage", &self.storage)
            .field("fields", &self.schema.field_names())
            .field("lock", &self.lock)
            .field("flusher", &self.flusher)
            .field("next_doc", &self.next_doc)
            .field("buffered_bytes", &self.buffered_bytes)
            .field("stats", &self.stats)
            .finish()
    }
}

fn empty_segment(schema: &Schema, number: u32, doc_base: DocNumber) -> SegmentData {
    SegmentData {
        name: format!("seg_{number:06}"),
        doc_base,
        identifiers: Vec::new(),
        fields: schema
            .fields()
            .iter()
            .map(|definition| SegmentField {
                name: definition.name.clone(),
                granularity: definition.granularity,
                lengths: Vec::new(),
                postings: FieldPostings::new(),
            })
            .collect(),
        stored_fields: schema
            .stored_body_fields()
            .into_iter()
            .map(str::to_string)
            .collect(),
        stored_values: Vec::new(),
    }
}

/// Build and commit an index from the corpus described by `config`.
pub fn build_index(config: &IndexConfig) -> Result<WriterStats> {
    config.validate()?;
    config.validate_sources()?;
    let charset = config.charset()?;

    let mut builder = IndexBuilder::open(config.clone())?;
    let primary = CorpusReader::open(&config.docs_dir, &config.extension, config.parser, charset)?;

    match &config.secondary_docs_dir {
        Some(secondary_dir) => {
            let secondary =
                CorpusReader::open(secondary_dir, &config.extension, config.parser, charset)?;
            info!(
                "Pairing {} with {}",
                config.docs_dir.display(),
                secondary_dir.display()
            );
            let mut paired = PairedCorpus::new(primary, secondary);
            while let Some((left, right)) = paired.next_pair()? {
                builder.add_pair(left, right)?;
            }
        }
        None => {
            let mut reader = primary;
            while let Some(document) = reader.next_document()? {
                builder.add_parsed(document)?;
            }
        }
    }

    builder.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::variant::AnalyzerVariant;
    use crate::index::meta::META_FILE;
    use crate::index::schema::FieldDefinition;
    use crate::storage::memory::MemoryStorage;

    fn config() -> IndexConfig {
        IndexConfig {
            background_flush: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_add_and_commit() {
        let storage = Arc::new(MemoryStorage::new());
        let mut builder = IndexBuilder::with_storage(config(), storage.clone()).unwrap();
        assert_eq!(builder.add_parsed(ParsedDocument::new("d1", "The cat sat")).unwrap(), 0);
        assert_eq!(builder.add_parsed(ParsedDocument::new("d2", "A dog")).unwrap(), 1);
        assert!(!storage.file_exists(META_FILE));

        let stats = builder.commit().unwrap();
        assert_eq!(stats.docs_added, 2);
        assert_eq!(stats.flushes, 1);
        assert!(stats.bytes_written > 0);
        assert!(storage.file_exists(META_FILE));
        assert!(!storage.file_exists(WRITE_LOCK));

        let meta = IndexMeta::read(storage.as_ref()).unwrap();
        assert_eq!(meta.doc_count, 2);
        assert_eq!(meta.segments.len(), 1);
        let english = meta.field_stats["english_body"];
        assert_eq!(english.doc_count, 2);
        // "cat", "sat" and "dog" survive the terrier stop list
        assert_eq!(english.total_length, 3);
    }

    #[test]
    fn test_duplicate_identifier_is_fatal() {
        let storage = Arc::new(MemoryStorage::new());
        let mut builder = IndexBuilder::with_storage(config(), storage).unwrap();
        builder.add_parsed(ParsedDocument::new("d1", "one")).unwrap();
        match builder.add_parsed(ParsedDocument::new("d1", "two")) {
            Err(XiphosError::DuplicateIdentifier(id)) => assert_eq!(id, "d1"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_failed_add_leaves_buffers_aligned() {
        let storage = Arc::new(MemoryStorage::new());
        let mut builder = IndexBuilder::with_storage(config(), storage.clone()).unwrap();

        // Only the last field ("ngram") is missing its analyzer.
        let full = builder.schema.build_analyzers().unwrap();
        let mut partial = PerFieldAnalyzer::new();
        for name in [ID_FIELD, "english_body"] {
            partial.add_analyzer(name, Arc::clone(full.get_analyzer(name).unwrap()));
        }
        builder.analyzers = partial;

        assert!(builder.add_parsed(ParsedDocument::new("d1", "cat dog")).is_err());
        assert!(builder.segment.identifiers.is_empty());
        assert!(builder.segment.fields.iter().all(|f| f.lengths.is_empty()));
        assert!(builder.field_stats.is_empty());

        builder.analyzers = full;
        assert_eq!(builder.add_parsed(ParsedDocument::new("d1", "cat dog")).unwrap(), 0);
        builder.commit().unwrap();

        let meta = IndexMeta::read(storage.as_ref()).unwrap();
        assert_eq!(meta.field_stats["english_body"].doc_count, 1);
        let docs = crate::index::segment::read_docs(storage.as_ref(), &meta.segments[0]).unwrap();
        assert_eq!(docs.identifiers, vec!["d1"]);
        assert!(docs.lengths.iter().all(|lengths| lengths.len() == 1));
    }

    #[test]
    fn test_duplicate_across_flushes() {
        let storage = Arc::new(MemoryStorage::new());
        let mut builder = IndexBuilder::with_storage(config(), storage).unwrap();
        builder.add_parsed(ParsedDocument::new("d1", "one")).unwrap();
        builder.flush().unwrap();
        assert!(builder.add_parsed(ParsedDocument::new("d1", "two")).is_err());
    }

    #[test]
    fn test_small_budget_flushes_many_segments() {
        let storage = Arc::new(MemoryStorage::new());
        let config = IndexConfig {
            ram_buffer_mb: 0.001,
            background_flush: true,
            ..Default::default()
        };
        let mut builder = IndexBuilder::with_storage(config, storage.clone()).unwrap();
        for i in 0..200 {
            let text = format!("document number {i} talks about topic{} and more", i % 7);
            builder.add_parsed(ParsedDocument::new(format!("d{i}"), text)).unwrap();
        }
        let stats = builder.commit().unwrap();

        assert!(stats.flushes > 1, "flushes: {}", stats.flushes);
        let meta = IndexMeta::read(storage.as_ref()).unwrap();
        assert_eq!(meta.doc_count, 200);
        let total: u32 = meta.segments.iter().map(|s| s.doc_count).sum();
        assert_eq!(total, 200);
    }

    #[test]
    fn test_second_builder_is_locked_out() {
        let storage = Arc::new(MemoryStorage::new());
        let _builder = IndexBuilder::with_storage(config(), storage.clone()).unwrap();
        assert!(IndexBuilder::with_storage(config(), storage).is_err());
    }

    #[test]
    fn test_reopen_removes_previous_commit() {
        let storage = Arc::new(MemoryStorage::new());
        let mut builder = IndexBuilder::with_storage(config(), storage.clone()).unwrap();
        builder.add_parsed(ParsedDocument::new("d1", "one")).unwrap();
        builder.commit().unwrap();
        assert!(storage.file_exists(META_FILE));

        let mut builder = IndexBuilder::with_storage(config(), storage.clone()).unwrap();
        assert!(!storage.file_exists(META_FILE));
        assert!(!storage.file_exists("seg_000000.post"));
        builder.add_parsed(ParsedDocument::new("d1", "again")).unwrap();
        drop(builder);

        // Dropped without commit: still no commit point.
        assert!(!storage.file_exists(META_FILE));
    }

    #[test]
    fn test_add_pair() {
        let storage = Arc::new(MemoryStorage::new());
        let config = IndexConfig {
            secondary_docs_dir: Some("fr".into()),
            background_flush: false,
            ..Default::default()
        };
        let mut builder = IndexBuilder::with_storage(config, storage).unwrap();
        builder
            .add_pair(ParsedDocument::new("d1", "cat"), ParsedDocument::new("d1", "chat"))
            .unwrap();
        assert!(matches!(
            builder.add_pair(ParsedDocument::new("d2", "dog"), ParsedDocument::new("d3", "chien")),
            Err(XiphosError::Consistency(_))
        ));
    }

    #[test]
    fn test_stored_body_field() {
        let storage = Arc::new(MemoryStorage::new());
        let config = IndexConfig {
            fields: Some(vec![
                FieldDefinition::text("body", AnalyzerVariant::english()).with_stored(true),
            ]),
            background_flush: false,
            ..Default::default()
        };
        let mut builder = IndexBuilder::with_storage(config, storage.clone()).unwrap();
        builder.add_parsed(ParsedDocument::new("d1", "Stored text")).unwrap();
        builder.commit().unwrap();

        let meta = IndexMeta::read(storage.as_ref()).unwrap();
        let docs = crate::index::segment::read_docs(storage.as_ref(), &meta.segments[0]).unwrap();
        assert_eq!(docs.stored_fields, vec!["body"]);
        assert_eq!(docs.stored_values[0], vec![Some("Stored text".to_string())]);
    }

    #[test]
    fn test_invalid_config_creates_nothing() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let index_dir = temp_dir.path().join("idx");
        let config = IndexConfig {
            index_dir: index_dir.clone(),
            ram_buffer_mb: 0.0,
            ..Default::default()
        };
        assert!(IndexBuilder::open(config).is_err());
        assert!(!index_dir.exists());
    }
}
