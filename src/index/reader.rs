//! Read-only access to a committed index.
//!
//! [`IndexReader::open`] loads the commit point, verifies every segment
//! file against its checksum and merges the per-segment term dictionaries
//! into one dictionary per field. The reader is immutable afterwards and
//! can be shared between threads.

use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use log::info;

use crate::analysis::analyzer::per_field::PerFieldAnalyzer;
use crate::error::{Result, XiphosError};
use crate::index::DocNumber;
use crate::index::meta::{FieldStats, IndexMeta};
use crate::index::posting::Posting;
use crate::index::schema::{FieldDefinition, Schema};
use crate::index::segment::{read_docs, read_postings};
use crate::storage::file::FileStorage;
use crate::storage::{Storage, StorageConfig};

/// Dictionary entry of a term.
#[derive(Debug, Clone, Default)]
pub struct TermEntry {
    pub collection_freq: u64,
    pub postings: Vec<Posting>,
}

impl TermEntry {
    pub fn doc_freq(&self) -> u64 {
        self.postings.len() as u64
    }
}

/// Per-term frequencies, as listed by the vocabulary dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermStats {
    pub term: String,
    pub doc_freq: u64,
    pub collection_freq: u64,
}

/// The inverted index of one field.
#[derive(Debug)]
pub struct FieldIndex {
    definition: FieldDefinition,
    terms: AHashMap<String, TermEntry>,
    lengths: Vec<Option<u32>>,
    stats: FieldStats,
}

impl FieldIndex {
    pub fn definition(&self) -> &FieldDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Postings of `term`, sorted by document number.
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.terms.get(term).map(|entry| entry.postings.as_slice())
    }

    pub fn term(&self, term: &str) -> Option<&TermEntry> {
        self.terms.get(term)
    }

    pub fn doc_freq(&self, term: &str) -> u64 {
        self.terms.get(term).map_or(0, TermEntry::doc_freq)
    }

    /// Token count of `doc` in this field, zero if the document lacks it.
    pub fn field_length(&self, doc: DocNumber) -> u32 {
        self.lengths
            .get(doc as usize)
            .copied()
            .flatten()
            .unwrap_or(0)
    }

    /// Number of documents that have this field.
    pub fn doc_count(&self) -> u64 {
        self.stats.doc_count
    }

    pub fn total_length(&self) -> u64 {
        self.stats.total_length
    }

    pub fn avg_length(&self) -> f64 {
        self.stats.avg_length()
    }

    pub fn unique_terms(&self) -> usize {
        self.terms.len()
    }

    /// All terms sorted by descending collection frequency, then by term.
    pub fn vocabulary(&self) -> Vec<TermStats> {
        let mut terms: Vec<TermStats> = self
            .terms
            .iter()
            .map(|(term, entry)| TermStats {
                term: term.clone(),
                doc_freq: entry.doc_freq(),
                collection_freq: entry.collection_freq,
            })
            .collect();
        terms.sort_by(|a, b| {
            b.collection_freq
                .cmp(&a.collection_freq)
                .then_with(|| a.term.cmp(&b.term))
        });
        terms
    }
}

/// A committed index loaded into memory.
#[derive(Debug)]
pub struct IndexReader {
    meta: IndexMeta,
    identifiers: Vec<String>,
    fields: Vec<FieldIndex>,
    stored_fields: Vec<String>,
    stored_values: Vec<Vec<Option<String>>>,
}

impl IndexReader {
    /// Open the index in `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(XiphosError::index(format!(
                "Index directory {} does not exist",
                dir.display()
            )));
        }
        let storage = FileStorage::new(dir, StorageConfig::default())?;
        let reader = Self::open_storage(&storage)?;
        info!(
            "Opened index {} with {} documents",
            dir.display(),
            reader.doc_count()
        );
        Ok(reader)
    }

    pub fn open_storage(storage: &dyn Storage) -> Result<Self> {
        let meta = IndexMeta::read(storage)?;
        let doc_count = usize::try_from(meta.doc_count)
            .map_err(|_| XiphosError::index("Document count does not fit in memory"))?;

        let mut fields: Vec<FieldIndex> = meta
            .schema
            .fields()
            .iter()
            .map(|definition| FieldIndex {
                definition: definition.clone(),
                terms: AHashMap::new(),
                lengths: Vec::with_capacity(doc_count),
                stats: meta
                    .field_stats
                    .get(&definition.name)
                    .copied()
                    .unwrap_or_default(),
            })
            .collect();
        let stored_fields: Vec<String> = meta
            .schema
            .stored_body_fields()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut identifiers = Vec::with_capacity(doc_count);
        let mut stored_values = Vec::with_capacity(doc_count);

        for info in &meta.segments {
            if info.doc_base as usize != identifiers.len() {
                return Err(XiphosError::index(format!(
                    "Segment {} starts at document {}, expected {}",
                    info.name,
                    info.doc_base,
                    identifiers.len()
                )));
            }

            let docs = read_docs(storage, info)?;
            if docs.field_names != meta.schema.field_names() || docs.stored_fields != stored_fields
            {
                return Err(XiphosError::index(format!(
                    "Segment {} does not match the index schema",
                    info.name
                )));
            }
            for (field, lengths) in fields.iter_mut().zip(docs.lengths) {
                field.lengths.extend(lengths);
            }
            identifiers.extend(docs.identifiers);
            stored_values.extend(docs.stored_values);

            for block in read_postings(storage, info)? {
                let field = fields
                    .iter_mut()
                    .find(|f| f.definition.name == block.name)
                    .ok_or_else(|| {
                        XiphosError::index(format!(
                            "Segment {} has postings for unknown field {}",
                            info.name, block.name
                        ))
                    })?;
                for term in block.terms {
                    let entry = field.terms.entry(term.term).or_default();
                    entry.collection_freq += term.collection_freq;
                    entry.postings.extend(term.postings);
                }
            }
        }

        if identifiers.len() != doc_count {
            return Err(XiphosError::index(format!(
                "Segments hold {} documents, commit point records {}",
                identifiers.len(),
                doc_count
            )));
        }

        Ok(IndexReader {
            meta,
            identifiers,
            fields,
            stored_fields,
            stored_values,
        })
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    pub fn schema(&self) -> &Schema {
        &self.meta.schema
    }

    pub fn doc_count(&self) -> u64 {
        self.identifiers.len() as u64
    }

    /// Stored identifier of an internal document number.
    pub fn identifier(&self, doc: DocNumber) -> Option<&str> {
        self.identifiers.get(doc as usize).map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Result<&FieldIndex> {
        self.fields
            .iter()
            .find(|f| f.definition.name == name)
            .ok_or_else(|| XiphosError::query(format!("Index has no field {name}")))
    }

    pub fn fields(&self) -> &[FieldIndex] {
        &self.fields
    }

    /// Stored text of a body field.
    pub fn stored_field(&self, doc: DocNumber, field: &str) -> Option<&str> {
        let slot = self.stored_fields.iter().position(|name| name == field)?;
        self.stored_values
            .get(doc as usize)?
            .get(slot)?
            .as_deref()
    }

    /// Rebuild the analyzers recorded in the index schema.
    pub fn analyzers(&self) -> Result<PerFieldAnalyzer> {
        self.meta.schema.build_analyzers()
    }

    pub fn into_shared(self) -> Arc<IndexReader> {
        Arc::new(self)
    }
}
