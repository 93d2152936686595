//! Build-time configuration.
//!
//! Everything is checked by [`IndexConfig::validate`] before the builder
//! touches the index directory, so a rejected configuration leaves no files
//! behind.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::document::charset::Charset;
use crate::document::corpus::normalize_extension;
use crate::document::parser::ParserKind;
use crate::error::{Result, XiphosError};
use crate::index::schema::{FieldDefinition, Schema};
use crate::search::bm25::Bm25Params;

/// Configuration of an index build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory receiving the index; created if absent.
    pub index_dir: PathBuf,

    /// Corpus directory (primary stream).
    pub docs_dir: PathBuf,

    /// Parallel corpus for multilingual pairing.
    pub secondary_docs_dir: Option<PathBuf>,

    /// Only files ending with this extension are read.
    pub extension: String,

    /// Charset label of the corpus files.
    pub charset: String,

    /// Postings buffered in memory before a flush, in megabytes.
    pub ram_buffer_mb: f64,

    /// Expected number of documents. A mismatch only logs a warning.
    pub expected_docs: Option<u64>,

    pub parser: ParserKind,

    /// Body fields. `None` selects the default schema for the input mode.
    pub fields: Option<Vec<FieldDefinition>>,

    /// Ranking defaults recorded with the index.
    pub bm25: Bm25Params,

    /// Write flushed segments on a background thread.
    pub background_flush: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            index_dir: PathBuf::from("index"),
            docs_dir: PathBuf::from("docs"),
            secondary_docs_dir: None,
            extension: "json".to_string(),
            charset: "utf-8".to_string(),
            ram_buffer_mb: 256.0,
            expected_docs: None,
            parser: ParserKind::default(),
            fields: None,
            bm25: Bm25Params::default(),
            background_flush: true,
        }
    }
}

impl IndexConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(index_dir: P, docs_dir: Q) -> Self {
        IndexConfig {
            index_dir: index_dir.into(),
            docs_dir: docs_dir.into(),
            ..Default::default()
        }
    }

    /// True when two parallel corpora are combined record by record.
    pub fn is_paired(&self) -> bool {
        self.secondary_docs_dir.is_some()
    }

    /// The configured schema, or the default one for the input mode.
    pub fn schema(&self) -> Schema {
        match &self.fields {
            Some(fields) => Schema::new(fields.clone()),
            None if self.is_paired() => Schema::multilingual(),
            None => Schema::single_language(),
        }
    }

    pub fn charset(&self) -> Result<Charset> {
        Charset::for_label(&self.charset)
    }

    /// Memory budget in bytes.
    pub fn ram_buffer_bytes(&self) -> usize {
        (self.ram_buffer_mb * 1024.0 * 1024.0) as usize
    }

    /// Check every build parameter. Performs no I/O.
    pub fn validate(&self) -> Result<()> {
        if !self.ram_buffer_mb.is_finite() || self.ram_buffer_mb <= 0.0 {
            return Err(XiphosError::invalid_config(format!(
                "RAM buffer must be greater than zero, got {}",
                self.ram_buffer_mb
            )));
        }
        if self.ram_buffer_bytes() == 0 {
            return Err(XiphosError::invalid_config("RAM buffer is below one byte"));
        }
        if normalize_extension(&self.extension).is_empty() {
            return Err(XiphosError::invalid_config(
                "Source file extension must not be empty",
            ));
        }
        if self.index_dir.as_os_str().is_empty() {
            return Err(XiphosError::invalid_config("Index directory must be set"));
        }
        self.charset()?;
        self.bm25.validate()?;
        self.schema().validate(self.is_paired())?;
        Ok(())
    }

    /// Check that the corpus directories can be read.
    pub fn validate_sources(&self) -> Result<()> {
        let dirs = std::iter::once(&self.docs_dir).chain(self.secondary_docs_dir.iter());
        for dir in dirs {
            if !dir.is_dir() {
                return Err(XiphosError::invalid_config(format!(
                    "Corpus directory {} does not exist or is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
