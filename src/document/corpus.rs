//! Corpus discovery and multi-file document streams.
//!
//! A corpus is a directory tree; every file whose name ends with the
//! configured extension is parsed in sorted path order. [`CorpusReader`]
//! chains the files into one stream and [`PairedCorpus`] walks two parallel
//! streams (one per language) in lockstep.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::document::charset::Charset;
use crate::document::document::ParsedDocument;
use crate::document::parser::{CorpusParser, DocumentParser, ParserKind};
use crate::error::{Result, XiphosError};

/// Normalize an extension filter: `.json` and `json` are equivalent.
pub fn normalize_extension(extension: &str) -> &str {
    extension.trim().trim_start_matches('.')
}

/// Recursively list the files under `dir` whose name ends with `.extension`,
/// sorted by path.
pub fn discover_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(XiphosError::invalid_config(format!(
            "Corpus directory {} does not exist or is not a directory",
            dir.display()
        )));
    }

    let suffix = format!(".{}", normalize_extension(extension));
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .file_name()
                .map(|name| name.to_string_lossy().ends_with(&suffix))
                .unwrap_or(false)
            {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Sequential stream of records over several corpus files.
#[derive(Debug)]
pub struct CorpusReader {
    files: Vec<PathBuf>,
    next_file: usize,
    parser: Option<CorpusParser>,
    kind: ParserKind,
    charset: Charset,
    documents_read: usize,
}

impl CorpusReader {
    pub fn new(files: Vec<PathBuf>, kind: ParserKind, charset: Charset) -> Self {
        CorpusReader {
            files,
            next_file: 0,
            parser: None,
            kind,
            charset,
            documents_read: 0,
        }
    }

    /// Discover and open the corpus under `dir`.
    pub fn open<P: AsRef<Path>>(
        dir: P,
        extension: &str,
        kind: ParserKind,
        charset: Charset,
    ) -> Result<Self> {
        let files = discover_files(&dir, extension)?;
        info!(
            "Found {} corpus file(s) in {}",
            files.len(),
            dir.as_ref().display()
        );
        Ok(Self::new(files, kind, charset))
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn documents_read(&self) -> usize {
        self.documents_read
    }

    /// The next record across all files, or `None` when every file is done.
    pub fn next_document(&mut self) -> Result<Option<ParsedDocument>> {
        loop {
            if let Some(parser) = self.parser.as_mut() {
                if parser.has_next()? {
                    self.documents_read += 1;
                    return parser.next_document().map(Some);
                }
                debug!("Finished corpus file after {} record(s)", parser.documents_read());
                self.parser = None;
            }

            let Some(path) = self.files.get(self.next_file) else {
                return Ok(None);
            };
            info!("Parsing {}", path.display());
            self.parser = Some(CorpusParser::open(self.kind, path, self.charset)?);
            self.next_file += 1;
        }
    }
}

/// Two parallel corpora combined record by record.
///
/// Both sides must yield the same identifiers in the same order and the
/// same number of records; anything else is a fatal consistency error.
#[derive(Debug)]
pub struct PairedCorpus {
    primary: CorpusReader,
    secondary: CorpusReader,
}

impl PairedCorpus {
    pub fn new(primary: CorpusReader, secondary: CorpusReader) -> Self {
        PairedCorpus { primary, secondary }
    }

    pub fn next_pair(&mut self) -> Result<Option<(ParsedDocument, ParsedDocument)>> {
        let left = self.primary.next_document()?;
        let right = self.secondary.next_document()?;

        match (left, right) {
            (None, None) => Ok(None),
            (Some(left), Some(right)) => {
                if left.id != right.id {
                    return Err(XiphosError::consistency(format!(
                        "Paired documents differ at record {}: primary id {:?}, secondary id {:?}",
                        self.primary.documents_read(),
                        left.id,
                        right.id
                    )));
                }
                Ok(Some((left, right)))
            }
            (Some(left), None) => Err(XiphosError::consistency(format!(
                "Secondary corpus ended before primary document {:?}",
                left.id
            ))),
            (None, Some(right)) => Err(XiphosError::consistency(format!(
                "Primary corpus ended before secondary document {:?}",
                right.id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn reader(dir: &Path) -> CorpusReader {
        CorpusReader::open(dir, "json", ParserKind::JsonArray, Charset::utf8()).unwrap()
    }

    #[test]
    fn test_discover_files_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "b.json", "[]");
        write(temp_dir.path(), "a.json", "[]");
        write(temp_dir.path(), "notes.txt", "");
        write(temp_dir.path(), "nested/c.json", "[]");

        let files = discover_files(temp_dir.path(), ".json").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(temp_dir.path()).unwrap().display().to_string())
            .collect();

        assert_eq!(names, vec!["a.json", "b.json", "nested/c.json"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        assert!(discover_files("/nonexistent/corpus", "json").is_err());
    }

    #[test]
    fn test_reader_chains_files() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "1.json", r#"[{"id":"d1","contents":"a"}]"#);
        write(temp_dir.path(), "2.json", r#"[]"#);
        write(temp_dir.path(), "3.json", r#"[{"id":"d2","contents":"b"}]"#);

        let mut reader = reader(temp_dir.path());
        let mut ids = Vec::new();
        while let Some(doc) = reader.next_document().unwrap() {
            ids.push(doc.id);
        }

        assert_eq!(ids, vec!["d1", "d2"]);
        assert_eq!(reader.documents_read(), 2);
    }

    #[test]
    fn test_paired_corpus() {
        let en = TempDir::new().unwrap();
        let fr = TempDir::new().unwrap();
        write(en.path(), "en.json", r#"[{"id":"d1","contents":"cat"},{"id":"d2","contents":"dog"}]"#);
        write(fr.path(), "fr.json", r#"[{"id":"d1","contents":"chat"},{"id":"d2","contents":"chien"}]"#);

        let mut paired = PairedCorpus::new(reader(en.path()), reader(fr.path()));
        let (left, right) = paired.next_pair().unwrap().unwrap();
        assert_eq!(left.contents, "cat");
        assert_eq!(right.contents, "chat");
        assert!(paired.next_pair().unwrap().is_some());
        assert!(paired.next_pair().unwrap().is_none());
    }

    #[test]
    fn test_paired_corpus_id_mismatch() {
        let en = TempDir::new().unwrap();
        let fr = TempDir::new().unwrap();
        write(en.path(), "en.json", r#"[{"id":"d1","contents":"cat"},{"id":"d2","contents":"dog"}]"#);
        write(fr.path(), "fr.json", r#"[{"id":"d1","contents":"chat"},{"id":"d3","contents":"chien"}]"#);

        let mut paired = PairedCorpus::new(reader(en.path()), reader(fr.path()));
        assert!(paired.next_pair().unwrap().is_some());
        match paired.next_pair() {
            Err(XiphosError::Consistency(_)) => {}
            other => panic!("expected consistency error, got {other:?}"),
        }
    }

    #[test]
    fn test_paired_corpus_length_mismatch() {
        let en = TempDir::new().unwrap();
        let fr = TempDir::new().unwrap();
        write(en.path(), "en.json", r#"[{"id":"d1","contents":"cat"},{"id":"d2","contents":"dog"}]"#);
        write(fr.path(), "fr.json", r#"[{"id":"d1","contents":"chat"}]"#);

        let mut paired = PairedCorpus::new(reader(en.path()), reader(fr.path()));
        assert!(paired.next_pair().unwrap().is_some());
        assert!(matches!(paired.next_pair(), Err(XiphosError::Consistency(_))));
    }
}
