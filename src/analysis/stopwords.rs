//! Stopword resources.
//!
//! A [`StopwordSet`] is loaded once when analyzers are configured and then
//! shared read-only (`Arc<StopwordSet>`) by every pipeline built from it.
//! The file format is plain text with one term per line; blank lines and
//! lines starting with `#` are ignored.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, XiphosError};

const TERRIER: &str = include_str!("../../resources/stopwords/terrier.txt");

/// Small English list used when no larger resource is wanted.
const SHORT_ENGLISH: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// An immutable set of stop words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StopwordSet {
    name: String,
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn from_words<I, S>(name: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StopwordSet {
            name: name.to_string(),
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the one-term-per-line format.
    pub fn parse(name: &str, content: &str) -> Self {
        Self::from_words(name, parse_lines(content))
    }

    /// Load a stopword file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            XiphosError::invalid_config(format!(
                "Unable to read stopword file {}: {e}",
                path.display()
            ))
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(Self::parse(&name, &content))
    }

    /// Look up a list shipped with the crate: `terrier` or `english`.
    pub fn builtin(name: &str) -> Result<Self> {
        match name {
            "terrier" => Ok(Self::parse(name, TERRIER)),
            "english" => Ok(Self::from_words(name, SHORT_ENGLISH.iter().copied())),
            other => Err(XiphosError::invalid_config(format!(
                "Unknown builtin stopword list: {other}"
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in sorted order.
    pub fn sorted_words(&self) -> Vec<String> {
        let mut words: Vec<String> = self.words.iter().cloned().collect();
        words.sort();
        words
    }
}

fn parse_lines(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

/// Where a stopword set comes from.
///
/// `File` sources are resolved into `Inline` lists when an index is
/// configured, so the word list travels with the index schema and query-time
/// analysis sees the exact same set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopwordSource {
    Builtin { name: String },
    File { path: PathBuf },
    Inline { name: String, words: Vec<String> },
}

impl StopwordSource {
    pub fn terrier() -> Self {
        StopwordSource::Builtin {
            name: "terrier".to_string(),
        }
    }

    /// Replace a `File` source by the inline list it contains.
    pub fn resolve(&self) -> Result<StopwordSource> {
        match self {
            StopwordSource::File { path } => {
                let set = StopwordSet::load(path)?;
                Ok(StopwordSource::Inline {
                    name: set.name().to_string(),
                    words: set.sorted_words(),
                })
            }
            StopwordSource::Builtin { name } => {
                // Fail early on unknown names.
                StopwordSet::builtin(name)?;
                Ok(self.clone())
            }
            StopwordSource::Inline { .. } => Ok(self.clone()),
        }
    }

    pub fn load(&self) -> Result<StopwordSet> {
        match self {
            StopwordSource::Builtin { name } => StopwordSet::builtin(name),
            StopwordSource::File { path } => StopwordSet::load(path),
            StopwordSource::Inline { name, words } => {
                Ok(StopwordSet::from_words(name, words.iter().cloned()))
            }
        }
    }
}

impl Default for StopwordSource {
    fn default() -> Self {
        StopwordSource::terrier()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_builtin_terrier() {
        let set = StopwordSet::builtin("terrier").unwrap();
        assert_eq!(set.name(), "terrier");
        assert!(set.contains("the"));
        assert!(set.contains("yourselves"));
        assert!(!set.contains("fox"));
        assert!(set.len() > 500);
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(StopwordSet::builtin("klingon").is_err());
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let set = StopwordSet::parse("t", "# header\nthe\n\n  and \n");
        assert_eq!(set.len(), 2);
        assert!(set.contains("and"));
    }

    #[test]
    fn test_file_source_resolves_inline() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "le").unwrap();
        writeln!(file, "la").unwrap();

        let source = StopwordSource::File {
            path: file.path().to_path_buf(),
        };
        let resolved = source.resolve().unwrap();

        match &resolved {
            StopwordSource::Inline { words, .. } => assert_eq!(words, &vec!["la", "le"]),
            other => panic!("unexpected source {other:?}"),
        }
        assert!(resolved.load().unwrap().contains("le"));
    }

    #[test]
    fn test_missing_file() {
        let source = StopwordSource::File {
            path: PathBuf::from("/nonexistent/stopwords.txt"),
        };
        assert!(source.resolve().is_err());
    }
}
