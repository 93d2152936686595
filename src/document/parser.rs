//! Streaming corpus parsers.
//!
//! A parser is a pull-based, single-use sequence of [`ParsedDocument`]s:
//!
//! ```text
//! while parser.has_next()? {
//!     let doc = parser.next_document()?;
//!     ...
//! }
//! ```
//!
//! `has_next` decodes exactly one record. At most one decoded record is held
//! at a time, so memory does not grow with the corpus. A malformed record or
//! broken framing is a fatal [`XiphosError::Parse`]; nothing is skipped.
//! Once `has_next` has returned `false` the parser is exhausted and any
//! further call fails.
//!
//! The set of formats is closed ([`ParserKind`]) and picked by configuration.
//!
//! # Examples
//!
//! ```
//! use xiphos::document::parser::{CorpusParser, ParserKind};
//!
//! let json = r#"[{"id": "d1", "contents": "first"}, {"id": "d2", "contents": "second"}]"#;
//! let parser = CorpusParser::from_reader(ParserKind::JsonArray, json.as_bytes(), "inline");
//!
//! let ids: Vec<String> = parser.map(|doc| doc.unwrap().id).collect();
//! assert_eq!(ids, vec!["d1", "d2"]);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::charset::Charset;
use crate::document::document::ParsedDocument;
use crate::error::{Result, XiphosError};

pub mod json_array;
pub mod json_lines;

use json_array::JsonArrayParser;
use json_lines::JsonLinesParser;

/// I/O buffer used for corpus files.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// The pull protocol shared by every corpus format.
pub trait DocumentParser {
    /// Decode the next record. Returns `false` at the end of the stream and
    /// fails on any call after that.
    fn has_next(&mut self) -> Result<bool>;

    /// Take the record decoded by the last successful `has_next`.
    fn next_document(&mut self) -> Result<ParsedDocument>;

    /// Number of records decoded so far.
    fn documents_read(&self) -> usize;
}

/// Supported corpus formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserKind {
    /// A single top-level JSON array of `{id, contents}` objects.
    #[default]
    JsonArray,
    /// One `{id, contents}` object per line.
    JsonLines,
}

impl ParserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserKind::JsonArray => "json_array",
            ParserKind::JsonLines => "json_lines",
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type BoxedReader = Box<dyn BufRead + Send>;

/// A parser for one corpus stream, resolved from a [`ParserKind`].
pub enum CorpusParser {
    JsonArray(JsonArrayParser<BoxedReader>),
    JsonLines(JsonLinesParser<BoxedReader>),
}

impl CorpusParser {
    /// Open a corpus file, decoding it from `charset`.
    pub fn open<P: AsRef<Path>>(kind: ParserKind, path: P, charset: Charset) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            XiphosError::parse(format!("Unable to open corpus file {}: {e}", path.display()))
        })?;
        let decoded = charset.decode(file);
        Ok(Self::from_reader(kind, decoded, &path.display().to_string()))
    }

    /// Parse an already-decoded UTF-8 stream. `source` names the stream in
    /// error messages.
    pub fn from_reader<R: Read + Send + 'static>(kind: ParserKind, reader: R, source: &str) -> Self {
        let reader: BoxedReader = Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, reader));
        match kind {
            ParserKind::JsonArray => CorpusParser::JsonArray(JsonArrayParser::new(reader, source)),
            ParserKind::JsonLines => CorpusParser::JsonLines(JsonLinesParser::new(reader, source)),
        }
    }

    pub fn kind(&self) -> ParserKind {
        match self {
            CorpusParser::JsonArray(_) => ParserKind::JsonArray,
            CorpusParser::JsonLines(_) => ParserKind::JsonLines,
        }
    }

    fn inner(&mut self) -> &mut dyn DocumentParser {
        match self {
            CorpusParser::JsonArray(parser) => parser,
            CorpusParser::JsonLines(parser) => parser,
        }
    }
}

impl DocumentParser for CorpusParser {
    fn has_next(&mut self) -> Result<bool> {
        self.inner().has_next()
    }

    fn next_document(&mut self) -> Result<ParsedDocument> {
        self.inner().next_document()
    }

    fn documents_read(&self) -> usize {
        match self {
            CorpusParser::JsonArray(parser) => parser.documents_read(),
            CorpusParser::JsonLines(parser) => parser.documents_read(),
        }
    }
}

/// Iterating yields each record; the first error ends the iteration.
impl Iterator for CorpusParser {
    type Item = Result<ParsedDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        let finished = match self {
            CorpusParser::JsonArray(parser) => parser.is_finished(),
            CorpusParser::JsonLines(parser) => parser.is_finished(),
        };
        if finished {
            return None;
        }
        match self.has_next() {
            Ok(true) => Some(self.next_document()),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl fmt::Debug for CorpusParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorpusParser")
            .field("kind", &self.kind())
            .field("documents_read", &self.documents_read())
            .finish()
    }
}
