//! Parser for JSON Lines corpora: one `{id, contents}` object per line.
//! Blank lines are skipped.

use std::io::BufRead;

use crate::document::document::ParsedDocument;
use crate::document::parser::DocumentParser;
use crate::error::{Result, XiphosError};

#[derive(Debug)]
pub struct JsonLinesParser<R> {
    reader: R,
    source: String,
    line: String,
    line_number: usize,
    current: Option<ParsedDocument>,
    documents_read: usize,
    exhausted: bool,
    failed: bool,
}

impl<R: BufRead> JsonLinesParser<R> {
    pub fn new(reader: R, source: &str) -> Self {
        JsonLinesParser {
            reader,
            source: source.to_string(),
            line: String::new(),
            line_number: 0,
            current: None,
            documents_read: 0,
            exhausted: false,
            failed: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.exhausted || self.failed
    }

    fn error(&self, msg: impl std::fmt::Display) -> XiphosError {
        XiphosError::parse(format!("{} (line {}): {msg}", self.source, self.line_number))
    }

    fn advance(&mut self) -> Result<bool> {
        if self.exhausted {
            return Err(self.error("parser already exhausted"));
        }
        if self.failed {
            return Err(self.error("parser failed earlier"));
        }

        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                self.exhausted = true;
                return Ok(false);
            }
            self.line_number += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let document: ParsedDocument = serde_json::from_str(trimmed)
                .map_err(|e| self.error(format!("malformed record: {e}")))?;
            self.current = Some(document);
            self.documents_read += 1;
            return Ok(true);
        }
    }
}

impl<R: BufRead> DocumentParser for JsonLinesParser<R> {
    fn has_next(&mut self) -> Result<bool> {
        self.current = None;
        let result = self.advance();
        if result.is_err() && !self.exhausted {
            self.failed = true;
        }
        result
    }

    fn next_document(&mut self) -> Result<ParsedDocument> {
        self.current
            .take()
            .ok_or_else(|| self.error("next_document called without a successful has_next"))
    }

    fn documents_read(&self) -> usize {
        self.documents_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let input = "{\"id\":\"a\",\"contents\":\"one\"}\n\n{\"id\":\"b\",\"contents\":\"two\"}";
        let mut parser = JsonLinesParser::new(input.as_bytes(), "test");

        assert!(parser.has_next().unwrap());
        assert_eq!(parser.next_document().unwrap().id, "a");
        assert!(parser.has_next().unwrap());
        assert_eq!(parser.next_document().unwrap().id, "b");
        assert!(!parser.has_next().unwrap());
        assert_eq!(parser.documents_read(), 2);
        assert!(parser.has_next().is_err());
    }

    #[test]
    fn test_malformed_line() {
        let input = "{\"id\":\"a\",\"contents\":\"one\"}\n{broken\n";
        let mut parser = JsonLinesParser::new(input.as_bytes(), "test");

        assert!(parser.has_next().unwrap());
        let err = parser.has_next().unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(parser.is_finished());
    }
}
