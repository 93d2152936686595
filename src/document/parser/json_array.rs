//! Parser for a single top-level JSON array of `{id, contents}` records.
//!
//! Array framing (`[`, `,`, `]`) is scanned by hand; each element is decoded
//! by `serde_json` straight from the buffered reader, which stops reading at
//! the element's closing brace.

use std::io::BufRead;

use serde::Deserialize;

use crate::document::document::ParsedDocument;
use crate::document::parser::DocumentParser;
use crate::error::{Result, XiphosError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Nothing consumed yet.
    Start,
    /// Inside the array; `first` until an element has been decoded.
    InArray { first: bool },
    /// `]` consumed and nothing but whitespace followed.
    Exhausted,
    /// A previous call failed; the stream position is unknown.
    Failed,
}

#[derive(Debug)]
pub struct JsonArrayParser<R> {
    reader: R,
    source: String,
    state: State,
    current: Option<ParsedDocument>,
    documents_read: usize,
}

impl<R: BufRead> JsonArrayParser<R> {
    pub fn new(reader: R, source: &str) -> Self {
        JsonArrayParser {
            reader,
            source: source.to_string(),
            state: State::Start,
            current: None,
            documents_read: 0,
        }
    }

    /// True once the stream is exhausted or has failed.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Exhausted | State::Failed)
    }

    fn error(&self, msg: impl std::fmt::Display) -> XiphosError {
        XiphosError::parse(format!(
            "{} (record {}): {msg}",
            self.source,
            self.documents_read + 1
        ))
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(());
            }
            let len = buf.len();
            let skipped = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
            self.reader.consume(skipped);
            if skipped < len {
                return Ok(());
            }
        }
    }

    fn peek(&mut self) -> Result<Option<u8>> {
        Ok(self.reader.fill_buf()?.first().copied())
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        self.skip_whitespace()?;
        match self.peek()? {
            Some(b) if b == expected => {
                self.reader.consume(1);
                Ok(())
            }
            Some(b) => Err(self.error(format!(
                "expected '{}' but found '{}'",
                expected as char, b as char
            ))),
            None => Err(self.error(format!(
                "unexpected end of stream, expected '{}'",
                expected as char
            ))),
        }
    }

    fn advance(&mut self) -> Result<bool> {
        match self.state {
            State::Exhausted => return Err(self.error("parser already exhausted")),
            State::Failed => return Err(self.error("parser failed earlier")),
            State::Start => {
                self.expect(b'[')?;
                self.state = State::InArray { first: true };
            }
            State::InArray { .. } => {}
        }

        let first = matches!(self.state, State::InArray { first: true });
        self.skip_whitespace()?;
        match self.peek()? {
            None => return Err(self.error("unexpected end of stream inside array")),
            Some(b']') => {
                self.reader.consume(1);
                self.skip_whitespace()?;
                if let Some(b) = self.peek()? {
                    return Err(self.error(format!(
                        "unexpected content after end of array: '{}'",
                        b as char
                    )));
                }
                self.state = State::Exhausted;
                return Ok(false);
            }
            Some(_) if !first => {
                self.expect(b',')?;
                self.skip_whitespace()?;
                if self.peek()? == Some(b']') {
                    return Err(self.error("trailing comma before end of array"));
                }
            }
            Some(_) => {}
        }

        let decoded = {
            let mut deserializer = serde_json::Deserializer::from_reader(&mut self.reader);
            ParsedDocument::deserialize(&mut deserializer)
        };
        let document = decoded.map_err(|e| self.error(format!("malformed record: {e}")))?;

        self.state = State::InArray { first: false };
        self.current = Some(document);
        self.documents_read += 1;
        Ok(true)
    }
}

impl<R: BufRead> DocumentParser for JsonArrayParser<R> {
    fn has_next(&mut self) -> Result<bool> {
        self.current = None;
        let result = self.advance();
        if result.is_err() && self.state != State::Exhausted {
            self.state = State::Failed;
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

    fn parser(input: &str) -> JsonArrayParser<&[u8]> {
        JsonArrayParser::new(input.as_bytes(), "test")
    }

    fn collect(input: &str) -> Result<Vec<ParsedDocument>> {
        let mut parser = parser(input);
        let mut docs = Vec::new();
        while parser.has_next()? {
            docs.push(parser.next_document()?);
        }
        Ok(docs)
    }

    #[test]
    fn test_parse_array() {
        let docs = collect(
            r#"
            [
              {"id": "doc1", "contents": "The quick fox"},
              {"id": "doc2", "contents": "Le renard \"rapide\"", "extra": [1, 2]}
            ]
            "#,
        )
        .unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0], ParsedDocument::new("doc1", "The quick fox"));
        assert_eq!(docs[1].contents, "Le renard \"rapide\"");
    }

    #[test]
    fn test_empty_array() {
        assert!(collect("[]").unwrap().is_empty());
        assert!(collect("  [ \n ]  \n").unwrap().is_empty());
    }

    #[test]
    fn test_framing_errors() {
        assert!(collect("").is_err());
        assert!(collect(r#"{"id":"a","contents":"b"}"#).is_err());
        assert!(collect(r#"[{"id":"a","contents":"b"}"#).is_err());
        assert!(collect(r#"[{"id":"a","contents":"b"} {"id":"c","contents":"d"}]"#).is_err());
        assert!(collect(r#"[{"id":"a","contents":"b"},]"#).is_err());
        assert!(collect(r#"[{"id":"a","contents":"b"}] x"#).is_err());
    }

    #[test]
    fn test_malformed_element() {
        let err = collect(r#"[{"id":"a","contents":"b"}, {"id": 7, "contents": "x"}]"#).unwrap_err();
        assert!(err.to_string().contains("record 2"));

        assert!(collect(r#"[{"id":"a"}]"#).is_err());
        assert!(collect(r#"["just a string"]"#).is_err());
    }

    #[test]
    fn test_exhausted_parser_fails_on_reuse() {
        let mut parser = parser(r#"[{"id":"a","contents":"b"}]"#);

        assert!(parser.has_next().unwrap());
        parser.next_document().unwrap();
        assert!(!parser.has_next().unwrap());
        assert!(parser.is_finished());
        assert!(parser.has_next().is_err());
    }

    #[test]
    fn test_next_without_has_next() {
        let mut parser = parser(r#"[{"id":"a","contents":"b"}]"#);
        assert!(parser.next_document().is_err());

        assert!(parser.has_next().unwrap());
        assert_eq!(parser.next_document().unwrap().id, "a");
        assert!(parser.next_document().is_err());
    }

    #[test]
    fn test_failed_parser_stays_failed() {
        let mut parser = parser("[oops]");
        assert!(parser.has_next().is_err());
        assert!(parser.is_finished());
        assert!(parser.has_next().is_err());
        assert_eq!(parser.documents_read(), 0);
    }
}
