//! Document structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single corpus record: `{"id": "...", "contents": "..."}`.
///
/// Unknown keys in the record are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub id: String,
    pub contents: String,
}

impl ParsedDocument {
    pub fn new<I: Into<String>, C: Into<String>>(id: I, contents: C) -> Self {
        ParsedDocument {
            id: id.into(),
            contents: contents.into(),
        }
    }
}

/// A document ready for indexing: a unique identifier plus the text of each
/// tokenized field. Never mutated once handed to the builder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    identifier: String,
    fields: BTreeMap<String, String>,
}

impl Document {
    pub fn new<S: Into<String>>(identifier: S) -> Self {
        Document {
            identifier: identifier.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn builder<S: Into<String>>(identifier: S) -> DocumentBuilder {
        DocumentBuilder {
            document: Document::new(identifier),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn add_field<N: Into<String>, T: Into<String>>(&mut self, name: N, text: T) {
        self.fields.insert(name.into(), text.into());
    }

    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    pub fn add_text<N: Into<String>, T: Into<String>>(mut self, name: N, text: T) -> Self {
        self.document.add_field(name, text);
        self
    }

    pub fn build(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builder() {
        let doc = Document::builder("d1")
            .add_text("english_body", "hello")
            .add_text("french_body", "bonjour")
            .build();

        assert_eq!(doc.identifier(), "d1");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get_field("french_body"), Some("bonjour"));
        assert!(!doc.has_field("ngram"));

        let names: Vec<&str> = doc.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["english_body", "french_body"]);
    }

    #[test]
    fn test_parsed_document_ignores_unknown_keys() {
        let doc: ParsedDocument =
            serde_json::from_str(r#"{"id":"d1","contents":"text","url":"x"}"#).unwrap();
        assert_eq!(doc, ParsedDocument::new("d1", "text"));
    }

    #[test]
    fn test_parsed_document_requires_contents() {
        assert!(serde_json::from_str::<ParsedDocument>(r#"{"id":"d1"}"#).is_err());
    }
}
