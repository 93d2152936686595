//! Corpus documents and the streaming parsers that produce them.
//!
//! - [`document::ParsedDocument`] is one `{id, contents}` record as it
//!   appears in a corpus file.
//! - [`document::Document`] is the record handed to the index builder: an
//!   identifier plus one text per indexed field.
//! - [`parser`] decodes corpus files one record at a time.
//! - [`corpus`] discovers corpus files and pairs parallel streams.
//! - [`charset`] resolves the configured source encoding.

pub mod charset;
pub mod corpus;
pub mod document;
pub mod parser;
