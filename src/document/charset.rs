//! Source character encodings.
//!
//! Labels are resolved with the WHATWG rules of `encoding_rs`, so `utf-8`,
//! `UTF8`, `latin1` and `iso-8859-1` are all accepted. Decoding happens on
//! the fly; a corpus file is never loaded whole.

use std::io::Read;

use encoding_rs::Encoding;
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};

use crate::error::{Result, XiphosError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset {
    encoding: &'static Encoding,
}

impl Charset {
    /// Resolve a charset label, failing for unknown names.
    pub fn for_label(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(XiphosError::invalid_config("charset must not be empty"));
        }
        Encoding::for_label(trimmed.as_bytes())
            .map(|encoding| Charset { encoding })
            .ok_or_else(|| XiphosError::invalid_config(format!("Unknown charset: {label}")))
    }

    pub fn utf8() -> Self {
        Charset {
            encoding: encoding_rs::UTF_8,
        }
    }

    /// Canonical encoding name.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Wrap `reader` so that it yields UTF-8. A byte order mark, if present,
    /// is honoured and removed.
    pub fn decode<R: Read>(&self, reader: R) -> DecodeReaderBytes<R, Vec<u8>> {
        DecodeReaderBytesBuilder::new()
            .encoding(Some(self.encoding))
            .build(reader)
    }
}

impl Default for Charset {
    fn default() -> Self {
        Charset::utf8()
    }
}
