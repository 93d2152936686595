//! Segment files.
//!
//! A flush turns the buffered documents into one segment of two files,
//! both written with [`StructWriter`] and closed by a CRC32 footer:
//!
//! ```text
//! <name>.post   magic "XPST" | version | fields*
//!               field: name | granularity | term count | terms* (sorted)
//!               term:  text | df | cf | postings bytes
//! <name>.docs   magic "XDOC" | version | doc base | doc count
//!               | field names | stored field names | docs*
//!               doc:   identifier | (length + 1, or 0 if absent)* | stored values*
//! ```
//!
//! Postings carry global document numbers, so concatenating the lists of
//! consecutive segments keeps them sorted.

use serde::{Deserialize, Serialize};

use crate::error::{Result, XiphosError};
use crate::index::DocNumber;
use crate::index::posting::{self, FieldPostings, Posting};
use crate::index::schema::IndexGranularity;
use crate::storage::Storage;
use crate::storage::structured::{StructReader, StructWriter};

const POST_MAGIC: u32 = u32::from_le_bytes(*b"XPST");
const DOCS_MAGIC: u32 = u32::from_le_bytes(*b"XDOC");
const SEGMENT_VERSION: u8 = 1;

/// Postings and lengths of one field inside an unflushed segment.
#[derive(Debug)]
pub struct SegmentField {
    pub name: String,
    pub granularity: IndexGranularity,
    /// Token count per document; `None` when the document lacks the field.
    pub lengths: Vec<Option<u32>>,
    pub postings: FieldPostings,
}

/// A sealed in-memory segment waiting to be written.
#[derive(Debug)]
pub struct SegmentData {
    pub name: String,
    pub doc_base: DocNumber,
    pub identifiers: Vec<String>,
    pub fields: Vec<SegmentField>,
    pub stored_fields: Vec<String>,
    /// Stored values per document, aligned with `stored_fields`.
    pub stored_values: Vec<Vec<Option<String>>>,
}

impl SegmentData {
    pub fn doc_count(&self) -> usize {
        self.identifiers.len()
    }
}

/// Description of a written segment, recorded in the commit point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub name: String,
    pub doc_base: DocNumber,
    pub doc_count: u32,
    pub terms: u64,
    pub postings: u64,
    pub bytes: u64,
}

impl SegmentInfo {
    pub fn postings_file(&self) -> String {
        postings_file(&self.name)
    }

    pub fn docs_file(&self) -> String {
        docs_file(&self.name)
    }
}

pub fn postings_file(name: &str) -> String {
    format!("{name}.post")
}

pub fn docs_file(name: &str) -> String {
    format!("{name}.docs")
}

/// True for file names produced by [`write_segment`].
pub fn is_segment_file(name: &str) -> bool {
    name.ends_with(".post") || name.ends_with(".docs")
}

fn granularity_tag(granularity: IndexGranularity) -> u8 {
    match granularity {
        IndexGranularity::Docs => 0,
        IndexGranularity::DocsAndFreqs => 1,
    }
}

fn granularity_from_tag(tag: u8) -> Result<IndexGranularity> {
    match tag {
        0 => Ok(IndexGranularity::Docs),
        1 => Ok(IndexGranularity::DocsAndFreqs),
        other => Err(XiphosError::index(format!("Unknown granularity tag {other}"))),
    }
}

/// Write both files of a segment.
pub fn write_segment(storage: &dyn Storage, segment: SegmentData) -> Result<SegmentInfo> {
    let doc_count = u32::try_from(segment.doc_count())
        .map_err(|_| XiphosError::index("Segment holds too many documents"))?;

    let mut post = StructWriter::new(storage.create_output(&postings_file(&segment.name))?);
    post.write_u32(POST_MAGIC)?;
    post.write_u8(SEGMENT_VERSION)?;
    post.write_varint(segment.fields.len() as u64)?;

    let mut docs = StructWriter::new(storage.create_output(&docs_file(&segment.name))?);
    docs.write_u32(DOCS_MAGIC)?;
    docs.write_u8(SEGMENT_VERSION)?;
    docs.write_varint(u64::from(segment.doc_base))?;
    docs.write_varint(u64::from(doc_count))?;
    docs.write_varint(segment.fields.len() as u64)?;
    for field in &segment.fields {
        docs.write_string(&field.name)?;
    }
    docs.write_varint(segment.stored_fields.len() as u64)?;
    for name in &segment.stored_fields {
        docs.write_string(name)?;
    }

    for (i, identifier) in segment.identifiers.iter().enumerate() {
        docs.write_string(identifier)?;
        for field in &segment.fields {
            let encoded = match field.lengths.get(i).copied().flatten() {
                Some(length) => u64::from(length) + 1,
                None => 0,
            };
            docs.write_varint(encoded)?;
        }
        let values = segment.stored_values.get(i);
        for slot in 0..segment.stored_fields.len() {
            match values.and_then(|v| v.get(slot)).and_then(Option::as_ref) {
                Some(value) => {
                    docs.write_u8(1)?;
                    docs.write_string(value)?;
                }
                None => docs.write_u8(0)?,
            }
        }
    }

    let mut total_terms = 0u64;
    let mut total_postings = 0u64;
    for field in segment.fields {
        post.write_string(&field.name)?;
        post.write_u8(granularity_tag(field.granularity))?;
        let terms = field.postings.into_sorted();
        post.write_varint(terms.len() as u64)?;
        total_terms += terms.len() as u64;

        for (term, postings) in terms {
            let collection_freq: u64 = postings.iter().map(|p| u64::from(p.freq)).sum();
            post.write_string(&term)?;
            post.write_varint(postings.len() as u64)?;
            post.write_varint(collection_freq)?;
            post.write_bytes(&posting::encode(&postings, field.granularity))?;
            total_postings += postings.len() as u64;
        }
    }

    let bytes = post.close()? + docs.close()?;
    Ok(SegmentInfo {
        name: segment.name,
        doc_base: segment.doc_base,
        doc_count,
        terms: total_terms,
        postings: total_postings,
        bytes,
    })
}

/// One term of a segment as read back from disk.
#[derive(Debug)]
pub struct TermBlock {
    pub term: String,
    pub doc_freq: u32,
    pub collection_freq: u64,
    pub postings: Vec<Posting>,
}

#[derive(Debug)]
pub struct FieldBlock {
    pub name: String,
    pub granularity: IndexGranularity,
    pub terms: Vec<TermBlock>,
}

/// Read and verify a segment's postings file.
pub fn read_postings(storage: &dyn Storage, info: &SegmentInfo) -> Result<Vec<FieldBlock>> {
    let file = info.postings_file();
    let mut reader = StructReader::new(storage.open_input(&file)?)?;
    check_header(&mut reader, POST_MAGIC, &file)?;

    let field_count = read_count(&mut reader, &file)?;
    let mut fields = Vec::with_capacity(field_count);
    for _ in 0..field_count {
        let name = reader.read_string()?;
        let granularity = granularity_from_tag(reader.read_u8()?)?;
        let term_count = read_count(&mut reader, &file)?;
        let mut terms = Vec::with_capacity(term_count);
        for _ in 0..term_count {
            let term = reader.read_string()?;
            let doc_freq = u32::try_from(reader.read_varint()?)
                .map_err(|_| XiphosError::index(format!("Corrupt document frequency in {file}")))?;
            let collection_freq = reader.read_varint()?;
            let bytes = reader.read_bytes()?;
            let mut postings = Vec::with_capacity((doc_freq as usize).min(bytes.len()));
            posting::decode_into(&bytes, doc_freq as usize, granularity, &mut postings)?;
            terms.push(TermBlock {
                term,
                doc_freq,
                collection_freq,
                postings,
            });
        }
        fields.push(FieldBlock {
            name,
            granularity,
            terms,
        });
    }

    reader
        .verify_checksum()
        .map_err(|e| XiphosError::index(format!("{file}: {e}")))?;
    Ok(fields)
}

/// Per-document data of a segment as read back from disk.
#[derive(Debug)]
pub struct DocsBlock {
    pub doc_base: DocNumber,
    pub identifiers: Vec<String>,
    pub field_names: Vec<String>,
    /// Lengths per field, aligned with `field_names`.
    pub lengths: Vec<Vec<Option<u32>>>,
    pub stored_fields: Vec<String>,
    pub stored_values: Vec<Vec<Option<String>>>,
}

/// Read and verify a segment's document file.
pub fn read_docs(storage: &dyn Storage, info: &SegmentInfo) -> Result<DocsBlock> {
    let file = info.docs_file();
    let mut reader = StructReader::new(storage.open_input(&file)?)?;
    check_header(&mut reader, DOCS_MAGIC, &file)?;

    let doc_base = DocNumber::try_from(reader.read_varint()?)
        .map_err(|_| XiphosError::index(format!("Corrupt document base in {file}")))?;
    let doc_count = read_count(&mut reader, &file)?;
    if doc_base != info.doc_base || doc_count as u64 != u64::from(info.doc_count) {
        return Err(XiphosError::index(format!(
            "{file} describes documents {doc_base}+{doc_count}, commit point expects {}+{}",
            info.doc_base, info.doc_count
        )));
    }

    let field_count = read_count(&mut reader, &file)?;
    let field_names = (0..field_count)
        .map(|_| reader.read_string())
        .collect::<Result<Vec<_>>>()?;
    let stored_count = read_count(&mut reader, &file)?;
    let stored_fields = (0..stored_count)
        .map(|_| reader.read_string())
        .collect::<Result<Vec<_>>>()?;

    let mut identifiers = Vec::with_capacity(doc_count);
    let mut lengths = vec![Vec::with_capacity(doc_count); field_count];
    let mut stored_values = Vec::with_capacity(doc_count);
    for _ in 0..doc_count {
        identifiers.push(reader.read_string()?);
        for field_lengths in lengths.iter_mut() {
            let encoded = reader.read_varint()?;
            let length = match encoded {
                0 => None,
                n => Some(u32::try_from(n - 1).map_err(|_| {
                    XiphosError::index(format!("Corrupt field length in {file}"))
                })?),
            };
            field_lengths.push(length);
        }
        let mut values = Vec::with_capacity(stored_count);
        for _ in 0..stored_count {
            values.push(match reader.read_u8()? {
                0 => None,
                _ => Some(reader.read_string()?),
            });
        }
        stored_values.push(values);
    }

    reader
        .verify_checksum()
        .map_err(|e| XiphosError::index(format!("{file}: {e}")))?;
    Ok(DocsBlock {
        doc_base,
        identifiers,
        field_names,
        lengths,
        stored_fields,
        stored_values,
    })
}

/// Read an element count, rejecting counts larger than the file itself.
fn read_count<R: crate::storage::StorageInput>(
    reader: &mut StructReader<R>,
    file: &str,
) -> Result<usize> {
    let count = reader.read_varint()?;
    match usize::try_from(count) {
        Ok(count) if count as u64 <= reader.size() => Ok(count),
        _ => Err(XiphosError::index(format!("Corrupt element count in {file}"))),
    }
}

fn check_header<R: crate::storage::StorageInput>(
    reader: &mut StructReader<R>,
    magic: u32,
    file: &str,
) -> Result<()> {
    if reader.read_u32()? != magic {
        return Err(XiphosError::index(format!("{file} is not a segment file")));
    }
    let version = reader.read_u8()?;
    if version != SEGMENT_VERSION {
        return Err(XiphosError::index(format!(
            "{file} has unsupported version {version}"
        )));
    }
    Ok(())
}
