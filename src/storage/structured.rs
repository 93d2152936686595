//! Structured binary files.
//!
//! Every index file except the commit point is written through a
//! [`StructWriter`]: little-endian fixed-width values, LEB128 varints and
//! length-prefixed strings, followed by a CRC32 footer over everything
//! written. [`StructReader`] mirrors the writer and checks the footer.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;

use crate::error::{Result, XiphosError};
use crate::storage::traits::{StorageInput, StorageOutput};
use crate::util::varint;

/// A structured file writer for binary data.
pub struct StructWriter<W: StorageOutput> {
    writer: W,
    hasher: Hasher,
    position: u64,
}

impl<W: StorageOutput> StructWriter<W> {
    pub fn new(writer: W) -> Self {
        StructWriter {
            writer,
            hasher: Hasher::new(),
            position: 0,
        }
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.writer.write_u8(value)?;
        self.update(&[value]);
        Ok(())
    }

    /// Write a u32 value (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_u32::<LittleEndian>(value)?;
        self.update(&value.to_le_bytes());
        Ok(())
    }

    /// Write a variable-length integer.
    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        let bytes = varint::encode_u64(value);
        self.write_raw(&bytes)
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    /// Write a length-prefixed byte slice.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.write_varint(value.len() as u64)?;
        self.write_raw(value)
    }

    pub fn write_raw(&mut self, value: &[u8]) -> Result<()> {
        self.writer.write_all(value)?;
        self.update(value);
        Ok(())
    }

    /// CRC32 of everything written so far.
    fn checksum(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.position += data.len() as u64;
    }

    /// Append the checksum footer, sync and close. Returns the file length.
    pub fn close(mut self) -> Result<u64> {
        let checksum = self.checksum();
        self.writer.write_u32::<LittleEndian>(checksum)?;
        self.writer.flush_and_sync()?;
        self.writer.close()?;
        Ok(self.position + 4)
    }
}

/// A structured file reader for binary data.
pub struct StructReader<R: StorageInput> {
    reader: R,
    hasher: Hasher,
    position: u64,
    file_size: u64,
}

impl<R: StorageInput> StructReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        let file_size = reader.size()?;
        if file_size < 4 {
            return Err(XiphosError::storage("File too short for checksum"));
        }
        Ok(StructReader {
            reader,
            hasher: Hasher::new(),
            position: 0,
            file_size,
        })
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let value = self.reader.read_u8()?;
        self.update(&[value]);
        Ok(value)
    }

    /// Read a u32 value (little-endian).
    pub fn read_u32(&mut self) -> Result<u32> {
        let value = self.reader.read_u32::<LittleEndian>()?;
        self.update(&value.to_le_bytes());
        Ok(value)
    }

    /// Read a variable-length integer.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut bytes = Vec::with_capacity(10);
        loop {
            let byte = self.reader.read_u8()?;
            bytes.push(byte);
            if byte & 0x80 == 0 {
                break;
            }
            if bytes.len() >= 10 {
                return Err(XiphosError::storage("Varint is too long"));
            }
        }

        let (value, _) = varint::decode_u64(&bytes)?;
        self.update(&bytes);
        Ok(value)
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes)
            .map_err(|e| XiphosError::storage(format!("Invalid UTF-8 string: {e}")))
    }

    /// Read a length-prefixed byte vector.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let length = self.read_varint()?;
        self.read_raw(length)
    }

    /// Read `length` bytes; the read must end before the checksum footer.
    pub fn read_raw(&mut self, length: u64) -> Result<Vec<u8>> {
        let end = length
            .checked_add(4)
            .and_then(|n| self.position.checked_add(n));
        let length = match (end, usize::try_from(length)) {
            (Some(end), Ok(length)) if end <= self.file_size => length,
            _ => {
                return Err(XiphosError::storage(format!(
                    "Read of {length} bytes at {} overruns file of {} bytes",
                    self.position, self.file_size
                )));
            }
        };
        let mut buffer = vec![0u8; length];
        self.reader.read_exact(&mut buffer)?;
        self.update(&buffer);
        Ok(buffer)
    }

    pub fn size(&self) -> u64 {
        self.file_size
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.position += data.len() as u64;
    }

    /// Read the footer and compare it with the checksum of the bytes read.
    ///
    /// Must be called after the whole body has been consumed.
    pub fn verify_checksum(mut self) -> Result<()> {
        if self.position + 4 != self.file_size {
            return Err(XiphosError::storage(format!(
                "Trailing data before checksum: {} unread byte(s)",
                self.file_size.saturating_sub(self.position + 4)
            )));
        }
        let stored = self.reader.read_u32::<LittleEndian>()?;
        let computed = self.hasher.finalize();
        if stored != computed {
            return Err(XiphosError::storage(format!(
                "Checksum mismatch: stored {stored:08x}, computed {computed:08x}"
            )));
        }
        Ok(())
    }
}
