//! DUNE container framing.
//!
//! ```text
//! file  := "DUNE" block*
//! block := metaLen:u32 metadata dataLen:u32 payload
//! ```
//!
//! Lengths are big-endian. There is no index or trailer: end of input at an
//! entry boundary ends the archive.

use crate::DUNE_MAGIC;
use crate::metadata::BlockMetadata;
use dune_core::error::{DuneError, Result};
use dune_core::Stage;
use std::io::{self, Read, Write};

/// One decoded container entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEntry {
    /// Zero-based ordinal of the entry.
    pub index: u64,
    /// Byte offset of the entry's first length field.
    pub offset: u64,
    /// Parsed block metadata.
    pub metadata: BlockMetadata,
    /// Bit-packed payload.
    pub payload: Vec<u8>,
}

/// Entry header read without its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySummary {
    /// Zero-based ordinal of the entry.
    pub index: u64,
    /// Byte offset of the entry's first length field.
    pub offset: u64,
    /// Parsed block metadata.
    pub metadata: BlockMetadata,
    /// Serialized metadata length.
    pub metadata_len: u32,
    /// Payload length.
    pub payload_len: u32,
}

impl EntrySummary {
    /// Total entry size including both length fields.
    pub fn entry_len(&self) -> u64 {
        8 + self.metadata_len as u64 + self.payload_len as u64
    }
}

/// Read until `buf` is full or the input ends; returns the bytes read.
pub(crate) fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Writes the magic header and framed entries.
pub struct ContainerWriter<W: Write> {
    writer: W,
    position: u64,
    entries: u64,
}

impl<W: Write> ContainerWriter<W> {
    /// Create a writer, emitting the magic header.
    pub fn new(mut writer: W) -> Result<Self> {
        writer.write_all(&DUNE_MAGIC)?;
        Ok(Self {
            writer,
            position: DUNE_MAGIC.len() as u64,
            entries: 0,
        })
    }

    /// Append one entry; returns its byte offset.
    pub fn write_entry(&mut self, metadata: &BlockMetadata, payload: &[u8]) -> Result<u64> {
        let meta_bytes = metadata.to_bytes();
        let meta_len = section_len("metadata", meta_bytes.len())?;
        let data_len = section_len("payload", payload.len())?;

        let offset = self.position;
        self.writer.write_all(&meta_len.to_be_bytes())?;
        self.writer.write_all(&meta_bytes)?;
        self.writer.write_all(&data_len.to_be_bytes())?;
        self.writer.write_all(payload)?;

        self.position += 8 + meta_bytes.len() as u64 + payload.len() as u64;
        self.entries += 1;
        Ok(offset)
    }

    /// Bytes written so far, magic included.
    pub fn bytes_written(&self) -> u64 {
        self.position
    }

    /// Entries written so far.
    pub fn entries_written(&self) -> u64 {
        self.entries
    }

    /// Flush and return the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn section_len(section: &str, len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| DuneError::invalid_config(format!("{section} of {len} bytes exceeds u32 length field")))
}

/// Validates the magic header and yields entries in file order.
pub struct ContainerReader<R: Read> {
    reader: R,
    position: u64,
    next_index: u64,
}

impl<R: Read> ContainerReader<R> {
    /// Create a reader, validating the magic header.
    pub fn new(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 4];
        let got = read_fully(&mut reader, &mut magic)?;
        if got < magic.len() {
            return Err(DuneError::truncated("magic", magic.len(), got));
        }
        if magic != DUNE_MAGIC {
            return Err(DuneError::invalid_magic(DUNE_MAGIC, magic));
        }

        Ok(Self {
            reader,
            position: magic.len() as u64,
            next_index: 0,
        })
    }

    /// Bytes consumed so far, magic included.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Ordinal of the next entry to be read.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Read the next entry with its payload, or `None` at end of archive.
    pub fn next_entry(&mut self) -> Result<Option<BlockEntry>> {
        let Some(summary) = self.read_header()? else {
            return Ok(None);
        };
        let (index, offset) = (summary.index, summary.offset);

        let payload = self
            .read_section("payload", summary.payload_len)
            .map_err(|e| e.in_block(index, offset, Stage::Framing))?;

        Ok(Some(BlockEntry {
            index,
            offset,
            metadata: summary.metadata,
            payload,
        }))
    }

    /// Read the next entry header and skip its payload without decoding it.
    pub fn skip_entry(&mut self) -> Result<Option<EntrySummary>> {
        let Some(summary) = self.read_header()? else {
            return Ok(None);
        };

        let wanted = summary.payload_len as u64;
        let skipped = io::copy(&mut (&mut self.reader).take(wanted), &mut io::sink())?;
        self.position += skipped;
        if skipped < wanted {
            return Err(
                DuneError::truncated("payload", wanted as usize, skipped as usize).in_block(
                    summary.index,
                    summary.offset,
                    Stage::Framing,
                ),
            );
        }

        Ok(Some(summary))
    }

    /// Read lengths and metadata of the next entry, leaving the reader at
    /// the payload.
    fn read_header(&mut self) -> Result<Option<EntrySummary>> {
        let offset = self.position;
        let index = self.next_index;
        let framing = |e: DuneError| e.in_block(index, offset, Stage::Framing);

        let mut len_buf = [0u8; 4];
        let got = read_fully(&mut self.reader, &mut len_buf)?;
        self.position += got as u64;
        match got {
            0 => return Ok(None),
            4 => {}
            _ => return Err(framing(DuneError::truncated("metadata length", 4, got))),
        }
        let metadata_len = u32::from_be_bytes(len_buf);

        let meta_bytes = self.read_section("metadata", metadata_len).map_err(framing)?;
        let metadata = BlockMetadata::from_bytes(&meta_bytes)
            .map_err(|e| e.in_block(index, offset, Stage::Metadata))?;

        let got = read_fully(&mut self.reader, &mut len_buf)?;
        self.position += got as u64;
        if got < 4 {
            return Err(framing(DuneError::truncated("payload length", 4, got)));
        }
        let payload_len = u32::from_be_bytes(len_buf);

        self.next_index += 1;
        Ok(Some(EntrySummary {
            index,
            offset,
            metadata,
            metadata_len,
            payload_len,
        }))
    }

    /// Read exactly `len` bytes without trusting `len` for the allocation.
    fn read_section(&mut self, section: &'static str, len: u32) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let got = (&mut self.reader).take(len as u64).read_to_end(&mut buf)?;
        self.position += got as u64;
        if got < len as usize {
            return Err(DuneError::truncated(section, len as usize, got));
        }
        Ok(buf)
    }
}
