//! Per-block metadata.
//!
//! ```text
//! blockSize:u32  transformIndex:u32  preEntropySize:u32
//! codeCount:u16  (symbol:u8 length:u8){codeCount}
//! ```
//!
//! All fields big-endian. Table contents are checked later by the
//! Huffman decoder; this module only enforces the layout.

use crate::huffman::{CodeEntry, CodeTable};
use dune_core::error::{DuneError, Result};

/// Size of the fixed fields before the code table.
pub const FIXED_LEN: usize = 14;

/// Information needed to invert one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMetadata {
    /// Bytes in the block before any transform.
    pub block_size: u32,
    /// Sorted row of the original block.
    pub transform_index: u32,
    /// Bytes of run-length output fed to the Huffman coder.
    pub pre_entropy_size: u32,
    /// Canonical code table.
    pub code_table: CodeTable,
}

impl BlockMetadata {
    /// Serialized length in bytes.
    pub fn encoded_len(&self) -> usize {
        FIXED_LEN + 2 * self.code_table.len()
    }

    /// Serialize to the on-disk layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.block_size.to_be_bytes());
        out.extend_from_slice(&self.transform_index.to_be_bytes());
        out.extend_from_slice(&self.pre_entropy_size.to_be_bytes());
        // A table never holds more than 256 entries
        out.extend_from_slice(&(self.code_table.len() as u16).to_be_bytes());
        for entry in self.code_table.entries() {
            out.push(entry.symbol);
            out.push(entry.length);
        }
        out
    }

    /// Parse the on-disk layout, rejecting short input and trailing bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < FIXED_LEN {
            return Err(DuneError::truncated("metadata header", FIXED_LEN, data.len()));
        }

        let be32 = |at: usize| u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);
        let block_size = be32(0);
        let transform_index = be32(4);
        let pre_entropy_size = be32(8);
        let code_count = u16::from_be_bytes([data[12], data[13]]) as usize;

        let table_bytes = &data[FIXED_LEN..];
        let needed = code_count * 2;
        if table_bytes.len() < needed {
            return Err(DuneError::truncated("code table", needed, table_bytes.len()));
        }
        if table_bytes.len() > needed {
            return Err(DuneError::TrailingMetadata {
                extra: table_bytes.len() - needed,
            });
        }

        let entries = table_bytes
            .chunks_exact(2)
            .map(|pair| CodeEntry::new(pair[0], pair[1]))
            .collect();

        Ok(Self {
            block_size,
            transform_index,
            pre_entropy_size,
            code_table: CodeTable::from_stored(entries),
        })
    }
}
