//! Block-sorting compression for DuneArc.
//!
//! Each block of input passes through a pipeline of transformations:
//! 1. Burrows-Wheeler Transform (BWT) - Block sorting to group similar bytes
//! 2. Move-to-Front Transform (MTF) - Locality transformation
//! 3. Run-Length Encoding (RLE) - (count, value) byte pairs
//! 4. Canonical Huffman Coding - Final entropy coding
//!
//! Blocks are framed independently inside a DUNE container, so they can be
//! concatenated, located and decoded one at a time.
//!
//! ```
//! use dune_codec::{BlockSize, compress, decompress};
//!
//! let data = b"AAAABBBCCD";
//! let packed = compress(data, BlockSize::default()).unwrap();
//! assert_eq!(&packed[..4], b"DUNE");
//! assert_eq!(decompress(&packed[..]).unwrap(), data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Burrows-Wheeler Transform implementation.
pub mod bwt;
/// DUNE container framing.
pub mod container;
mod decode;
mod encode;
/// Canonical Huffman coder.
pub mod huffman;
/// Per-block metadata codec.
pub mod metadata;
/// Move-to-Front transform.
pub mod mtf;
/// Byte-pair run-length coding.
pub mod rle;

pub use container::{BlockEntry, ContainerReader, ContainerWriter, EntrySummary};
pub use decode::{DuneDecoder, decompress, decompress_block, decompress_stream};
pub use encode::{DuneEncoder, compress, compress_block, compress_stream};
pub use huffman::{CodeEntry, CodeTable};
pub use metadata::BlockMetadata;

pub use dune_core::{DuneError, ErrorCategory, Result, Stage};

/// Container magic bytes ("DUNE").
pub const DUNE_MAGIC: [u8; 4] = [0x44, 0x55, 0x4E, 0x45];

/// Reference block size (50 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 50 * 1024;

/// Largest accepted block size (16 MiB).
pub const MAX_BLOCK_SIZE: usize = 16 * 1024 * 1024;

/// Maximum number of input bytes transformed as one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSize(usize);

impl BlockSize {
    /// Create a block size, rejecting zero and anything above [`MAX_BLOCK_SIZE`].
    pub fn new(bytes: usize) -> Result<Self> {
        if bytes == 0 || bytes > MAX_BLOCK_SIZE {
            return Err(DuneError::invalid_config(format!(
                "block size {bytes} outside 1..={MAX_BLOCK_SIZE}"
            )));
        }
        Ok(Self(bytes))
    }

    /// Get the block size in bytes.
    pub fn bytes(&self) -> usize {
        self.0
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self(DEFAULT_BLOCK_SIZE)
    }
}

/// Running totals reported by the streaming entry points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Number of container entries written or read.
    pub blocks: u64,
    /// Uncompressed bytes consumed or produced.
    pub raw_bytes: u64,
    /// Container bytes produced or consumed, magic included.
    pub container_bytes: u64,
}

impl StreamStats {
    /// Container size as a percentage of the raw size.
    pub fn ratio(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            self.container_bytes as f64 / self.raw_bytes as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_size() {
        let size = BlockSize::new(4096).unwrap();
        assert_eq!(size.bytes(), 4096);
        assert_eq!(BlockSize::default().bytes(), 51_200);
    }

    #[test]
    fn test_block_size_bounds() {
        assert!(BlockSize::new(0).is_err());
        assert!(BlockSize::new(MAX_BLOCK_SIZE).is_ok());
        assert!(BlockSize::new(MAX_BLOCK_SIZE + 1).is_err());
    }

    #[test]
    fn test_roundtrip_single_byte() {
        let original = b"a";
        let compressed = compress(original, BlockSize::default()).unwrap();
        let decompressed = decompress(&compressed[..]).unwrap();
        assert_eq!(decompressed, original.as_slice());
    }

    #[test]
    fn test_roundtrip_repeated() {
        let original = b"aaaaaaaaaabbbbbbbbbbcccccccccc";
        let compressed = compress(original, BlockSize::new(7).unwrap()).unwrap();
        let decompressed = decompress(&compressed[..]).unwrap();
        assert_eq!(decompressed, original.as_slice());
    }

    #[test]
    fn test_roundtrip_empty() {
        let compressed = compress(b"", BlockSize::default()).unwrap();
        assert_eq!(compressed, DUNE_MAGIC.to_vec());
        let decompressed = decompress(&compressed[..]).unwrap();
        assert!(decompressed.is_empty());
    }

    #[test]
    fn test_stream_stats_ratio() {
        let stats = StreamStats {
            blocks: 1,
            raw_bytes: 200,
            container_bytes: 50,
        };
        assert!((stats.ratio() - 25.0).abs() < 1e-9);
        assert_eq!(StreamStats::default().ratio(), 0.0);
    }
}
