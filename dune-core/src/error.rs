//! Error types for DuneArc operations.
//!
//! Every failure in the pipeline is reported through [`DuneError`]. Variants
//! fall into a small number of [`ErrorCategory`] buckets so callers can tell
//! an I/O problem from a damaged container or a foreign code table.

use std::fmt;
use std::io;
use thiserror::Error;

/// Pipeline stage that was running when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Reading or writing container framing.
    Framing,
    /// Encoding or decoding block metadata.
    Metadata,
    /// Block-sorting transform.
    Transform,
    /// Move-to-front recoding.
    MoveToFront,
    /// Run-length coding.
    RunLength,
    /// Canonical entropy coding.
    Entropy,
}

impl Stage {
    /// Short lowercase name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Framing => "framing",
            Stage::Metadata => "metadata",
            Stage::Transform => "transform",
            Stage::MoveToFront => "move-to-front",
            Stage::RunLength => "run-length",
            Stage::Entropy => "entropy",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Broad classification of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Operating system I/O failure.
    Io,
    /// Container structure is damaged or truncated.
    Framing,
    /// Stored side information is inconsistent with the data.
    Codec,
    /// The library was configured with invalid parameters.
    Config,
}

/// The main error type for DuneArc operations.
#[derive(Debug, Error)]
pub enum DuneError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic number in container header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// A length-prefixed section ended early.
    #[error("Truncated {section}: expected {expected} bytes, only {available} available")]
    Truncated {
        /// Which section was being read.
        section: &'static str,
        /// Number of bytes declared or required.
        expected: usize,
        /// Number of bytes actually available.
        available: usize,
    },

    /// Metadata section is longer than its fields.
    #[error("Trailing data in metadata: {extra} unexpected bytes")]
    TrailingMetadata {
        /// Number of unread bytes.
        extra: usize,
    },

    /// Run-length pair stream is not a sequence of valid (count, value) pairs.
    #[error("Malformed run-length data: {message}")]
    MalformedRunLength {
        /// Description of the problem.
        message: String,
    },

    /// Code table entry has an unusable length.
    #[error("Invalid code length {length} for symbol {symbol}")]
    InvalidCodeLength {
        /// Symbol owning the entry.
        symbol: u8,
        /// Offending length.
        length: u8,
    },

    /// Code table is not a valid canonical table.
    #[error("Invalid code table: {message}")]
    InvalidCodeTable {
        /// Description of the problem.
        message: String,
    },

    /// Bit pattern walked to a missing trie child.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Number of decoded symbols differs from the declared count.
    #[error("Symbol count mismatch: expected {expected}, decoded {decoded}")]
    SymbolCountMismatch {
        /// Declared symbol count.
        expected: usize,
        /// Symbols actually decoded.
        decoded: usize,
    },

    /// Transform index does not address a row of the permuted block.
    #[error("Transform index {index} out of range for block of {len} bytes")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Length of the permuted block.
        len: usize,
    },

    /// Inverse transform was given no data.
    #[error("Cannot invert transform of an empty block")]
    EmptyBlock,

    /// Reconstructed block is shorter than recorded in metadata.
    #[error("Block size mismatch: metadata declares {declared} bytes, reconstructed {actual}")]
    BlockSizeMismatch {
        /// Size stored in metadata.
        declared: usize,
        /// Size produced by the pipeline.
        actual: usize,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// An error raised while processing one container entry.
    #[error("block {index} at offset {offset} ({stage} stage): {source}")]
    Block {
        /// Zero-based ordinal of the block.
        index: u64,
        /// Byte offset of the entry in the container.
        offset: u64,
        /// Stage that failed.
        stage: Stage,
        /// Underlying error.
        #[source]
        source: Box<DuneError>,
    },
}

/// Result type alias for DuneArc operations.
pub type Result<T> = std::result::Result<T, DuneError>;

impl DuneError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a truncated section error.
    pub fn truncated(section: &'static str, expected: usize, available: usize) -> Self {
        Self::Truncated {
            section,
            expected,
            available,
        }
    }

    /// Create a malformed run-length error.
    pub fn malformed_rle(message: impl Into<String>) -> Self {
        Self::MalformedRunLength {
            message: message.into(),
        }
    }

    /// Create an invalid code table error.
    pub fn invalid_table(message: impl Into<String>) -> Self {
        Self::InvalidCodeTable {
            message: message.into(),
        }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a symbol count mismatch error.
    pub fn count_mismatch(expected: usize, decoded: usize) -> Self {
        Self::SymbolCountMismatch { expected, decoded }
    }

    /// Create an out-of-range transform index error.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Attach block context to an error.
    pub fn in_block(self, index: u64, offset: u64, stage: Stage) -> Self {
        Self::Block {
            index,
            offset,
            stage,
            source: Box::new(self),
        }
    }

    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(_) => ErrorCategory::Io,
            Self::InvalidMagic { .. }
            | Self::Truncated { .. }
            | Self::TrailingMetadata { .. }
            | Self::MalformedRunLength { .. } => ErrorCategory::Framing,
            Self::InvalidCodeLength { .. }
            | Self::InvalidCodeTable { .. }
            | Self::InvalidHuffmanCode { .. }
            | Self::SymbolCountMismatch { .. }
            | Self::IndexOutOfRange { .. }
            | Self::EmptyBlock
            | Self::BlockSizeMismatch { .. } => ErrorCategory::Codec,
            Self::InvalidConfig { .. } => ErrorCategory::Config,
            Self::Block { source, .. } => source.category(),
        }
    }

    /// The innermost error, with block context stripped.
    pub fn root(&self) -> &DuneError {
        match self {
            Self::Block { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DuneError::invalid_magic(*b"DUNE", *b"BZh9");
        assert!(err.to_string().contains("Invalid magic"));

        let err = DuneError::truncated("payload", 100, 12);
        assert_eq!(
            err.to_string(),
            "Truncated payload: expected 100 bytes, only 12 available"
        );

        let err = DuneError::count_mismatch(10, 7);
        assert!(err.to_string().contains("expected 10, decoded 7"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: DuneError = io_err.into();
        assert!(matches!(err, DuneError::Io(_)));
        assert_eq!(err.category(), ErrorCategory::Io);
    }

    #[test]
    fn test_block_context() {
        let err = DuneError::index_out_of_range(9, 4).in_block(2, 1234, Stage::Transform);
        let msg = err.to_string();
        assert!(msg.starts_with("block 2 at offset 1234 (transform stage)"));
        assert!(msg.contains("index 9 out of range"));
        assert_eq!(err.category(), ErrorCategory::Codec);
        assert!(matches!(err.root(), DuneError::IndexOutOfRange { .. }));
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            DuneError::malformed_rle("odd").category(),
            ErrorCategory::Framing
        );
        assert_eq!(DuneError::EmptyBlock.category(), ErrorCategory::Codec);
        assert_eq!(
            DuneError::invalid_config("zero").category(),
            ErrorCategory::Config
        );
    }
}
