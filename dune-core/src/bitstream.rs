//! MSB-first bit stream operations for canonical code packing.
//!
//! Codes are written most significant bit first and packed into bytes from
//! the high bit down. A final partial byte is padded with zero bits.
//!
//! # Example
//!
//! ```
//! use dune_core::bitstream::{MsbBitReader, MsbBitWriter};
//!
//! let mut writer = MsbBitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_bits(0b1100, 4);
//! let data = writer.finish();
//! assert_eq!(data, vec![0b1011_1000]);
//!
//! let mut reader = MsbBitReader::new(&data);
//! let bits: Vec<bool> = std::iter::from_fn(|| reader.next_bit()).collect();
//! assert_eq!(bits, [true, false, true, true, true, false, false, false]);
//! ```

/// Maximum number of bits accepted by a single [`MsbBitWriter::write_bits`] call.
pub const MAX_WRITE_BITS: u8 = 64;

/// MSB-first bit reader over an in-memory slice.
#[derive(Debug)]
pub struct MsbBitReader<'a> {
    /// Input data.
    data: &'a [u8],
    /// Total bits read.
    position: u64,
}

impl<'a> MsbBitReader<'a> {
    /// Create a new MSB bit reader.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current bit position (for error reporting).
    pub fn bit_position(&self) -> u64 {
        self.position
    }

    /// Read a single bit, or `None` when the input is exhausted.
    #[inline]
    pub fn next_bit(&mut self) -> Option<bool> {
        let byte = *self.data.get((self.position / 8) as usize)?;
        let bit = (byte >> (7 - (self.position % 8) as u8)) & 1;
        self.position += 1;
        Some(bit == 1)
    }
}

/// MSB-first bit writer collecting into a byte vector.
#[derive(Debug, Default)]
pub struct MsbBitWriter {
    /// Output buffer.
    output: Vec<u8>,
    /// Pending bits (fewer than 8 between calls).
    buffer: u64,
    /// Number of pending bits.
    bits_in_buffer: u8,
}

impl MsbBitWriter {
    /// Create a new MSB bit writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with room for `bytes` output bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            output: Vec::with_capacity(bytes),
            ..Self::default()
        }
    }

    /// Write the low `count` bits of `value`, most significant first.
    ///
    /// `count` must not exceed [`MAX_WRITE_BITS`].
    #[inline]
    pub fn write_bits(&mut self, value: u64, count: u8) {
        debug_assert!(count <= MAX_WRITE_BITS, "Cannot write more than 64 bits at once");

        if count > 32 {
            self.write_chunk(value >> 32, count - 32);
            self.write_chunk(value & 0xFFFF_FFFF, 32);
        } else {
            self.write_chunk(value, count);
        }
    }

    /// Write at most 32 bits.
    #[inline]
    fn write_chunk(&mut self, value: u64, count: u8) {
        if count == 0 {
            return;
        }

        let mask = (1u64 << count) - 1;
        self.buffer = (self.buffer << count) | (value & mask);
        self.bits_in_buffer += count;

        // Flush complete bytes (from MSB side)
        while self.bits_in_buffer >= 8 {
            let byte = (self.buffer >> (self.bits_in_buffer - 8)) as u8;
            self.output.push(byte);
            self.bits_in_buffer -= 8;
        }
        self.buffer &= (1u64 << self.bits_in_buffer) - 1;
    }

    /// Pad the final partial byte with zeros and return the output.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bits_in_buffer > 0 {
            let byte = (self.buffer << (8 - self.bits_in_buffer)) as u8;
            self.output.push(byte);
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
        self.output
    }
}
