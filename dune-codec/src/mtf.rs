//! Move-to-Front Transform for DuneArc.
//!
//! MTF transforms a stream by replacing each byte with its position
//! in a dynamic list. After each byte, that byte is moved to the front
//! of the list. This converts local byte clusters into many zeros.

/// Ranking of all 256 byte values.
///
/// Each encode or decode call owns a fresh ranking, so no state leaks
/// between blocks.
#[derive(Debug, Clone)]
pub struct MoveToFront {
    list: [u8; 256],
}

impl MoveToFront {
    /// Create a ranking in ascending byte order.
    pub fn new() -> Self {
        let mut list = [0u8; 256];
        for (slot, value) in list.iter_mut().zip(0..=255u8) {
            *slot = value;
        }
        Self { list }
    }

    /// Current rank of `byte`, then move it to the front.
    #[inline]
    pub fn encode_byte(&mut self, byte: u8) -> u8 {
        // The list is a permutation of 0..=255, so the byte is always present
        let pos = self.list.iter().position(|&b| b == byte).unwrap_or(0);
        self.promote(pos);
        pos as u8
    }

    /// Byte at `rank`, then move it to the front.
    #[inline]
    pub fn decode_rank(&mut self, rank: u8) -> u8 {
        let pos = rank as usize;
        let byte = self.list[pos];
        self.promote(pos);
        byte
    }

    /// Move the entry at `pos` to rank 0, shifting the entries before it down.
    #[inline]
    fn promote(&mut self, pos: usize) {
        if pos > 0 {
            let byte = self.list[pos];
            self.list.copy_within(0..pos, 1);
            self.list[0] = byte;
        }
    }

    /// Current ranking, front first.
    pub fn ranking(&self) -> &[u8; 256] {
        &self.list
    }
}

impl Default for MoveToFront {
    fn default() -> Self {
        Self::new()
    }
}

/// Perform Move-to-Front transform.
pub fn transform(data: &[u8]) -> Vec<u8> {
    let mut mtf = MoveToFront::new();
    data.iter().map(|&byte| mtf.encode_byte(byte)).collect()
}

/// Perform inverse Move-to-Front transform.
pub fn inverse_transform(data: &[u8]) -> Vec<u8> {
    let mut mtf = MoveToFront::new();
    data.iter().map(|&rank| mtf.decode_rank(rank)).collect()
}
