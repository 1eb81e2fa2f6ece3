//! Run-Length Encoding for DuneArc.
//!
//! Maximal runs of one byte value become `(count, value)` byte pairs with
//! `count` in `1..=255`. Longer runs are split across several pairs.

use dune_core::error::{DuneError, Result};

/// Longest run stored in a single pair.
pub const MAX_RUN: usize = 255;

/// Encode data as `(count, value)` pairs.
pub fn encode(data: &[u8]) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(data.len() / 2 + 2);
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        let mut run_len = 1;

        // Count consecutive identical bytes
        while i + run_len < data.len() && data[i + run_len] == byte && run_len < MAX_RUN {
            run_len += 1;
        }

        result.push(run_len as u8);
        result.push(byte);
        i += run_len;
    }

    result
}

/// Decode `(count, value)` pairs.
pub fn decode(pairs: &[u8]) -> Result<Vec<u8>> {
    if pairs.len() % 2 != 0 {
        return Err(DuneError::malformed_rle(format!(
            "odd pair stream length {}",
            pairs.len()
        )));
    }

    let total: usize = pairs.chunks_exact(2).map(|pair| pair[0] as usize).sum();
    let mut result = Vec::with_capacity(total);

    for (n, pair) in pairs.chunks_exact(2).enumerate() {
        let (count, byte) = (pair[0] as usize, pair[1]);
        if count == 0 {
            return Err(DuneError::malformed_rle(format!("zero run count in pair {n}")));
        }
        result.resize(result.len() + count, byte);
    }

    Ok(result)
}
