//! Burrows-Wheeler Transform for DuneArc.
//!
//! The BWT is a reversible transformation that groups similar bytes together,
//! making the data more compressible. Rotations are ordered by plain byte
//! comparison; the transform index is the sorted row of the unrotated block.

use dune_core::error::{DuneError, Result};

/// Perform the Burrows-Wheeler Transform.
/// Returns the last column of the sorted rotation matrix and the row of the
/// original block.
pub fn transform(data: &[u8]) -> (Vec<u8>, u32) {
    if data.is_empty() {
        return (Vec::new(), 0);
    }

    let n = data.len();
    let order = sort_rotations(data);

    let mut index = 0;
    let mut transformed = Vec::with_capacity(n);
    for (row, &start) in order.iter().enumerate() {
        if start == 0 {
            index = row;
        }
        transformed.push(data[(start + n - 1) % n]);
    }

    (transformed, index as u32)
}

/// Sort the cyclic rotations of `data` by prefix doubling.
///
/// After each round `rank[i]` orders rotation `i` by its first `2 * width`
/// bytes. Once the compared prefix covers the whole block, rotations with
/// equal rank are byte-identical and keep ascending start order.
fn sort_rotations(data: &[u8]) -> Vec<usize> {
    let n = data.len();
    let mut order: Vec<usize> = (0..n).collect();
    let mut rank: Vec<usize> = data.iter().map(|&b| b as usize).collect();
    let mut next_rank = vec![0usize; n];
    let mut width = 1;

    loop {
        order.sort_unstable_by_key(|&i| (rank[i], rank[(i + width) % n], i));

        next_rank[order[0]] = 0;
        for w in 1..n {
            let (prev, cur) = (order[w - 1], order[w]);
            let same = rank[prev] == rank[cur]
                && rank[(prev + width) % n] == rank[(cur + width) % n];
            next_rank[cur] = next_rank[prev] + usize::from(!same);
        }
        std::mem::swap(&mut rank, &mut next_rank);

        // All rotations distinct
        if rank[order[n - 1]] == n - 1 {
            break;
        }

        width *= 2;
        if width >= n {
            break;
        }
    }

    order
}

/// Perform inverse Burrows-Wheeler Transform.
/// Reconstructs the original data from the last column and the transform index.
pub fn inverse_transform(data: &[u8], index: u32) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Err(DuneError::EmptyBlock);
    }

    let n = data.len();
    let index = index as usize;
    if index >= n {
        return Err(DuneError::index_out_of_range(index, n));
    }

    // Count occurrences of each byte
    let mut counts = [0usize; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }

    // Starting row of each byte in the first column
    let mut starts = [0usize; 256];
    let mut total = 0;
    for (start, &count) in starts.iter_mut().zip(counts.iter()) {
        *start = total;
        total += count;
    }

    // next[i]: row whose first byte is the occurrence of data[i] at row i
    let mut next = vec![0usize; n];
    let mut seen = starts;
    for (slot, &byte) in next.iter_mut().zip(data.iter()) {
        *slot = seen[byte as usize];
        seen[byte as usize] += 1;
    }

    // Walk backward from the original row, filling the output from the end
    let mut result = vec![0u8; n];
    let mut current = index;
    for slot in result.iter_mut().rev() {
        if current >= n {
            return Err(DuneError::index_out_of_range(current, n));
        }
        *slot = data[current];
        current = next[current];
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Materialize and sort every rotation.
    fn naive_transform(data: &[u8]) -> (Vec<u8>, u32) {
        let n = data.len();
        let mut rotations: Vec<(Vec<u8>, usize)> = (0..n)
            .map(|i| {
                let mut rot = data[i..].to_vec();
                rot.extend_from_slice(&data[..i]);
                (rot, i)
            })
            .collect();
        rotations.sort();
        let index = rotations.iter().position(|(_, i)| *i == 0).unwrap();
        let last = rotations.iter().map(|(rot, _)| rot[n - 1]).collect();
        (last, index as u32)
    }

    fn lcg_bytes(len: usize, seed: u64, alphabet: u8) -> Vec<u8> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 33) % alphabet as u64) as u8
            })
            .collect()
    }

    #[test]
    fn test_bwt_empty() {
        let (transformed, index) = transform(b"");
        assert!(transformed.is_empty());
        assert_eq!(index, 0);
        assert!(matches!(
            inverse_transform(b"", 0),
            Err(DuneError::EmptyBlock)
        ));
    }

    #[test]
    fn test_bwt_single() {
        let (transformed, index) = transform(b"a");
        assert_eq!(transformed, b"a");
        assert_eq!(index, 0);
        assert_eq!(inverse_transform(&transformed, index).unwrap(), b"a");
    }

    #[test]
    fn test_bwt_banana() {
        let (transformed, index) = transform(b"banana");
        assert_eq!(transformed, b"nnbaaa");
        assert_eq!(index, 3);
        assert_eq!(inverse_transform(&transformed, index).unwrap(), b"banana");
    }

    #[test]
    fn test_bwt_roundtrip() {
        let test_cases = [
            b"hello world".as_slice(),
            b"abracadabra",
            b"mississippi",
            b"aaaaa",
            b"abcde",
            b"abababab",
            b"AAAABBBCCD",
            b"the quick brown fox jumps over the lazy dog",
        ];

        for data in test_cases {
            let (transformed, index) = transform(data);
            let recovered = inverse_transform(&transformed, index).unwrap();
            assert_eq!(recovered, data, "Failed for: {:?}", data);
        }
    }

    #[test]
    fn test_matches_naive_rotation_sort() {
        for (len, alphabet) in [(1, 2), (2, 2), (7, 2), (31, 3), (64, 4), (200, 16), (257, 255)] {
            let data = lcg_bytes(len, len as u64 * 31 + alphabet as u64, alphabet);
            assert_eq!(transform(&data), naive_transform(&data), "len {len}");
        }
        for data in [b"abababab".as_slice(), b"zzzz", b"abcabcabc", b"AAAABBBCCD"] {
            assert_eq!(transform(data), naive_transform(data));
        }
    }

    #[test]
    fn test_periodic_block_uses_first_row() {
        // Rotations 0, 2, 4 and 6 are identical
        let (_, index) = transform(b"abababab");
        assert_eq!(index, 0);
        let (_, index) = transform(b"babababa");
        assert_eq!(index, 4);
    }

    #[test]
    fn test_bwt_long_run() {
        let data = vec![0x41u8; 10_000];
        let (transformed, index) = transform(&data);
        assert_eq!(transformed, data);
        assert_eq!(inverse_transform(&transformed, index).unwrap(), data);
    }

    #[test]
    fn test_bwt_all_byte_values() {
        let data: Vec<u8> = (0..=255u8).rev().chain(0..=255u8).collect();
        let (transformed, index) = transform(&data);
        assert_eq!(inverse_transform(&transformed, index).unwrap(), data);
    }

    #[test]
    fn test_inverse_index_out_of_range() {
        let (transformed, _) = transform(b"banana");
        let err = inverse_transform(&transformed, 6).unwrap_err();
        assert!(matches!(err, DuneError::IndexOutOfRange { index: 6, len: 6 }));
    }

    #[test]
    fn test_bwt_groups_similar() {
        let data = b"abababab";
        let (transformed, _) = transform(data);

        let mut runs = 1;
        for i in 1..transformed.len() {
            if transformed[i] != transformed[i - 1] {
                runs += 1;
            }
        }

        assert!(runs <= 4, "BWT should group similar bytes");
    }
}
