//! Round-trip tests for the full DUNE pipeline.

use dune_codec::{
    BlockSize, CodeEntry, ContainerReader, DEFAULT_BLOCK_SIZE, DUNE_MAGIC, DuneDecoder,
    compress, compress_stream, decompress, decompress_stream,
};

/// Reproducible pseudo-random bytes.
fn lcg_bytes(size: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..size)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 32) as u8
        })
        .collect()
}

fn roundtrip(data: &[u8]) -> Vec<u8> {
    let compressed = compress(data, BlockSize::default()).unwrap();
    decompress(&compressed[..]).unwrap()
}

#[test]
fn test_empty_file() {
    let compressed = compress(b"", BlockSize::default()).unwrap();
    assert_eq!(compressed, DUNE_MAGIC.to_vec());
    assert!(decompress(&compressed[..]).unwrap().is_empty());
}

#[test]
fn test_single_byte() {
    assert_eq!(roundtrip(b"A"), b"A");
}

#[test]
fn test_repeated_byte() {
    let input = vec![255u8; 5000];
    let compressed = compress(&input, BlockSize::default()).unwrap();
    assert_eq!(decompress(&compressed[..]).unwrap(), input);
    // One code, a handful of pairs
    assert!(compressed.len() < 64);
}

#[test]
fn test_all_byte_values() {
    let input: Vec<u8> = (0..=255u8).collect();
    assert_eq!(roundtrip(&input), input);

    let input: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    assert_eq!(roundtrip(&input), input);
}

#[test]
fn test_lengths_around_block_size() {
    for len in [
        DEFAULT_BLOCK_SIZE - 1,
        DEFAULT_BLOCK_SIZE,
        DEFAULT_BLOCK_SIZE + 1,
        2 * DEFAULT_BLOCK_SIZE + 17,
    ] {
        let input = lcg_bytes(len, len as u64);
        assert_eq!(roundtrip(&input), input, "length {len}");
    }
}

#[test]
fn test_aaaabbbccd_table() {
    let input = b"AAAABBBCCD";
    let compressed = compress(input, BlockSize::default()).unwrap();
    assert_eq!(decompress(&compressed[..]).unwrap(), input);

    let mut reader = ContainerReader::new(&compressed[..]).unwrap();
    let entry = reader.next_entry().unwrap().unwrap();
    let table = &entry.metadata.code_table;

    assert!(table.entries().iter().all(|e| e.length >= 1));
    for pair in table.entries().windows(2) {
        assert!((pair[0].length, pair[0].symbol) < (pair[1].length, pair[1].symbol));
    }

    // Rebuilding the table from its own lengths gives the same multiset
    let rebuilt = dune_codec::CodeTable::from_lengths(
        table
            .entries()
            .iter()
            .rev()
            .map(|e| CodeEntry::new(e.symbol, e.length))
            .collect(),
    );
    assert_eq!(rebuilt.lengths(), table.lengths());
    assert_eq!(&rebuilt, table);
}

#[test]
fn test_random_200k_four_blocks() {
    let input = lcg_bytes(200 * 1024, 0x123456789ABCDEF0);
    let compressed = compress(&input, BlockSize::default()).unwrap();

    let mut reader = ContainerReader::new(&compressed[..]).unwrap();
    let mut sizes = Vec::new();
    while let Some(summary) = reader.skip_entry().unwrap() {
        sizes.push(summary.metadata.block_size);
    }
    assert_eq!(sizes, vec![51_200; 4]);

    assert_eq!(decompress(&compressed[..]).unwrap(), input);
}

#[test]
fn test_concatenated_entries() {
    let first = compress(b"independently produced ", BlockSize::default()).unwrap();
    let second = compress(b"and appended", BlockSize::default()).unwrap();

    let mut joined = first.clone();
    joined.extend_from_slice(&second[DUNE_MAGIC.len()..]);

    assert_eq!(
        decompress(&joined[..]).unwrap(),
        b"independently produced and appended"
    );
}

#[test]
fn test_streaming_matches_in_memory() {
    let input = lcg_bytes(130_000, 7);
    let block_size = BlockSize::new(32 * 1024).unwrap();

    let mut archive = Vec::new();
    let stats = compress_stream(&input[..], &mut archive, block_size, |_| {}).unwrap();
    assert_eq!(stats.blocks, 4);
    assert_eq!(archive, compress(&input, block_size).unwrap());

    let mut output = Vec::new();
    let stats = decompress_stream(&archive[..], &mut output, |_| {}).unwrap();
    assert_eq!(stats.raw_bytes, input.len() as u64);
    assert_eq!(output, input);
}

#[test]
fn test_block_by_block() {
    let text = b"The quick brown fox jumps over the lazy dog. ".repeat(100);
    let archive = compress(&text, BlockSize::new(1000).unwrap()).unwrap();

    let mut decoder = DuneDecoder::new(&archive[..]).unwrap();
    let mut blocks = Vec::new();
    while let Some(block) = decoder.read_block().unwrap() {
        assert!(block.len() <= 1000);
        blocks.push(block);
    }
    assert_eq!(blocks.len(), 5);
    assert_eq!(blocks.concat(), text);
}

#[test]
fn test_compressible_text_shrinks() {
    let text = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(500);
    let compressed = compress(&text, BlockSize::default()).unwrap();
    assert!(compressed.len() < text.len() / 10);
    assert_eq!(decompress(&compressed[..]).unwrap(), text);
}
