//! DuneArc decoder.

use crate::container::{ContainerReader, EntrySummary};
use crate::metadata::BlockMetadata;
use crate::{StreamStats, bwt, huffman, mtf, rle};
use dune_core::Stage;
use dune_core::error::{DuneError, Result};
use std::io::{Read, Write};

/// Run one block through the inverse pipeline.
pub fn decompress_block(metadata: &BlockMetadata, payload: &[u8]) -> Result<Vec<u8>> {
    invert(metadata, payload, |e, _| e)
}

/// Inverse pipeline; `context` decorates each stage's error.
fn invert<F>(metadata: &BlockMetadata, payload: &[u8], context: F) -> Result<Vec<u8>>
where
    F: Fn(DuneError, Stage) -> DuneError,
{
    let declared = metadata.block_size as usize;

    // Step 1: Huffman decoding
    let pairs = huffman::decode(
        payload,
        &metadata.code_table,
        metadata.pre_entropy_size as usize,
    )
    .map_err(|e| context(e, Stage::Entropy))?;

    // Step 2: Expand (count, value) pairs
    let ranks = rle::decode(&pairs).map_err(|e| context(e, Stage::RunLength))?;

    // Step 3: Inverse MTF
    let permuted = mtf::inverse_transform(&ranks);

    // An entry describing an empty block decodes to nothing
    if permuted.is_empty() && declared == 0 {
        return Ok(Vec::new());
    }

    // Step 4: Inverse BWT
    let mut block = bwt::inverse_transform(&permuted, metadata.transform_index)
        .map_err(|e| context(e, Stage::Transform))?;

    if block.len() < declared {
        return Err(context(
            DuneError::BlockSizeMismatch {
                declared,
                actual: block.len(),
            },
            Stage::Transform,
        ));
    }
    block.truncate(declared);

    log::trace!(
        "block stages: {} payload bytes -> {} pairs -> {} bytes",
        payload.len(),
        pairs.len(),
        block.len()
    );

    Ok(block)
}

/// DuneArc decoder.
pub struct DuneDecoder<R: Read> {
    container: ContainerReader<R>,
    raw_bytes: u64,
    blocks: u64,
}

impl<R: Read> DuneDecoder<R> {
    /// Create a new decoder, validating the container header.
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self {
            container: ContainerReader::new(reader)?,
            raw_bytes: 0,
            blocks: 0,
        })
    }

    /// Read and decode the next block, or `None` at end of archive.
    pub fn read_block(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(entry) = self.container.next_entry()? else {
            return Ok(None);
        };
        let (index, offset) = (entry.index, entry.offset);

        let block = invert(&entry.metadata, &entry.payload, |e, stage| {
            e.in_block(index, offset, stage)
        })?;

        self.blocks += 1;
        self.raw_bytes += block.len() as u64;

        log::debug!(
            "block {} at offset {}: {} -> {} bytes, transform index {}",
            index,
            offset,
            entry.payload.len(),
            block.len(),
            entry.metadata.transform_index
        );

        Ok(Some(block))
    }

    /// Skip the next block without decoding it.
    pub fn skip_block(&mut self) -> Result<Option<EntrySummary>> {
        let summary = self.container.skip_entry()?;
        if summary.is_some() {
            self.blocks += 1;
        }
        Ok(summary)
    }

    /// Decode block `index` alone, skipping the entries before it.
    ///
    /// Returns `None` when the archive holds fewer blocks. Blocks already
    /// passed cannot be revisited.
    pub fn read_block_at(&mut self, index: u64) -> Result<Option<Vec<u8>>> {
        let next = self.container.next_index();
        if index < next {
            return Err(DuneError::invalid_config(format!(
                "block {index} already passed, next is {next}"
            )));
        }

        while self.container.next_index() < index {
            if self.skip_block()?.is_none() {
                return Ok(None);
            }
        }

        self.read_block()
    }

    /// Running totals.
    pub fn stats(&self) -> StreamStats {
        StreamStats {
            blocks: self.blocks,
            raw_bytes: self.raw_bytes,
            container_bytes: self.container.position(),
        }
    }
}

/// Decompress a DUNE container.
pub fn decompress<R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut decoder = DuneDecoder::new(reader)?;
    let mut output = Vec::new();

    while let Some(block) = decoder.read_block()? {
        output.extend_from_slice(&block);
    }

    Ok(output)
}

/// Decompress `reader` into `writer` one block at a time.
///
/// `progress` is called after every block with the running totals.
pub fn decompress_stream<R, W, F>(reader: R, mut writer: W, mut progress: F) -> Result<StreamStats>
where
    R: Read,
    W: Write,
    F: FnMut(&StreamStats),
{
    let mut decoder = DuneDecoder::new(reader)?;

    while let Some(block) = decoder.read_block()? {
        writer.write_all(&block)?;
        progress(&decoder.stats());
    }
    writer.flush()?;

    let stats = decoder.stats();
    log::info!(
        "decompressed {} blocks, {} container bytes into {} bytes",
        stats.blocks,
        stats.container_bytes,
        stats.raw_bytes
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockSize, compress, compress_block};

    #[test]
    fn test_decompress_block_roundtrip() {
        let (metadata, payload) = compress_block(b"AAAABBBCCD").unwrap();
        assert_eq!(decompress_block(&metadata, &payload).unwrap(), b"AAAABBBCCD");
    }

    #[test]
    fn test_short_block_is_mismatch() {
        let (mut metadata, payload) = compress_block(b"hello").unwrap();
        metadata.block_size = 9;
        let err = decompress_block(&metadata, &payload).unwrap_err();
        assert!(matches!(
            err,
            DuneError::BlockSizeMismatch {
                declared: 9,
                actual: 5
            }
        ));
    }

    #[test]
    fn test_long_block_is_truncated() {
        let (mut metadata, payload) = compress_block(b"hello").unwrap();
        metadata.block_size = 3;
        let block = decompress_block(&metadata, &payload).unwrap();
        assert_eq!(block.len(), 3);
    }

    #[test]
    fn test_bad_index_carries_context() {
        let data = b"first block!second block";
        let archive = compress(data, BlockSize::new(12).unwrap()).unwrap();

        // transformIndex of the second entry: 4 magic + 4 + 4 block size
        let first_meta_len = u32::from_be_bytes([archive[4], archive[5], archive[6], archive[7]]);
        let first_data_len_at = 8 + first_meta_len as usize;
        let first_data_len = u32::from_be_bytes([
            archive[first_data_len_at],
            archive[first_data_len_at + 1],
            archive[first_data_len_at + 2],
            archive[first_data_len_at + 3],
        ]);
        let second = first_data_len_at + 4 + first_data_len as usize;
        let mut corrupted = archive.clone();
        corrupted[second + 8..second + 12].copy_from_slice(&500u32.to_be_bytes());

        let err = decompress(&corrupted[..]).unwrap_err();
        match &err {
            DuneError::Block {
                index,
                offset,
                stage,
                ..
            } => {
                assert_eq!(*index, 1);
                assert_eq!(*offset, second as u64);
                assert_eq!(*stage, Stage::Transform);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            err.root(),
            DuneError::IndexOutOfRange { index: 500, len: 12 }
        ));
    }

    #[test]
    fn test_read_block_at() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let archive = compress(&data, BlockSize::new(300).unwrap()).unwrap();

        let mut decoder = DuneDecoder::new(&archive[..]).unwrap();
        assert_eq!(decoder.read_block_at(2).unwrap().unwrap(), &data[600..900]);
        assert!(decoder.read_block_at(0).is_err());
        assert_eq!(decoder.read_block_at(3).unwrap().unwrap(), &data[900..]);
        assert!(decoder.read_block_at(7).unwrap().is_none());
    }

    #[test]
    fn test_stream_stats() {
        let data = vec![b'q'; 5000];
        let archive = compress(&data, BlockSize::new(2048).unwrap()).unwrap();

        let mut out = Vec::new();
        let mut seen = Vec::new();
        let stats = decompress_stream(&archive[..], &mut out, |s| seen.push(s.blocks)).unwrap();

        assert_eq!(out, data);
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(stats.raw_bytes, 5000);
        assert_eq!(stats.container_bytes, archive.len() as u64);
    }
}
