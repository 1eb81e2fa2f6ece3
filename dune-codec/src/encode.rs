//! DuneArc encoder.

use crate::container::{ContainerWriter, read_fully};
use crate::metadata::BlockMetadata;
use crate::{BlockSize, StreamStats, bwt, huffman, mtf, rle};
use dune_core::Stage;
use dune_core::error::{DuneError, Result};
use std::io::{Read, Write};

/// Run one block through the forward pipeline.
///
/// Returns the block's metadata and its bit-packed payload.
pub fn compress_block(data: &[u8]) -> Result<(BlockMetadata, Vec<u8>)> {
    if data.is_empty() {
        return Err(DuneError::EmptyBlock);
    }
    let block_size = u32::try_from(data.len())
        .map_err(|_| DuneError::invalid_config(format!("block of {} bytes", data.len())))?;

    // Step 1: Burrows-Wheeler Transform
    let (permuted, transform_index) = bwt::transform(data);

    // Step 2: Move-to-Front Transform
    let ranks = mtf::transform(&permuted);

    // Step 3: (count, value) pairs
    let pairs = rle::encode(&ranks);

    // Step 4: Canonical Huffman coding
    let (payload, code_table) = huffman::encode(&pairs)?;

    log::trace!(
        "block stages: {} raw -> {} pairs -> {} payload bytes, {} codes",
        data.len(),
        pairs.len(),
        payload.len(),
        code_table.len()
    );

    let metadata = BlockMetadata {
        block_size,
        transform_index,
        pre_entropy_size: pairs.len() as u32,
        code_table,
    };

    Ok((metadata, payload))
}

/// DuneArc encoder.
pub struct DuneEncoder<W: Write> {
    container: ContainerWriter<W>,
    block_size: BlockSize,
    raw_bytes: u64,
}

impl<W: Write> DuneEncoder<W> {
    /// Create a new encoder, writing the container header.
    pub fn new(writer: W, block_size: BlockSize) -> Result<Self> {
        Ok(Self {
            container: ContainerWriter::new(writer)?,
            block_size,
            raw_bytes: 0,
        })
    }

    /// Configured block size.
    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Compress and append one block of at most `block_size` bytes.
    pub fn write_block(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        if data.len() > self.block_size.bytes() {
            return Err(DuneError::invalid_config(format!(
                "block of {} bytes exceeds block size {}",
                data.len(),
                self.block_size.bytes()
            )));
        }

        let index = self.container.entries_written();
        let offset = self.container.bytes_written();

        // Only the entropy stage can fail on the way in
        let (metadata, payload) =
            compress_block(data).map_err(|e| e.in_block(index, offset, Stage::Entropy))?;
        self.container
            .write_entry(&metadata, &payload)
            .map_err(|e| e.in_block(index, offset, Stage::Framing))?;
        self.raw_bytes += data.len() as u64;

        log::debug!(
            "block {} at offset {}: {} -> {} bytes, transform index {}",
            index,
            offset,
            data.len(),
            payload.len(),
            metadata.transform_index
        );

        Ok(())
    }

    /// Running totals.
    pub fn stats(&self) -> StreamStats {
        StreamStats {
            blocks: self.container.entries_written(),
            raw_bytes: self.raw_bytes,
            container_bytes: self.container.bytes_written(),
        }
    }

    /// Finish the stream and return the writer.
    pub fn finish(self) -> Result<W> {
        self.container.finish()
    }
}

/// Compress data into a DUNE container.
pub fn compress(data: &[u8], block_size: BlockSize) -> Result<Vec<u8>> {
    let mut encoder = DuneEncoder::new(Vec::new(), block_size)?;

    for chunk in data.chunks(block_size.bytes()) {
        encoder.write_block(chunk)?;
    }

    encoder.finish()
}

/// Compress `reader` into `writer` one block at a time.
///
/// `progress` is called after every block with the running totals.
pub fn compress_stream<R, W, F>(
    mut reader: R,
    writer: W,
    block_size: BlockSize,
    mut progress: F,
) -> Result<StreamStats>
where
    R: Read,
    W: Write,
    F: FnMut(&StreamStats),
{
    let mut encoder = DuneEncoder::new(writer, block_size)?;
    let mut chunk = vec![0u8; block_size.bytes()];

    loop {
        let filled = read_fully(&mut reader, &mut chunk)?;
        if filled == 0 {
            break;
        }
        encoder.write_block(&chunk[..filled])?;
        progress(&encoder.stats());
        if filled < chunk.len() {
            break;
        }
    }

    let stats = encoder.stats();
    encoder.finish()?;

    log::info!(
        "compressed {} bytes into {} blocks, {} bytes ({:.1}%)",
        stats.raw_bytes,
        stats.blocks,
        stats.container_bytes,
        stats.ratio()
    );

    Ok(stats)
}
