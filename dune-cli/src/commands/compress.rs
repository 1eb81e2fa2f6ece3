//! Compress command implementation.

use crate::utils::create_progress_bar;
use dune_codec::{BlockSize, compress_stream};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub fn cmd_compress(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(input)?);
    let input_len = std::fs::metadata(input)?.len();
    let writer = BufWriter::new(File::create(output)?);

    let block_size = BlockSize::default();
    log::debug!(
        "compressing {} with {}-byte blocks",
        input.display(),
        block_size.bytes()
    );

    let pb = create_progress_bar(input_len);
    pb.set_message("Compressing");
    let stats = compress_stream(reader, writer, block_size, |stats| {
        pb.set_position(stats.raw_bytes)
    })?;
    pb.finish_and_clear();

    println!(
        "{} -> {}: {} -> {} bytes ({:.1}%), {} blocks",
        input.display(),
        output.display(),
        stats.raw_bytes,
        stats.container_bytes,
        stats.ratio(),
        stats.blocks
    );
    Ok(())
}
