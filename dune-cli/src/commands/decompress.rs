//! Decompress command implementation.

use crate::utils::create_progress_bar;
use dune_codec::decompress_stream;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub fn cmd_decompress(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(input)?);
    let archive_len = std::fs::metadata(input)?.len();
    let writer = BufWriter::new(File::create(output)?);

    let pb = create_progress_bar(archive_len);
    pb.set_message("Decompressing");
    let stats = decompress_stream(reader, writer, |stats| {
        pb.set_position(stats.container_bytes)
    })?;
    pb.finish_and_clear();

    println!(
        "{} -> {}: {} blocks, {} bytes",
        input.display(),
        output.display(),
        stats.blocks,
        stats.raw_bytes
    );
    Ok(())
}
