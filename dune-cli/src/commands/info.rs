//! Info command implementation.

use crate::utils::percent;
use dune_codec::{ContainerReader, EntrySummary};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// JSON serializable block entry.
#[derive(Debug, Serialize, Deserialize)]
struct BlockJson {
    index: u64,
    offset: u64,
    block_size: u32,
    transform_index: u32,
    pre_entropy_size: u32,
    codes: usize,
    max_code_length: u8,
    metadata_len: u32,
    payload_len: u32,
    entry_len: u64,
}

impl BlockJson {
    fn from_summary(summary: &EntrySummary) -> Self {
        let metadata = &summary.metadata;
        Self {
            index: summary.index,
            offset: summary.offset,
            block_size: metadata.block_size,
            transform_index: metadata.transform_index,
            pre_entropy_size: metadata.pre_entropy_size,
            codes: metadata.code_table.len(),
            max_code_length: metadata.code_table.lengths().last().copied().unwrap_or(0),
            metadata_len: summary.metadata_len,
            payload_len: summary.payload_len,
            entry_len: summary.entry_len(),
        }
    }
}

/// JSON output for archive info.
#[derive(Debug, Serialize, Deserialize)]
struct ArchiveInfoJson {
    archive: String,
    size: u64,
    original_size: u64,
    blocks: Vec<BlockJson>,
}

pub fn cmd_info(archive: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let size = std::fs::metadata(archive)?.len();
    let mut reader = ContainerReader::new(BufReader::new(File::open(archive)?))?;

    let mut blocks = Vec::new();
    while let Some(summary) = reader.skip_entry()? {
        blocks.push(BlockJson::from_summary(&summary));
    }
    let original_size: u64 = blocks.iter().map(|b| b.block_size as u64).sum();

    if json {
        let output = ArchiveInfoJson {
            archive: archive.display().to_string(),
            size,
            original_size,
            blocks,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Archive Information");
    println!("===================");
    println!("File: {}", archive.display());
    println!("Size: {} bytes", size);
    println!("Original size: {} bytes", original_size);
    println!("Blocks: {}", blocks.len());
    if original_size > 0 {
        println!("Ratio: {:.1}%", percent(size, original_size));
    }

    if !blocks.is_empty() {
        println!();
        println!(
            "{:>6} {:>10} {:>8} {:>8} {:>8} {:>6} {:>5}",
            "Block", "Offset", "Size", "Payload", "Index", "Codes", "Max"
        );
        println!("{}", "-".repeat(58));
        for block in &blocks {
            println!(
                "{:>6} {:>10} {:>8} {:>8} {:>8} {:>6} {:>5}",
                block.index,
                block.offset,
                block.block_size,
                block.payload_len,
                block.transform_index,
                block.codes,
                block.max_code_length
            );
        }
    }

    Ok(())
}
