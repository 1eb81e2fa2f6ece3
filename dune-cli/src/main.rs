//! DuneArc CLI
//!
//! Block-sorting compression: Burrows-Wheeler transform, move-to-front,
//! run-length pairs and canonical Huffman coding in a DUNE container.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{cmd_compress, cmd_decompress, cmd_info, cmd_stats, cmd_test};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dune")]
#[command(author, version, about = "DuneArc - block-sorting compressor")]
#[command(long_about = "
DuneArc compresses files block by block with a Burrows-Wheeler transform,
move-to-front recoding, run-length pairs and canonical Huffman coding.

Set RUST_LOG=debug for per-block diagnostics.

Examples:
  dune compress input.txt input.dune
  dune decompress input.dune input.txt
  dune info input.dune --json
  dune test input.dune
  dune stats input.txt --compressed input.dune --decoded roundtrip.txt
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a DUNE container
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output container
        output: PathBuf,
    },

    /// Decompress a DUNE container
    #[command(alias = "d")]
    Decompress {
        /// Container to decompress
        input: PathBuf,

        /// Output file
        output: PathBuf,
    },

    /// List block entries without decoding them
    #[command(alias = "i")]
    Info {
        /// Container to inspect
        archive: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Decode every block and report integrity
    #[command(alias = "t")]
    Test {
        /// Container to test
        archive: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Entropy statistics for a file
    Stats {
        /// File to analyse
        file: PathBuf,

        /// Compressed copy, for average bits per symbol
        #[arg(short, long)]
        compressed: Option<PathBuf>,

        /// Decoded copy, compared byte for byte
        #[arg(short, long)]
        decoded: Option<PathBuf>,
    },
}

fn init_logging() {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn);
    builder.parse_default_env();
    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(buf, "[{}] {}", record.level(), record.args())
    });
    let _ = builder.try_init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compress { input, output } => cmd_compress(&input, &output),
        Commands::Decompress { input, output } => cmd_decompress(&input, &output),
        Commands::Info { archive, json } => cmd_info(&archive, json),
        Commands::Test { archive, verbose } => cmd_test(&archive, verbose),
        Commands::Stats {
            file,
            compressed,
            decoded,
        } => cmd_stats(&file, compressed.as_deref(), decoded.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
