//! Command implementations for the DuneArc CLI.

pub mod compress;
pub mod decompress;
pub mod info;
pub mod stats;

pub use compress::cmd_compress;
pub use decompress::cmd_decompress;
pub use info::cmd_info;
pub use stats::cmd_stats;
pub use test::cmd_test;
