//! # DuneArc Core
//!
//! Core components shared by the DuneArc crates.
//!
//! - [`bitstream`]: MSB-first bit packing used by the canonical entropy coder
//! - [`error`]: Error type, error categories and pipeline stages
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI: dune compress / decompress / info / test / stats   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Container: DUNE magic, length-prefixed block entries    │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codec: transform → move-to-front → run-length → entropy │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate): bit I/O, errors                      │
//! └─────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitstream;
pub mod error;

pub use bitstream::{MsbBitReader, MsbBitWriter};
pub use error::{DuneError, ErrorCategory, Result, Stage};
