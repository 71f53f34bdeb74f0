//! # OxiCab Core
//!
//! Core components shared by the OxiCab codecs.
//!
//! - [`error`]: Error type and `Result` alias
//! - [`traits`]: Block-oriented decompressor trait
//! - [`method`]: CAB `typeCompress` tags
//! - [`stored`]: Pass-through codec for uncompressed folders
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Container (external)                                    │
//! │     CFHEADER / CFFOLDER / CFDATA parsing               │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     LZX engine, folder driver                           │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     errors, BlockDecompressor, compression tags         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxicab_core::{BlockDecompressor, CompressionType, StoredDecompressor};
//!
//! let ty = CompressionType::from_u16(0x1003).unwrap();
//! assert_eq!(ty, CompressionType::Lzx(16));
//!
//! let mut stored = StoredDecompressor::new();
//! let out = stored.decompress_block_to_vec(b"abc", 3).unwrap();
//! assert_eq!(out, b"abc");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod method;
pub mod stored;
pub mod traits;

// Re-exports for convenience
pub use error::{OxiCabError, Result};
pub use method::CompressionType;
pub use stored::StoredDecompressor;
pub use traits::BlockDecompressor;
