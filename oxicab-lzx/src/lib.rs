//! # OxiCab-LZX: Pure Rust LZX Decompression
//!
//! This crate decodes LZX, the Huffman-coded LZ77 variant used by
//! Microsoft Cabinet (CAB) folders.
//!
//! ## Features
//!
//! - **Pure Rust**: No C dependencies, no unsafe code
//! - **All block types**: VERBATIM, ALIGNED and UNCOMPRESSED
//! - **Windows from 32 KB to 2 MB** (`2^15` to `2^21`)
//! - **Intel E8 call translation** for x86 executables
//! - **Reset intervals** for containers that restart the stream every N frames
//! - **Parallel folders** with the `parallel` feature
//!
//! ## Stream Structure
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ Intel header (first frame only)            │
//! │   1 bit flag [+ 32-bit translation size]   │
//! ├────────────────────────────────────────────┤
//! │ Block header                               │
//! │   3-bit type, 24-bit uncompressed length   │
//! │   ALIGNED:      aligned tree, then ...     │
//! │   VERBATIM:     main tree, length tree     │
//! │   UNCOMPRESSED: padding, R0 R1 R2          │
//! ├────────────────────────────────────────────┤
//! │ Block data (may span many frames)          │
//! ├────────────────────────────────────────────┤
//! │ Block header ...                           │
//! └────────────────────────────────────────────┘
//! ```
//!
//! A frame is one CFDATA block. Each call to
//! [`LzxDecoder::decompress`] consumes one frame and produces exactly its
//! uncompressed size. The sliding window, Huffman code lengths and repeat
//! offsets carry over from frame to frame.
//!
//! ## Example
//!
//! ```rust
//! use oxicab_lzx::LzxDecoder;
//!
//! // No Intel header, one UNCOMPRESSED block of 5 bytes.
//! let mut frame = vec![0x00, 0x30, 0x50, 0x00];
//! for _ in 0..3 {
//!     frame.extend_from_slice(&1u32.to_le_bytes());
//! }
//! frame.extend_from_slice(b"hello");
//!
//! let mut decoder = LzxDecoder::with_window_bits(15).unwrap();
//! let mut out = [0u8; 5];
//! decoder.decompress(&frame, 5, &mut out).unwrap();
//! assert_eq!(&out, b"hello");
//! ```
//!
//! Whole folders go through [`FolderDecoder`]:
//!
//! ```rust
//! use oxicab_core::CompressionType;
//! use oxicab_lzx::{FolderBlock, decompress_folder};
//!
//! let blocks = [FolderBlock::new(b"plain", 5)];
//! let out = decompress_folder(CompressionType::None, &blocks).unwrap();
//! assert_eq!(out, b"plain");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod bitstream;
pub mod config;
pub mod decode;
pub mod folder;
pub mod huffman;
pub mod intel;
pub mod lengths;
pub mod state;
pub mod tables;

pub use bitstream::BitCursor;
pub use config::LzxConfig;
pub use decode::LzxDecoder;
pub use folder::{FolderBlock, FolderDecoder, decompress_folder};
pub use huffman::HuffmanTable;
pub use state::{DecoderState, RepeatOffsets};
pub use tables::BlockType;

#[cfg(feature = "parallel")]
pub use folder::decompress_folders_parallel;

pub use oxicab_core::{BlockDecompressor, CompressionType, OxiCabError, Result};
