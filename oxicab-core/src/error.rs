//! Error types for OxiCab operations.
//!
//! Every codec in the workspace reports failures through [`OxiCabError`].
//! Decoders never retry or salvage: once an error is returned, the state
//! that produced it must not be used for the rest of its folder.

use thiserror::Error;

/// The main error type for OxiCab operations.
#[derive(Debug, Error)]
pub enum OxiCabError {
    /// Window size outside the range supported by the codec.
    #[error("Invalid window size: 2^{bits} (supported: 2^{min}..=2^{max})")]
    InvalidWindowSize {
        /// Requested window size exponent.
        bits: u8,
        /// Smallest supported exponent.
        min: u8,
        /// Largest supported exponent.
        max: u8,
    },

    /// Unsupported compression method.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The compression method identifier.
        method: String,
    },

    /// Unknown CAB compression type tag.
    #[error("Unknown compression type: {value:#06x}")]
    UnknownCompressionType {
        /// Raw `typeCompress` value.
        value: u16,
    },

    /// Block header carries an undefined block type.
    #[error("Unknown block type: {block_type}")]
    UnknownBlockType {
        /// The 3-bit block type read from the stream.
        block_type: u32,
    },

    /// Code lengths do not describe a usable prefix code.
    #[error("Invalid Huffman table '{table}': {reason}")]
    InvalidHuffmanTable {
        /// Name of the table being built.
        table: &'static str,
        /// What was wrong with the code lengths.
        reason: &'static str,
    },

    /// A symbol was requested from a table with no codes.
    #[error("Huffman table '{table}' is empty but a symbol was requested")]
    EmptyHuffmanTable {
        /// Name of the empty table.
        table: &'static str,
    },

    /// Invalid Huffman code encountered during decompression.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// A run or match would write past the end of the sliding window.
    #[error("Run of {length} bytes at window position {position} crosses window end {window_size}")]
    WindowOverrun {
        /// Window write position.
        position: usize,
        /// Number of bytes in the run.
        length: usize,
        /// Size of the window.
        window_size: usize,
    },

    /// Invalid distance in an LZ77 back-reference.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Current history buffer size.
        history_size: usize,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Buffer too small for operation.
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Corrupted data in the compressed stream.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },
}

/// Result type alias for OxiCab operations.
pub type Result<T> = std::result::Result<T, OxiCabError>;

impl OxiCabError {
    /// Create an invalid window size error.
    pub fn invalid_window_size(bits: u8, min: u8, max: u8) -> Self {
        Self::InvalidWindowSize { bits, min, max }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Create an unknown compression type error.
    pub fn unknown_compression_type(value: u16) -> Self {
        Self::UnknownCompressionType { value }
    }

    /// Create an unknown block type error.
    pub fn unknown_block_type(block_type: u32) -> Self {
        Self::UnknownBlockType { block_type }
    }

    /// Create an invalid Huffman table error.
    pub fn invalid_table(table: &'static str, reason: &'static str) -> Self {
        Self::InvalidHuffmanTable { table, reason }
    }

    /// Create an empty Huffman table error.
    pub fn empty_table(table: &'static str) -> Self {
        Self::EmptyHuffmanTable { table }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a window overrun error.
    pub fn window_overrun(position: usize, length: usize, window_size: usize) -> Self {
        Self::WindowOverrun {
            position,
            length,
            window_size,
        }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create a buffer too small error.
    pub fn buffer_too_small(needed: usize, available: usize) -> Self {
        Self::BufferTooSmall { needed, available }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }
}
