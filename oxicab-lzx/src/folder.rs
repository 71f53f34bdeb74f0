//! Folder-level decoding.
//!
//! A cabinet folder is a chain of CFDATA blocks compressed as one stream.
//! The container reader hands each block over together with the size it
//! expands to; [`FolderDecoder`] picks the codec from the folder's
//! compression tag and feeds it the blocks in order.

use crate::decode::LzxDecoder;
use oxicab_core::error::{OxiCabError, Result};
use oxicab_core::method::CompressionType;
use oxicab_core::stored::StoredDecompressor;
use oxicab_core::traits::BlockDecompressor;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One CFDATA block of a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolderBlock<'a> {
    /// Compressed bytes.
    pub data: &'a [u8],
    /// Number of bytes the block expands to.
    pub uncompressed_size: usize,
}

impl<'a> FolderBlock<'a> {
    /// Create a block descriptor.
    pub fn new(data: &'a [u8], uncompressed_size: usize) -> Self {
        Self {
            data,
            uncompressed_size,
        }
    }
}

/// Decoder for the blocks of one folder.
pub struct FolderDecoder {
    compression: CompressionType,
    codec: Box<dyn BlockDecompressor + Send>,
    blocks_decoded: usize,
}

impl std::fmt::Debug for FolderDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderDecoder")
            .field("compression", &self.compression)
            .field("blocks_decoded", &self.blocks_decoded)
            .finish()
    }
}

impl FolderDecoder {
    /// Create a decoder for a folder's compression type.
    ///
    /// MSZIP and Quantum folders are reported as unsupported.
    pub fn new(compression: CompressionType) -> Result<Self> {
        let codec: Box<dyn BlockDecompressor + Send> = match compression {
            CompressionType::None => Box::new(StoredDecompressor::new()),
            CompressionType::Lzx(window_bits) => Box::new(LzxDecoder::with_window_bits(window_bits)?),
            other => return Err(OxiCabError::unsupported_method(other.name())),
        };
        tracing::debug!("Folder decoder: {}", compression.name());

        Ok(Self {
            compression,
            codec,
            blocks_decoded: 0,
        })
    }

    /// Compression type of the folder.
    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    /// Number of blocks decoded so far.
    pub fn blocks_decoded(&self) -> usize {
        self.blocks_decoded
    }

    /// Decode the next block into `output`, which must be exactly its
    /// uncompressed size.
    pub fn decode_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let consumed = self.codec.decompress_block(input, output)?;
        self.blocks_decoded += 1;
        Ok(consumed)
    }

    /// Decode every block in order and concatenate the output.
    pub fn decode_all(&mut self, blocks: &[FolderBlock<'_>]) -> Result<Vec<u8>> {
        let total: usize = blocks.iter().map(|b| b.uncompressed_size).sum();
        let mut output = vec![0u8; total];

        let mut offset = 0;
        for block in blocks {
            let end = offset + block.uncompressed_size;
            self.decode_block(block.data, &mut output[offset..end])?;
            offset = end;
        }

        tracing::debug!(
            "Folder decoded: {} blocks, {} bytes",
            blocks.len(),
            total
        );
        Ok(output)
    }

    /// Start over from the first block.
    pub fn reset(&mut self) {
        self.codec.reset();
        self.blocks_decoded = 0;
    }
}

/// Decode a whole folder.
pub fn decompress_folder(compression: CompressionType, blocks: &[FolderBlock<'_>]) -> Result<Vec<u8>> {
    FolderDecoder::new(compression)?.decode_all(blocks)
}

/// Decode independent folders in parallel (requires `parallel` feature).
///
/// Each folder gets its own decoder state. Results are returned in input
/// order; the first failing folder's error is reported.
#[cfg(feature = "parallel")]
pub fn decompress_folders_parallel(
    folders: &[(CompressionType, Vec<FolderBlock<'_>>)],
) -> Result<Vec<Vec<u8>>> {
    folders
        .par_iter()
        .map(|(compression, blocks)| decompress_folder(*compression, blocks))
        .collect()
}
