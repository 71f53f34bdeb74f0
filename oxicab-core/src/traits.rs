//! Core traits for block-oriented decompression.
//!
//! Cabinet folders are stored as a sequence of CFDATA blocks, each of which
//! carries its compressed size and the exact number of bytes it expands to.
//! Codecs therefore work one block at a time: the caller hands over the
//! compressed bytes and an output slice of the expected length.

use crate::error::Result;

/// A decompressor driven one container block at a time.
///
/// Implementations keep whatever history they need (sliding window, code
/// tables, repeat offsets) between calls. A single instance belongs to one
/// folder and must not be shared with another.
pub trait BlockDecompressor {
    /// Decompress one block.
    ///
    /// # Arguments
    ///
    /// * `input` - Compressed bytes of the block
    /// * `output` - Destination, exactly as long as the block's uncompressed size
    ///
    /// # Returns
    ///
    /// The number of input bytes consumed.
    fn decompress_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize>;

    /// Reset the decompressor to the state it had before the first block.
    fn reset(&mut self);

    /// Decompress one block into a freshly allocated buffer.
    fn decompress_block_to_vec(&mut self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        let mut output = vec![0u8; uncompressed_size];
        self.decompress_block(input, &mut output)?;
        Ok(output)
    }
}

impl<D: BlockDecompressor + ?Sized> BlockDecompressor for Box<D> {
    fn decompress_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        (**self).decompress_block(input, output)
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}
