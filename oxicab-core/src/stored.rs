//! Stored (uncompressed) CAB blocks.

use crate::error::{OxiCabError, Result};
use crate::traits::BlockDecompressor;

/// Pass-through codec for folders written with `tcompTYPE_NONE`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StoredDecompressor;

impl StoredDecompressor {
    /// Create a new stored-block codec.
    pub fn new() -> Self {
        Self
    }
}

impl BlockDecompressor for StoredDecompressor {
    fn decompress_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        if input.len() < output.len() {
            return Err(OxiCabError::unexpected_eof(output.len() - input.len()));
        }
        if input.len() > output.len() {
            return Err(OxiCabError::corrupted(
                output.len() as u64,
                format!(
                    "stored block holds {} bytes but expands to {}",
                    input.len(),
                    output.len()
                ),
            ));
        }
        output.copy_from_slice(input);
        Ok(input.len())
    }

    fn reset(&mut self) {}
}
