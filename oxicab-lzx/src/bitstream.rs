//! Bit-level input cursor for LZX streams.
//!
//! # Bit Ordering
//!
//! LZX reads its input as a sequence of little-endian 16-bit words and
//! consumes each word from its most significant bit down. The cursor keeps
//! a 32-bit buffer whose top bits are always the next bits of the stream;
//! refills append whole words below the bits already buffered.
//!
//! Bytes past the end of the input read as zero. A well-formed block never
//! needs more than one such word (a Huffman lookup always asks for 16 bits,
//! even when the final code is shorter), so the cursor allows exactly
//! [`INPUT_SLACK`] bytes of overrun and fails on the next refill.
//!
//! # Example
//!
//! ```
//! use oxicab_lzx::BitCursor;
//!
//! // One word, 0xA5C3, stored little-endian.
//! let data = [0xC3, 0xA5];
//! let mut cursor = BitCursor::new(&data);
//! assert_eq!(cursor.read_bits(4).unwrap(), 0xA);
//! assert_eq!(cursor.read_bits(8).unwrap(), 0x5C);
//! assert_eq!(cursor.read_bits(4).unwrap(), 0x3);
//! ```

use oxicab_core::error::{OxiCabError, Result};

/// Number of zero bytes the cursor may read past the end of its input.
pub const INPUT_SLACK: usize = 2;

/// A bit-level reader over an in-memory LZX block.
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    /// Compressed input.
    input: &'a [u8],
    /// Next byte to load into the buffer.
    position: usize,
    /// Bit buffer; the next bit to decode is bit 31.
    buffer: u32,
    /// Number of valid bits in `buffer`.
    bits_left: u32,
}

impl<'a> BitCursor<'a> {
    /// Create a cursor at the start of `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            position: 0,
            buffer: 0,
            bits_left: 0,
        }
    }

    /// Drop all buffered bits, keeping the byte position.
    #[inline]
    pub fn reset(&mut self) {
        self.buffer = 0;
        self.bits_left = 0;
    }

    /// Byte offset of the next word or raw byte to be loaded.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of buffered bits.
    pub fn bits_left(&self) -> u32 {
        self.bits_left
    }

    /// Raw buffer contents, next bit at bit 31.
    #[inline]
    pub fn buffer(&self) -> u32 {
        self.buffer
    }

    /// Total input length.
    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    /// Bits consumed so far (for error reporting).
    pub fn bit_position(&self) -> u64 {
        (self.position as u64 * 8).saturating_sub(self.bits_left as u64)
    }

    /// Whether the cursor has loaded bytes past the end of its input.
    pub fn is_overrun(&self) -> bool {
        self.position > self.input.len()
    }

    /// Ensure at least `count` bits are buffered (`count <= 17`).
    #[inline]
    pub fn ensure(&mut self, count: u32) -> Result<()> {
        debug_assert!(count <= 17, "Cannot buffer more than 17 bits at once");

        while self.bits_left < count {
            // Once a refill has started past the end, the slack is spent.
            if self.position > self.input.len() {
                return Err(OxiCabError::unexpected_eof(INPUT_SLACK));
            }
            let lo = self.input.get(self.position).copied().unwrap_or(0);
            let hi = self.input.get(self.position + 1).copied().unwrap_or(0);
            let word = u16::from_le_bytes([lo, hi]) as u32;

            self.buffer |= word << (16 - self.bits_left);
            self.bits_left += 16;
            self.position += 2;
        }
        Ok(())
    }

    /// Return the next `count` bits without consuming them.
    ///
    /// The caller must have buffered them with [`ensure`](Self::ensure).
    #[inline]
    pub fn peek(&self, count: u32) -> u32 {
        if count == 0 {
            return 0;
        }
        self.buffer >> (32 - count)
    }

    /// Discard `count` buffered bits.
    #[inline]
    pub fn remove(&mut self, count: u32) {
        debug_assert!(count <= self.bits_left, "Removing unbuffered bits");
        self.buffer = self.buffer.checked_shl(count).unwrap_or(0);
        self.bits_left = self.bits_left.saturating_sub(count);
    }

    /// Read `count` bits (`count <= 17`).
    #[inline]
    pub fn read_bits(&mut self, count: u32) -> Result<u32> {
        if count == 0 {
            return Ok(0);
        }
        self.ensure(count)?;
        let value = self.peek(count);
        self.remove(count);
        Ok(value)
    }

    /// Re-align to a 16-bit boundary before raw data.
    ///
    /// Uncompressed blocks pad their header with 1 to 16 zero bits. After
    /// buffering 16 bits, anything beyond those belongs to a word that is
    /// already raw data, so the cursor steps back over it.
    pub fn align_to_word(&mut self) -> Result<()> {
        self.ensure(16)?;
        if self.bits_left > 16 {
            self.position -= 2;
        }
        self.reset();
        Ok(())
    }

    /// Read a raw little-endian `u32`, bypassing the bit buffer.
    pub fn read_raw_u32(&mut self) -> Result<u32> {
        let bytes = self.read_raw_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Borrow the next `count` raw bytes, bypassing the bit buffer.
    pub fn read_raw_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self.position + count;
        if end > self.input.len() {
            return Err(OxiCabError::unexpected_eof(
                end - self.input.len().max(self.position),
            ));
        }
        let bytes = &self.input[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Skip one raw byte (the pad after an odd-length uncompressed block).
    pub fn skip_raw_byte(&mut self) {
        self.position += 1;
    }
}
