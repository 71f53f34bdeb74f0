//! Persistent per-folder LZX decoder state.
//!
//! Everything here survives from one frame to the next: the sliding
//! window, the code lengths of all four trees, the repeat-offset cache,
//! the current block and the Intel E8 bookkeeping. Only the bit cursor is
//! rebuilt on every call.

use crate::huffman::HuffmanTable;
use crate::tables::{
    ALIGNED_NUM_ELEMENTS, ALIGNED_TABLE_BITS, BlockType, LENGTH_MAX_SYMBOLS, LENGTH_TABLE_BITS,
    MAINTREE_TABLE_BITS, MAX_WINDOW_BITS, MIN_WINDOW_BITS, PRETREE_NUM_ELEMENTS,
    PRETREE_TABLE_BITS, main_elements, position_slots,
};
use oxicab_core::error::{OxiCabError, Result};

/// The three most recently used match offsets.
///
/// A repeat slot moves its offset to the front; a newly coded offset is
/// shifted in and the oldest is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatOffsets {
    r0: u32,
    r1: u32,
    r2: u32,
}

impl RepeatOffsets {
    /// Cache with every entry set to 1.
    pub const fn new() -> Self {
        Self { r0: 1, r1: 1, r2: 1 }
    }

    /// Cache with explicit values (uncompressed block headers carry them).
    pub const fn from_values(r0: u32, r1: u32, r2: u32) -> Self {
        Self { r0, r1, r2 }
    }

    /// Current values, most recent first.
    pub fn values(&self) -> [u32; 3] {
        [self.r0, self.r1, self.r2]
    }

    /// Use a cached offset. Slot 0 leaves the cache as is; slots 1 and 2
    /// swap with slot 0.
    pub fn repeat(&mut self, slot: usize) -> u32 {
        match slot {
            1 => std::mem::swap(&mut self.r0, &mut self.r1),
            2 => std::mem::swap(&mut self.r0, &mut self.r2),
            _ => {}
        }
        self.r0
    }

    /// Shift a newly coded offset in.
    pub fn push(&mut self, offset: u32) -> u32 {
        self.r2 = self.r1;
        self.r1 = self.r0;
        self.r0 = offset;
        offset
    }
}

impl Default for RepeatOffsets {
    fn default() -> Self {
        Self::new()
    }
}

/// Persistent state of one folder's LZX stream.
#[derive(Debug, Clone)]
pub struct DecoderState {
    pub(crate) window: Vec<u8>,
    pub(crate) window_bits: u8,
    pub(crate) window_size: usize,
    /// Next write position; may equal `window_size` between calls.
    pub(crate) window_posn: usize,

    pub(crate) offsets: RepeatOffsets,
    pub(crate) main_elements: usize,

    pub(crate) pretree: HuffmanTable,
    pub(crate) maintree: HuffmanTable,
    pub(crate) length: HuffmanTable,
    pub(crate) aligned: HuffmanTable,

    pub(crate) header_read: bool,
    pub(crate) block_type: Option<BlockType>,
    pub(crate) block_length: u32,
    pub(crate) block_remaining: u32,

    pub(crate) frames_read: u32,
    pub(crate) intel_filesize: i32,
    pub(crate) intel_curpos: i32,
    pub(crate) intel_started: bool,
}

impl DecoderState {
    /// Allocate state for a window of `2^window_bits` bytes.
    pub fn new(window_bits: u8) -> Result<Self> {
        check_window_bits(window_bits)?;
        let main_elements = main_elements(window_bits);
        Ok(Self {
            window: vec![0; 1usize << window_bits],
            window_bits,
            window_size: 1usize << window_bits,
            window_posn: 0,
            offsets: RepeatOffsets::new(),
            main_elements,
            pretree: HuffmanTable::new("pretree", PRETREE_NUM_ELEMENTS, PRETREE_TABLE_BITS),
            maintree: HuffmanTable::new("maintree", main_elements, MAINTREE_TABLE_BITS),
            length: HuffmanTable::new("length", LENGTH_MAX_SYMBOLS, LENGTH_TABLE_BITS),
            aligned: HuffmanTable::new("aligned", ALIGNED_NUM_ELEMENTS, ALIGNED_TABLE_BITS),
            header_read: false,
            block_type: None,
            block_length: 0,
            block_remaining: 0,
            frames_read: 0,
            intel_filesize: 0,
            intel_curpos: 0,
            intel_started: false,
        })
    }

    /// Re-initialise for a new folder.
    ///
    /// The window allocation is kept when it is already large enough.
    /// Everything else returns to its initial value.
    pub fn init(&mut self, window_bits: u8) -> Result<()> {
        check_window_bits(window_bits)?;
        self.reinitialize(window_bits);
        Ok(())
    }

    /// Re-initialise with the current window size.
    pub(crate) fn restart(&mut self) {
        self.reinitialize(self.window_bits);
    }

    fn reinitialize(&mut self, window_bits: u8) {
        let window_size = 1usize << window_bits;

        if self.window.len() < window_size {
            self.window = vec![0; window_size];
        } else {
            self.window[..window_size].fill(0);
        }
        self.window_bits = window_bits;
        self.window_size = window_size;
        self.window_posn = 0;

        let main_elements = main_elements(window_bits);
        if main_elements != self.main_elements {
            self.maintree = HuffmanTable::new("maintree", main_elements, MAINTREE_TABLE_BITS);
            self.main_elements = main_elements;
        }

        self.reset();
        self.pretree.clear_lengths();
        self.aligned.clear_lengths();
        self.frames_read = 0;
        self.intel_filesize = 0;
        self.intel_curpos = 0;
        self.intel_started = false;
    }

    /// Reset at a frame boundary.
    ///
    /// Clears the repeat offsets, the header flag, the block bookkeeping and
    /// the main/length code lengths. The window and frame counter are kept.
    pub fn reset(&mut self) {
        self.offsets = RepeatOffsets::new();
        self.header_read = false;
        self.block_type = None;
        self.block_length = 0;
        self.block_remaining = 0;
        self.maintree.clear_lengths();
        self.length.clear_lengths();
    }

    /// Window size exponent.
    pub fn window_bits(&self) -> u8 {
        self.window_bits
    }

    /// Window size in bytes.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Next window write position.
    pub fn window_position(&self) -> usize {
        self.window_posn
    }

    /// Number of position slots for this window.
    pub fn position_slots(&self) -> usize {
        position_slots(self.window_bits)
    }

    /// Number of main tree symbols.
    pub fn main_elements(&self) -> usize {
        self.main_elements
    }

    /// Repeat offsets, most recent first.
    pub fn repeat_offsets(&self) -> [u32; 3] {
        self.offsets.values()
    }

    /// Number of `decompress` calls since the last `init`.
    pub fn frames_read(&self) -> u32 {
        self.frames_read
    }

    /// Intel translation file size from the stream header (0 = off).
    pub fn intel_filesize(&self) -> i32 {
        self.intel_filesize
    }

    /// Running Intel translation position.
    pub fn intel_curpos(&self) -> i32 {
        self.intel_curpos
    }

    /// Whether Intel translation has been latched on.
    pub fn intel_started(&self) -> bool {
        self.intel_started
    }

    /// Whether the stream header has been consumed.
    pub fn header_read(&self) -> bool {
        self.header_read
    }

    /// Type of the current block, if one has been started.
    pub fn block_type(&self) -> Option<BlockType> {
        self.block_type
    }

    /// Declared length of the current block.
    pub fn block_length(&self) -> u32 {
        self.block_length
    }

    /// Bytes still to be produced from the current block.
    pub fn block_remaining(&self) -> u32 {
        self.block_remaining
    }

    /// Window contents.
    pub fn window(&self) -> &[u8] {
        &self.window[..self.window_size]
    }
}

fn check_window_bits(window_bits: u8) -> Result<()> {
    if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
        return Err(OxiCabError::invalid_window_size(
            window_bits,
            MIN_WINDOW_BITS,
            MAX_WINDOW_BITS,
        ));
    }
    Ok(())
}
