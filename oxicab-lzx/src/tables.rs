//! LZX constants and position slot tables.
//!
//! Match distances are coded as a position slot plus a number of extra
//! bits. Slot `s` covers formatted offsets
//! `POSITION_BASE[s] .. POSITION_BASE[s] + 2^EXTRA_BITS[s]`, where the
//! formatted offset is the real distance plus two (slots 0-2 are reserved
//! for the repeat-offset cache).

/// Smallest supported window exponent (32 KB).
pub const MIN_WINDOW_BITS: u8 = 15;
/// Largest supported window exponent (2 MB).
pub const MAX_WINDOW_BITS: u8 = 21;

/// Shortest match.
pub const MIN_MATCH: usize = 2;
/// Longest match.
pub const MAX_MATCH: usize = 257;

/// Number of literal symbols in the main tree.
pub const NUM_CHARS: usize = 256;
/// Length header value that signals a length-tree footer.
pub const NUM_PRIMARY_LENGTHS: usize = 7;
/// Number of symbols in the length tree.
pub const NUM_SECONDARY_LENGTHS: usize = 249;

/// Number of position slots for the largest window.
pub const MAX_POSITION_SLOTS: usize = 50;

/// Pretree: symbol count and fast-lookup width.
pub const PRETREE_NUM_ELEMENTS: usize = 20;
/// Fast-lookup bits for the pretree.
pub const PRETREE_TABLE_BITS: u8 = 6;

/// Main tree: maximum symbol count (largest window).
pub const MAINTREE_MAX_SYMBOLS: usize = NUM_CHARS + MAX_POSITION_SLOTS * 8;
/// Fast-lookup bits for the main tree.
pub const MAINTREE_TABLE_BITS: u8 = 12;

/// Length tree: symbol count used for table construction.
pub const LENGTH_MAX_SYMBOLS: usize = NUM_SECONDARY_LENGTHS + 1;
/// Fast-lookup bits for the length tree.
pub const LENGTH_TABLE_BITS: u8 = 12;

/// Aligned offset tree: symbol count.
pub const ALIGNED_NUM_ELEMENTS: usize = 8;
/// Fast-lookup bits for the aligned offset tree.
pub const ALIGNED_TABLE_BITS: u8 = 7;

/// Extra room after each length array; pretree runs may overshoot.
pub const LENTABLE_SAFETY: usize = 64;

/// Longest code the decode tables accept.
pub const MAX_CODE_LENGTH: u32 = 16;

/// Intel E8 translation is only applied to the first 32768 frames.
pub const INTEL_FRAME_LIMIT: u32 = 32768;

/// Block types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// Huffman-coded literals and matches with verbatim offset bits.
    Verbatim,
    /// Like verbatim, with the low three offset bits coded by the aligned tree.
    Aligned,
    /// Raw bytes preceded by the repeat-offset cache.
    Uncompressed,
}

impl BlockType {
    /// Parse the 3-bit block type field.
    pub fn from_bits(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Verbatim),
            2 => Some(Self::Aligned),
            3 => Some(Self::Uncompressed),
            _ => None,
        }
    }

    /// The 3-bit value written in block headers.
    pub fn to_bits(self) -> u32 {
        match self {
            Self::Verbatim => 1,
            Self::Aligned => 2,
            Self::Uncompressed => 3,
        }
    }
}

const fn build_extra_bits() -> [u8; MAX_POSITION_SLOTS] {
    let mut table = [0u8; MAX_POSITION_SLOTS];
    let mut i = 4;
    while i < MAX_POSITION_SLOTS {
        let bits = i / 2 - 1;
        table[i] = if bits > 17 { 17 } else { bits as u8 };
        i += 1;
    }
    table
}

const fn build_position_base() -> [u32; MAX_POSITION_SLOTS] {
    let mut table = [0u32; MAX_POSITION_SLOTS];
    let mut i = 1;
    while i < MAX_POSITION_SLOTS {
        table[i] = table[i - 1] + (1 << EXTRA_BITS[i - 1]);
        i += 1;
    }
    table
}

/// Extra offset bits per position slot: 0,0,0,0,1,1,2,2,...,16,16,17,17,...
pub const EXTRA_BITS: [u8; MAX_POSITION_SLOTS] = build_extra_bits();

/// Base formatted offset per position slot: 0,1,2,3,4,6,8,12,16,24,...
pub const POSITION_BASE: [u32; MAX_POSITION_SLOTS] = build_position_base();

/// Number of position slots for a window of `2^window_bits` bytes.
pub fn position_slots(window_bits: u8) -> usize {
    match window_bits {
        20 => 42,
        21 => 50,
        bits => (bits as usize) << 1,
    }
}

/// Number of main tree symbols for a window of `2^window_bits` bytes.
pub fn main_elements(window_bits: u8) -> usize {
    NUM_CHARS + (position_slots(window_bits) << 3)
}
