//! Pretree-coded code length updates.
//!
//! Main and length tree lengths are not sent directly. A 20-symbol pretree
//! is sent first (4 bits per length), and each pretree symbol then either
//! updates one length as a delta modulo 17 or describes a run:
//!
//! | Symbol | Meaning                                              |
//! |--------|------------------------------------------------------|
//! | 0-16   | `len = (len - sym) mod 17`                           |
//! | 17     | `4 + read(4)` zero lengths                           |
//! | 18     | `20 + read(5)` zero lengths                          |
//! | 19     | `4 + read(1)` copies of one delta-updated length      |
//!
//! Runs may step past `last`; the length arrays carry a safety margin for
//! exactly that.

use crate::bitstream::BitCursor;
use crate::huffman::HuffmanTable;
use crate::tables::{LENTABLE_SAFETY, PRETREE_NUM_ELEMENTS};
use oxicab_core::error::{OxiCabError, Result};

/// Apply a pretree delta to a previous length.
#[inline]
fn delta(previous: u8, symbol: usize) -> u8 {
    let mut value = previous as i32 - symbol as i32;
    if value < 0 {
        value += 17;
    }
    // A same-run carrying a run symbol as its delta can still land below
    // zero. The truncated length matches no code length during table
    // construction.
    value as u8
}

/// Update `target.lengths()[first..last]` from the stream.
///
/// Lengths outside the range are left untouched, apart from the safety
/// margin past `last` which a run may overwrite. The pretree is rebuilt
/// from the stream on every call.
pub fn read_lengths(
    pretree: &mut HuffmanTable,
    target: &mut HuffmanTable,
    first: usize,
    last: usize,
    cursor: &mut BitCursor<'_>,
) -> Result<()> {
    for i in 0..PRETREE_NUM_ELEMENTS {
        pretree.lengths_mut()[i] = cursor.read_bits(4)? as u8;
    }
    pretree.rebuild()?;

    let lengths = target.lengths_mut();
    let limit = (last + LENTABLE_SAFETY).min(lengths.len());
    let mut x = first;

    while x < last {
        let symbol = pretree.decode(cursor)?;
        let (run, value) = match symbol {
            17 => (4 + cursor.read_bits(4)? as usize, None),
            18 => (20 + cursor.read_bits(5)? as usize, None),
            19 => {
                let run = 4 + cursor.read_bits(1)? as usize;
                let z = pretree.decode(cursor)?;
                (run, Some(z))
            }
            z => (1, Some(z)),
        };

        if x + run > limit {
            return Err(OxiCabError::corrupted(
                cursor.bit_position() / 8,
                "Code length run overflows table",
            ));
        }

        match value {
            None => lengths[x..x + run].fill(0),
            Some(z) => {
                let updated = delta(lengths[x], z);
                lengths[x..x + run].fill(updated);
            }
        }
        x += run;
    }

    Ok(())
}
