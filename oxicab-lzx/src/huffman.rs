//! Canonical Huffman decode tables.
//!
//! LZX transmits only code lengths; codes are assigned canonically, shorter
//! codes first and symbols in ascending order within a length. Each table
//! has a direct-lookup part indexed by the next `table_bits` input bits.
//! Codes longer than that continue in a binary tree stored after the
//! direct part, one node (a pair of entries) per internal branch.

use crate::bitstream::BitCursor;
use crate::tables::{LENTABLE_SAFETY, MAX_CODE_LENGTH};
use oxicab_core::error::{OxiCabError, Result};

/// Marks a table entry that no code has reached yet.
const UNUSED: u16 = 0xFFFF;

/// A canonical Huffman decode table together with its code lengths.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    /// Table name for error messages.
    name: &'static str,
    /// Code length per symbol, plus room for pretree run overshoot.
    lengths: Vec<u8>,
    /// Direct lookup entries followed by tree nodes.
    table: Vec<u16>,
    /// Number of symbols.
    num_symbols: usize,
    /// Width of the direct lookup.
    table_bits: u8,
    /// Whether the last build found no codes at all.
    empty: bool,
}

impl HuffmanTable {
    /// Create a table for `num_symbols` symbols with all lengths zero.
    pub fn new(name: &'static str, num_symbols: usize, table_bits: u8) -> Self {
        Self {
            name,
            lengths: vec![0; num_symbols + LENTABLE_SAFETY],
            table: vec![0; (1usize << table_bits) + num_symbols * 2],
            num_symbols,
            table_bits,
            empty: true,
        }
    }

    /// Table name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of symbols.
    pub fn num_symbols(&self) -> usize {
        self.num_symbols
    }

    /// Code lengths, including the safety margin.
    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    /// Mutable code lengths, including the safety margin.
    pub fn lengths_mut(&mut self) -> &mut [u8] {
        &mut self.lengths
    }

    /// Zero every code length.
    pub fn clear_lengths(&mut self) {
        self.lengths.fill(0);
    }

    /// Whether the last build produced an empty table.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Rebuild the decode table from the current code lengths.
    ///
    /// An all-zero set of lengths yields an empty table, which is only an
    /// error if a symbol is later decoded from it. Any other set that does
    /// not form a complete prefix code is rejected.
    pub fn rebuild(&mut self) -> Result<()> {
        match self.build_table() {
            Ok(()) => {
                self.empty = false;
                Ok(())
            }
            Err(err) => {
                if self.lengths[..self.num_symbols].iter().any(|&len| len > 0) {
                    return Err(err);
                }
                self.empty = true;
                Ok(())
            }
        }
    }

    fn build_table(&mut self) -> Result<()> {
        let nbits = self.table_bits as u32;
        let nsyms = self.num_symbols;
        let lengths = &self.lengths[..nsyms];
        let table = &mut self.table;

        let overrun = || OxiCabError::invalid_table(self.name, "table overrun");

        // Codes that fit the direct lookup fill runs of entries.
        let mut pos: u32 = 0;
        let mut table_mask: u32 = 1 << nbits;
        let mut bit_mask: u32 = table_mask >> 1;

        for bit_num in 1..=nbits {
            for (sym, &len) in lengths.iter().enumerate() {
                if len as u32 != bit_num {
                    continue;
                }
                let leaf = pos as usize;
                pos += bit_mask;
                if pos > table_mask {
                    return Err(overrun());
                }
                table[leaf..pos as usize].fill(sym as u16);
            }
            bit_mask >>= 1;
        }

        if pos == table_mask {
            return Ok(());
        }

        // Longer codes hang off the remaining direct entries as trees.
        table[pos as usize..table_mask as usize].fill(UNUSED);

        let mut next_symbol = ((table_mask >> 1) as usize).max(nsyms);
        pos <<= 16;
        table_mask <<= 16;
        bit_mask = 1 << 15;

        for bit_num in (nbits + 1)..=MAX_CODE_LENGTH {
            for (sym, &len) in lengths.iter().enumerate() {
                if len as u32 != bit_num {
                    continue;
                }
                if pos >= table_mask {
                    return Err(overrun());
                }

                let mut leaf = (pos >> 16) as usize;
                for fill in 0..(bit_num - nbits) {
                    let entry = *table.get(leaf).ok_or_else(overrun)?;
                    if entry == UNUSED {
                        let node = next_symbol << 1;
                        let pair = table.get_mut(node..node + 2).ok_or_else(overrun)?;
                        pair.fill(UNUSED);
                        table[leaf] = next_symbol as u16;
                        next_symbol += 1;
                    }
                    leaf = (table[leaf] as usize) << 1;
                    if (pos >> (15 - fill)) & 1 != 0 {
                        leaf += 1;
                    }
                }
                *table.get_mut(leaf).ok_or_else(overrun)? = sym as u16;
                pos += bit_mask;
            }
            bit_mask >>= 1;
        }

        if pos == table_mask {
            Ok(())
        } else {
            Err(OxiCabError::invalid_table(self.name, "incomplete code"))
        }
    }

    /// Decode one symbol.
    pub fn decode(&self, cursor: &mut BitCursor<'_>) -> Result<usize> {
        if self.empty {
            return Err(OxiCabError::empty_table(self.name));
        }

        cursor.ensure(MAX_CODE_LENGTH)?;
        let nbits = self.table_bits as u32;
        let bad_code = || OxiCabError::invalid_huffman(cursor.bit_position());

        let mut sym = *self
            .table
            .get(cursor.peek(nbits) as usize)
            .ok_or_else(bad_code)? as usize;

        if sym >= self.num_symbols {
            let buffer = cursor.buffer();
            let mut bit = 1u32 << (31 - nbits);
            let mut depth = nbits;
            loop {
                depth += 1;
                if depth > MAX_CODE_LENGTH {
                    return Err(bad_code());
                }
                let index = (sym << 1) | usize::from(buffer & bit != 0);
                sym = *self.table.get(index).ok_or_else(bad_code)? as usize;
                if sym < self.num_symbols {
                    break;
                }
                bit >>= 1;
            }
        }

        cursor.remove(self.lengths[sym] as u32);
        Ok(sym)
    }
}
