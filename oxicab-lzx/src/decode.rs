//! LZX frame decoder.
//!
//! A folder is decoded one frame (CFDATA block) at a time. Each call
//! produces exactly the requested number of bytes; LZX blocks may start and
//! end anywhere inside a frame and carry over to the next call.

use crate::bitstream::BitCursor;
use crate::config::LzxConfig;
use crate::huffman::HuffmanTable;
use crate::intel::decode_e8;
use crate::lengths::read_lengths;
use crate::state::{DecoderState, RepeatOffsets};
use crate::tables::{
    ALIGNED_NUM_ELEMENTS, BlockType, EXTRA_BITS, INTEL_FRAME_LIMIT, MIN_MATCH, NUM_CHARS,
    NUM_PRIMARY_LENGTHS, NUM_SECONDARY_LENGTHS, POSITION_BASE,
};
use oxicab_core::error::{OxiCabError, Result};
use oxicab_core::traits::BlockDecompressor;

/// Main tree symbol of the `0xE8` literal.
const E8_SYMBOL: usize = 0xE8;

/// LZX decompressor for one folder.
#[derive(Debug, Clone)]
pub struct LzxDecoder {
    /// Configuration.
    config: LzxConfig,
    /// Persistent stream state.
    state: DecoderState,
}

impl LzxDecoder {
    /// Create a decoder from a configuration.
    pub fn new(config: LzxConfig) -> Result<Self> {
        config.validate()?;
        let state = DecoderState::new(config.window_bits)?;
        tracing::debug!(
            "LZX decoder: window 2^{}, {} main elements, reset interval {}",
            config.window_bits,
            state.main_elements(),
            config.reset_interval
        );
        Ok(Self { config, state })
    }

    /// Create a CAB decoder for a window of `2^window_bits` bytes.
    pub fn with_window_bits(window_bits: u8) -> Result<Self> {
        Self::new(LzxConfig::cab(window_bits))
    }

    /// Re-initialise for a new folder with a possibly different window.
    pub fn init(&mut self, window_bits: u8) -> Result<()> {
        self.state.init(window_bits)?;
        self.config.window_bits = window_bits;
        tracing::debug!(
            "LZX decoder re-initialised: window 2^{}, {} main elements",
            window_bits,
            self.state.main_elements()
        );
        Ok(())
    }

    /// Configuration in use.
    pub fn config(&self) -> &LzxConfig {
        &self.config
    }

    /// Persistent stream state.
    pub fn state(&self) -> &DecoderState {
        &self.state
    }

    /// Decompress one frame.
    ///
    /// Writes exactly `outlen` bytes to the front of `output` and returns
    /// the number of input bytes read. After an error the folder cannot be
    /// continued; call [`init`](Self::init) before reusing the decoder.
    pub fn decompress(&mut self, input: &[u8], outlen: usize, output: &mut [u8]) -> Result<usize> {
        if outlen > self.state.window_size {
            return Err(OxiCabError::buffer_too_small(outlen, self.state.window_size));
        }
        if output.len() < outlen {
            return Err(OxiCabError::buffer_too_small(outlen, output.len()));
        }

        let interval = self.config.reset_interval;
        if interval != 0 && self.state.frames_read != 0 && self.state.frames_read % interval == 0 {
            tracing::debug!("LZX reset at frame {}", self.state.frames_read);
            self.state.reset();
        }

        let mut cursor = BitCursor::new(input);

        if !self.state.header_read {
            self.read_stream_header(&mut cursor)?;
        }

        let mut togo = outlen;
        while togo > 0 {
            if self.state.block_remaining == 0 {
                self.read_block_header(&mut cursor)?;
            }

            let this_run = (self.state.block_remaining as usize).min(togo);
            togo -= this_run;
            self.state.block_remaining -= this_run as u32;

            self.state.window_posn &= self.state.window_size - 1;
            if self.state.window_posn + this_run > self.state.window_size {
                return Err(OxiCabError::window_overrun(
                    self.state.window_posn,
                    this_run,
                    self.state.window_size,
                ));
            }

            match self.state.block_type {
                Some(BlockType::Verbatim) | Some(BlockType::Aligned) => {
                    let overshoot = self.decode_run(&mut cursor, this_run)?;
                    // Runs stop at a block or frame end; matches may not.
                    if overshoot > 0 {
                        return Err(OxiCabError::corrupted(
                            cursor.position() as u64,
                            format!("match overruns its run by {overshoot} bytes"),
                        ));
                    }
                }
                Some(BlockType::Uncompressed) => {
                    let bytes = cursor.read_raw_bytes(this_run)?;
                    let start = self.state.window_posn;
                    self.state.window[start..start + this_run].copy_from_slice(bytes);
                    self.state.window_posn += this_run;
                }
                None => {
                    return Err(OxiCabError::corrupted(
                        cursor.position() as u64,
                        "data before first block header",
                    ));
                }
            }
        }

        self.copy_frame(&mut output[..outlen]);
        self.apply_intel_filter(&mut output[..outlen]);

        tracing::trace!(
            "LZX frame {}: {} bytes from {} input bytes",
            self.state.frames_read,
            outlen,
            cursor.position().min(input.len())
        );
        Ok(cursor.position().min(input.len()))
    }

    /// One-bit Intel flag, optionally followed by the 32-bit file size.
    fn read_stream_header(&mut self, cursor: &mut BitCursor<'_>) -> Result<()> {
        let mut filesize = 0u32;
        if cursor.read_bits(1)? != 0 {
            let high = cursor.read_bits(16)?;
            let low = cursor.read_bits(16)?;
            filesize = (high << 16) | low;
        }
        self.state.intel_filesize = filesize as i32;
        self.state.header_read = true;

        if filesize != 0 {
            tracing::debug!("LZX Intel E8 translation enabled, file size {}", filesize);
        }
        Ok(())
    }

    fn read_block_header(&mut self, cursor: &mut BitCursor<'_>) -> Result<()> {
        let state = &mut self.state;

        // Uncompressed blocks bypass the bit buffer; pad to a word.
        if state.block_type == Some(BlockType::Uncompressed) {
            if state.block_length & 1 != 0 {
                cursor.skip_raw_byte();
            }
            cursor.reset();
        }

        let raw_type = cursor.read_bits(3)?;
        let high = cursor.read_bits(16)?;
        let low = cursor.read_bits(8)?;
        state.block_length = (high << 8) | low;
        state.block_remaining = state.block_length;

        let block_type = BlockType::from_bits(raw_type)
            .ok_or_else(|| OxiCabError::unknown_block_type(raw_type))?;
        state.block_type = Some(block_type);
        tracing::trace!("LZX block: {:?}, {} bytes", block_type, state.block_length);

        match block_type {
            BlockType::Aligned => {
                for i in 0..ALIGNED_NUM_ELEMENTS {
                    state.aligned.lengths_mut()[i] = cursor.read_bits(3)? as u8;
                }
                state.aligned.rebuild()?;
                Self::read_main_and_length_trees(state, cursor)?;
            }
            BlockType::Verbatim => {
                Self::read_main_and_length_trees(state, cursor)?;
            }
            BlockType::Uncompressed => {
                state.intel_started = true;
                cursor.align_to_word()?;
                let r0 = cursor.read_raw_u32()?;
                let r1 = cursor.read_raw_u32()?;
                let r2 = cursor.read_raw_u32()?;
                state.offsets = RepeatOffsets::from_values(r0, r1, r2);
            }
        }

        if cursor.is_overrun() && cursor.bits_left() < 16 {
            return Err(OxiCabError::unexpected_eof(
                cursor.position() - cursor.input_len(),
            ));
        }
        Ok(())
    }

    fn read_main_and_length_trees(state: &mut DecoderState, cursor: &mut BitCursor<'_>) -> Result<()> {
        let main_elements = state.main_elements;
        read_lengths(&mut state.pretree, &mut state.maintree, 0, NUM_CHARS, cursor)?;
        read_lengths(
            &mut state.pretree,
            &mut state.maintree,
            NUM_CHARS,
            main_elements,
            cursor,
        )?;
        state.maintree.rebuild()?;

        if state.maintree.lengths()[E8_SYMBOL] != 0 && !state.intel_started {
            tracing::debug!("LZX Intel E8 translation started");
            state.intel_started = true;
        }

        read_lengths(
            &mut state.pretree,
            &mut state.length,
            0,
            NUM_SECONDARY_LENGTHS,
            cursor,
        )?;
        state.length.rebuild()
    }

    /// Decode `run` bytes of a VERBATIM or ALIGNED block into the window.
    ///
    /// Returns how far the final match reached past `run`.
    fn decode_run(&mut self, cursor: &mut BitCursor<'_>, run: usize) -> Result<usize> {
        let aligned_block = self.state.block_type == Some(BlockType::Aligned);
        let mut remaining = run as isize;

        while remaining > 0 {
            let symbol = self.state.maintree.decode(cursor)?;
            let posn = self.state.window_posn;

            if symbol < NUM_CHARS {
                self.state.window[posn] = symbol as u8;
                self.state.window_posn += 1;
                remaining -= 1;
                continue;
            }

            let header = symbol - NUM_CHARS;
            let mut match_length = header & NUM_PRIMARY_LENGTHS;
            if match_length == NUM_PRIMARY_LENGTHS {
                match_length += self.state.length.decode(cursor)?;
            }
            match_length += MIN_MATCH;

            let slot = header >> 3;
            let offset = match slot {
                0..=2 => self.state.offsets.repeat(slot),
                _ => {
                    let aligned = aligned_block.then_some(&self.state.aligned);
                    let offset = read_match_offset(slot, aligned, cursor)?;
                    self.state.offsets.push(offset)
                }
            };

            let size = self.state.window_size;
            copy_match(
                &mut self.state.window[..size],
                posn,
                offset as usize,
                match_length,
            )?;
            self.state.window_posn += match_length;
            remaining -= match_length as isize;
        }

        Ok((-remaining) as usize)
    }

    /// Copy the last `output.len()` bytes written to the window.
    fn copy_frame(&self, output: &mut [u8]) {
        let size = self.state.window_size;
        let len = output.len();
        let start = (self.state.window_posn + size - len) & (size - 1);

        if start + len <= size {
            output.copy_from_slice(&self.state.window[start..start + len]);
        } else {
            let first = size - start;
            output[..first].copy_from_slice(&self.state.window[start..size]);
            output[first..].copy_from_slice(&self.state.window[..len - first]);
        }
    }

    fn apply_intel_filter(&mut self, frame: &mut [u8]) {
        let state = &mut self.state;
        let frame_index = state.frames_read;
        state.frames_read = state.frames_read.wrapping_add(1);

        if frame_index >= INTEL_FRAME_LIMIT || state.intel_filesize == 0 {
            return;
        }
        state.intel_curpos = if state.intel_started {
            decode_e8(frame, state.intel_curpos, state.intel_filesize)
        } else {
            state.intel_curpos.wrapping_add(frame.len() as i32)
        };
    }
}

/// Read the offset of a match whose position slot is 3 or more.
///
/// In aligned blocks, slots with at least three extra bits take the low
/// three from the aligned tree.
fn read_match_offset(
    slot: usize,
    aligned: Option<&HuffmanTable>,
    cursor: &mut BitCursor<'_>,
) -> Result<u32> {
    let extra = EXTRA_BITS[slot] as u32;
    let base = POSITION_BASE[slot] - 2;

    match aligned {
        Some(aligned) if extra >= 3 => {
            let verbatim = cursor.read_bits(extra - 3)? << 3;
            let low = aligned.decode(cursor)? as u32;
            Ok(base + verbatim + low)
        }
        _ if extra > 0 => Ok(base + cursor.read_bits(extra)?),
        _ => Ok(1),
    }
}

/// Copy a match inside the window, reading across the wrap if needed.
fn copy_match(window: &mut [u8], dest: usize, offset: usize, length: usize) -> Result<()> {
    let size = window.len();
    if dest + length > size {
        return Err(OxiCabError::window_overrun(dest, length, size));
    }
    if offset > size {
        return Err(OxiCabError::invalid_distance(offset, size));
    }

    if offset <= dest {
        let src = dest - offset;
        if offset >= length {
            window.copy_within(src..src + length, dest);
        } else {
            // Overlapping: each byte may depend on one just written.
            for i in 0..length {
                window[dest + i] = window[src + i];
            }
        }
    } else {
        let mask = size - 1;
        let src = dest + size - offset;
        for i in 0..length {
            window[dest + i] = window[(src + i) & mask];
        }
    }
    Ok(())
}

impl BlockDecompressor for LzxDecoder {
    fn decompress_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let outlen = output.len();
        self.decompress(input, outlen, output)
    }

    fn reset(&mut self) {
        self.state.restart();
    }
}
