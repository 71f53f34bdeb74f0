//! Test-side LZX stream writer.
//!
//! Builds frames from explicit tokens so tests control every block header,
//! code length and offset slot the decoder sees. Code lengths are not
//! optimal; every used symbol simply gets a short, complete code.

#![allow(dead_code)]

use oxicab_lzx::tables::{
    ALIGNED_NUM_ELEMENTS, BlockType, EXTRA_BITS, LENGTH_MAX_SYMBOLS, MIN_MATCH, NUM_CHARS,
    NUM_PRIMARY_LENGTHS, NUM_SECONDARY_LENGTHS, POSITION_BASE, PRETREE_NUM_ELEMENTS,
    main_elements, position_slots,
};

/// Writes bits MSB-first into little-endian 16-bit words.
#[derive(Debug, Default)]
pub struct BitWriter {
    out: Vec<u8>,
    acc: u32,
    count: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, value: u32, bits: u32) {
        for i in (0..bits).rev() {
            self.acc = (self.acc << 1) | ((value >> i) & 1);
            self.count += 1;
            if self.count == 16 {
                self.out.extend_from_slice(&(self.acc as u16).to_le_bytes());
                self.acc = 0;
                self.count = 0;
            }
        }
    }

    /// Bits written into the current, unfinished word.
    pub fn partial_bits(&self) -> u32 {
        self.count
    }

    /// Zero-pad to the next word boundary.
    pub fn align(&mut self) {
        if self.count > 0 {
            self.write(0, 16 - self.count);
        }
    }

    /// Append bytes verbatim; the writer must be word aligned.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        assert_eq!(self.count, 0, "raw bytes need word alignment");
        self.out.extend_from_slice(bytes);
    }

    /// Align and hand over everything written so far.
    pub fn take(&mut self) -> Vec<u8> {
        self.align();
        std::mem::take(&mut self.out)
    }
}

/// Canonical codes for a set of code lengths.
pub fn canonical_codes(lengths: &[u8]) -> Vec<u32> {
    let mut codes = vec![0u32; lengths.len()];
    let mut code = 0u32;
    for len in 1..=16u8 {
        for (sym, &l) in lengths.iter().enumerate() {
            if l == len {
                codes[sym] = code;
                code += 1;
            }
        }
        code <<= 1;
    }
    codes
}

/// Complete code lengths covering `used` (plus a filler if only one).
///
/// With `n` symbols and `L = ceil(log2 n)`, the first `2^L - n` get `L - 1`
/// bits and the rest `L`, which fills the code space exactly.
pub fn complete_lengths(num_symbols: usize, used: &[usize]) -> Vec<u8> {
    let mut symbols: Vec<usize> = used.to_vec();
    symbols.sort_unstable();
    symbols.dedup();

    let mut lengths = vec![0u8; num_symbols];
    if symbols.is_empty() {
        return lengths;
    }
    if symbols.len() == 1 {
        let filler = if symbols[0] == 0 { 1 } else { 0 };
        symbols.push(filler);
        symbols.sort_unstable();
    }

    let n = symbols.len();
    let bits = usize::BITS - (n - 1).leading_zeros();
    let short = (1usize << bits) - n;
    for (i, &sym) in symbols.iter().enumerate() {
        lengths[sym] = if i < short { bits as u8 - 1 } else { bits as u8 };
    }
    lengths
}

/// Pretree code lengths used for every length update.
fn pretree_lengths() -> Vec<u8> {
    (0..PRETREE_NUM_ELEMENTS)
        .map(|s| if s < 12 { 4 } else { 5 })
        .collect()
}

/// Where a match takes its offset from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    /// Most recent offset.
    R0,
    /// Second most recent offset (swapped to the front).
    R1,
    /// Third most recent offset (swapped to the front).
    R2,
    /// Explicit distance.
    Absolute(u32),
}

/// One decoded unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Match { length: usize, offset: Offset },
}

impl Token {
    pub fn size(&self) -> usize {
        match self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => *length,
        }
    }
}

/// Literal tokens for a byte string.
pub fn literals(bytes: &[u8]) -> Vec<Token> {
    bytes.iter().map(|&b| Token::Literal(b)).collect()
}

/// Position slot and extra-bit value for an explicit distance.
pub fn slot_for_distance(distance: u32, slots: usize) -> (usize, u32) {
    let formatted = distance + 2;
    let slot = (3..slots)
        .rev()
        .find(|&s| POSITION_BASE[s] <= formatted)
        .expect("distance below slot 3");
    (slot, formatted - POSITION_BASE[slot])
}

#[derive(Debug, Clone, Copy)]
struct Encoded {
    main: usize,
    length: Option<usize>,
    slot: usize,
    extra: u32,
}

/// Codes of the block being written.
#[derive(Debug, Clone)]
struct BlockCodes {
    kind: BlockType,
    main_lengths: Vec<u8>,
    main_codes: Vec<u32>,
    length_lengths: Vec<u8>,
    length_codes: Vec<u32>,
    aligned_lengths: Vec<u8>,
    aligned_codes: Vec<u32>,
}

/// Writes LZX frames for a decoder with the same window size.
#[derive(Debug)]
pub struct LzxWriter {
    window_bits: u8,
    bits: BitWriter,
    header_written: bool,
    prev_main: Vec<u8>,
    prev_length: Vec<u8>,
    block: Option<BlockCodes>,
    pending_pad: bool,
}

impl LzxWriter {
    pub fn new(window_bits: u8) -> Self {
        Self {
            window_bits,
            bits: BitWriter::new(),
            header_written: false,
            prev_main: vec![0; main_elements(window_bits)],
            prev_length: vec![0; LENGTH_MAX_SYMBOLS],
            block: None,
            pending_pad: false,
        }
    }

    /// Forget everything, as a decoder reset does.
    pub fn reset(&mut self) {
        self.header_written = false;
        self.prev_main.fill(0);
        self.prev_length.fill(0);
        self.block = None;
        self.pending_pad = false;
    }

    fn flush_pad(&mut self) {
        if self.pending_pad {
            self.bits.write_raw(&[0]);
            self.pending_pad = false;
        }
    }

    /// Write raw bits (for malformed streams).
    pub fn write_bits(&mut self, value: u32, bits: u32) {
        self.flush_pad();
        self.bits.write(value, bits);
    }

    /// Stream header; `None` disables Intel translation.
    pub fn header(&mut self, intel_filesize: Option<u32>) {
        assert!(!self.header_written);
        self.flush_pad();
        match intel_filesize {
            Some(size) => {
                self.bits.write(1, 1);
                self.bits.write(size >> 16, 16);
                self.bits.write(size & 0xFFFF, 16);
            }
            None => self.bits.write(0, 1),
        }
        self.header_written = true;
    }

    fn ensure_header(&mut self) {
        if !self.header_written {
            self.header(None);
        }
    }

    fn block_header(&mut self, kind: BlockType, length: usize) {
        self.ensure_header();
        self.flush_pad();
        self.bits.write(kind.to_bits(), 3);
        self.bits.write((length >> 8) as u32, 16);
        self.bits.write((length & 0xFF) as u32, 8);
    }

    fn encode(&self, token: &Token) -> Option<Encoded> {
        let Token::Match { length, offset } = *token else {
            return None;
        };
        assert!((MIN_MATCH..=257).contains(&length), "bad match length {length}");
        let (slot, extra) = match offset {
            Offset::R0 => (0, 0),
            Offset::R1 => (1, 0),
            Offset::R2 => (2, 0),
            Offset::Absolute(d) => slot_for_distance(d, position_slots(self.window_bits)),
        };
        let header = (length - MIN_MATCH).min(NUM_PRIMARY_LENGTHS);
        let footer = (header == NUM_PRIMARY_LENGTHS).then(|| length - MIN_MATCH - NUM_PRIMARY_LENGTHS);
        Some(Encoded {
            main: NUM_CHARS + (slot << 3) + header,
            length: footer,
            slot,
            extra,
        })
    }

    /// Start a VERBATIM or ALIGNED block sized to `tokens`, with codes
    /// covering them. The tokens themselves are written separately.
    pub fn start_block(&mut self, kind: BlockType, tokens: &[Token]) {
        self.start_block_with_length(kind, tokens, tokens.iter().map(Token::size).sum());
    }

    /// Like [`start_block`](Self::start_block) with an explicit length
    /// field, for blocks spanning several token batches or frames.
    pub fn start_block_with_length(&mut self, kind: BlockType, tokens: &[Token], length: usize) {
        assert_ne!(kind, BlockType::Uncompressed);
        let me = main_elements(self.window_bits);

        let mut main_used = Vec::new();
        let mut length_used = Vec::new();
        let mut aligned_used = Vec::new();
        for token in tokens {
            match token {
                Token::Literal(b) => main_used.push(*b as usize),
                Token::Match { .. } => {
                    let enc = self.encode(token).expect("match");
                    main_used.push(enc.main);
                    if let Some(l) = enc.length {
                        length_used.push(l);
                    }
                    if kind == BlockType::Aligned && EXTRA_BITS[enc.slot] >= 3 {
                        aligned_used.push((enc.extra & 7) as usize);
                    }
                }
            }
        }

        let main_lengths = complete_lengths(me, &main_used);
        let length_lengths = complete_lengths(LENGTH_MAX_SYMBOLS, &length_used);
        let aligned_lengths = complete_lengths(ALIGNED_NUM_ELEMENTS, &aligned_used);

        self.block_header(kind, length);
        if kind == BlockType::Aligned {
            for &l in &aligned_lengths {
                self.bits.write(l as u32, 3);
            }
        }

        let prev_main = std::mem::take(&mut self.prev_main);
        self.write_lengths(&prev_main, &main_lengths, 0, NUM_CHARS);
        self.write_lengths(&prev_main, &main_lengths, NUM_CHARS, me);
        self.prev_main = main_lengths.clone();

        let prev_length = std::mem::take(&mut self.prev_length);
        self.write_lengths(&prev_length, &length_lengths, 0, NUM_SECONDARY_LENGTHS);
        self.prev_length = length_lengths.clone();

        self.block = Some(BlockCodes {
            kind,
            main_codes: canonical_codes(&main_lengths),
            main_lengths,
            length_codes: canonical_codes(&length_lengths),
            length_lengths,
            aligned_codes: canonical_codes(&aligned_lengths),
            aligned_lengths,
        });
    }

    /// Write tokens with the codes of the current block.
    pub fn tokens(&mut self, tokens: &[Token]) {
        let block = self.block.clone().expect("no compressed block started");
        for token in tokens {
            match token {
                Token::Literal(b) => {
                    let sym = *b as usize;
                    self.code(block.main_codes[sym], block.main_lengths[sym]);
                }
                Token::Match { .. } => {
                    let enc = self.encode(token).expect("match");
                    self.code(block.main_codes[enc.main], block.main_lengths[enc.main]);
                    if let Some(l) = enc.length {
                        self.code(block.length_codes[l], block.length_lengths[l]);
                    }
                    if enc.slot < 3 {
                        continue;
                    }
                    let extra_bits = EXTRA_BITS[enc.slot] as u32;
                    if block.kind == BlockType::Aligned && extra_bits >= 3 {
                        self.bits.write(enc.extra >> 3, extra_bits - 3);
                        let a = (enc.extra & 7) as usize;
                        self.code(block.aligned_codes[a], block.aligned_lengths[a]);
                    } else {
                        self.bits.write(enc.extra, extra_bits);
                    }
                }
            }
        }
    }

    fn code(&mut self, code: u32, len: u8) {
        assert!(len > 0, "symbol has no code");
        self.bits.write(code, len as u32);
    }

    /// A complete VERBATIM block.
    pub fn verbatim_block(&mut self, tokens: &[Token]) {
        self.start_block(BlockType::Verbatim, tokens);
        self.tokens(tokens);
    }

    /// A complete ALIGNED block.
    pub fn aligned_block(&mut self, tokens: &[Token]) {
        self.start_block(BlockType::Aligned, tokens);
        self.tokens(tokens);
    }

    /// Header of an UNCOMPRESSED block; data follows via [`raw`](Self::raw).
    pub fn start_uncompressed(&mut self, length: usize, offsets: [u32; 3]) {
        self.block_header(BlockType::Uncompressed, length);
        if self.bits.partial_bits() == 0 {
            self.bits.write(0, 16);
        } else {
            self.bits.align();
        }
        for r in offsets {
            self.bits.write_raw(&r.to_le_bytes());
        }
        self.pending_pad = length & 1 != 0;
        self.block = None;
    }

    /// Raw bytes of an UNCOMPRESSED block.
    ///
    /// The pad byte of an odd-length block is emitted lazily, in front of
    /// whatever is written next.
    pub fn raw(&mut self, data: &[u8]) {
        let pad = self.pending_pad;
        self.pending_pad = false;
        self.bits.write_raw(data);
        self.pending_pad = pad;
    }

    /// A complete UNCOMPRESSED block.
    pub fn uncompressed_block(&mut self, data: &[u8], offsets: [u32; 3]) {
        self.start_uncompressed(data.len(), offsets);
        self.raw(data);
    }

    /// Finish the current frame.
    pub fn finish_frame(&mut self) -> Vec<u8> {
        self.bits.take()
    }

    /// Emit pretree-coded lengths for `new[first..last]`.
    fn write_lengths(&mut self, prev: &[u8], new: &[u8], first: usize, last: usize) {
        let pre_lengths = pretree_lengths();
        let pre_codes = canonical_codes(&pre_lengths);
        for &l in &pre_lengths {
            self.bits.write(l as u32, 4);
        }
        let emit = |bits: &mut BitWriter, sym: usize| bits.write(pre_codes[sym], pre_lengths[sym] as u32);
        let delta = |x: usize| (prev[x] as usize + 17 - new[x] as usize) % 17;

        let mut x = first;
        while x < last {
            let run = new[x..last].iter().take_while(|&&l| l == new[x]).count();
            if new[x] == 0 && run >= 20 {
                let n = run.min(51);
                emit(&mut self.bits, 18);
                self.bits.write((n - 20) as u32, 5);
                x += n;
            } else if new[x] == 0 && run >= 4 {
                let n = run.min(19);
                emit(&mut self.bits, 17);
                self.bits.write((n - 4) as u32, 4);
                x += n;
            } else if run >= 4 {
                let n = run.min(5);
                emit(&mut self.bits, 19);
                self.bits.write((n - 4) as u32, 1);
                emit(&mut self.bits, delta(x));
                x += n;
            } else {
                emit(&mut self.bits, delta(x));
                x += 1;
            }
        }
    }
}

/// Build a single-frame stream from blocks of tokens.
pub fn single_frame(window_bits: u8, blocks: &[(BlockType, Vec<Token>)]) -> Vec<u8> {
    let mut writer = LzxWriter::new(window_bits);
    for (kind, tokens) in blocks {
        match kind {
            BlockType::Verbatim => writer.verbatim_block(tokens),
            BlockType::Aligned => writer.aligned_block(tokens),
            BlockType::Uncompressed => unreachable!("use uncompressed_block"),
        }
    }
    writer.finish_frame()
}

/// Expand tokens against preceding output, tracking repeat offsets the
/// way the decoder does.
pub fn expand(history: &mut Vec<u8>, offsets: &mut [u32; 3], tokens: &[Token]) {
    for token in tokens {
        match *token {
            Token::Literal(b) => history.push(b),
            Token::Match { length, offset } => {
                let distance: u32 = match offset {
                    Offset::R0 => offsets[0],
                    Offset::R1 => {
                        offsets.swap(0, 1);
                        offsets[0]
                    }
                    Offset::R2 => {
                        offsets.swap(0, 2);
                        offsets[0]
                    }
                    Offset::Absolute(d) => {
                        offsets[2] = offsets[1];
                        offsets[1] = offsets[0];
                        offsets[0] = d;
                        d
                    }
                };
                for _ in 0..length {
                    let b = history[history.len() - distance as usize];
                    history.push(b);
                }
            }
        }
    }
}
