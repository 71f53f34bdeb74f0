//! Intel E8 call translation.
//!
//! Before compression, x86 `CALL rel32` instructions (opcode `0xE8`) have
//! their relative operands rewritten as absolute addresses, which repeat
//! far more often in a typical executable. This module undoes that
//! rewrite on decompressed output.

/// Operand bytes following each `0xE8`.
const OPERAND_SIZE: usize = 4;

/// Bytes at the end of a frame that are never scanned for `0xE8`.
const TAIL_GUARD: usize = 10;

/// Frames this short are never translated.
const MIN_FRAME: usize = 6;

/// Convert absolute call targets in `frame` back to relative ones.
///
/// `curpos` is the stream offset of `frame[0]` and `filesize` the
/// translation size from the stream header. Only operands in
/// `-curpos..filesize` were rewritten by the compressor, so anything else
/// is left alone. Returns the stream offset of the next frame.
pub fn decode_e8(frame: &mut [u8], curpos: i32, filesize: i32) -> i32 {
    let next = curpos.wrapping_add(frame.len() as i32);
    if frame.len() <= MIN_FRAME {
        return next;
    }

    let end = frame.len().saturating_sub(TAIL_GUARD);
    let mut pos = curpos;
    let mut i = 0;

    while i < end {
        if frame[i] != 0xE8 {
            i += 1;
            pos = pos.wrapping_add(1);
            continue;
        }

        let operand = &mut frame[i + 1..i + 1 + OPERAND_SIZE];
        let abs = i32::from_le_bytes([operand[0], operand[1], operand[2], operand[3]]);
        if abs >= pos.wrapping_neg() && abs < filesize {
            let rel = if abs >= 0 {
                abs.wrapping_sub(pos)
            } else {
                abs.wrapping_add(filesize)
            };
            operand.copy_from_slice(&rel.to_le_bytes());
        }

        i += 1 + OPERAND_SIZE;
        pos = pos.wrapping_add(1 + OPERAND_SIZE as i32);
    }

    next
}
