//! Variable-length integers: 7 data bits per byte, high bit continues.

use super::error::{ProtoError, Result};

/// Longest valid encoding of a 32-bit value.
pub const MAX_VARINT_LEN: usize = 5;

/// Lenient decode used where a partial value is acceptable.
///
/// Stops after [`MAX_VARINT_LEN`] bytes even when the continuation bit is
/// still set, or at the end of `input`. Returns the accumulated value and the
/// number of bytes consumed.
pub fn decode(input: &[u8]) -> (i32, usize) {
    let mut value: u32 = 0;
    let mut shift = 0;
    let mut consumed = 0;
    for &byte in input.iter().take(MAX_VARINT_LEN) {
        value |= ((byte & 0x7f) as u32) << shift;
        shift += 7;
        consumed += 1;
        if (byte & 0x80) == 0 {
            break;
        }
    }
    (value as i32, consumed)
}

/// Encodes `value`, treating it as unsigned so negatives take 5 bytes.
pub fn encode(value: i32) -> Vec<u8> {
    let mut out = Vec::with_capacity(varint_len(value));
    write_varint(&mut out, value);
    out
}

#[inline]
pub(crate) fn read_varint(input: &mut &[u8]) -> Result<i32> {
    let Some((value, len)) = read_varint_partial(input)? else {
        return Err(ProtoError::UnexpectedEof);
    };
    *input = &input[len..];
    Ok(value)
}

/// Strict streaming decode: `Ok(None)` means more bytes are needed.
#[inline]
pub fn read_varint_partial(input: &[u8]) -> Result<Option<(i32, usize)>> {
    let mut value: u32 = 0;
    for i in 0..MAX_VARINT_LEN {
        let Some(&byte) = input.get(i) else {
            return Ok(None);
        };

        value |= ((byte & 0x7f) as u32) << (i * 7);
        if (byte & 0x80) == 0 {
            return Ok(Some((value as i32, i + 1)));
        }
    }

    Err(ProtoError::VarIntTooLarge)
}

#[inline]
pub fn write_varint(out: &mut Vec<u8>, value: i32) {
    let mut val = value as u32;
    loop {
        if (val & 0xffffff80) == 0 {
            out.push(val as u8);
            return;
        }
        out.push((val as u8 & 0x7f) | 0x80);
        val >>= 7;
    }
}

#[inline]
pub fn varint_len(value: i32) -> usize {
    let mut val = value as u32;
    let mut count = 1;
    while (val & 0xffffff80) != 0 {
        count += 1;
        val >>= 7;
    }
    count
}
