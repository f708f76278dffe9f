use super::{
    error::{ProtoError, Result},
    varint::{read_varint, write_varint},
};

#[inline]
pub(crate) fn take<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
    if input.len() < len {
        return Err(ProtoError::UnexpectedEof);
    }

    let (head, tail) = input.split_at(len);
    *input = tail;
    Ok(head)
}

#[inline]
pub(crate) fn read_u8(input: &mut &[u8]) -> Result<u8> {
    Ok(take(input, 1)?[0])
}

#[inline]
pub(crate) fn read_u16_be(input: &mut &[u8]) -> Result<u16> {
    let bytes = take(input, 2)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

#[inline]
pub(crate) fn write_u16_be(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Reads exactly `N` bytes and requires the input to end there.
pub(crate) fn read_exact_tail<const N: usize>(input: &mut &[u8]) -> Result<[u8; N]> {
    if input.len() != N {
        return Err(ProtoError::InvalidPayloadLength {
            expected: N,
            actual: input.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(take(input, N)?);
    Ok(out)
}

/// Varint length prefix followed by at most `max` raw bytes.
pub(crate) fn read_bytes_bounded<'a>(input: &mut &'a [u8], max: usize) -> Result<&'a [u8]> {
    let len = read_varint(input)?;
    if len < 0 {
        return Err(ProtoError::NegativeLength(len));
    }

    let len = len as usize;
    if len > max {
        return Err(ProtoError::LengthTooLarge { max, actual: len });
    }

    take(input, len)
}

pub(crate) fn write_bytes_bounded(out: &mut Vec<u8>, value: &[u8], max: usize) -> Result<()> {
    if value.len() > max {
        return Err(ProtoError::LengthTooLarge {
            max,
            actual: value.len(),
        });
    }

    write_varint(out, value.len() as i32);
    out.extend_from_slice(value);
    Ok(())
}

pub(crate) fn read_string_bounded<'a>(input: &mut &'a [u8], max_chars: usize) -> Result<&'a str> {
    let bytes = read_bytes_bounded(input, max_chars.saturating_mul(4))?;
    let s = std::str::from_utf8(bytes).map_err(|_| ProtoError::InvalidUtf8)?;

    let char_count = s.encode_utf16().count();
    if char_count > max_chars {
        return Err(ProtoError::StringTooLong {
            max: max_chars,
            actual: char_count,
        });
    }

    Ok(s)
}

pub(crate) fn write_string_bounded(out: &mut Vec<u8>, value: &str, max_chars: usize) -> Result<()> {
    let char_count = value.encode_utf16().count();
    if char_count > max_chars {
        return Err(ProtoError::StringTooLong {
            max: max_chars,
            actual: char_count,
        });
    }

    let len = value.len();
    if len > i32::MAX as usize {
        return Err(ProtoError::LengthTooLarge {
            max: i32::MAX as usize,
            actual: len,
        });
    }

    write_varint(out, len as i32);
    out.extend_from_slice(value.as_bytes());
    Ok(())
}
