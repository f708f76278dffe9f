//! Single-read handshake framing.
//!
//! The caller hands over one read's worth of bytes. Input whose length prefix
//! does not cover exactly the bytes received is a legacy (pre-Netty) probe or
//! garbage and is reported as [`Framed::Legacy`] rather than as an error.

use super::{
    error::{ProtoError, Result},
    io::read_u8,
    packets::HandshakeC2s,
    varint::read_varint_partial,
};

/// First byte of the pre-Netty server list ping.
pub const LEGACY_PING_ID: u8 = 0xfe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framed<'a> {
    /// Not a modern length-prefixed packet; drop without a response.
    Legacy,
    Handshake(HandshakeC2s<'a>),
}

#[inline]
pub fn is_legacy_ping(first_byte: u8) -> bool {
    first_byte == LEGACY_PING_ID
}

/// Validates the outer length of `buf[..bytes_read]` and extracts the
/// handshake fields. Truncated or oversized fields are errors and the
/// connection should be closed.
pub fn frame_handshake(buf: &[u8], bytes_read: usize) -> Result<Framed<'_>> {
    let Some(received) = buf.get(..bytes_read) else {
        return Err(ProtoError::UnexpectedEof);
    };

    let (declared_length, prefix_len) = match read_varint_partial(received) {
        Ok(Some(value)) => value,
        Ok(None) | Err(_) => return Ok(Framed::Legacy),
    };
    if declared_length < 0 || declared_length as usize != received.len() - prefix_len {
        return Ok(Framed::Legacy);
    }

    let mut input = &received[prefix_len..];
    let request_type = read_u8(&mut input)?;
    let handshake = HandshakeC2s::decode_fields(declared_length, request_type, &mut input)?;
    if !input.is_empty() {
        return Err(ProtoError::TrailingBytes(input.len()));
    }

    Ok(Framed::Handshake(handshake))
}
