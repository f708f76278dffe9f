use super::{
    error::{debug_log_error, ProtoError, Result},
    io::{
        read_bytes_bounded, read_exact_tail, read_string_bounded, read_u16_be, read_u8,
        write_bytes_bounded, write_string_bounded, write_u16_be,
    },
    state::{HandshakeNextState, PacketState},
    types::{PacketDecode, PacketEncode, PacketFrame},
    varint::{read_varint, varint_len, write_varint},
};

/// Hostnames longer than this are rejected.
pub const MAX_HOSTNAME_LEN: usize = 255;

/// Ping and pong carry an opaque 8-byte token.
pub const PING_PAYLOAD_LEN: usize = 8;

const MAX_JSON_CHARS: usize = 32_767;

/// Handshake (C2S) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeC2s<'a> {
    /// Length prefix as sent, counting every byte after itself.
    pub declared_length: i32,
    pub request_type: u8,
    pub protocol_version: i32,
    /// Raw bytes; Forge and proxies append NUL-separated markers.
    pub hostname: &'a [u8],
    pub port: u16,
    pub next_state: HandshakeNextState,
}

/// Status request (C2S) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRequestC2s;

/// Status ping (C2S) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPingC2s {
    pub payload: [u8; PING_PAYLOAD_LEN],
}

/// Status response (S2C) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusResponseS2c<'a> {
    pub json: &'a str,
}

/// Status pong (S2C) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPongS2c {
    pub payload: [u8; PING_PAYLOAD_LEN],
}

/// Login disconnect (S2C) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginDisconnectS2c<'a> {
    pub reason: &'a str,
}

/// Any serverbound packet supported by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerboundPacket<'a> {
    Handshake(HandshakeC2s<'a>),
    StatusRequest(StatusRequestC2s),
    StatusPing(StatusPingC2s),
}

impl PacketFrame {
    pub fn decode_serverbound(&self, state: PacketState) -> Result<ServerboundPacket<'_>> {
        ServerboundPacket::decode(state, self)
    }
}

impl<'a> ServerboundPacket<'a> {
    pub fn decode(state: PacketState, frame: &'a PacketFrame) -> Result<Self> {
        let mut input = frame.body.as_slice();
        let packet = match (state, frame.id) {
            (PacketState::Handshaking, id) if id == HandshakeC2s::ID => {
                let declared_length = (varint_len(frame.id) + frame.body.len()) as i32;
                HandshakeC2s::decode_fields(declared_length, frame.id as u8, &mut input)
                    .map(ServerboundPacket::Handshake)
            }
            (PacketState::Status, StatusRequestC2s::ID) => {
                StatusRequestC2s::decode_body(&mut input).map(ServerboundPacket::StatusRequest)
            }
            (PacketState::Status, StatusPingC2s::ID) => {
                StatusPingC2s::decode_body(&mut input).map(ServerboundPacket::StatusPing)
            }
            _ => Err(ProtoError::InvalidPacketId {
                state,
                id: frame.id,
            }),
        };

        let packet = match packet {
            Ok(value) => value,
            Err(err) => {
                debug_log_error("packet body decode failed", &err);
                return Err(err);
            }
        };

        if !input.is_empty() {
            let err = ProtoError::TrailingBytes(input.len());
            debug_log_error("packet had trailing bytes", &err);
            return Err(err);
        }

        Ok(packet)
    }
}

impl<'a> HandshakeC2s<'a> {
    pub const ID: i32 = 0x00;

    /// Reads the fields that follow the request type byte.
    ///
    /// The hostname length is a VarInt like every protocol string, so a
    /// hostname of 128 bytes or more carries a 2-byte length prefix. A
    /// single raw length byte above 127 reads as an unfinished VarInt.
    pub(crate) fn decode_fields(
        declared_length: i32,
        request_type: u8,
        input: &mut &'a [u8],
    ) -> Result<Self> {
        let protocol_version = read_varint(input)?;
        let hostname = read_bytes_bounded(input, MAX_HOSTNAME_LEN)?;
        let port = read_u16_be(input)?;
        let next_state = HandshakeNextState::from(read_u8(input)?);

        Ok(Self {
            declared_length,
            request_type,
            protocol_version,
            hostname,
            port,
            next_state,
        })
    }

    /// Hostname up to the first NUL, lossily decoded.
    pub fn stripped_hostname(&self) -> String {
        let end = self
            .hostname
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.hostname.len());
        String::from_utf8_lossy(&self.hostname[..end]).into_owned()
    }
}

impl<'a> PacketEncode for HandshakeC2s<'a> {
    const ID: i32 = HandshakeC2s::ID;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_varint(out, self.protocol_version);
        write_bytes_bounded(out, self.hostname, MAX_HOSTNAME_LEN)?;
        write_u16_be(out, self.port);
        out.push(self.next_state.as_byte());
        Ok(())
    }
}

impl StatusRequestC2s {
    pub const ID: i32 = 0x00;

    pub fn decode_body(_input: &mut &[u8]) -> Result<Self> {
        Ok(Self)
    }
}

impl<'a> PacketDecode<'a> for StatusRequestC2s {
    const ID: i32 = StatusRequestC2s::ID;

    fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        StatusRequestC2s::decode_body(input)
    }
}

impl PacketEncode for StatusRequestC2s {
    const ID: i32 = StatusRequestC2s::ID;

    fn encode_body(&self, _out: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }
}

impl StatusPingC2s {
    pub const ID: i32 = 0x01;

    pub fn decode_body(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            payload: read_exact_tail::<PING_PAYLOAD_LEN>(input)?,
        })
    }
}

impl<'a> PacketDecode<'a> for StatusPingC2s {
    const ID: i32 = StatusPingC2s::ID;

    fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        StatusPingC2s::decode_body(input)
    }
}

impl PacketEncode for StatusPingC2s {
    const ID: i32 = StatusPingC2s::ID;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.payload);
        Ok(())
    }
}

impl<'a> StatusResponseS2c<'a> {
    pub const ID: i32 = 0x00;

    pub fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        Ok(Self {
            json: read_string_bounded(input, MAX_JSON_CHARS)?,
        })
    }
}

impl<'a> PacketDecode<'a> for StatusResponseS2c<'a> {
    const ID: i32 = StatusResponseS2c::ID;

    fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        StatusResponseS2c::decode_body(input)
    }
}

impl<'a> PacketEncode for StatusResponseS2c<'a> {
    const ID: i32 = StatusResponseS2c::ID;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_string_bounded(out, self.json, MAX_JSON_CHARS)
    }
}

impl StatusPongS2c {
    pub const ID: i32 = 0x01;

    pub fn decode_body(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            payload: read_exact_tail::<PING_PAYLOAD_LEN>(input)?,
        })
    }
}

impl<'a> PacketDecode<'a> for StatusPongS2c {
    const ID: i32 = StatusPongS2c::ID;

    fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        StatusPongS2c::decode_body(input)
    }
}

impl PacketEncode for StatusPongS2c {
    const ID: i32 = StatusPongS2c::ID;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.payload);
        Ok(())
    }
}

impl<'a> LoginDisconnectS2c<'a> {
    pub const ID: i32 = 0x00;

    pub fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        Ok(Self {
            reason: read_string_bounded(input, MAX_JSON_CHARS)?,
        })
    }
}

impl<'a> PacketDecode<'a> for LoginDisconnectS2c<'a> {
    const ID: i32 = LoginDisconnectS2c::ID;

    fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        LoginDisconnectS2c::decode_body(input)
    }
}

impl<'a> PacketEncode for LoginDisconnectS2c<'a> {
    const ID: i32 = LoginDisconnectS2c::ID;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_string_bounded(out, self.reason, MAX_JSON_CHARS)
    }
}
