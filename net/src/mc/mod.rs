//! Handshake, status and ping framing for the Java edition protocol.

mod error;
mod frame;
mod io;
mod packets;
mod ping;
mod state;
mod status;
mod types;
pub mod varint;


pub use error::{ProtoError, Result};
pub use frame::{frame_handshake, is_legacy_ping, Framed};
pub use packets::{
    HandshakeC2s, LoginDisconnectS2c, ServerboundPacket, StatusPingC2s, StatusPongS2c,
    StatusRequestC2s, StatusResponseS2c, PING_PAYLOAD_LEN,
};
pub use ping::PingResponder;
pub use state::{interpret, ConnectionState, HandshakeNextState, PacketState};
pub use status::{
    StatusDescription, StatusPayload, StatusPlayerSample, StatusPlayers, StatusResponder,
    StatusVersion,
};
pub use types::{
    encode_packet, encode_raw_packet, PacketDecode, PacketDecoder, PacketEncode, PacketEncoder,
    PacketFrame, MAX_PACKET_SIZE,
};
