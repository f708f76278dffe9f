//! Minimal Minecraft protocol types for handshake, status, and ping.
pub mod mc;

pub use mc::{
    encode_packet, frame_handshake, interpret, is_legacy_ping, ConnectionState, Framed, HandshakeC2s,
    HandshakeNextState, LoginDisconnectS2c, PacketDecode, PacketDecoder, PacketEncode,
    PacketEncoder, PacketFrame, PacketState, PingResponder, ProtoError, ServerboundPacket,
    StatusDescription, StatusPayload, StatusPingC2s, StatusPlayerSample, StatusPlayers,
    StatusPongS2c, StatusRequestC2s, StatusResponder, StatusResponseS2c, StatusVersion,
    MAX_PACKET_SIZE,
};
