use super::{
    error::Result,
    packets::{StatusPingC2s, StatusPongS2c},
    types::{encode_packet, PacketFrame},
};

/// Echoes the client's ping token back inside a pong.
#[derive(Debug, Clone, Copy, Default)]
pub struct PingResponder;

impl PingResponder {
    /// `Ok(None)` when `frame` is not a ping.
    pub fn respond(frame: &PacketFrame) -> Result<Option<Vec<u8>>> {
        if frame.id != StatusPingC2s::ID {
            return Ok(None);
        }

        let ping = StatusPingC2s::decode_body(&mut frame.body.as_slice())?;
        let mut out = Vec::with_capacity(ping.payload.len() + 2);
        encode_packet(
            &mut out,
            &StatusPongS2c {
                payload: ping.payload,
            },
        )?;
        Ok(Some(out))
    }

    /// Same as [`PingResponder::respond`] over one raw packet.
    pub fn respond_raw(raw: &[u8]) -> Result<Option<Vec<u8>>> {
        Self::respond(&PacketFrame::from_raw(raw)?)
    }
}
