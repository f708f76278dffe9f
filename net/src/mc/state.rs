use super::{
    error::Result,
    frame::{frame_handshake, Framed},
    packets::HandshakeC2s,
};

/// Protocol state used to select packet IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketState {
    Handshaking,
    Status,
}

/// Next state value in the handshake packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeNextState {
    Status,
    Login,
    /// Any value this server has no transition for.
    Unknown(u8),
}

impl From<u8> for HandshakeNextState {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Status,
            2 => Self::Login,
            other => Self::Unknown(other),
        }
    }
}

impl HandshakeNextState {
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Status => 1,
            Self::Login => 2,
            Self::Unknown(other) => other,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Login => "login",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Per-connection position in the handshake exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    AwaitingHandshake,
    StatusRequested,
    LoginRequested,
}

impl ConnectionState {
    /// Applies a decoded handshake. `None` means there is no transition and
    /// the caller keeps its current state.
    pub fn advance(self, handshake: &HandshakeC2s<'_>) -> Option<Self> {
        if self != Self::AwaitingHandshake {
            return None;
        }
        match handshake.next_state {
            HandshakeNextState::Status => Some(Self::StatusRequested),
            HandshakeNextState::Login => Some(Self::LoginRequested),
            HandshakeNextState::Unknown(_) => None,
        }
    }
}

/// Frames a single-read handshake and resolves the state it leads to.
///
/// Legacy probes and handshakes with an unhandled next state yield `Ok(None)`.
pub fn interpret(buf: &[u8], bytes_read: usize) -> Result<Option<(HandshakeC2s<'_>, ConnectionState)>> {
    let handshake = match frame_handshake(buf, bytes_read)? {
        Framed::Legacy => return Ok(None),
        Framed::Handshake(handshake) => handshake,
    };

    Ok(ConnectionState::AwaitingHandshake
        .advance(&handshake)
        .map(|state| (handshake, state)))
}
