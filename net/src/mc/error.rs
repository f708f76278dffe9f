use super::state::PacketState;

/// Protocol decode/encode error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtoError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("varint is longer than 5 bytes")]
    VarIntTooLarge,
    #[error("packet of {len} bytes exceeds the protocol limit")]
    PacketTooLarge { len: usize },
    #[error("negative length {0}")]
    NegativeLength(i32),
    #[error("string is not valid utf-8")]
    InvalidUtf8,
    #[error("string has {actual} chars, max {max}")]
    StringTooLong { max: usize, actual: usize },
    #[error("length {actual} exceeds max {max}")]
    LengthTooLarge { max: usize, actual: usize },
    #[error("{0} trailing bytes after packet body")]
    TrailingBytes(usize),
    #[error("packet id {id:#04x} is not valid in state {state:?}")]
    InvalidPacketId { state: PacketState, id: i32 },
    #[error("payload must be {expected} bytes, got {actual}")]
    InvalidPayloadLength { expected: usize, actual: usize },
    #[error("json: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, ProtoError>;

pub(crate) fn debug_log_error(context: &str, error: &ProtoError) {
    #[cfg(debug_assertions)]
    {
        log::error!("{}: {:?}", context, error);
    }
    let _ = context;
    let _ = error;
}
