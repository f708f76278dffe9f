use net::ProtoError;

use crate::threat::ClientFail;

/// What ended a connection, as it shows up in the log.
#[derive(thiserror::Error, Debug)]
pub enum ReportableError {
    #[error("Request timeout (re::rt)")]
    Timeout(#[from] tokio::time::error::Elapsed),
    #[error("Networking error - {0:?} (re:ne)")]
    IoError(#[from] tokio::io::Error),
    #[error("Bad request (re::br) - {0}")]
    ClientError(#[from] ClientFail),
    #[error("Malformed packet (re::mp) - {0}")]
    Protocol(#[from] ProtoError),
    #[error("Unknown error (re::??)")]
    Anyhow(anyhow::Error),
}

impl From<anyhow::Error> for ReportableError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ClientFail>() {
            Ok(fail) => return Self::ClientError(fail),
            Err(err) => err,
        };
        let err = match err.downcast::<tokio::time::error::Elapsed>() {
            Ok(elapsed) => return Self::Timeout(elapsed),
            Err(err) => err,
        };
        let err = match err.downcast::<ProtoError>() {
            Ok(proto) => return Self::Protocol(proto),
            Err(err) => err,
        };
        match err.downcast::<std::io::Error>() {
            Ok(io) => Self::IoError(io),
            Err(err) => Self::Anyhow(err),
        }
    }
}

impl ReportableError {
    /// Peer went away; not worth an error line.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::IoError(err) => matches!(
                err.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }

    /// Client went quiet past its deadline.
    pub fn is_stalled(&self) -> bool {
        matches!(self, Self::ClientError(ClientFail::Stalled(_)) | Self::Timeout(_))
    }
}
