use std::io;

use thiserror::Error;

/// The server sent something the status protocol does not allow.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("VarInt too big")]
    VarIntTooBig,

    #[error("Server prematurely ended stream.")]
    PrematureEnd,

    #[error("Server returned invalid packet.")]
    InvalidPacket { expected: i32, found: i32 },

    #[error("Server returned unexpected value.")]
    UnexpectedValue,

    #[error("Server declared invalid length {0}.")]
    InvalidLength(i32),
}

/// Errors that can occur when pinging a server.
#[derive(Error, Debug)]
pub enum PingError {
    /// The options were unusable; nothing was sent.
    #[error("{0}")]
    Validation(&'static str),

    /// Resolving or connecting to the server failed or timed out.
    #[error("could not connect to {address}: {source}")]
    Connection {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("status JSON could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error during ping: {0}")]
    Io(#[from] io::Error),
}

impl PingError {
    /// Turns an end-of-stream I/O error into [`ProtocolError::PrematureEnd`].
    pub(crate) fn eof_as_premature(self) -> Self {
        match self {
            PingError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                ProtocolError::PrematureEnd.into()
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, PingError>;
