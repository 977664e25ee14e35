//! Typed handshake failures

use thiserror::Error;

#[derive(Debug, Error)]
/// The ways an authentication exchange can go wrong before a password
/// verdict is reached.
pub enum HandshakeError {
    /// The peer announced a version line we do not speak.
    #[error("unsupported version {0:?}")]
    VersionMismatch(String),

    /// The server offered zero security types and explained itself.
    #[error("no security types offered: {reason:?}")]
    NoSecurityTypes { reason: String },

    /// The reserved type byte 0x00 appeared in the offered list.
    #[error("invalid security type 0x00 offered")]
    InvalidSecurityType,

    /// Neither VNC auth nor the None type was offered.
    #[error("VNC auth unsupported (offered types {offered:?})")]
    UnsupportedAuthTypes { offered: Vec<u8> },

    /// A declared frame length no sane server would send.
    #[error("peer declared a {got}-byte reason (limit {limit})")]
    OversizedFrame { limit: usize, got: usize },

    /// I/O failure, labelled with the handshake step that was running.
    #[error("{step}: {source}")]
    Io {
        step: &'static str,
        source: std::io::Error,
    },
}

impl HandshakeError {
    pub(crate) fn io(step: &'static str, source: std::io::Error) -> Self {
        HandshakeError::Io { step, source }
    }
}

#[cfg(test)]
mod tests {
    use crate::protocol::error::HandshakeError;

    #[test]
    fn io_errors_carry_their_step() {
        let err = HandshakeError::io(
            "challenge read",
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "early eof"),
        );

        assert_eq!(err.to_string(), "challenge read: early eof");
    }
}
