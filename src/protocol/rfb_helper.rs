//! Frame-level helpers shared by both handshake roles.
//!
//! Every read and write is labelled with the handshake step it belongs
//! to so a failed exchange reports where it died, not just that it did.

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::protocol::error::HandshakeError;
use crate::protocol::rfb::{ProtocolVersion, SECURITY_RESULT_FAILED, VERSION_REFUSED_REASON};

/// Longest reason string we will read before calling the peer hostile.
pub const MAX_REASON_LEN: usize = 4096;

pub async fn read_bytes<S: AsyncReadExt + Unpin>(
    stream: &mut S,
    buf: &mut [u8],
    step: &'static str,
) -> Result<(), HandshakeError> {
    stream
        .read_exact(buf)
        .await
        .map_err(|e| HandshakeError::io(step, e))?;
    Ok(())
}

pub async fn write_bytes<S: AsyncWriteExt + Unpin>(
    stream: &mut S,
    bytes: &[u8],
    step: &'static str,
) -> Result<(), HandshakeError> {
    stream
        .write_all(bytes)
        .await
        .map_err(|e| HandshakeError::io(step, e))
}

pub async fn read_byte<S: AsyncReadExt + Unpin>(
    stream: &mut S,
    step: &'static str,
) -> Result<u8, HandshakeError> {
    stream.read_u8().await.map_err(|e| HandshakeError::io(step, e))
}

pub async fn read_word<S: AsyncReadExt + Unpin>(
    stream: &mut S,
    step: &'static str,
) -> Result<u32, HandshakeError> {
    stream.read_u32().await.map_err(|e| HandshakeError::io(step, e))
}

pub async fn write_word<S: AsyncWriteExt + Unpin>(
    stream: &mut S,
    word: u32,
    step: &'static str,
) -> Result<(), HandshakeError> {
    stream.write_u32(word).await.map_err(|e| HandshakeError::io(step, e))
}

/// Reads a length-prefixed reason string and strips trailing NULs.
pub async fn read_reason<S: AsyncReadExt + Unpin>(
    stream: &mut S,
    step: &'static str,
) -> Result<String, HandshakeError> {
    let len = read_word(stream, step).await? as usize;
    if len > MAX_REASON_LEN {
        return Err(HandshakeError::OversizedFrame {
            limit: MAX_REASON_LEN,
            got: len,
        });
    }
    let mut raw = vec![0u8; len];
    read_bytes(stream, &mut raw, step).await?;
    Ok(String::from_utf8_lossy(&raw)
        .trim_end_matches('\0')
        .to_string())
}

pub async fn write_reason<S: AsyncWriteExt + Unpin>(
    stream: &mut S,
    reason: &str,
    step: &'static str,
) -> Result<(), HandshakeError> {
    write_word(stream, reason.len() as u32, step).await?;
    write_bytes(stream, reason.as_bytes(), step).await
}

/// Sends the failure result word followed by its reason string.
pub async fn write_failure_result<S: AsyncWriteExt + Unpin>(
    stream: &mut S,
    reason: &str,
    step: &'static str,
) -> Result<(), HandshakeError> {
    write_word(stream, SECURITY_RESULT_FAILED, step).await?;
    write_reason(stream, reason, step).await
}

/// Refuses a client whose version line we do not speak.
///
/// 3.8 clients get an empty security type list, 3.3 clients a zero type
/// word, and both then get the reason string.
pub async fn write_version_refusal<S: AsyncWriteExt + Unpin>(
    stream: &mut S,
    version: ProtocolVersion,
) -> Result<(), HandshakeError> {
    let step = "version refusal send";
    match version {
        ProtocolVersion::V3_8 => {
            stream.write_u8(0).await.map_err(|e| HandshakeError::io(step, e))?;
        }
        ProtocolVersion::V3_3 => {
            write_word(stream, 0, step).await?;
        }
    }
    write_reason(stream, VERSION_REFUSED_REASON, step).await
}

#[cfg(test)]
mod tests {
    use crate::protocol::error::HandshakeError;
    use crate::protocol::rfb_helper::{read_reason, write_reason, MAX_REASON_LEN};
    use tokio::io::AsyncWriteExt;

    #[actix_rt::test]
    async fn reasons_round_trip_and_lose_their_nul_padding() {
        let (mut client, mut server) = tokio::io::duplex(256);

        write_reason(&mut server, "Too many failures\0\0", "test send")
            .await
            .unwrap();
        let reason = read_reason(&mut client, "test read").await.unwrap();

        assert_eq!(reason, "Too many failures");
    }

    #[actix_rt::test]
    async fn absurd_reason_lengths_are_refused() {
        let (mut client, mut server) = tokio::io::duplex(64);

        server.write_u32(u32::MAX).await.unwrap();
        let err = read_reason(&mut client, "test read").await.unwrap_err();

        match err {
            HandshakeError::OversizedFrame { limit, got } => {
                assert_eq!(limit, MAX_REASON_LEN);
                assert_eq!(got, u32::MAX as usize);
            }
            other => panic!("expected OversizedFrame, got {other:?}"),
        }
    }
}
