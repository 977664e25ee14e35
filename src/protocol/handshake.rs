//! The authentication exchange, played from either end of the wire.
//!
//! `authenticate` drives the client role against a live server and says
//! whether one password worked. `capture` drives the server role against
//! a connecting client and elicits a challenge/response pair without
//! ever letting the client in.

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::crypto::vnc_des::ChallengeCipher;
use crate::protocol::error::HandshakeError;
use crate::protocol::rfb::{
    AuthOutcome, CaptureOutcome, Challenge, ProtocolVersion, AUTH_FAILED_REASON,
    SECURITY_RESULT_OK, SECURITY_TYPE_INVALID, SECURITY_TYPE_NONE, SECURITY_TYPE_VNC_AUTH,
    ZERO_CHALLENGE,
};
use crate::protocol::rfb_helper::{
    read_byte, read_bytes, read_reason, read_word, write_bytes, write_failure_result, write_word,
    write_version_refusal,
};

/// Runs one full client-side authentication attempt with the given cipher.
///
/// Speaks protocol 3.8 only. Returns an [`AuthOutcome`] when the exchange
/// reached a password verdict and an error when it broke down before one.
pub async fn authenticate<S>(
    stream: &mut S,
    cipher: &ChallengeCipher,
) -> Result<AuthOutcome, HandshakeError>
where
    S: AsyncReadExt + AsyncWriteExt + Unpin,
{
    let mut version = [0u8; 12];
    read_bytes(stream, &mut version, "version read").await?;
    if &version != ProtocolVersion::V3_8.wire_bytes() {
        return Err(HandshakeError::VersionMismatch(
            String::from_utf8_lossy(&version)
                .trim_end_matches('\n')
                .to_string(),
        ));
    }
    write_bytes(stream, ProtocolVersion::V3_8.wire_bytes(), "version send").await?;

    let count = read_byte(stream, "security type count read").await?;
    if count == 0 {
        let reason = read_reason(stream, "security failure reason read").await?;
        return Err(HandshakeError::NoSecurityTypes { reason });
    }
    let mut offered = vec![0u8; count as usize];
    read_bytes(stream, &mut offered, "security types read").await?;

    if offered.contains(&SECURITY_TYPE_INVALID) {
        return Err(HandshakeError::InvalidSecurityType);
    }
    if !offered.contains(&SECURITY_TYPE_VNC_AUTH) {
        // Wide-open server. No point sending a password at all.
        if offered.contains(&SECURITY_TYPE_NONE) {
            return Ok(AuthOutcome::NoAuthNeeded);
        }
        return Err(HandshakeError::UnsupportedAuthTypes { offered });
    }
    write_bytes(stream, &[SECURITY_TYPE_VNC_AUTH], "auth type send").await?;

    let mut challenge: Challenge = [0u8; 16];
    read_bytes(stream, &mut challenge, "challenge read").await?;
    let response = cipher.encrypt(&challenge);
    write_bytes(stream, &response, "challenge response send").await?;

    let result = read_word(stream, "auth result read").await?;
    if result == SECURITY_RESULT_OK {
        return Ok(AuthOutcome::Accepted);
    }
    let reason = read_reason(stream, "auth fail reason read").await?;
    Ok(AuthOutcome::BadPassword { reason })
}

/// Runs one full server-side exchange and reports what the client sent.
///
/// The zero challenge goes out regardless of the client, so every captured
/// response is directly comparable across sessions. The client is always
/// turned away with a generic failure once its response is in hand.
pub async fn capture<S>(
    stream: &mut S,
    version: ProtocolVersion,
) -> Result<CaptureOutcome, HandshakeError>
where
    S: AsyncReadExt + AsyncWriteExt + Unpin,
{
    write_bytes(stream, version.wire_bytes(), "version send").await?;

    let mut client_version = [0u8; 12];
    read_bytes(stream, &mut client_version, "version read").await?;
    if &client_version != version.wire_bytes() {
        // Session is over either way, so the refusal is best-effort.
        let _ = write_version_refusal(stream, version).await;
        return Ok(CaptureOutcome::BadVersion {
            version: String::from_utf8_lossy(&client_version)
                .trim_end_matches('\n')
                .to_string(),
        });
    }

    match version {
        ProtocolVersion::V3_8 => {
            write_bytes(stream, &[1, SECURITY_TYPE_VNC_AUTH], "security types send").await?;
            let requested = read_byte(stream, "security choice read").await?;
            if requested != SECURITY_TYPE_VNC_AUTH {
                return Ok(CaptureOutcome::WrongSecurityType { requested });
            }
        }
        // 3.3 has no negotiation, the server just picks.
        ProtocolVersion::V3_3 => {
            write_word(stream, SECURITY_TYPE_VNC_AUTH as u32, "security type send").await?;
        }
    }

    write_bytes(stream, &ZERO_CHALLENGE, "challenge send").await?;

    let mut response = [0u8; 16];
    let mut total = 0;
    while total < response.len() {
        let n = stream
            .read(&mut response[total..])
            .await
            .map_err(|e| HandshakeError::io("auth response read", e))?;
        if n == 0 {
            if total == 0 {
                return Err(HandshakeError::io(
                    "auth response read",
                    std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "closed before auth response",
                    ),
                ));
            }
            return Ok(CaptureOutcome::Incomplete {
                partial: response[..total].to_vec(),
            });
        }
        total += n;
    }

    // The pair is already captured, so a client that hangs up without
    // reading its rejection costs us nothing.
    let _ = write_failure_result(stream, AUTH_FAILED_REASON, "auth result send").await;
    Ok(CaptureOutcome::Captured {
        challenge: ZERO_CHALLENGE,
        response,
    })
}
