//! RFB protocol vocabulary: versions, security types, frame constants

use strum_macros::Display;
use strum_macros::EnumString;

/// A 16-byte challenge as sent by the server.
pub type Challenge = [u8; 16];
/// A 16-byte encrypted response as sent by the client.
pub type Response = [u8; 16];

/// Security type byte reserved as invalid by the protocol.
pub const SECURITY_TYPE_INVALID: u8 = 0x00;
/// Security type byte for connections without authentication.
pub const SECURITY_TYPE_NONE: u8 = 0x01;
/// Security type byte for challenge/response ("VNC") authentication.
pub const SECURITY_TYPE_VNC_AUTH: u8 = 0x02;

/// SecurityResult word for an accepted authentication.
pub const SECURITY_RESULT_OK: u32 = 0;
/// SecurityResult word for a refused authentication.
pub const SECURITY_RESULT_FAILED: u32 = 1;

/// The challenge the decoy hands out. All zero bytes, so a capture can be
/// replayed against the offline matcher's well-known test vector and both
/// encrypted halves depend on the key alone.
pub const ZERO_CHALLENGE: Challenge = [0u8; 16];

/// Reason sent by the decoy after swallowing a response.
pub const AUTH_FAILED_REASON: &str = "Invalid username or password.";

/// Reason sent by the decoy when the client speaks the wrong version.
/// Exactly 20 bytes, matching the advertised length.
pub const VERSION_REFUSED_REASON: &str = "Unsupported version.";

/// Rate-limiting servers prefix their refusal with this text. It arrives
/// either as a SecurityResult reason or, from servers that throttle before
/// negotiation, as the reason behind an empty security-type list.
pub const REJECTION_MESSAGE_PREFIX: &str = "Your connection has been rejected";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
/// The protocol versions the decoy can emulate. The attacker speaks 3.8
/// only; 3.3 exists for luring older scanners.
pub enum ProtocolVersion {
    #[strum(serialize = "3.8")]
    V3_8,
    #[strum(serialize = "3.3")]
    V3_3,
}

impl ProtocolVersion {
    /// The exact 12 bytes of the version line on the wire.
    pub fn wire_bytes(self) -> &'static [u8; 12] {
        match self {
            ProtocolVersion::V3_8 => b"RFB 003.008\n",
            ProtocolVersion::V3_3 => b"RFB 003.003\n",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
/// Terminal outcome of a completed attacker-side exchange.
pub enum AuthOutcome {
    /// The server accepted the password.
    Accepted,
    /// The server offers the None type and not VNC auth; any password works.
    NoAuthNeeded,
    /// The server refused the password, with its reason when one was sent.
    BadPassword { reason: String },
}

#[derive(Debug, PartialEq, Eq)]
/// Terminal outcome of a decoy-side exchange that ran to a decision.
pub enum CaptureOutcome {
    /// A full challenge/response pair was elicited.
    Captured {
        challenge: Challenge,
        response: Response,
    },
    /// The client hung up mid-response; the partial bytes are kept for the
    /// log but nothing is captured.
    Incomplete { partial: Vec<u8> },
    /// The client announced a version we do not emulate.
    BadVersion { version: String },
    /// A 3.8 client picked something other than VNC auth.
    WrongSecurityType { requested: u8 },
}
