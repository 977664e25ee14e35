//! The `$vnc$*challenge*response` text token.
//!
//! Tokens travel through plain text files and can be embedded anywhere in
//! a line, so scanning is regex-based and a single line may yield several
//! handshakes. Pot-file lines are the same token with the cracked
//! plaintext appended after a colon.

use regex::Regex;
use thiserror::Error;

use crate::protocol::rfb::{Challenge, Response};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed handshake token {0:?}")]
pub struct MalformedToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
/// A previously solved handshake as stored in the pot file.
pub struct PotEntry {
    pub challenge: Challenge,
    pub response: Response,
    pub plaintext: String,
}

impl PotEntry {
    pub fn to_line(&self) -> String {
        format!(
            "{}:{}",
            format_token(&self.challenge, &self.response),
            self.plaintext
        )
    }
}

/// Formats a pair in the shape the scanner reads back.
pub fn format_token(challenge: &Challenge, response: &Response) -> String {
    format!(
        "$vnc$*{}*{}",
        hex::encode_upper(challenge),
        hex::encode_upper(response)
    )
}

/// Pulls handshake tokens and pot entries out of text lines.
pub struct TokenScanner {
    token: Regex,
    pot: Regex,
}

impl TokenScanner {
    pub fn new() -> Self {
        TokenScanner {
            token: Regex::new(r"\$vnc\$\*([0-9A-Fa-f]{32})\*([0-9A-Fa-f]{32})").unwrap(),
            pot: Regex::new(r"\$vnc\$\*([0-9A-Fa-f]{32})\*([0-9A-Fa-f]{32}):(\S+)").unwrap(),
        }
    }

    /// Returns every handshake token found in the line, in order.
    pub fn scan_line(&self, line: &str) -> Vec<(Challenge, Response)> {
        self.token
            .captures_iter(line)
            .map(|caps| {
                (
                    decode_half(caps.get(1).unwrap().as_str()),
                    decode_half(caps.get(2).unwrap().as_str()),
                )
            })
            .collect()
    }

    /// Returns the first pot entry on the line, if any.
    pub fn scan_pot_line(&self, line: &str) -> Option<PotEntry> {
        self.pot.captures(line).map(|caps| PotEntry {
            challenge: decode_half(caps.get(1).unwrap().as_str()),
            response: decode_half(caps.get(2).unwrap().as_str()),
            plaintext: caps.get(3).unwrap().as_str().to_string(),
        })
    }

    /// Parses a string that must be exactly one token and nothing else.
    pub fn parse_token(&self, text: &str) -> Result<(Challenge, Response), MalformedToken> {
        match self.token.find(text) {
            Some(m) if m.start() == 0 && m.end() == text.len() => {
                let mut pairs = self.scan_line(text);
                Ok(pairs.remove(0))
            }
            _ => Err(MalformedToken(text.to_string())),
        }
    }
}

/// Decodes 32 hex chars into 16 bytes. The regex guarantees the shape.
fn decode_half(hex_chars: &str) -> [u8; 16] {
    let mut half = [0u8; 16];
    let raw = hex::decode(hex_chars).unwrap();
    half.copy_from_slice(&raw);
    half
}
