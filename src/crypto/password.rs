//! Password material for authentication attempts

use std::collections::HashSet;

use log::info;

use crate::crypto::vnc_des::{derive_key, ChallengeCipher};
use crate::lines::service_trait::LineSource;

/// A candidate password with its derived key and a ready-to-use cipher.
///
/// Immutable once constructed. Two passwords with the same derived key are
/// interchangeable on the wire, whatever their spelling.
pub struct Password {
    text: String,
    key: [u8; 8],
    cipher: ChallengeCipher,
}

impl Password {
    /// * `text` - The password as read from a wordlist line.
    pub fn new(text: &str) -> Self {
        let key = derive_key(text);
        let cipher = ChallengeCipher::new(&key);
        Password {
            text: text.to_string(),
            key,
            cipher,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cipher(&self) -> &ChallengeCipher {
        &self.cipher
    }

    /// The logical password: the bytes that actually fed the key schedule,
    /// with the zero padding stripped. Anything past the eighth byte never
    /// reaches the server. A cut that splits a multi-byte character is
    /// rendered with a replacement marker.
    pub fn shown(&self) -> String {
        let bytes = self.text.as_bytes();
        let mut end = bytes.len().min(8);
        while end > 0 && bytes[end - 1] == 0 {
            end -= 1;
        }
        if self.text.is_char_boundary(end) {
            self.text[..end].to_string()
        } else {
            // A cut through a multi-byte character has no exact text form;
            // the marker stands in for the half that fed the key.
            String::from_utf8_lossy(&bytes[..end]).into_owned()
        }
    }
}

/// Reads passwords from a wordlist, dropping entries whose derived key was
/// seen before. Order of first appearance is kept.
///
/// * `source`         - The wordlist lines.
/// * `log_duplicates` - Whether dropped duplicates are logged.
pub async fn read_passwords(
    source: &mut impl LineSource,
    log_duplicates: bool,
) -> Result<Vec<Password>, std::io::Error> {
    let mut passwords = Vec::new();
    let mut seen: HashSet<[u8; 8]> = HashSet::new();

    while let Some(line) = source.next_line().await? {
        let password = Password::new(&line);
        if !seen.insert(password.key) {
            if log_duplicates {
                info!("Ignoring duplicate password {:?}", line);
            }
            continue;
        }
        passwords.push(password);
    }

    Ok(passwords)
}
