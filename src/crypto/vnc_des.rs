//! The DES transform behind RFB authentication

use des::cipher::{BlockEncrypt, KeyInit};
use des::Des;

/// Lookup table mapping each byte to its bit-reversed value. Not in the
/// RFC, but VNC servers feed password bytes through it before the DES key
/// schedule, so interoperability requires it.
pub const REVERSED_BYTE: [u8; 256] = [
    0x00, 0x80, 0x40, 0xc0, 0x20, 0xa0, 0x60, 0xe0, 0x10, 0x90, 0x50, 0xd0, 0x30, 0xb0, 0x70,
    0xf0, 0x08, 0x88, 0x48, 0xc8, 0x28, 0xa8, 0x68, 0xe8, 0x18, 0x98, 0x58, 0xd8, 0x38, 0xb8,
    0x78, 0xf8, 0x04, 0x84, 0x44, 0xc4, 0x24, 0xa4, 0x64, 0xe4, 0x14, 0x94, 0x54, 0xd4, 0x34,
    0xb4, 0x74, 0xf4, 0x0c, 0x8c, 0x4c, 0xcc, 0x2c, 0xac, 0x6c, 0xec, 0x1c, 0x9c, 0x5c, 0xdc,
    0x3c, 0xbc, 0x7c, 0xfc, 0x02, 0x82, 0x42, 0xc2, 0x22, 0xa2, 0x62, 0xe2, 0x12, 0x92, 0x52,
    0xd2, 0x32, 0xb2, 0x72, 0xf2, 0x0a, 0x8a, 0x4a, 0xca, 0x2a, 0xaa, 0x6a, 0xea, 0x1a, 0x9a,
    0x5a, 0xda, 0x3a, 0xba, 0x7a, 0xfa, 0x06, 0x86, 0x46, 0xc6, 0x26, 0xa6, 0x66, 0xe6, 0x16,
    0x96, 0x56, 0xd6, 0x36, 0xb6, 0x76, 0xf6, 0x0e, 0x8e, 0x4e, 0xce, 0x2e, 0xae, 0x6e, 0xee,
    0x1e, 0x9e, 0x5e, 0xde, 0x3e, 0xbe, 0x7e, 0xfe, 0x01, 0x81, 0x41, 0xc1, 0x21, 0xa1, 0x61,
    0xe1, 0x11, 0x91, 0x51, 0xd1, 0x31, 0xb1, 0x71, 0xf1, 0x09, 0x89, 0x49, 0xc9, 0x29, 0xa9,
    0x69, 0xe9, 0x19, 0x99, 0x59, 0xd9, 0x39, 0xb9, 0x79, 0xf9, 0x05, 0x85, 0x45, 0xc5, 0x25,
    0xa5, 0x65, 0xe5, 0x15, 0x95, 0x55, 0xd5, 0x35, 0xb5, 0x75, 0xf5, 0x0d, 0x8d, 0x4d, 0xcd,
    0x2d, 0xad, 0x6d, 0xed, 0x1d, 0x9d, 0x5d, 0xdd, 0x3d, 0xbd, 0x7d, 0xfd, 0x03, 0x83, 0x43,
    0xc3, 0x23, 0xa3, 0x63, 0xe3, 0x13, 0x93, 0x53, 0xd3, 0x33, 0xb3, 0x73, 0xf3, 0x0b, 0x8b,
    0x4b, 0xcb, 0x2b, 0xab, 0x6b, 0xeb, 0x1b, 0x9b, 0x5b, 0xdb, 0x3b, 0xbb, 0x7b, 0xfb, 0x07,
    0x87, 0x47, 0xc7, 0x27, 0xa7, 0x67, 0xe7, 0x17, 0x97, 0x57, 0xd7, 0x37, 0xb7, 0x77, 0xf7,
    0x0f, 0x8f, 0x4f, 0xcf, 0x2f, 0xaf, 0x6f, 0xef, 0x1f, 0x9f, 0x5f, 0xdf, 0x3f, 0xbf, 0x7f,
    0xff,
];

/// Derives the 8-byte DES key a VNC server expects from a password.
///
/// The password is truncated to its first 8 bytes or right-padded with
/// zero bytes, then every byte is bit-reversed.
///
/// * `password` - The password text as read from a wordlist.
pub fn derive_key(password: &str) -> [u8; 8] {
    let mut key = [0u8; 8];
    for (i, &b) in password.as_bytes().iter().take(8).enumerate() {
        key[i] = REVERSED_BYTE[b as usize];
    }
    key
}

/// Encrypts 16-byte challenges under one derived key.
///
/// Instances are immutable. Encryption borrows the cipher shared, so one
/// instance per password can be used from any number of workers without
/// locking.
pub struct ChallengeCipher {
    des: Des,
}

impl ChallengeCipher {
    /// Builds the cipher for a derived key.
    ///
    /// * `key` - The 8 bytes produced by [derive_key].
    pub fn new(key: &[u8; 8]) -> Self {
        // Only a wrong key length can fail, and the type rules that out.
        let des = Des::new_from_slice(key).expect("8-byte DES key");
        ChallengeCipher { des }
    }

    /// Encrypts the two 8-byte halves of `challenge` independently and
    /// returns the 16-byte response a real client would send.
    pub fn encrypt(&self, challenge: &[u8; 16]) -> [u8; 16] {
        let mut response = [0u8; 16];

        let mut half = [0u8; 8];
        half.copy_from_slice(&challenge[..8]);
        let mut block = half.into();
        self.des.encrypt_block(&mut block);
        response[..8].copy_from_slice(&block);

        half.copy_from_slice(&challenge[8..]);
        let mut block = half.into();
        self.des.encrypt_block(&mut block);
        response[8..].copy_from_slice(&block);

        response
    }
}

#[cfg(test)]
mod tests {
    use crate::crypto::vnc_des::{derive_key, ChallengeCipher, REVERSED_BYTE};

    #[test]
    fn key_padding_and_truncation_boundaries() {
        // empty: all padding
        assert_eq!(derive_key(""), [0u8; 8]);

        // one byte, seven zero pads
        let key = derive_key("k");
        assert_eq!(key[0], REVERSED_BYTE[b'k' as usize]);
        assert_eq!(key[1..], [0u8; 7]);

        // exactly eight bytes, no padding
        let key = derive_key("12345678");
        for (i, b) in b"12345678".iter().enumerate() {
            assert_eq!(key[i], REVERSED_BYTE[*b as usize]);
        }

        // nine bytes: the ninth must not matter
        assert_eq!(derive_key("123456789"), derive_key("12345678"));
    }

    #[test]
    fn key_bytes_are_bit_reversed() {
        // 'k' = 0x6b = 0b01101011, reversed 0b11010110 = 0xd6
        assert_eq!(derive_key("k")[0], 0xd6);
        assert_eq!(REVERSED_BYTE[0x01], 0x80);
        assert_eq!(REVERSED_BYTE[0xff], 0xff);
    }

    #[test]
    fn kitten_encrypts_the_zero_challenge() {
        let cipher = ChallengeCipher::new(&derive_key("kitten"));

        let response = cipher.encrypt(&[0u8; 16]);

        // Both halves of an all-zero challenge encrypt to the same block.
        let expected = [
            0x79, 0x09, 0xb2, 0x4a, 0xe2, 0xf2, 0xed, 0xc9, 0x79, 0x09, 0xb2, 0x4a, 0xe2, 0xf2,
            0xed, 0xc9,
        ];
        assert_eq!(response, expected);
    }

    #[test]
    fn encryption_is_deterministic() {
        let cipher = ChallengeCipher::new(&derive_key("hunter2"));
        let challenge = *b"0123456789abcdef";

        assert_eq!(cipher.encrypt(&challenge), cipher.encrypt(&challenge));
    }

    #[test]
    fn halves_are_encrypted_independently() {
        let cipher = ChallengeCipher::new(&derive_key("hunter2"));
        let first = cipher.encrypt(&[0u8; 16]);

        let mut changed = [0u8; 16];
        changed[8..].copy_from_slice(b"notzero!");
        let second = cipher.encrypt(&changed);

        assert_eq!(first[..8], second[..8]);
        assert_ne!(first[8..], second[8..]);
    }
}
