//! Offline matching of captured handshakes against a wordlist.

pub mod matcher;
pub mod set;
pub mod token;
