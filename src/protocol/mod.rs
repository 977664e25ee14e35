//! RFB authentication handshake, playable from either side of the wire

pub mod error;
pub mod handshake;
pub mod rfb;
mod rfb_helper;
