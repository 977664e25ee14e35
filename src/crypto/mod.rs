//! Key derivation and challenge encryption

pub mod password;
pub mod vnc_des;
