//! Protocol-emulating listener that collects challenge/response pairs.

pub mod listener;
